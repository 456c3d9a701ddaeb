use crate::core::clock::PrayerClock;
use crate::domain::model::{
    round_to_seconds, Countdown, Notification, NotificationKind, PrayerEvent,
};
use crate::domain::ports::{Notifier, ScheduleDisplay, Storage, TimingsSource};
use crate::utils::error::Result;
use chrono::{DateTime, FixedOffset, TimeDelta};
use std::time::Duration;

/// How long after a prayer time an arrival missed between ticks is still announced.
pub const ARRIVAL_GRACE: TimeDelta = TimeDelta::seconds(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub next: PrayerEvent,
    pub remaining: Countdown,
    pub rolled_over: bool,
    pub fired: Vec<Notification>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Ready(TickReport),
    /// A previous failure is backing off; the clock was not consulted.
    Waiting { retry_at: DateTime<FixedOffset> },
}

/// Per-event notification state, reset whenever the next event changes.
#[derive(Debug, Clone, Copy)]
struct Tracked {
    event: PrayerEvent,
    last_remaining: Option<i64>,
    pre_fired: bool,
    arrival_fired: bool,
}

impl Tracked {
    fn new(event: PrayerEvent) -> Self {
        Self {
            event,
            last_remaining: None,
            pre_fired: false,
            arrival_fired: false,
        }
    }
}

pub struct NotificationScheduler<S: Storage, F: TimingsSource> {
    clock: PrayerClock<S, F>,
    notifier: Box<dyn Notifier>,
    display: Box<dyn ScheduleDisplay>,
    lead_seconds: i64,
    retry_delay: TimeDelta,
    retry_at: Option<DateTime<FixedOffset>>,
    tracked: Option<Tracked>,
}

impl<S: Storage, F: TimingsSource> NotificationScheduler<S, F> {
    pub fn new(
        clock: PrayerClock<S, F>,
        notifier: Box<dyn Notifier>,
        display: Box<dyn ScheduleDisplay>,
        lead_time: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            clock,
            notifier,
            display,
            lead_seconds: i64::try_from(lead_time.as_secs()).unwrap_or(i64::MAX),
            retry_delay: TimeDelta::from_std(retry_delay).unwrap_or(TimeDelta::seconds(60)),
            retry_at: None,
            tracked: None,
        }
    }

    pub fn clock(&self) -> &PrayerClock<S, F> {
        &self.clock
    }

    /// Pushes the initially loaded schedule to the display.
    pub fn on_startup(&self) {
        self.display.show_schedule(&self.clock.schedule());
    }

    pub async fn tick(&mut self, now: DateTime<FixedOffset>) -> Result<TickOutcome> {
        // Settled from the held schedule, so a failing rollover cannot swallow it.
        let mut fired: Vec<Notification> = self.settle_passed(now).into_iter().collect();
        self.dispatch(&fired);

        if let Some(retry_at) = self.retry_at {
            if now < retry_at {
                return Ok(TickOutcome::Waiting { retry_at });
            }
        }

        let next = match self.clock.next_prayer(now).await {
            Ok(next) => {
                self.retry_at = None;
                next
            }
            Err(e) => {
                let retry_at = now + self.retry_delay;
                tracing::warn!("⏳ Could not advance prayer clock, retrying at {}", retry_at);
                self.retry_at = Some(retry_at);
                return Err(e);
            }
        };

        if next.rolled_over {
            self.display.show_schedule(&self.clock.schedule());
        }

        let remaining = round_to_seconds(next.event.time() - now);
        let observed = self.observe(next.event, remaining);
        self.dispatch(&observed);
        fired.extend(observed);

        let countdown = Countdown::from_seconds(remaining);
        self.display.show_countdown(&next.event, countdown);

        Ok(TickOutcome::Ready(TickReport {
            next: next.event,
            remaining: countdown,
            rolled_over: next.rolled_over,
            fired,
        }))
    }

    fn dispatch(&self, notifications: &[Notification]) {
        for notification in notifications {
            tracing::info!(
                "🔔 {:?} for {} at {}",
                notification.kind,
                notification.event.prayer(),
                notification.event.time().format("%H:%M")
            );
            self.notifier.notify(notification);
        }
    }

    /// Arrival of a tracked event whose time passed since the last tick.
    ///
    /// Runs before the clock is consulted. Only events seen counting down are
    /// announced, and only within [`ARRIVAL_GRACE`] of their time.
    fn settle_passed(&mut self, now: DateTime<FixedOffset>) -> Option<Notification> {
        let tracked = self.tracked.as_mut()?;
        if tracked.arrival_fired || tracked.event.time() > now {
            return None;
        }
        tracked.arrival_fired = true;

        let counted_down = tracked.last_remaining.is_some_and(|r| r > 0);
        if !counted_down || now - tracked.event.time() > ARRIVAL_GRACE {
            tracing::debug!("Skipping stale arrival of {}", tracked.event.prayer());
            return None;
        }
        Some(Notification {
            kind: NotificationKind::Arrival,
            event: tracked.event,
        })
    }

    /// Threshold-crossing detection: each kind fires at most once per event, on the
    /// first tick that observes the crossing.
    fn observe(&mut self, event: PrayerEvent, remaining: i64) -> Vec<Notification> {
        let mut fired = Vec::new();

        let mut tracked = match self.tracked.take() {
            Some(tracked) if tracked.event == event => tracked,
            _ => Tracked::new(event),
        };

        let crossed_lead = tracked
            .last_remaining
            .is_some_and(|r| r > self.lead_seconds);
        if !tracked.pre_fired && crossed_lead && remaining <= self.lead_seconds && remaining > 0 {
            tracked.pre_fired = true;
            fired.push(Notification {
                kind: NotificationKind::PreReminder,
                event,
            });
        }

        if !tracked.arrival_fired && remaining <= 0 {
            tracked.arrival_fired = true;
            fired.push(Notification {
                kind: NotificationKind::Arrival,
                event,
            });
        }

        tracked.last_remaining = Some(remaining);
        self.tracked = Some(tracked);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::tests::{MockStorage, StaticSource};
    use crate::core::cache::TimingsCache;
    use crate::core::parser::tests::month_payload;
    use crate::domain::model::{DailySchedule, Prayer};
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    const JUNE: [&str; 5] = [
        "04:30 (+03)",
        "11:45 (+03)",
        "15:10 (+03)",
        "18:20 (+03)",
        "19:50 (+03)",
    ];

    #[derive(Clone, Default)]
    struct Recorder {
        notifications: Arc<Mutex<Vec<Notification>>>,
        schedules: Arc<Mutex<Vec<DailySchedule>>>,
        countdowns: Arc<Mutex<Vec<Countdown>>>,
    }

    impl Recorder {
        fn kinds(&self) -> Vec<(NotificationKind, Prayer)> {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .map(|n| (n.kind, n.event.prayer()))
                .collect()
        }
    }

    impl Notifier for Recorder {
        fn notify(&self, notification: &Notification) {
            self.notifications.lock().unwrap().push(*notification);
        }
    }

    impl ScheduleDisplay for Recorder {
        fn show_schedule(&self, schedule: &DailySchedule) {
            self.schedules.lock().unwrap().push(schedule.clone());
        }

        fn show_countdown(&self, _next: &PrayerEvent, remaining: Countdown) {
            self.countdowns.lock().unwrap().push(remaining);
        }
    }

    fn at(day: u32, h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, day, h, m, s)
            .unwrap()
    }

    async fn scheduler_at(
        now: DateTime<FixedOffset>,
        source: StaticSource,
    ) -> (NotificationScheduler<MockStorage, StaticSource>, Recorder) {
        let cache = TimingsCache::new(MockStorage::new(), source);
        let clock = PrayerClock::load(cache, now).await.unwrap();
        let recorder = Recorder::default();
        let scheduler = NotificationScheduler::new(
            clock,
            Box::new(recorder.clone()),
            Box::new(recorder.clone()),
            Duration::from_secs(5 * 60),
            Duration::from_secs(30),
        );
        (scheduler, recorder)
    }

    fn june_source() -> StaticSource {
        StaticSource::new().with_month(2024, 6, month_payload(2024, 6, JUNE))
    }

    #[tokio::test]
    async fn test_pre_reminder_fires_once_on_crossing() {
        let (mut scheduler, recorder) = scheduler_at(at(1, 11, 0, 0), june_source()).await;

        // Dhuhr at 11:45:00: remaining goes 5m02s, 5m01s, 5m00s, 4m59s.
        for s in [58, 59] {
            scheduler.tick(at(1, 11, 39, s)).await.unwrap();
        }
        assert!(recorder.kinds().is_empty());

        let outcome = scheduler.tick(at(1, 11, 40, 0)).await.unwrap();
        match outcome {
            TickOutcome::Ready(report) => {
                assert_eq!(report.remaining.total_seconds(), 300);
                assert_eq!(report.fired.len(), 1);
                assert_eq!(report.fired[0].kind, NotificationKind::PreReminder);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        scheduler.tick(at(1, 11, 40, 1)).await.unwrap();
        scheduler.tick(at(1, 11, 40, 2)).await.unwrap();

        assert_eq!(
            recorder.kinds(),
            vec![(NotificationKind::PreReminder, Prayer::Dhuhr)]
        );
    }

    #[tokio::test]
    async fn test_pre_reminder_survives_coarse_polling() {
        let (mut scheduler, recorder) = scheduler_at(at(1, 11, 0, 0), june_source()).await;

        // Jumps over the exact 5-minute mark.
        scheduler.tick(at(1, 11, 39, 50)).await.unwrap();
        scheduler.tick(at(1, 11, 40, 7)).await.unwrap();
        scheduler.tick(at(1, 11, 40, 24)).await.unwrap();

        assert_eq!(
            recorder.kinds(),
            vec![(NotificationKind::PreReminder, Prayer::Dhuhr)]
        );
    }

    #[tokio::test]
    async fn test_no_pre_reminder_when_started_inside_lead_window() {
        let (mut scheduler, recorder) = scheduler_at(at(1, 11, 42, 0), june_source()).await;

        scheduler.tick(at(1, 11, 42, 0)).await.unwrap();
        scheduler.tick(at(1, 11, 42, 1)).await.unwrap();

        assert!(recorder.kinds().is_empty());
    }

    #[tokio::test]
    async fn test_arrival_fires_once_at_prayer_time() {
        let (mut scheduler, recorder) = scheduler_at(at(1, 15, 9, 0), june_source()).await;

        for s in 57..60 {
            scheduler.tick(at(1, 15, 9, s)).await.unwrap();
        }
        // Asr is now past; Maghrib becomes the next event.
        scheduler.tick(at(1, 15, 10, 0)).await.unwrap();
        scheduler.tick(at(1, 15, 10, 1)).await.unwrap();

        assert_eq!(recorder.kinds(), vec![(NotificationKind::Arrival, Prayer::Asr)]);
    }

    #[tokio::test]
    async fn test_arrival_fires_when_rounding_reaches_zero() {
        let (mut scheduler, recorder) = scheduler_at(at(1, 15, 9, 0), june_source()).await;

        scheduler.tick(at(1, 15, 9, 59)).await.unwrap();
        let almost = at(1, 15, 9, 59) + TimeDelta::milliseconds(700);
        scheduler.tick(almost).await.unwrap();
        scheduler.tick(at(1, 15, 10, 0) + TimeDelta::milliseconds(700)).await.unwrap();

        assert_eq!(recorder.kinds(), vec![(NotificationKind::Arrival, Prayer::Asr)]);
    }

    #[tokio::test]
    async fn test_stale_arrival_is_not_announced() {
        let (mut scheduler, recorder) = scheduler_at(at(1, 15, 0, 0), june_source()).await;

        scheduler.tick(at(1, 15, 0, 0)).await.unwrap();
        // Process was suspended for an hour.
        scheduler.tick(at(1, 16, 0, 0)).await.unwrap();

        assert!(recorder.kinds().is_empty());
    }

    #[tokio::test]
    async fn test_rollover_refreshes_display_and_announces_isha() {
        let (mut scheduler, recorder) = scheduler_at(at(1, 19, 49, 0), june_source()).await;
        scheduler.on_startup();

        scheduler.tick(at(1, 19, 49, 59)).await.unwrap();
        let outcome = scheduler.tick(at(1, 19, 50, 0)).await.unwrap();

        let TickOutcome::Ready(report) = outcome else {
            panic!("expected a ready tick");
        };
        assert!(report.rolled_over);
        assert_eq!(report.next.time(), at(2, 4, 30, 0));
        assert_eq!(recorder.kinds(), vec![(NotificationKind::Arrival, Prayer::Isha)]);

        let schedules = recorder.schedules.lock().unwrap();
        assert_eq!(schedules.len(), 2);
        assert_eq!(schedules[1].date().to_string(), "2024-06-02");
    }

    #[tokio::test]
    async fn test_failed_rollover_backs_off_then_retries() {
        let source = june_source();
        let (mut scheduler, _recorder) = scheduler_at(at(30, 21, 0, 0), source.clone()).await;

        assert!(scheduler.tick(at(30, 21, 0, 0)).await.is_err());
        let waiting = scheduler.tick(at(30, 21, 0, 10)).await.unwrap();
        assert_eq!(
            waiting,
            TickOutcome::Waiting {
                retry_at: at(30, 21, 0, 30)
            }
        );
        // Only the initial load and the failed attempt reached the source.
        assert_eq!(source.calls(), 2);

        source.set_month(
            2024,
            7,
            month_payload(
                2024,
                7,
                ["04:35 (+03)", "11:50 (+03)", "15:15 (+03)", "18:25 (+03)", "19:55 (+03)"],
            ),
        );
        let outcome = scheduler.tick(at(30, 21, 0, 30)).await.unwrap();
        let TickOutcome::Ready(report) = outcome else {
            panic!("expected a ready tick");
        };
        assert!(report.rolled_over);
    }

    #[tokio::test]
    async fn test_isha_arrival_fires_while_rollover_keeps_failing() {
        let source = june_source();
        let (mut scheduler, recorder) = scheduler_at(at(30, 19, 49, 50), source.clone()).await;

        // July is unavailable for longer than several retry delays.
        let mut now = at(30, 19, 49, 50);
        let mut errors = 0;
        while now <= at(30, 19, 52, 0) {
            if scheduler.tick(now).await.is_err() {
                errors += 1;
            }
            now += TimeDelta::seconds(1);
        }
        assert_eq!(errors, 5);
        assert_eq!(recorder.kinds(), vec![(NotificationKind::Arrival, Prayer::Isha)]);
        assert_eq!(scheduler.clock().date().to_string(), "2024-06-30");

        source.set_month(
            2024,
            7,
            month_payload(
                2024,
                7,
                ["04:35 (+03)", "11:50 (+03)", "15:15 (+03)", "18:25 (+03)", "19:55 (+03)"],
            ),
        );
        let outcome = scheduler.tick(at(30, 19, 52, 30)).await.unwrap();
        let TickOutcome::Ready(report) = outcome else {
            panic!("expected a ready tick");
        };
        assert!(report.rolled_over);
        assert!(report.fired.is_empty());
        assert_eq!(recorder.kinds(), vec![(NotificationKind::Arrival, Prayer::Isha)]);
    }

    #[tokio::test]
    async fn test_countdown_is_shown_every_tick() {
        let (mut scheduler, recorder) = scheduler_at(at(1, 3, 0, 0), june_source()).await;

        scheduler.tick(at(1, 3, 0, 0)).await.unwrap();
        scheduler.tick(at(1, 3, 0, 1)).await.unwrap();

        let countdowns = recorder.countdowns.lock().unwrap();
        assert_eq!(countdowns.len(), 2);
        assert_eq!(countdowns[0].to_string(), "01:30:00");
        assert_eq!(countdowns[1].to_string(), "01:29:59");
    }
}
