use crate::core::cache::TimingsCache;
use crate::core::parser::parse_schedule;
use crate::domain::model::{DailySchedule, PrayerEvent};
use crate::domain::ports::{Storage, TimingsSource};
use crate::utils::error::{PrayerError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPrayer {
    pub event: PrayerEvent,
    /// The held schedule was replaced during this call.
    pub rolled_over: bool,
}

/// Holds the current day's schedule and advances it lazily.
///
/// The schedule is only replaced from inside [`PrayerClock::next_prayer`], when
/// a poll observes that every event of the held day is at or before `now`.
pub struct PrayerClock<S: Storage, F: TimingsSource> {
    cache: TimingsCache<S, F>,
    schedule: Arc<DailySchedule>,
}

impl<S: Storage, F: TimingsSource> PrayerClock<S, F> {
    /// Loads the schedule for `now`'s calendar date at the prayer location.
    ///
    /// The location's offset is only known from a loaded schedule, so the host's
    /// date is tried first and corrected when the two disagree.
    pub async fn load(cache: TimingsCache<S, F>, now: DateTime<FixedOffset>) -> Result<Self> {
        let mut schedule = load_schedule(&cache, now.date_naive()).await?;
        let local_date = now.with_timezone(&schedule.offset()).date_naive();
        if local_date != schedule.date() {
            tracing::debug!(
                "Host date {} differs from location date {}",
                schedule.date(),
                local_date
            );
            schedule = load_schedule(&cache, local_date).await?;
        }
        tracing::info!("📅 Loaded prayer timings for {}", schedule.date());
        Ok(Self {
            cache,
            schedule: Arc::new(schedule),
        })
    }

    /// Immutable snapshot of the held schedule.
    pub fn schedule(&self) -> Arc<DailySchedule> {
        Arc::clone(&self.schedule)
    }

    pub fn date(&self) -> NaiveDate {
        self.schedule.date()
    }

    pub async fn next_prayer(&mut self, now: DateTime<FixedOffset>) -> Result<NextPrayer> {
        if let Some(event) = self.schedule.next_after(now) {
            return Ok(NextPrayer {
                event: *event,
                rolled_over: false,
            });
        }

        // Calendar date as seen at the prayer location.
        let today = now.with_timezone(&self.schedule.offset()).date_naive();

        if self.schedule.date() < today {
            // Suspended across days: today's remaining prayers come first.
            let schedule = load_schedule(&self.cache, today).await?;
            if let Some(event) = schedule.next_after(now).copied() {
                self.replace(schedule);
                return Ok(NextPrayer {
                    event,
                    rolled_over: true,
                });
            }
        }

        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| PrayerError::parse(format!("no calendar day after {}", today)))?;
        let schedule = load_schedule(&self.cache, tomorrow).await?;
        let event = *schedule.first();
        self.replace(schedule);

        Ok(NextPrayer {
            event,
            rolled_over: true,
        })
    }

    fn replace(&mut self, schedule: DailySchedule) {
        tracing::info!(
            "🔄 Rolled over from {} to {}",
            self.schedule.date(),
            schedule.date()
        );
        self.schedule = Arc::new(schedule);
    }
}

async fn load_schedule<S: Storage, F: TimingsSource>(
    cache: &TimingsCache<S, F>,
    date: NaiveDate,
) -> Result<DailySchedule> {
    let entry = cache.get(date).await?;
    match parse_schedule(entry.payload(), date) {
        Ok(schedule) => Ok(schedule),
        Err(e) => {
            tracing::error!("❌ Timings for {} are unusable: {}", date, e);
            // A malformed entry never fixes itself; drop it so a retry downloads again.
            cache.invalidate(date).await?;
            Err(e)
        }
    }
}
