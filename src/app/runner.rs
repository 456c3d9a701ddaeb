use crate::adapters::{AladhanClient, LocalStorage, LogNotifier, NotifierSet, SoundNotifier, TerminalDisplay};
use crate::core::cache::TimingsCache;
use crate::core::clock::PrayerClock;
use crate::core::scheduler::{NotificationScheduler, TickOutcome};
use crate::domain::ports::{ConfigProvider, ScheduleDisplay, Storage, TimingsSource};
use crate::utils::error::Result;
use chrono::{DateTime, FixedOffset, Local};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub type LiveScheduler = NotificationScheduler<LocalStorage, AladhanClient>;

pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Wires the production adapters from configuration and loads today's schedule.
pub async fn build_scheduler<C: ConfigProvider + ?Sized>(
    config: &C,
    display: Box<dyn ScheduleDisplay>,
    now: DateTime<FixedOffset>,
) -> Result<LiveScheduler> {
    let storage = LocalStorage::new(config.cache_dir());
    let source = AladhanClient::new(config)?;
    let clock = PrayerClock::load(TimingsCache::new(storage, source), now).await?;

    let mut notifier = NotifierSet::new().with(LogNotifier);
    if let Some(sound) = SoundNotifier::from_config(config) {
        tracing::info!("🔊 Sound notifications enabled");
        notifier = notifier.with(sound);
    }

    Ok(NotificationScheduler::new(
        clock,
        Box::new(notifier),
        display,
        config.pre_reminder_lead(),
        config.retry_delay(),
    ))
}

pub fn terminal_display() -> Box<dyn ScheduleDisplay> {
    Box::new(TerminalDisplay)
}

/// Drives `tick` on a fixed interval until `shutdown` resolves.
///
/// Tick errors are logged and never end the loop; the scheduler backs off on its own.
pub async fn run<S, F, Sd>(
    scheduler: &mut NotificationScheduler<S, F>,
    poll_interval: Duration,
    shutdown: Sd,
) -> u64
where
    S: Storage,
    F: TimingsSource,
    Sd: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                ticks += 1;
                match scheduler.tick(local_now()).await {
                    Ok(TickOutcome::Ready(report)) => {
                        if report.rolled_over {
                            tracing::info!("📅 Now serving {}", scheduler.clock().date());
                        }
                    }
                    Ok(TickOutcome::Waiting { retry_at }) => {
                        tracing::debug!("Waiting until {} before retrying", retry_at);
                    }
                    Err(e) => {
                        tracing::error!(
                            "❌ Tick failed: {} (Category: {:?}, Severity: {:?})",
                            e,
                            e.category(),
                            e.severity()
                        );
                        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                    }
                }
            }
            _ = &mut shutdown => {
                tracing::info!("👋 Shutting down after {} ticks", ticks);
                break;
            }
        }
    }
    ticks
}
