use crate::domain::model::{Countdown, DailySchedule, Notification, PrayerEvent};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Persistent byte store for cache entries. A missing file reads back as `None`.
pub trait Storage: Send + Sync {
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Remote prayer-time provider. One request returns a whole month.
#[async_trait]
pub trait TimingsSource: Send + Sync {
    async fn fetch_month(&self, year: i32, month: u32) -> Result<Vec<u8>>;
}

/// Notify sink. Must not block the poll loop.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Display sink for the schedule list and the countdown line.
pub trait ScheduleDisplay: Send + Sync {
    fn show_schedule(&self, schedule: &DailySchedule);
    fn show_countdown(&self, next: &PrayerEvent, remaining: Countdown);
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
    fn calculation_method(&self) -> u8;
    fn school(&self) -> u8;
    fn cache_dir(&self) -> &str;
    fn pre_reminder_lead(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn retry_delay(&self) -> Duration;
    fn poll_interval(&self) -> Duration;
    fn sound_player(&self) -> Option<&str>;
    fn pre_reminder_sound(&self) -> Option<&str>;
    fn arrival_sound(&self) -> Option<&str>;
}
