pub mod cache;
pub mod clock;
pub mod parser;
pub mod scheduler;

pub use crate::domain::model::{DailySchedule, Prayer, PrayerEvent};
pub use crate::domain::ports::{ConfigProvider, Notifier, ScheduleDisplay, Storage, TimingsSource};
pub use crate::utils::error::Result;
