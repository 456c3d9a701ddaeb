pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;
pub use crate::config::toml_config::TomlConfig;

pub use crate::adapters::{AladhanClient, LocalStorage, LogNotifier, NotifierSet, SoundNotifier, TerminalDisplay};
pub use crate::core::{
    cache::TimingsCache,
    clock::{NextPrayer, PrayerClock},
    parser::parse_schedule,
    scheduler::{NotificationScheduler, TickOutcome, TickReport},
};
pub use crate::domain::model::{
    CacheEntry, Countdown, DailySchedule, EntryOrigin, Notification, NotificationKind, Prayer,
    PrayerEvent,
};
pub use crate::domain::ports::{ConfigProvider, Notifier, ScheduleDisplay, Storage, TimingsSource};
pub use crate::utils::error::{PrayerError, Result};
