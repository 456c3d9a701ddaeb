use crate::config::defaults;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_provider, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "prayer-clock")]
#[command(about = "Prayer times countdown with reminders before and at each prayer")]
pub struct CliConfig {
    /// Path to a TOML configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Calendar endpoint of the prayer times provider")]
    pub api_endpoint: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    #[arg(long, help = "Provider calculation method id")]
    pub method: Option<u8>,

    #[arg(long, help = "Asr juristic school (0 = Shafi, 1 = Hanafi)")]
    pub school: Option<u8>,

    #[arg(long, help = "Directory holding one timings file per date")]
    pub cache_dir: Option<String>,

    #[arg(long, help = "Minutes before a prayer to send the reminder")]
    pub remind_before: Option<u64>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Seconds to wait before retrying a failed download")]
    pub retry_delay_seconds: Option<u64>,

    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    #[arg(long, help = "Command used to play notification sounds, e.g. aplay")]
    pub player: Option<String>,

    #[arg(long)]
    pub pre_reminder_sound: Option<String>,

    #[arg(long)]
    pub arrival_sound: Option<String>,

    #[arg(long, help = "Print today's schedule and the next prayer, then exit")]
    pub once: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        self.api_endpoint
            .as_deref()
            .unwrap_or(defaults::API_ENDPOINT)
    }

    fn latitude(&self) -> f64 {
        self.latitude.unwrap_or(defaults::LATITUDE)
    }

    fn longitude(&self) -> f64 {
        self.longitude.unwrap_or(defaults::LONGITUDE)
    }

    fn calculation_method(&self) -> u8 {
        self.method.unwrap_or(defaults::CALCULATION_METHOD)
    }

    fn school(&self) -> u8 {
        self.school.unwrap_or(defaults::SCHOOL)
    }

    fn cache_dir(&self) -> &str {
        self.cache_dir.as_deref().unwrap_or(defaults::CACHE_DIR)
    }

    fn pre_reminder_lead(&self) -> Duration {
        Duration::from_secs(self.remind_before.unwrap_or(defaults::PRE_REMINDER_MINUTES) * 60)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.timeout_seconds
                .unwrap_or(defaults::REQUEST_TIMEOUT_SECONDS),
        )
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_secs(
            self.retry_delay_seconds
                .unwrap_or(defaults::RETRY_DELAY_SECONDS),
        )
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(defaults::POLL_INTERVAL_MS))
    }

    fn sound_player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    fn pre_reminder_sound(&self) -> Option<&str> {
        self.pre_reminder_sound.as_deref()
    }

    fn arrival_sound(&self) -> Option<&str> {
        self.arrival_sound.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
