use crate::config::defaults;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PrayerError, Result};
use crate::utils::validation::{validate_provider, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub location: LocationConfig,
    pub provider: Option<ProviderConfig>,
    pub cache: Option<CacheConfig>,
    pub notifications: Option<NotificationsConfig>,
    pub sound: Option<SoundConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub endpoint: Option<String>,
    pub method: Option<u8>,
    pub school: Option<u8>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub pre_reminder_minutes: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub retry_delay_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoundConfig {
    pub player: Option<String>,
    pub pre_reminder: Option<String>,
    pub arrival: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PrayerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PrayerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PRAYER_LATITUDE})；未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 套用命令列覆蓋設定
    #[cfg(feature = "cli")]
    pub fn apply_cli_overrides(&mut self, cli: &crate::config::cli::CliConfig) {
        if let Some(latitude) = cli.latitude {
            self.location.latitude = latitude;
        }
        if let Some(longitude) = cli.longitude {
            self.location.longitude = longitude;
        }

        let provider = self.provider.get_or_insert_with(ProviderConfig::default);
        if let Some(endpoint) = &cli.api_endpoint {
            provider.endpoint = Some(endpoint.clone());
        }
        if cli.method.is_some() {
            provider.method = cli.method;
        }
        if cli.school.is_some() {
            provider.school = cli.school;
        }
        if cli.timeout_seconds.is_some() {
            provider.timeout_seconds = cli.timeout_seconds;
        }

        if let Some(directory) = &cli.cache_dir {
            self.cache = Some(CacheConfig {
                directory: Some(directory.clone()),
            });
        }

        let notifications = self
            .notifications
            .get_or_insert_with(NotificationsConfig::default);
        if cli.remind_before.is_some() {
            notifications.pre_reminder_minutes = cli.remind_before;
        }
        if cli.poll_interval_ms.is_some() {
            notifications.poll_interval_ms = cli.poll_interval_ms;
        }
        if cli.retry_delay_seconds.is_some() {
            notifications.retry_delay_seconds = cli.retry_delay_seconds;
        }

        let sound = self.sound.get_or_insert_with(SoundConfig::default);
        if let Some(player) = &cli.player {
            sound.player = Some(player.clone());
        }
        if let Some(path) = &cli.pre_reminder_sound {
            sound.pre_reminder = Some(path.clone());
        }
        if let Some(path) = &cli.arrival_sound {
            sound.arrival = Some(path.clone());
        }
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location.name.as_deref()
    }

    fn provider(&self) -> Option<&ProviderConfig> {
        self.provider.as_ref()
    }

    fn notifications(&self) -> Option<&NotificationsConfig> {
        self.notifications.as_ref()
    }

    fn sound(&self) -> Option<&SoundConfig> {
        self.sound.as_ref()
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        self.provider()
            .and_then(|p| p.endpoint.as_deref())
            .unwrap_or(defaults::API_ENDPOINT)
    }

    fn latitude(&self) -> f64 {
        self.location.latitude
    }

    fn longitude(&self) -> f64 {
        self.location.longitude
    }

    fn calculation_method(&self) -> u8 {
        self.provider()
            .and_then(|p| p.method)
            .unwrap_or(defaults::CALCULATION_METHOD)
    }

    fn school(&self) -> u8 {
        self.provider()
            .and_then(|p| p.school)
            .unwrap_or(defaults::SCHOOL)
    }

    fn cache_dir(&self) -> &str {
        self.cache
            .as_ref()
            .and_then(|c| c.directory.as_deref())
            .unwrap_or(defaults::CACHE_DIR)
    }

    fn pre_reminder_lead(&self) -> Duration {
        let minutes = self
            .notifications()
            .and_then(|n| n.pre_reminder_minutes)
            .unwrap_or(defaults::PRE_REMINDER_MINUTES);
        Duration::from_secs(minutes * 60)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.provider()
                .and_then(|p| p.timeout_seconds)
                .unwrap_or(defaults::REQUEST_TIMEOUT_SECONDS),
        )
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_secs(
            self.notifications()
                .and_then(|n| n.retry_delay_seconds)
                .unwrap_or(defaults::RETRY_DELAY_SECONDS),
        )
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.notifications()
                .and_then(|n| n.poll_interval_ms)
                .unwrap_or(defaults::POLL_INTERVAL_MS),
        )
    }

    fn sound_player(&self) -> Option<&str> {
        self.sound().and_then(|s| s.player.as_deref())
    }

    fn pre_reminder_sound(&self) -> Option<&str> {
        self.sound().and_then(|s| s.pre_reminder.as_deref())
    }

    fn arrival_sound(&self) -> Option<&str> {
        self.sound().and_then(|s| s.arrival.as_deref())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
