use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrayerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status} for {url}")]
    FetchStatusError { status: u16, url: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Schedule parse error: {message}")]
    ParseError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類，對應 fetch / storage / parse 三種失敗來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Fetch,
    Storage,
    Parse,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PrayerError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::FetchStatusError { .. } => ErrorCategory::Fetch,
            Self::IoError(_) => ErrorCategory::Storage,
            Self::ParseError { .. } => ErrorCategory::Parse,
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Config
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Fetch => ErrorSeverity::Medium,
            ErrorCategory::Parse | ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Fetch => {
                "Check the network connection and the provider endpoint; the fetch is retried on a later tick"
            }
            ErrorCategory::Storage => {
                "Make sure the cache directory exists and is writable"
            }
            ErrorCategory::Parse => {
                "The cached timings were discarded; they will be downloaded again"
            }
            ErrorCategory::Config => "Review the command line flags or the TOML configuration file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) if e.is_timeout() => {
                "Timed out while downloading prayer timings".to_string()
            }
            Self::ApiError(_) | Self::FetchStatusError { .. } => {
                format!("Could not download prayer timings: {}", self)
            }
            Self::IoError(e) => format!("Could not access the timings cache: {}", e),
            Self::ParseError { .. } => {
                format!("Prayer timings are malformed: {}", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrayerError>;
