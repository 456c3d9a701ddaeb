use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PrayerError, Result};
use std::time::Duration;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PrayerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 也會落在這裡：比較永遠為 false
    if !(value >= min && value <= max) {
        return Err(PrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

fn validate_duration(field_name: &str, value: Duration, min: Duration, max: Duration) -> Result<()> {
    if value < min || value > max {
        return Err(PrayerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{:?}", value),
            reason: format!("Value must be between {:?} and {:?}", min, max),
        });
    }
    Ok(())
}

/// 共用的設定檢查，CLI 與 TOML 設定都走這裡
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_url("api_endpoint", config.api_endpoint())?;
    validate_range("latitude", config.latitude(), -90.0, 90.0)?;
    validate_range("longitude", config.longitude(), -180.0, 180.0)?;
    validate_range("method", config.calculation_method(), 0, 99)?;
    validate_range("school", config.school(), 0, 1)?;
    validate_path("cache_dir", config.cache_dir())?;

    validate_duration(
        "pre_reminder_lead",
        config.pre_reminder_lead(),
        Duration::ZERO,
        Duration::from_secs(12 * 3600),
    )?;
    validate_duration(
        "request_timeout",
        config.request_timeout(),
        Duration::from_secs(1),
        Duration::from_secs(600),
    )?;
    validate_duration(
        "retry_delay",
        config.retry_delay(),
        Duration::from_secs(1),
        Duration::from_secs(24 * 3600),
    )?;
    validate_duration(
        "poll_interval",
        config.poll_interval(),
        Duration::from_millis(100),
        Duration::from_secs(60),
    )?;

    if let Some(player) = config.sound_player() {
        validate_non_empty_string("sound.player", player)?;
    }
    for (field, path) in [
        ("sound.pre_reminder", config.pre_reminder_sound()),
        ("sound.arrival", config.arrival_sound()),
    ] {
        if let Some(path) = path {
            validate_path(field, path)?;
        }
    }

    Ok(())
}
