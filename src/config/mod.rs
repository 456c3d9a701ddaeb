#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

/// 預設值：沙烏地阿拉伯 Arar，計算方法 4 (Umm al-Qura)
pub mod defaults {
    pub const API_ENDPOINT: &str = "https://api.aladhan.com/v1/calendar";
    pub const LATITUDE: f64 = 30.983334;
    pub const LONGITUDE: f64 = 41.016666;
    pub const CALCULATION_METHOD: u8 = 4;
    pub const SCHOOL: u8 = 0;
    pub const CACHE_DIR: &str = "./";
    pub const PRE_REMINDER_MINUTES: u64 = 5;
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
    pub const RETRY_DELAY_SECONDS: u64 = 60;
    pub const POLL_INTERVAL_MS: u64 = 1000;
}
