use crate::domain::ports::{ConfigProvider, TimingsSource};
use crate::utils::error::{PrayerError, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Aladhan calendar API: `GET {endpoint}/{year}/{month}` returns one month of timings.
pub struct AladhanClient {
    client: Client,
    endpoint: String,
    latitude: f64,
    longitude: f64,
    method: u8,
    school: u8,
}

impl AladhanClient {
    pub fn new<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("prayer-clock/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.api_endpoint().trim_end_matches('/').to_string(),
            latitude: config.latitude(),
            longitude: config.longitude(),
            method: config.calculation_method(),
            school: config.school(),
        })
    }

    pub fn month_url(&self, year: i32, month: u32) -> String {
        format!("{}/{}/{}", self.endpoint, year, month)
    }
}

#[async_trait]
impl TimingsSource for AladhanClient {
    async fn fetch_month(&self, year: i32, month: u32) -> Result<Vec<u8>> {
        let url = self.month_url(year, month);
        tracing::debug!("Making API request to: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("method", self.method.to_string()),
                ("school", self.school.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(PrayerError::FetchStatusError {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
