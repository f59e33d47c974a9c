//! Weather provider client.
//!
//! The poll cycle only sees [`WeatherSource`]: one call, one [`Reading`] or a
//! [`FetchError`]. [`OpenWeatherClient`] implements it against the
//! OpenWeatherMap current-weather endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::{RawWeatherResponse, Reading, Units};

// ---

/// Reasons a fetch produced no reading.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

/// Source of current weather readings.
pub trait WeatherSource {
    fn fetch(&self) -> impl Future<Output = Result<Reading, FetchError>> + Send;
}

/// OpenWeatherMap current weather client for one location.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_url: String,
    api_key: String,
    location: String,
    units: Units,
}

impl OpenWeatherClient {
    // ---
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        location: impl Into<String>,
        units: Units,
    ) -> Result<Self, FetchError> {
        // ---
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            location: location.into(),
            units,
        })
    }
}

impl WeatherSource for OpenWeatherClient {
    // ---
    async fn fetch(&self) -> Result<Reading, FetchError> {
        // ---
        tracing::debug!("Fetching current weather for {}", self.location);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", self.location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_query()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw: RawWeatherResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        raw.to_reading(self.units)
            .ok_or_else(|| FetchError::Malformed("response has no weather condition".into()))
    }
}
