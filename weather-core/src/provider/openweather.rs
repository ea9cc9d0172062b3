use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Unit, WeatherObservation, error::{Result, WeatherError}};

use super::WeatherSource;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn with_settings(api_key: String, base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_current(&self, query: &[(&str, &str)], unit: Unit) -> Result<WeatherObservation> {
        let url = format!("{}/weather", self.base_url);

        debug!(?query, units = unit.api_units(), "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("units", unit.api_units()), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| WeatherError::fetch(format!("Failed to send request to OpenWeather: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::fetch(format!("Failed to read OpenWeather response body: {e}")))?;

        if !status.is_success() {
            warn!(%status, "OpenWeather request failed");
            return Err(WeatherError::fetch(format!(
                "OpenWeather request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::fetch(format!("Failed to parse OpenWeather JSON: {e}")))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn by_city(&self, city: &str, unit: Unit) -> Result<WeatherObservation> {
        self.fetch_current(&[("q", city)], unit).await
    }

    async fn by_coordinates(&self, lat: f64, lon: f64, unit: Unit) -> Result<WeatherObservation> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        self.fetch_current(&[("lat", lat.as_str()), ("lon", lon.as_str())], unit).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
