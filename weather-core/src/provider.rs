use async_trait::async_trait;
use std::fmt::Debug;

use crate::{Config, Unit, WeatherObservation, error::Result, provider::openweather::OpenWeatherSource};

pub mod openweather;

/// Something that can answer "what is the weather right now" for a place.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn by_city(&self, city: &str, unit: Unit) -> Result<WeatherObservation>;

    async fn by_coordinates(&self, lat: f64, lon: f64, unit: Unit) -> Result<WeatherObservation>;
}

/// Construct the OpenWeather source from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<OpenWeatherSource> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `cityweather configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    OpenWeatherSource::with_settings(api_key, config.base_url(), config.timeout())
}
