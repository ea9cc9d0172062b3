//! In-crate doubles for the weather source.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    Unit, WeatherObservation, WeatherSource,
    error::{Result, WeatherError},
    model::fixtures::observation,
};

/// Answers from a fixed table and counts every call. Unknown cities fail.
#[derive(Debug, Default)]
pub struct FakeSource {
    cities: HashMap<String, WeatherObservation>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with an observation named `canonical`.
    pub fn with_city(mut self, query: &str, canonical: &str, temp: f64) -> Self {
        self.cities.insert(query.to_string(), observation(canonical, temp));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl WeatherSource for FakeSource {
    async fn by_city(&self, city: &str, _unit: Unit) -> Result<WeatherObservation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.cities
            .get(city)
            .cloned()
            .ok_or_else(|| WeatherError::fetch(format!("city not found: {city}")))
    }

    async fn by_coordinates(&self, lat: f64, lon: f64, _unit: Unit) -> Result<WeatherObservation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut obs = observation("Here", 20.0);
        obs.coord = Some(crate::model::Coordinates { lat, lon });
        Ok(obs)
    }
}
