use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

use crate::error::WeatherError;

/// Temperature unit system selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Celsius => "C",
            Unit::Fahrenheit => "F",
        }
    }

    /// Value of the `units` query parameter understood by OpenWeather.
    pub fn api_units(&self) -> &'static str {
        match self {
            Unit::Celsius => "metric",
            Unit::Fahrenheit => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Unit::Celsius => Unit::Fahrenheit,
            Unit::Fahrenheit => Unit::Celsius,
        }
    }

    pub fn wind_speed_label(&self) -> &'static str {
        match self {
            Unit::Celsius => "m/s",
            Unit::Fahrenheit => "mph",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "c" | "celsius" | "metric" => Ok(Unit::Celsius),
            "f" | "fahrenheit" | "imperial" => Ok(Unit::Fahrenheit),
            _ => Err(WeatherError::InvalidUnit(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    pub humidity: u8,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindBlock {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Category label such as "Rain" or "Clouds".
    pub main: String,
    pub description: String,
    pub icon: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current-weather document as returned by the weather source.
///
/// Fields this crate does not interpret are kept in the `extra` map of the
/// block they came from, so a stored snapshot carries the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub name: String,
    pub main: MainBlock,
    pub wind: WindBlock,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord: Option<Coordinates>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Background category picked from the primary condition label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    Rain,
    Cloudy,
    Fog,
    Haze,
    Snow,
    Sunny,
}

impl Backdrop {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backdrop::Rain => "rain",
            Backdrop::Cloudy => "cloudy",
            Backdrop::Fog => "fog",
            Backdrop::Haze => "haze",
            Backdrop::Snow => "snow",
            Backdrop::Sunny => "sunny",
        }
    }
}

impl WeatherObservation {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn icon_url(&self) -> Option<String> {
        self.primary_condition()
            .map(|c| format!("https://openweathermap.org/img/wn/{}@4x.png", c.icon))
    }

    /// Description of the primary condition with its first letter upper-cased.
    pub fn headline(&self) -> String {
        let Some(condition) = self.primary_condition() else {
            return "Unknown".to_string();
        };

        let mut chars = condition.description.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => condition.main.clone(),
        }
    }

    pub fn backdrop(&self) -> Backdrop {
        let label = self.primary_condition().map(|c| c.main.as_str()).unwrap_or("");

        // First match wins.
        if label.contains("Rain") {
            Backdrop::Rain
        } else if label.contains("Cloud") {
            Backdrop::Cloudy
        } else if label.contains("Fog") {
            Backdrop::Fog
        } else if label.contains("Haze") {
            Backdrop::Haze
        } else if label.contains("Snow") {
            Backdrop::Snow
        } else {
            Backdrop::Sunny
        }
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    }
}
