/// Errors surfaced by weather lookups and favourites bookkeeping.
///
/// None of these are fatal: callers show a placeholder state and wait for
/// the next user action.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Failed to fetch weather: {message}")]
    FetchFailed { message: String },

    #[error("Storage for '{key}' is unavailable: {message}")]
    PersistenceUnavailable { key: String, message: String },

    #[error("Request was cancelled before it completed")]
    Cancelled,

    #[error("No weather loaded yet")]
    NoWeather,

    #[error("Unknown unit '{0}'. Supported units: C, F.")]
    InvalidUnit(String),
}

impl WeatherError {
    pub(crate) fn fetch(message: impl Into<String>) -> Self {
        WeatherError::FetchFailed { message: message.into() }
    }

    pub(crate) fn persistence(key: &str, err: impl std::fmt::Display) -> Self {
        WeatherError::PersistenceUnavailable { key: key.to_string(), message: err.to_string() }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
