//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather source abstraction and its OpenWeather client
//! - Key-value persistence and a reachability probe
//! - Favourites, recent searches and unit preference, reconciled with live lookups
//!
//! It is used by `cityweather-cli`, but can also back other front ends.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod favourites;
pub mod model;
pub mod provider;
pub mod recent;
pub mod service;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::WeatherError;
pub use favourites::{FavouriteEntry, FavouritesList, Toggled};
pub use model::{Backdrop, Unit, WeatherObservation};
pub use provider::WeatherSource;
pub use service::{CityWeather, WeatherService};
pub use session::{DetailsSession, DetailsState};
