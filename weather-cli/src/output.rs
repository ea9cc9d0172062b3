//! Human-readable rendering of weather and favourites.

use std::fmt::Write;

use chrono::Local;
use cityweather_core::{DetailsState, FavouritesList, Unit, WeatherObservation};

pub fn observation(obs: &WeatherObservation, unit: Unit) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", obs.name);
    let _ = writeln!(out, "  {:.1}°{}  {}", obs.main.temp, unit, obs.headline());
    if let Some(feels) = obs.main.feels_like {
        let _ = writeln!(out, "  Feels like: {feels:.1}°{unit}");
    }
    let _ = writeln!(out, "  Wind speed: {} {}", obs.wind.speed, unit.wind_speed_label());
    let _ = writeln!(out, "  Humidity: {}%", obs.main.humidity);
    let _ = writeln!(out, "  Backdrop: {}", obs.backdrop().as_str());
    if let Some(url) = obs.icon_url() {
        let _ = writeln!(out, "  Icon: {url}");
    }
    if let Some(at) = obs.observed_at() {
        let _ = writeln!(out, "  Observed: {}", at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    }

    out
}

pub fn details(state: &DetailsState) -> String {
    let Some(obs) = &state.weather else {
        return format!("No weather available for {}\n", state.city);
    };

    let mut out = observation(obs, state.weather_unit.unwrap_or(state.unit));
    let star = if state.is_favourite { "★ favourite" } else { "☆ not a favourite" };
    let _ = writeln!(out, "  {star}");
    if state.from_cache {
        let _ = writeln!(out, "  (offline: showing saved snapshot)");
    }
    if let Some(warning) = &state.favourites_warning {
        let _ = writeln!(out, "  (favourites unavailable: {warning})");
    }
    out
}

pub fn favourites(list: &FavouritesList) -> String {
    if list.is_empty() {
        return "No favourites found\n".to_string();
    }

    let mut out = String::new();
    for entry in list.entries() {
        let obs = &entry.observation;
        let _ = writeln!(out, "{:<20} {:>6.1}°{}  {}", obs.name, obs.main.temp, entry.unit, obs.headline());
    }
    out
}

pub fn recent(list: &[String]) -> String {
    if list.is_empty() {
        return "No recent searches\n".to_string();
    }

    list.iter().map(|city| format!("{city}\n")).collect()
}
