//! State behind the city details view.
//!
//! Each `load` starts a new generation and cancels the previous one, so a
//! response that arrives after the view moved on (or closed) is dropped
//! instead of overwriting newer state.

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    Unit, WeatherObservation,
    error::{Result, WeatherError},
    service::{CityWeather, WeatherService},
};

/// What the details view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsState {
    pub city: String,
    pub unit: Unit,
    pub loading: bool,
    pub weather: Option<WeatherObservation>,
    /// Unit the loaded weather is expressed in; differs from `unit` for an offline snapshot.
    pub weather_unit: Option<Unit>,
    pub is_favourite: bool,
    pub from_cache: bool,
    /// Why the favourite status could not be checked, if it could not.
    pub favourites_warning: Option<String>,
}

impl DetailsState {
    fn new(city: String, unit: Unit) -> Self {
        Self {
            city,
            unit,
            loading: false,
            weather: None,
            weather_unit: None,
            is_favourite: false,
            from_cache: false,
            favourites_warning: None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: DetailsState,
    generation: u64,
    cancel: CancellationToken,
}

/// Controller for one open details view.
#[derive(Debug)]
pub struct DetailsSession {
    service: WeatherService,
    inner: Mutex<Inner>,
}

impl DetailsSession {
    /// Open a view for `city`. Without an explicit unit, the saved preference is used.
    pub async fn open(service: WeatherService, city: impl Into<String>, unit: Option<Unit>) -> Result<Self> {
        let unit = match unit {
            Some(unit) => unit,
            None => service.unit().await?,
        };

        Ok(Self {
            service,
            inner: Mutex::new(Inner {
                state: DetailsState::new(city.into(), unit),
                generation: 0,
                cancel: CancellationToken::new(),
            }),
        })
    }

    pub async fn state(&self) -> DetailsState {
        self.inner.lock().await.state.clone()
    }

    /// Fetch (or fall back to the saved favourite) and apply the result if
    /// no newer load or close happened meanwhile.
    pub async fn load(&self) -> Result<DetailsState> {
        let (generation, cancel, city, unit) = {
            let mut inner = self.inner.lock().await;
            inner.cancel.cancel();
            inner.cancel = CancellationToken::new();
            inner.generation += 1;

            let city = inner.state.city.clone();
            let unit = inner.state.unit;
            inner.state = DetailsState { loading: true, ..DetailsState::new(city.clone(), unit) };

            (inner.generation, inner.cancel.clone(), city, unit)
        };

        let result = self.service.load_weather_for_city(&city, unit, &cancel).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation || cancel.is_cancelled() {
            debug!(city = %city, generation, "discarding stale weather result");
            return Err(WeatherError::Cancelled);
        }

        inner.state.loading = false;
        match result {
            Ok(CityWeather { observation, unit, is_favourite, from_cache, favourites_warning }) => {
                inner.state.weather = Some(observation);
                inner.state.weather_unit = Some(unit);
                inner.state.is_favourite = is_favourite;
                inner.state.from_cache = from_cache;
                inner.state.favourites_warning = favourites_warning;
                Ok(inner.state.clone())
            }
            Err(err) => Err(err),
        }
    }

    /// Bookmark or un-bookmark the loaded city.
    pub async fn toggle_favourite(&self) -> Result<bool> {
        let (observation, unit) = {
            let inner = self.inner.lock().await;
            let observation = inner.state.weather.clone().ok_or(WeatherError::NoWeather)?;
            (observation, inner.state.weather_unit.unwrap_or(inner.state.unit))
        };

        let toggled = self.service.toggle_favourite(&observation, unit).await?;

        let mut inner = self.inner.lock().await;
        inner.state.is_favourite = toggled.is_favourite;
        Ok(toggled.is_favourite)
    }

    /// Flip C/F and remember the choice. The caller reloads to see new numbers.
    pub async fn toggle_unit(&self) -> Result<Unit> {
        let unit = {
            let mut inner = self.inner.lock().await;
            inner.state.unit = inner.state.unit.toggled();
            inner.state.unit
        };

        self.service.set_unit(unit).await?;
        Ok(unit)
    }

    /// Abandon any pending load; its result will be discarded.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.cancel.cancel();
        inner.generation += 1;
        inner.state.loading = false;
    }
}
