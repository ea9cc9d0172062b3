//! Weather lookups reconciled against the persisted favourites.

use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    Config, Unit, WeatherObservation,
    connectivity::{Reachability, TcpProbe},
    error::{Result, WeatherError},
    favourites::{self, FavouriteEntry, FavouritesList, Toggled},
    provider::{WeatherSource, source_from_config},
    recent,
    storage::{
        FAVOURITES_KEY, FileStore, KeyLocks, KeyValueStore, RECENT_SEARCHES_KEY, UNIT_KEY, load_json,
        save_json,
    },
};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Weather for a searched city, as shown on the details view.
#[derive(Debug, Clone, PartialEq)]
pub struct CityWeather {
    pub observation: WeatherObservation,
    /// Unit the temperatures are in. A cached snapshot keeps the unit it was saved with.
    pub unit: Unit,
    pub is_favourite: bool,
    /// Served from the favourites list because we were offline.
    pub from_cache: bool,
    /// Set when the saved favourites could not be read; the lookup went
    /// ahead without them.
    pub favourites_warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
    store: Arc<dyn KeyValueStore>,
    reachability: Arc<dyn Reachability>,
    locks: Arc<KeyLocks>,
}

impl WeatherService {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        store: Arc<dyn KeyValueStore>,
        reachability: Arc<dyn Reachability>,
    ) -> Self {
        Self { source, store, reachability, locks: Arc::new(KeyLocks::new()) }
    }

    /// OpenWeather + file store + TCP probe, all taken from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let probe = TcpProbe::new(config.probe_addr(), PROBE_TIMEOUT);
        Self::from_config_with(config, Arc::new(probe))
    }

    pub fn from_config_with(config: &Config, reachability: Arc<dyn Reachability>) -> anyhow::Result<Self> {
        let source = source_from_config(config)?;
        let store = FileStore::new(config.data_dir()?);

        Ok(Self::new(Arc::new(source), Arc::new(store), reachability))
    }

    pub async fn favourites(&self) -> Result<FavouritesList> {
        Ok(load_json(self.store.as_ref(), FAVOURITES_KEY).await?.unwrap_or_default())
    }

    /// Forget all favourites, including an unreadable saved list.
    pub async fn reset_favourites(&self) -> Result<()> {
        let _guard = self.locks.acquire(FAVOURITES_KEY).await;
        self.store.remove(FAVOURITES_KEY).await?;
        info!("favourites reset");
        Ok(())
    }

    pub async fn is_favourite(&self, city: &str) -> Result<bool> {
        Ok(favourites::is_favourite(&self.favourites().await?, city))
    }

    /// Current weather for `city`, falling back to the saved favourite when offline.
    ///
    /// A fresh answer for a favourited city overwrites the stored snapshot,
    /// retagged with `unit`. Cancelling `cancel` abandons the request before
    /// anything is written. An unreadable favourites list does not block the
    /// lookup: it is reported in `favourites_warning` and left untouched.
    pub async fn load_weather_for_city(
        &self,
        city: &str,
        unit: Unit,
        cancel: &CancellationToken,
    ) -> Result<CityWeather> {
        let stored = match self.favourites().await {
            Ok(list) => Ok(list),
            Err(err) => {
                warn!(error = %err, "favourites unreadable, looking up without them");
                Err(err.to_string())
            }
        };

        if let Some(entry) = stored.as_ref().ok().and_then(|list| list.get(city)) {
            if !self.reachability.is_online().await {
                info!(city, "offline, serving saved favourite");
                return Ok(CityWeather {
                    observation: entry.observation.clone(),
                    unit: entry.unit,
                    is_favourite: true,
                    from_cache: true,
                    favourites_warning: None,
                });
            }
        }

        let observation = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(WeatherError::Cancelled),
            res = self.source.by_city(city, unit) => res.inspect_err(|e| warn!(city, error = %e, "weather fetch failed"))?,
        };

        let (is_favourite, favourites_warning) = match stored {
            Ok(_) => (self.refresh_favourite(city, &observation, unit, cancel).await?, None),
            Err(warning) => (false, Some(warning)),
        };

        Ok(CityWeather { observation, unit, is_favourite, from_cache: false, favourites_warning })
    }

    /// Overwrite the stored snapshot for `city` (or the canonical name the
    /// source answered with) if it is a favourite.
    async fn refresh_favourite(
        &self,
        city: &str,
        observation: &WeatherObservation,
        unit: Unit,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let _guard = self.locks.acquire(FAVOURITES_KEY).await;
        // Waiting for the lock can outlast the requester.
        if cancel.is_cancelled() {
            return Err(WeatherError::Cancelled);
        }
        let mut list = self.favourites().await?;

        let Some(index) = list.position(city).or_else(|| list.position(&observation.name)) else {
            return Ok(false);
        };

        list.replace_at(index, FavouriteEntry::new(observation.clone(), unit));
        save_json(self.store.as_ref(), FAVOURITES_KEY, &list).await?;
        info!(city = %observation.name, %unit, "refreshed favourite");

        Ok(true)
    }

    /// Weather at a position. Never cached and never touches favourites.
    pub async fn load_weather_for_coordinates(&self, lat: f64, lon: f64, unit: Unit) -> Result<WeatherObservation> {
        self.source
            .by_coordinates(lat, lon, unit)
            .await
            .inspect_err(|e| warn!(lat, lon, error = %e, "weather fetch failed"))
    }

    pub async fn toggle_favourite(&self, observation: &WeatherObservation, unit: Unit) -> Result<Toggled> {
        let _guard = self.locks.acquire(FAVOURITES_KEY).await;
        let list = self.favourites().await?;

        let toggled = favourites::toggle_favourite(&list, observation, unit);
        save_json(self.store.as_ref(), FAVOURITES_KEY, &toggled.list).await?;

        if toggled.is_favourite {
            info!(city = %observation.name, "added to favourites");
        } else {
            info!(city = %observation.name, "removed from favourites");
        }
        Ok(toggled)
    }

    pub async fn remove_favourite(&self, city: &str) -> Result<FavouritesList> {
        let _guard = self.locks.acquire(FAVOURITES_KEY).await;
        let list = favourites::remove_favourite(&self.favourites().await?, city);

        save_json(self.store.as_ref(), FAVOURITES_KEY, &list).await?;
        info!(city, "removed from favourites");
        Ok(list)
    }

    pub async fn recent_searches(&self) -> Result<Vec<String>> {
        Ok(load_json(self.store.as_ref(), RECENT_SEARCHES_KEY).await?.unwrap_or_default())
    }

    pub async fn record_search(&self, city: &str) -> Result<Vec<String>> {
        let _guard = self.locks.acquire(RECENT_SEARCHES_KEY).await;
        let mut list = self.recent_searches().await?;

        if recent::record(&mut list, city) {
            save_json(self.store.as_ref(), RECENT_SEARCHES_KEY, &list).await?;
        }
        Ok(list)
    }

    pub async fn suggest(&self, text: &str) -> Result<Vec<String>> {
        let list = self.recent_searches().await?;
        Ok(recent::filter(&list, text).into_iter().map(str::to_string).collect())
    }

    pub async fn clear_recent_searches(&self) -> Result<()> {
        let _guard = self.locks.acquire(RECENT_SEARCHES_KEY).await;
        self.store.remove(RECENT_SEARCHES_KEY).await
    }

    /// Saved unit preference; missing or unreadable values mean Celsius.
    pub async fn unit(&self) -> Result<Unit> {
        let Some(raw) = self.store.get(UNIT_KEY).await? else {
            return Ok(Unit::default());
        };

        Ok(raw.parse().unwrap_or_else(|_| {
            warn!(value = %raw, "ignoring unknown saved unit");
            Unit::default()
        }))
    }

    pub async fn set_unit(&self, unit: Unit) -> Result<()> {
        self.store.set(UNIT_KEY, unit.as_str()).await
    }
}
