//! String key-value persistence.
//!
//! Values are whole documents: callers read a key, change it in memory and
//! write the complete value back. [`KeyLocks`] lets a caller hold a key for
//! the duration of such a read-modify-write.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    fmt::Debug,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{
    fs,
    sync::{Mutex, OwnedMutexGuard},
};
use tracing::debug;

use crate::error::{Result, WeatherError};

pub const FAVOURITES_KEY: &str = "favourites";
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";
pub const UNIT_KEY: &str = "unit";

#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read a JSON value; a missing key reads as `None`.
pub async fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| WeatherError::persistence(key, format!("corrupt value: {e}"))),
        None => Ok(None),
    }
}

pub async fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(|e| WeatherError::persistence(key, e))?;
    store.set(key, &raw).await
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WeatherError::persistence(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| WeatherError::persistence(key, e))?;

        // Write beside the target and rename so a crash never leaves half a list.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await.map_err(|e| WeatherError::persistence(key, e))?;
        fs::rename(&tmp, &path).await.map_err(|e| WeatherError::persistence(key, e))?;

        debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WeatherError::persistence(key, e)),
        }
    }
}

/// Process-local store, used by tests and as a scratch backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

/// Per-key async locks serialising read-modify-write sequences.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}
