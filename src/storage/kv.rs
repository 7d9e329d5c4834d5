use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::cache::CacheManager;
use crate::{Result, StorageError};

/// String key-value table standing in for browser local storage.
///
/// Writes replace the whole value. There are no transactions: two writers
/// racing on one key leave whichever value landed last.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn keys(&self) -> Result<Vec<String>>;
}

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// One file per key under a data directory.
///
/// Each write goes to its own staging file and is renamed over the key, so
/// concurrent writers (in this process or another) never share a temp file.
pub struct DiskKv {
    base_path: PathBuf,
    cache: Option<CacheManager>,
}

impl DiskKv {
    pub async fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_owned();
        fs::create_dir_all(&base_path).await?;
        Ok(Self { base_path, cache: None })
    }

    pub fn with_cache(mut self, cache_size: usize) -> Self {
        self.cache = Some(CacheManager::new(cache_size));
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageError::Storage(format!("invalid storage key: {:?}", key)).into());
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl KeyValueStore for DiskKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(cache) = &self.cache {
            if let Some(value) = cache.get(key).await {
                return Ok(Some(value));
            }
        }

        let path = self.key_path(key)?;
        let value = match fs::read_to_string(&path).await {
            Ok(value) => value,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if let Some(cache) = &self.cache {
            cache.put(key, value.clone()).await;
        }
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let staging = self.base_path.join(format!(
            ".{}.{}.{}.tmp",
            key,
            std::process::id(),
            STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let written = match fs::write(&staging, value).await {
            Ok(()) => fs::rename(&staging, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        debug!(key, bytes = value.len(), "wrote table");

        if let Some(cache) = &self.cache {
            cache.put(key, value.to_string()).await;
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if let Some(cache) = &self.cache {
            cache.invalidate(key).await;
        }
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// In-process table, used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }
}

/// Space taken by the table against its nominal capacity. Never enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageUsage {
    pub used: u64,
    pub capacity: u64,
    pub percentage: f64,
}

pub async fn storage_usage(kv: &dyn KeyValueStore, capacity: u64) -> Result<StorageUsage> {
    let mut used = 0u64;
    for key in kv.keys().await? {
        let value_len = kv.get(&key).await?.map(|v| v.len()).unwrap_or(0);
        used += (key.len() + value_len) as u64;
    }
    let percentage = if capacity == 0 {
        100.0
    } else {
        (used as f64 / capacity as f64 * 100.0).min(100.0)
    };
    Ok(StorageUsage { used, capacity, percentage })
}
