use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::storage::table::{keys, load_value, save_value};
use crate::storage::KeyValueStore;
use crate::Result;

/// Usage counters: searches run and views per content id.
pub struct Counters {
    kv: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
}

impl Counters {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv, lock: Mutex::new(()) }
    }

    pub async fn searches(&self) -> u64 {
        load_value(self.kv.as_ref(), keys::SEARCH_COUNT).await.unwrap_or(0)
    }

    pub async fn record_search(&self) -> Result<u64> {
        let _guard = self.lock.lock().await;
        let count = self.searches().await + 1;
        save_value(self.kv.as_ref(), keys::SEARCH_COUNT, &count).await?;
        Ok(count)
    }

    async fn view_counts(&self) -> BTreeMap<String, u64> {
        load_value(self.kv.as_ref(), keys::VIEW_COUNTS).await.unwrap_or_default()
    }

    pub async fn views(&self, id: i64) -> u64 {
        self.view_counts().await.get(&id.to_string()).copied().unwrap_or(0)
    }

    pub async fn record_view(&self, id: i64) -> Result<u64> {
        let _guard = self.lock.lock().await;
        let mut counts = self.view_counts().await;
        let count = counts.entry(id.to_string()).or_insert(0);
        *count += 1;
        let count = *count;
        save_value(self.kv.as_ref(), keys::VIEW_COUNTS, &counts).await?;
        debug!(id, views = count, "view recorded");
        Ok(count)
    }
}
