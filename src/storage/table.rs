//! JSON tables on top of the key-value store.
//!
//! Every read goes through here so malformed data is handled one way: it is
//! logged and read as empty. Nothing stored is ever fatal to a caller.

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::kv::KeyValueStore;
use crate::Result;

pub mod keys {
    pub const CONTENT: &str = "iprd_content";
    pub const SHARES: &str = "iprd_shares";
    pub const AUDIT_LOGS: &str = "iprd_audit_logs";
    pub const SEARCH_COUNT: &str = "iprd_search_count";
    pub const SEARCH_PRESETS: &str = "iprd_search_presets";
    pub const PENDING_SHARE: &str = "iprd_pending_share";
    pub const VIEW_COUNTS: &str = "iprd_view_counts";
}

/// Reads a JSON array. Entries that do not parse are skipped one by one.
pub async fn load_list<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw = match kv.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "failed to read table, treating as empty");
            return Vec::new();
        }
    };

    let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(key, error = %e, "malformed table, treating as empty");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(key, index, error = %e, "skipping malformed entry");
                None
            }
        })
        .collect()
}

pub async fn save_list<T: Serialize>(kv: &dyn KeyValueStore, key: &str, items: &[T]) -> Result<()> {
    let json = serde_json::to_string(items)?;
    kv.set(key, &json).await
}

pub async fn load_value<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match kv.get(key).await {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "failed to read value, treating as absent");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "malformed value, treating as absent");
            None
        }
    }
}

pub async fn save_value<T: Serialize>(kv: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    kv.set(key, &json).await
}
