use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::filter::FilterSpec;
use crate::storage::table::{keys, load_list, save_list};
use crate::storage::KeyValueStore;
use crate::{Result, ValidationError};

/// Only the most recent presets are kept.
pub const MAX_PRESETS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPreset {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub filters: FilterSpec,
    #[serde(default)]
    pub result_count: usize,
    #[serde(default)]
    pub created_at: String,
}

/// Named filter sets the user can re-run.
pub struct SearchPresets {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl SearchPresets {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list(&self) -> Vec<SearchPreset> {
        load_list(self.kv.as_ref(), keys::SEARCH_PRESETS).await
    }

    pub async fn get(&self, name: &str) -> Option<SearchPreset> {
        self.list().await.into_iter().find(|p| p.name == name.trim())
    }

    /// Saving under an existing name replaces that preset.
    pub async fn save(&self, name: &str, filters: FilterSpec, result_count: usize) -> Result<SearchPreset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("preset name").into());
        }
        let now = Utc::now();
        let preset = SearchPreset {
            id: now.timestamp_millis(),
            name: name.to_string(),
            filters,
            result_count,
            created_at: now.to_rfc3339(),
        };

        let _guard = self.write_lock.lock().await;
        let mut presets = self.list().await;
        presets.retain(|p| p.name != name);
        presets.push(preset.clone());
        if presets.len() > MAX_PRESETS {
            presets.drain(..presets.len() - MAX_PRESETS);
        }
        save_list(self.kv.as_ref(), keys::SEARCH_PRESETS, &presets).await?;
        info!(name, "search preset saved");
        Ok(preset)
    }

    /// Returns whether a preset was removed.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut presets = self.list().await;
        let before = presets.len();
        presets.retain(|p| p.name != name.trim());
        if presets.len() == before {
            return Ok(false);
        }
        save_list(self.kv.as_ref(), keys::SEARCH_PRESETS, &presets).await?;
        Ok(true)
    }
}
