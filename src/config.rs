use std::path::PathBuf;
use std::time::Duration;

use crate::debounce::SEARCH_DEBOUNCE;
use crate::upload::MAX_UPLOAD_BYTES;

/// Nominal browser-style storage quota, reported but never enforced.
pub const STORAGE_CAPACITY: u64 = 10 * 1024 * 1024;

pub const PAGE_SIZE: usize = 12;

/// Runtime knobs for a [`ContentManager`](crate::manager::ContentManager).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    /// Entries kept in the read cache; zero disables it.
    pub cache_size: usize,
    pub debounce: Duration,
    pub page_size: usize,
    pub storage_capacity: u64,
    pub max_upload_bytes: u64,
}

impl Settings {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }
}

/// Falls back to `./iprd` when the platform has no data directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("iprd"))
        .unwrap_or_else(|| PathBuf::from("iprd"))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_size: 100,
            debounce: SEARCH_DEBOUNCE,
            page_size: PAGE_SIZE,
            storage_capacity: STORAGE_CAPACITY,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}
