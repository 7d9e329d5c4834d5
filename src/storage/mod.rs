pub mod cache;
pub mod content;
pub mod kv;
pub mod seed;
pub mod table;

pub use content::ContentStore;
pub use kv::{storage_usage, DiskKv, KeyValueStore, MemoryKv, StorageUsage};
