pub mod access;
pub mod audit;
pub mod bulk;
pub mod config;
pub mod counters;
pub mod debounce;
pub mod error;
pub mod export;
pub mod filter;
pub mod logging;
pub mod manager;
pub mod media;
pub mod presets;
pub mod reports;
pub mod share;
pub mod storage;
pub mod upload;
pub mod workflow;

mod types;

pub use error::{AppError, ClipError, Result, StorageError, ValidationError, WorkflowError};
pub use manager::ContentManager;
pub use types::*;
