use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Content not found: {0}")]
    NotFound(String),
    #[error("Seed record {0} is read-only")]
    SeedImmutable(i64),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// User-facing, recoverable input problems. The message is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in {0}")]
    MissingField(&'static str),
    #[error("Invalid time '{0}', expected HH:MM:SS")]
    InvalidTimecode(String),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid 10-digit mobile number")]
    InvalidMobile,
    #[error("File size must be less than {limit} bytes (got {size})")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Cannot {action} a video that is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
    #[error("Content {0} is not a video")]
    NotAVideo(i64),
    #[error("No tag at index {0}")]
    TagIndexOutOfRange(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipError {
    #[error("Clip end {end} is before its start {start}")]
    NegativeDuration { start: String, end: String },
    #[error("Video {0} has not been finalized")]
    NotFinal(i64),
    #[error("Tag '{0}' has no time range")]
    Untimed(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Clip(#[from] ClipError),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(StorageError::Io(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(StorageError::Serialization(err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
