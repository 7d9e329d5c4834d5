mod audit;
mod content;
mod file;
mod share;
mod tag;

pub use audit::{AuditAction, AuditLogEntry};
pub(crate) use content::lenient;
pub use content::{
    parse_day, ContentMetadata, ContentRecord, ContentType, RecordPatch, Source, Status, ZipEntry,
};
pub use file::{format_file_size, FileKind, FileTypeDetector};
pub use share::{ClipShare, ShareMetadata, ShareRecord, ShareType};
pub use tag::{Tag, Timecode, TAG_TYPES};
