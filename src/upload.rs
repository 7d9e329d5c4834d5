//! Taking a new file into the library.

use std::path::Path;

use chrono::Local;
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::media;
use crate::storage::ContentStore;
use crate::{
    AuditAction, ContentMetadata, ContentRecord, ContentType, FileKind, FileTypeDetector, Result,
    Source, Status, StorageError, ValidationError,
};

pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

const SNIFF_LEN: usize = 8192;

/// A file on disk, as seen by the uploader.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectedFile {
    pub metadata: ContentMetadata,
    pub kind: FileKind,
}

impl InspectedFile {
    /// Archives and unrecognized files are filed as documents.
    pub fn suggested_type(&self) -> ContentType {
        self.kind.content_type().unwrap_or(ContentType::Document)
    }
}

/// Reads `path`: size, sniffed MIME type and a sha256 checksum, then
/// whatever the contents reveal (archive listing, pixel size, duration).
pub async fn inspect_file(path: &Path) -> Result<InspectedFile> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StorageError::Storage(format!("not a file path: {}", path.display())))?
        .to_string();

    let mut file = File::open(path).await.map_err(StorageError::from)?;
    let mut hasher = Sha256::new();
    let mut head: Vec<u8> = Vec::with_capacity(SNIFF_LEN);
    let mut buf = vec![0u8; 64 * 1024];
    let mut size = 0u64;
    loop {
        let n = file.read(&mut buf).await.map_err(StorageError::from)?;
        if n == 0 {
            break;
        }
        if head.len() < SNIFF_LEN {
            let take = (SNIFF_LEN - head.len()).min(n);
            head.extend_from_slice(&buf[..take]);
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }

    let kind = FileTypeDetector::detect(&file_name, &head);
    let mime_type = FileTypeDetector::sniff_mime(&head).map(str::to_string);
    let mut metadata = ContentMetadata {
        file_extension: FileTypeDetector::extension(&file_name),
        file_name: Some(file_name),
        file_size: Some(size),
        mime_type,
        checksum: Some(hex::encode(hasher.finalize())),
        ..ContentMetadata::default()
    };
    read_contents(path, kind, &mut metadata).await;
    debug!(file = ?metadata.file_name, size, ?kind, "inspected upload");

    Ok(InspectedFile { metadata, kind })
}

/// Fills archive listing, pixel size and duration where the file allows.
async fn read_contents(path: &Path, kind: FileKind, metadata: &mut ContentMetadata) {
    let is_zip = kind == FileKind::Archive
        && (metadata.file_extension.as_deref() == Some("zip")
            || metadata.mime_type.as_deref() == Some("application/zip"));
    let is_audio = metadata.mime_type.as_deref().is_some_and(|m| m.starts_with("audio/"));
    let path = path.to_owned();

    let found = tokio::task::spawn_blocking(move || {
        let zip_entries = if is_zip { media::zip_listing(&path) } else { None };
        let dimensions = if kind == FileKind::Image { media::image_dimensions(&path) } else { None };
        let duration = if kind == FileKind::Video || is_audio { media::media_duration(&path) } else { None };
        (zip_entries, dimensions, duration)
    })
    .await;

    match found {
        Ok((zip_entries, dimensions, duration)) => {
            metadata.zip_entries = zip_entries.unwrap_or_default();
            if let Some((width, height)) = dimensions {
                metadata.width = Some(width);
                metadata.height = Some(height);
            }
            metadata.duration_secs = duration;
        }
        Err(e) => warn!(error = %e, "file contents could not be read"),
    }
}

/// Everything the upload form collects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadRequest {
    pub name: String,
    pub department: String,
    pub content_type: Option<ContentType>,
    pub district: String,
    pub block: String,
    pub person_tag: String,
    pub source: Source,
    pub remarks: String,
    pub file: Option<ContentMetadata>,
}

/// Checks fields in form order and stops at the first problem.
pub fn validate(request: &UploadRequest, max_bytes: u64) -> std::result::Result<(), ValidationError> {
    if request.name.trim().is_empty() {
        return Err(ValidationError::MissingField("content name"));
    }
    if request.department.trim().is_empty() {
        return Err(ValidationError::MissingField("department"));
    }
    if request.content_type.is_none() {
        return Err(ValidationError::MissingField("content type"));
    }
    let Some(file) = &request.file else {
        return Err(ValidationError::MissingField("a file to upload"));
    };
    let size = file.file_size.unwrap_or(0);
    if size > max_bytes {
        return Err(ValidationError::FileTooLarge { size, limit: max_bytes });
    }
    Ok(())
}

/// Validates, stores and audits a new record. Videos start out raw.
pub async fn upload(
    store: &ContentStore,
    audit: &AuditLog,
    request: UploadRequest,
    user: &str,
    max_bytes: u64,
) -> Result<ContentRecord> {
    validate(&request, max_bytes)?;

    let metadata = request.file.unwrap_or_default();
    let content_type = request.content_type;
    let record = ContentRecord {
        id: 0,
        name: request.name.trim().to_string(),
        department: request.department.trim().to_string(),
        district: request.district,
        block: request.block,
        person_tag: request.person_tag,
        content_type,
        remarks: request.remarks,
        source: Some(request.source),
        upload_date: Local::now().format("%Y-%m-%d").to_string(),
        uploaded_by: if user.trim().is_empty() { "Unknown".to_string() } else { user.to_string() },
        status: Some(if content_type == Some(ContentType::Video) { Status::Raw } else { Status::Final }),
        metadata,
        tags: Vec::new(),
    };

    let stored = store.append(record).await?;
    audit.record(AuditAction::Upload, &stored.name, user).await?;
    info!(id = stored.id, name = %stored.name, "content uploaded");
    Ok(stored)
}
