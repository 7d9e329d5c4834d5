use std::path::Path;

use super::ContentType;

/// Broad family of an uploaded file, before the user picks a content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Image,
    Document,
    Archive,
    Other,
}

impl FileKind {
    /// Archives and unknown files have no content type of their own.
    pub fn content_type(self) -> Option<ContentType> {
        match self {
            FileKind::Video => Some(ContentType::Video),
            FileKind::Image => Some(ContentType::Photo),
            FileKind::Document => Some(ContentType::Document),
            FileKind::Archive | FileKind::Other => None,
        }
    }
}

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "wmv", "flv", "webm", "mkv", "m4v", "3gp", "ogv", "ogm", "mpeg", "mpg",
    "vob", "ts", "m2ts", "mts", "asf", "rm", "rmvb", "divx", "xvid", "f4v", "amv",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "tiff", "tif", "ico", "heic", "heif", "raw",
    "cr2", "nef", "orf", "sr2", "dng", "arw", "rw2", "raf", "srw", "x3f", "mrw", "pef", "kdc",
    "dcr", "psd", "ai", "eps", "sketch", "fig",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "odt", "ods", "odp", "csv",
    "pages", "numbers", "key", "md", "tex", "latex", "wps", "wpd", "wks", "wdb",
];

const ARCHIVE_EXTENSIONS: &[&str] = &[
    "zip", "rar", "7z", "tar", "gz", "bz2", "xz", "cab", "iso", "dmg", "pkg", "deb", "rpm", "apk",
];

pub struct FileTypeDetector;

impl FileTypeDetector {
    /// MIME type sniffed from the leading bytes, if recognizable.
    pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
        infer::get(data).map(|kind| kind.mime_type())
    }

    pub fn extension(name: &str) -> Option<String> {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    pub fn kind_from_name(name: &str) -> FileKind {
        match Self::extension(name) {
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => FileKind::Video,
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => FileKind::Image,
            Some(ext) if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) => FileKind::Document,
            Some(ext) if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) => FileKind::Archive,
            _ => FileKind::Other,
        }
    }

    pub fn kind_from_mime(mime: &str) -> FileKind {
        match mime {
            "application/zip"
            | "application/x-rar-compressed"
            | "application/vnd.rar"
            | "application/x-7z-compressed"
            | "application/x-tar"
            | "application/gzip"
            | "application/x-bzip2" => FileKind::Archive,
            "application/pdf"
            | "application/msword"
            | "application/rtf"
            | "text/plain"
            | "text/csv" => FileKind::Document,
            mime if mime.starts_with("video/") => FileKind::Video,
            mime if mime.starts_with("image/") => FileKind::Image,
            mime if mime.starts_with("application/vnd.") => FileKind::Document,
            _ => FileKind::Other,
        }
    }

    /// Magic bytes win over the file name; the extension is the fallback.
    /// Office formats sniff as ZIP containers, so those defer to the name.
    pub fn detect(name: &str, data: &[u8]) -> FileKind {
        let by_name = Self::kind_from_name(name);
        match Self::sniff_mime(data).map(Self::kind_from_mime) {
            Some(FileKind::Archive) if by_name == FileKind::Document => FileKind::Document,
            Some(FileKind::Other) | None => by_name,
            Some(kind) => kind,
        }
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let rounded = (size * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
