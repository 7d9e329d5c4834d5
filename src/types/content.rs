use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use super::{format_file_size, Tag, Timecode};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Video,
    Photo,
    Document,
    Report,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Video,
        ContentType::Photo,
        ContentType::Document,
        ContentType::Report,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Video => "Video",
            ContentType::Photo => "Photo",
            ContentType::Document => "Document",
            ContentType::Report => "Report",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|ct| ct.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownValue {
                kind: "content type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Cloud,
    Local,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Cloud => "cloud",
            Source::Local => "local",
        })
    }
}

impl FromStr for Source {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cloud" => Ok(Source::Cloud),
            "local" => Ok(Source::Local),
            _ => Err(ValidationError::UnknownValue {
                kind: "source",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Raw,
    Final,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Raw => "Raw",
            Status::Final => "Final",
        })
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Raw" | "raw" => Ok(Status::Raw),
            "Final" | "final" => Ok(Status::Final),
            _ => Err(ValidationError::UnknownValue {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Name and size of one file inside an uploaded archive. Bytes are never kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipEntry {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(default, alias = "fileType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, alias = "zipFileList", skip_serializing_if = "Vec::is_empty")]
    pub zip_entries: Vec<ZipEntry>,
}

impl ContentMetadata {
    pub fn formatted_duration(&self) -> Option<String> {
        self.duration_secs
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| Timecode::from_secs(d.floor().min(u32::MAX as f64) as u32).to_string())
    }

    pub fn formatted_dimensions(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
            _ => None,
        }
    }

    pub fn formatted_size(&self) -> String {
        format_file_size(self.file_size.unwrap_or(0))
    }
}

/// Metadata describing one uploaded asset.
///
/// Enumerated fields that hold a value this build does not know are read as
/// absent instead of failing the whole record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default, alias = "title", alias = "contentName")]
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub block: String,
    #[serde(default)]
    pub person_tag: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub remarks: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default, alias = "date")]
    pub upload_date: String,
    #[serde(default)]
    pub uploaded_by: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default)]
    pub metadata: ContentMetadata,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl ContentRecord {
    pub fn is_video(&self) -> bool {
        self.content_type == Some(ContentType::Video)
    }

    /// Videos without a stored status are still raw; other content is final.
    pub fn status(&self) -> Status {
        match self.status {
            Some(status) => status,
            None if self.is_video() => Status::Raw,
            None => Status::Final,
        }
    }

    pub fn source(&self) -> Source {
        self.source.unwrap_or_default()
    }

    pub fn upload_day(&self) -> Option<NaiveDate> {
        parse_day(&self.upload_date)
    }

    pub fn upload_year(&self) -> Option<i32> {
        self.upload_day().map(|d| d.year())
    }

    pub fn tag_types(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.tag_type.as_str())
    }
}

/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Reads a string or number through `FromStr`. Blank strings, nulls and
/// values that do not parse all come back as `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().parse().ok(),
        Some(serde_json::Value::Number(n)) => n.to_string().parse().ok(),
        _ => None,
    })
}

/// Field-wise replacement for a stored record. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub department: Option<String>,
    pub district: Option<String>,
    pub block: Option<String>,
    pub person_tag: Option<String>,
    pub remarks: Option<String>,
    pub status: Option<Status>,
    pub tags: Option<Vec<Tag>>,
}

impl RecordPatch {
    pub fn finalize_tags(tags: Vec<Tag>) -> Self {
        Self {
            status: Some(Status::Final),
            tags: Some(tags),
            ..Self::default()
        }
    }

    pub fn apply(self, record: &mut ContentRecord) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(department) = self.department {
            record.department = department;
        }
        if let Some(district) = self.district {
            record.district = district;
        }
        if let Some(block) = self.block {
            record.block = block;
        }
        if let Some(person_tag) = self.person_tag {
            record.person_tag = person_tag;
        }
        if let Some(remarks) = self.remarks {
            record.remarks = remarks;
        }
        if let Some(status) = self.status {
            record.status = Some(status);
        }
        if let Some(tags) = self.tags {
            record.tags = tags;
        }
    }
}
