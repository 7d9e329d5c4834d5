use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Tag categories offered by the tagging form. Stored tags may carry any label.
pub const TAG_TYPES: &[&str] = &[
    "Best Practice",
    "Innovation",
    "Achievement",
    "Success Story",
    "Testimonial",
    "CM Byte",
    "Other",
];

/// A position inside a video, `HH:MM:SS`, held as whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timecode(u32);

impl Timecode {
    pub const ZERO: Timecode = Timecode(0);

    pub fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    pub fn as_secs(self) -> u32 {
        self.0
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidTimecode(value.to_string());
        let parts: Vec<&str> = value.trim().split(':').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut fields = [0u32; 3];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        let [hours, minutes, seconds] = fields;
        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }
        hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .map(Timecode)
            .ok_or_else(invalid)
    }
}

impl FromStr for Timecode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timecode::parse(s)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// A labelled time range inside a video.
///
/// Reading accepts every shape the table has held over time (`tagType`,
/// `start`/`end`, or a bare label string) and always writes the canonical one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredTag")]
pub struct Tag {
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub tag_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Set on tags applied in bulk, which carry a placeholder range.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub untimed: bool,
}

impl Tag {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>, tag_type: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            tag_type: tag_type.into(),
            remarks: None,
            untimed: false,
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        let remarks = remarks.into();
        self.remarks = if remarks.trim().is_empty() { None } else { Some(remarks) };
        self
    }

    pub fn untimed(tag_type: impl Into<String>) -> Self {
        let zero = Timecode::ZERO.to_string();
        Self {
            start_time: zero.clone(),
            end_time: zero,
            tag_type: tag_type.into(),
            remarks: None,
            untimed: true,
        }
    }

    pub fn start(&self) -> Result<Timecode, ValidationError> {
        Timecode::parse(&self.start_time)
    }

    pub fn end(&self) -> Result<Timecode, ValidationError> {
        Timecode::parse(&self.end_time)
    }

    /// Start, end and type must all be filled in before a tag is accepted.
    pub fn check_required(&self) -> Result<(), ValidationError> {
        if self.start_time.trim().is_empty() {
            return Err(ValidationError::MissingField("Start Time"));
        }
        if self.end_time.trim().is_empty() {
            return Err(ValidationError::MissingField("End Time"));
        }
        if self.tag_type.trim().is_empty() {
            return Err(ValidationError::MissingField("Tag Type"));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTag {
    Label(String),
    Fields(StoredTagFields),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTagFields {
    #[serde(default, alias = "start")]
    start_time: Option<String>,
    #[serde(default, alias = "end")]
    end_time: Option<String>,
    #[serde(default, rename = "type", alias = "tagType")]
    tag_type: Option<String>,
    #[serde(default)]
    remarks: Option<String>,
    #[serde(default)]
    untimed: bool,
}

impl From<StoredTag> for Tag {
    fn from(stored: StoredTag) -> Self {
        match stored {
            StoredTag::Label(label) => Tag {
                start_time: String::new(),
                end_time: String::new(),
                tag_type: label,
                remarks: None,
                untimed: true,
            },
            StoredTag::Fields(fields) => Tag {
                start_time: fields.start_time.unwrap_or_default(),
                end_time: fields.end_time.unwrap_or_default(),
                tag_type: fields.tag_type.unwrap_or_default(),
                remarks: fields.remarks.filter(|r| !r.trim().is_empty()),
                untimed: fields.untimed,
            },
        }
    }
}
