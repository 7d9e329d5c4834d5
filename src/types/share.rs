use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareType {
    #[default]
    Full,
    Clip,
}

/// A tagged sub-range of a video queued for sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipShare {
    pub file_name: String,
    pub clip_start: String,
    pub clip_end: String,
    pub clip_duration: String,
    pub tag_type: String,
    pub video_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareMetadata {
    #[serde(default)]
    pub share_type: ShareType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip: Option<ClipShare>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub person_name: String,
    #[serde(default, alias = "file")]
    pub file_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub metadata: ShareMetadata,
}

impl ShareRecord {
    pub fn is_clip(&self) -> bool {
        self.metadata.share_type == ShareType::Clip
    }
}
