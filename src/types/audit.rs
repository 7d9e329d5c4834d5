use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuditAction {
    Upload,
    Delete,
    Share,
    Tag,
    BulkDelete,
    BulkTag,
    Login,
    Logout,
    Other(String),
}

impl AuditAction {
    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::Upload => "Upload",
            AuditAction::Delete => "Delete",
            AuditAction::Share => "Share",
            AuditAction::Tag => "Tag",
            AuditAction::BulkDelete => "Bulk Delete",
            AuditAction::BulkTag => "Bulk Tag",
            AuditAction::Login => "Login",
            AuditAction::Logout => "Logout",
            AuditAction::Other(other) => other,
        }
    }
}

impl From<String> for AuditAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Upload" => AuditAction::Upload,
            "Delete" => AuditAction::Delete,
            "Share" => AuditAction::Share,
            "Tag" => AuditAction::Tag,
            "Bulk Delete" => AuditAction::BulkDelete,
            "Bulk Tag" => AuditAction::BulkTag,
            "Login" => AuditAction::Login,
            "Logout" => AuditAction::Logout,
            _ => AuditAction::Other(value),
        }
    }
}

impl From<AuditAction> for String {
    fn from(action: AuditAction) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub user: String,
    pub action: AuditAction,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub ip: String,
}
