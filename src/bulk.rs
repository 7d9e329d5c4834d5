use tracing::info;

use crate::audit::AuditLog;
use crate::storage::ContentStore;
use crate::{AuditAction, Result, Tag, ValidationError};

/// Deletes every selected record that is stored. Unknown ids are ignored.
pub async fn bulk_delete(store: &ContentStore, audit: &AuditLog, ids: &[i64], user: &str) -> Result<usize> {
    let removed = store.remove(ids).await?;
    if removed > 0 {
        audit
            .record(AuditAction::BulkDelete, &format!("{} items", removed), user)
            .await?;
    }
    Ok(removed)
}

/// Appends an untimed tag of `tag_type` to every selected stored record.
pub async fn bulk_tag(
    store: &ContentStore,
    audit: &AuditLog,
    ids: &[i64],
    tag_type: &str,
    user: &str,
) -> Result<usize> {
    let tag_type = tag_type.trim();
    if tag_type.is_empty() {
        return Err(ValidationError::MissingField("Tag Type").into());
    }
    let tagged = store
        .modify_many(ids, |record| record.tags.push(Tag::untimed(tag_type)))
        .await?;
    if tagged > 0 {
        audit
            .record(AuditAction::BulkTag, &format!("{} items: {}", tagged, tag_type), user)
            .await?;
    }
    info!(tag_type, tagged, "bulk tag applied");
    Ok(tagged)
}
