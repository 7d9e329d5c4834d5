//! Tagging a video and deriving shareable clips from its tags.
//!
//! A video moves `Raw -> Editing -> Final`. Editing is in-memory only: tags
//! are authored in a scratch buffer and nothing is stored until `commit`.
//! There is no way back from `Final`.

use std::fmt;

use tracing::info;

use crate::storage::ContentStore;
use crate::{
    ClipError, ClipShare, ContentRecord, RecordPatch, Result, Status, Tag, Timecode,
    ValidationError, WorkflowError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Raw,
    Editing,
    Final,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Raw => "raw",
            Phase::Editing => "being edited",
            Phase::Final => "final",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum EditorState {
    Raw(ContentRecord),
    Editing {
        record: ContentRecord,
        scratch: Vec<Tag>,
    },
    Final(ContentRecord),
}

/// The tagging state machine for one video record.
#[derive(Debug, Clone, PartialEq)]
pub struct TagEditor {
    state: EditorState,
}

impl TagEditor {
    /// Starts from the record's stored status. Only videos can be tagged.
    pub fn open(record: ContentRecord) -> Result<Self> {
        if !record.is_video() {
            return Err(WorkflowError::NotAVideo(record.id).into());
        }
        let state = match record.status() {
            Status::Raw => EditorState::Raw(record),
            Status::Final => EditorState::Final(record),
        };
        Ok(Self { state })
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            EditorState::Raw(_) => Phase::Raw,
            EditorState::Editing { .. } => Phase::Editing,
            EditorState::Final(_) => Phase::Final,
        }
    }

    pub fn record(&self) -> &ContentRecord {
        match &self.state {
            EditorState::Raw(record) | EditorState::Final(record) => record,
            EditorState::Editing { record, .. } => record,
        }
    }

    /// Tags being authored. Empty outside of editing.
    pub fn scratch(&self) -> &[Tag] {
        match &self.state {
            EditorState::Editing { scratch, .. } => scratch,
            _ => &[],
        }
    }

    fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            action,
            phase: self.phase().as_str(),
        }
    }

    pub fn send_to_editing(&mut self) -> Result<()> {
        let EditorState::Raw(record) = &self.state else {
            return Err(self.invalid("send to editing").into());
        };
        let record = record.clone();
        let scratch = record.tags.clone();
        self.state = EditorState::Editing { record, scratch };
        Ok(())
    }

    /// Rejected tags leave the buffer untouched.
    pub fn add_tag(&mut self, tag: Tag) -> Result<()> {
        let phase = self.phase();
        let EditorState::Editing { scratch, .. } = &mut self.state else {
            return Err(WorkflowError::InvalidTransition {
                action: "add a tag to",
                phase: phase.as_str(),
            }
            .into());
        };
        tag.check_required()?;
        tag.start()?;
        tag.end()?;
        scratch.push(tag);
        Ok(())
    }

    pub fn delete_tag(&mut self, index: usize) -> Result<Tag> {
        let phase = self.phase();
        let EditorState::Editing { scratch, .. } = &mut self.state else {
            return Err(WorkflowError::InvalidTransition {
                action: "delete a tag from",
                phase: phase.as_str(),
            }
            .into());
        };
        if index >= scratch.len() {
            return Err(WorkflowError::TagIndexOutOfRange(index).into());
        }
        Ok(scratch.remove(index))
    }

    /// Drops the scratch buffer and returns to `Raw` without storing anything.
    pub fn cancel(&mut self) -> Result<()> {
        let EditorState::Editing { record, .. } = &self.state else {
            return Err(self.invalid("cancel editing of").into());
        };
        self.state = EditorState::Raw(record.clone());
        Ok(())
    }

    /// Stores the scratch tags and marks the video final. On a storage error
    /// the editor stays in `Editing` with the buffer intact.
    pub async fn commit(&mut self, store: &ContentStore) -> Result<&ContentRecord> {
        let EditorState::Editing { record, scratch } = &self.state else {
            return Err(self.invalid("commit tags of").into());
        };
        let updated = store
            .update(record.id, RecordPatch::finalize_tags(scratch.clone()))
            .await?;
        info!(id = updated.id, tags = updated.tags.len(), "video tags committed");
        self.state = EditorState::Final(updated);
        Ok(self.record())
    }
}

/// `end - start` as `HH:MM:SS`. An end before the start is an error.
pub fn clip_duration(start: &str, end: &str) -> Result<String> {
    let start_tc = Timecode::parse(start)?;
    let end_tc = Timecode::parse(end)?;
    let secs = end_tc
        .as_secs()
        .checked_sub(start_tc.as_secs())
        .ok_or_else(|| ClipError::NegativeDuration {
            start: start.to_string(),
            end: end.to_string(),
        })?;
    Ok(Timecode::from_secs(secs).to_string())
}

/// Describes the sub-clip of a finalized video covered by one of its tags.
pub fn derive_clip(record: &ContentRecord, tag: &Tag) -> Result<ClipShare> {
    if record.status() != Status::Final {
        return Err(ClipError::NotFinal(record.id).into());
    }
    if tag.untimed {
        return Err(ClipError::Untimed(tag.tag_type.clone()).into());
    }
    if tag.tag_type.trim().is_empty() {
        return Err(ValidationError::MissingField("Tag Type").into());
    }
    let duration = clip_duration(&tag.start_time, &tag.end_time)?;
    Ok(ClipShare {
        file_name: record.name.clone(),
        clip_start: tag.start_time.clone(),
        clip_end: tag.end_time.clone(),
        clip_duration: duration,
        tag_type: tag.tag_type.clone(),
        video_id: record.id,
    })
}

/// Videos still waiting for tags, in store order.
pub fn raw_videos(records: &[ContentRecord]) -> Vec<ContentRecord> {
    records
        .iter()
        .filter(|r| r.is_video() && r.status() == Status::Raw)
        .cloned()
        .collect()
}

pub fn final_videos(records: &[ContentRecord]) -> Vec<ContentRecord> {
    records
        .iter()
        .filter(|r| r.is_video() && r.status() == Status::Final)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryKv;
    use crate::{AppError, ContentType};

    fn video() -> ContentRecord {
        ContentRecord {
            name: "Health camp".into(),
            department: "Health".into(),
            content_type: Some(ContentType::Video),
            status: Some(Status::Raw),
            ..ContentRecord::default()
        }
    }

    fn store() -> ContentStore {
        ContentStore::with_seed(Arc::new(MemoryKv::new()), Vec::new())
    }

    #[test]
    fn only_videos_can_be_opened() {
        let photo = ContentRecord {
            content_type: Some(ContentType::Photo),
            ..video()
        };
        assert!(matches!(
            TagEditor::open(photo),
            Err(AppError::Workflow(WorkflowError::NotAVideo(_)))
        ));
    }

    #[test]
    fn incomplete_tags_leave_the_buffer_alone() {
        let mut editor = TagEditor::open(video()).unwrap();
        editor.send_to_editing().unwrap();

        for tag in [
            Tag::new("", "00:00:20", "Innovation"),
            Tag::new("00:00:05", "", "Innovation"),
            Tag::new("00:00:05", "00:00:20", ""),
        ] {
            let err = editor.add_tag(tag).unwrap_err();
            assert!(matches!(err, AppError::Validation(ValidationError::MissingField(_))));
            assert!(editor.scratch().is_empty());
        }

        editor.add_tag(Tag::new("00:00:05", "00:00:20", "Innovation")).unwrap();
        assert_eq!(editor.scratch().len(), 1);
    }

    #[test]
    fn malformed_times_are_rejected() {
        let mut editor = TagEditor::open(video()).unwrap();
        editor.send_to_editing().unwrap();
        let err = editor.add_tag(Tag::new("5 seconds", "00:00:20", "Other")).unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::InvalidTimecode(_))));
    }

    #[test]
    fn transitions_outside_editing_are_rejected() {
        let mut editor = TagEditor::open(video()).unwrap();
        assert!(editor.add_tag(Tag::new("00:00:01", "00:00:02", "Other")).is_err());
        assert!(editor.cancel().is_err());
        assert!(editor.delete_tag(0).is_err());

        editor.send_to_editing().unwrap();
        assert!(editor.send_to_editing().is_err());
        assert!(matches!(
            editor.delete_tag(3),
            Err(AppError::Workflow(WorkflowError::TagIndexOutOfRange(3)))
        ));
    }

    #[tokio::test]
    async fn cancel_discards_without_storing() {
        let store = store();
        let added = store.append(video()).await.unwrap();
        let mut editor = TagEditor::open(added.clone()).unwrap();
        editor.send_to_editing().unwrap();
        editor.add_tag(Tag::new("00:00:01", "00:00:02", "Other")).unwrap();
        editor.cancel().unwrap();

        assert_eq!(editor.phase(), Phase::Raw);
        assert!(editor.scratch().is_empty());
        assert_eq!(store.get(added.id).await.unwrap(), added);
    }

    #[tokio::test]
    async fn upload_tag_commit_finalizes() {
        let store = store();
        let added = store.append(video()).await.unwrap();
        assert_eq!(added.status(), Status::Raw);

        let mut editor = TagEditor::open(added).unwrap();
        editor.send_to_editing().unwrap();
        editor.add_tag(Tag::new("00:00:05", "00:00:20", "Innovation")).unwrap();
        editor.add_tag(Tag::new("00:01:00", "00:01:30", "Other")).unwrap();
        assert_eq!(editor.delete_tag(1).unwrap().tag_type, "Other");
        let committed = editor.commit(&store).await.unwrap().clone();

        assert_eq!(editor.phase(), Phase::Final);
        let stored = store.get(committed.id).await.unwrap();
        assert_eq!(stored.status, Some(Status::Final));
        assert_eq!(stored.tags.len(), 1);

        let mut reopened = TagEditor::open(stored).unwrap();
        assert_eq!(reopened.phase(), Phase::Final);
        assert!(reopened.send_to_editing().is_err());
    }

    #[tokio::test]
    async fn committing_a_seed_video_fails_and_keeps_the_buffer() {
        let seed = ContentRecord { id: 1, ..video() };
        let store = ContentStore::with_seed(Arc::new(MemoryKv::new()), vec![seed.clone()]);
        let mut editor = TagEditor::open(seed).unwrap();
        editor.send_to_editing().unwrap();
        editor.add_tag(Tag::new("00:00:01", "00:00:02", "Other")).unwrap();

        assert!(editor.commit(&store).await.is_err());
        assert_eq!(editor.phase(), Phase::Editing);
        assert_eq!(editor.scratch().len(), 1);
    }

    #[test]
    fn clip_duration_subtracts() {
        assert_eq!(clip_duration("00:01:00", "00:03:30").unwrap(), "00:02:30");
        assert_eq!(clip_duration("00:59:59", "01:00:00").unwrap(), "00:00:01");
        assert!(matches!(
            clip_duration("00:03:30", "00:01:00"),
            Err(AppError::Clip(ClipError::NegativeDuration { .. }))
        ));
    }

    #[test]
    fn clips_come_from_final_videos_with_timed_tags() {
        let tag = Tag::new("00:00:05", "00:00:20", "Innovation");
        let raw = ContentRecord { id: 9, ..video() };
        assert!(matches!(derive_clip(&raw, &tag), Err(AppError::Clip(ClipError::NotFinal(9)))));

        let done = ContentRecord {
            status: Some(Status::Final),
            tags: vec![tag.clone()],
            ..raw
        };
        let clip = derive_clip(&done, &tag).unwrap();
        assert_eq!(clip.clip_duration, "00:00:15");
        assert_eq!(clip.video_id, 9);
        assert_eq!(clip.file_name, "Health camp");

        let bulk = Tag::untimed("Innovation");
        assert!(matches!(derive_clip(&done, &bulk), Err(AppError::Clip(ClipError::Untimed(_)))));
    }

    #[test]
    fn library_views_split_by_status() {
        let records = vec![
            ContentRecord { id: 1, ..video() },
            ContentRecord {
                id: 2,
                status: Some(Status::Final),
                ..video()
            },
            ContentRecord {
                id: 3,
                status: None,
                ..video()
            },
            ContentRecord {
                id: 4,
                content_type: Some(ContentType::Report),
                ..video()
            },
        ];
        let raw: Vec<_> = raw_videos(&records).into_iter().map(|r| r.id).collect();
        let done: Vec<_> = final_videos(&records).into_iter().map(|r| r.id).collect();
        assert_eq!(raw, vec![1, 3]);
        assert_eq!(done, vec![2]);
    }
}
