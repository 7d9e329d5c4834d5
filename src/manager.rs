use std::sync::Arc;

use tracing::info;

use crate::audit::AuditLog;
use crate::config::Settings;
use crate::counters::Counters;
use crate::filter::{filter, paginate, FilterSpec, Page};
use crate::presets::SearchPresets;
use crate::reports::{dashboard, within_range, DashboardStats, DateRange};
use crate::share::{ShareForm, ShareService};
use crate::storage::{storage_usage, ContentStore, DiskKv, KeyValueStore, StorageUsage};
use crate::upload::{upload, UploadRequest};
use crate::workflow::{derive_clip, TagEditor};
use crate::{bulk, AuditAction, ClipShare, ContentRecord, Result, ShareRecord, StorageError, WorkflowError};

/// One handle over everything stored for the library.
#[derive(Clone)]
pub struct ContentManager {
    inner: Arc<Inner>,
}

struct Inner {
    kv: Arc<dyn KeyValueStore>,
    store: ContentStore,
    audit: AuditLog,
    shares: ShareService,
    presets: SearchPresets,
    counters: Counters,
    settings: Settings,
}

impl ContentManager {
    /// Opens (creating if needed) the data directory named in `settings`.
    pub async fn open(settings: Settings) -> Result<Self> {
        let mut kv = DiskKv::new(&settings.data_dir).await?;
        if settings.cache_size > 0 {
            kv = kv.with_cache(settings.cache_size);
        }
        info!(data_dir = %settings.data_dir.display(), "content library opened");
        Ok(Self::with_kv(Arc::new(kv), settings))
    }

    pub fn with_kv(kv: Arc<dyn KeyValueStore>, settings: Settings) -> Self {
        Self::with_store(kv.clone(), ContentStore::new(kv), settings)
    }

    pub fn with_store(kv: Arc<dyn KeyValueStore>, store: ContentStore, settings: Settings) -> Self {
        let audit = AuditLog::new(kv.clone());
        Self {
            inner: Arc::new(Inner {
                shares: ShareService::new(kv.clone(), audit.clone()),
                presets: SearchPresets::new(kv.clone()),
                counters: Counters::new(kv.clone()),
                kv,
                store,
                audit,
                settings,
            }),
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.inner.store
    }

    pub fn audit(&self) -> &AuditLog {
        &self.inner.audit
    }

    pub fn shares(&self) -> &ShareService {
        &self.inner.shares
    }

    pub fn presets(&self) -> &SearchPresets {
        &self.inner.presets
    }

    pub fn counters(&self) -> &Counters {
        &self.inner.counters
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Runs a search and counts it.
    pub async fn search(&self, spec: &FilterSpec, page: usize) -> Result<Page<ContentRecord>> {
        let matched = filter(&self.inner.store.load_all().await, spec);
        self.inner.counters.record_search().await?;
        Ok(paginate(&matched, page, self.inner.settings.page_size))
    }

    /// Looks a record up and counts the view.
    pub async fn show(&self, id: i64) -> Result<(ContentRecord, u64)> {
        let record = self.require(id).await?;
        let views = self.inner.counters.record_view(id).await?;
        Ok((record, views))
    }

    async fn require(&self, id: i64) -> Result<ContentRecord> {
        self.inner
            .store
            .get(id)
            .await
            .ok_or_else(|| StorageError::NotFound(id.to_string()).into())
    }

    pub async fn upload(&self, request: UploadRequest, user: &str) -> Result<ContentRecord> {
        let s = &self.inner;
        upload(&s.store, &s.audit, request, user, s.settings.max_upload_bytes).await
    }

    pub async fn bulk_delete(&self, ids: &[i64], user: &str) -> Result<usize> {
        bulk::bulk_delete(&self.inner.store, &self.inner.audit, ids, user).await
    }

    pub async fn bulk_tag(&self, ids: &[i64], tag_type: &str, user: &str) -> Result<usize> {
        bulk::bulk_tag(&self.inner.store, &self.inner.audit, ids, tag_type, user).await
    }

    pub async fn editor(&self, id: i64) -> Result<TagEditor> {
        TagEditor::open(self.require(id).await?)
    }

    /// Commits the editor's tags and records who did it.
    pub async fn commit_tags(&self, editor: &mut TagEditor, user: &str) -> Result<ContentRecord> {
        let record = editor.commit(&self.inner.store).await?.clone();
        let summary = format!("{} ({} tags)", record.name, record.tags.len());
        self.inner.audit.record(AuditAction::Tag, &summary, user).await?;
        Ok(record)
    }

    /// Queues the clip covered by tag `tag_index` of video `id` for sharing.
    /// Returns the clip and any unshared clip it replaced.
    pub async fn queue_clip(&self, id: i64, tag_index: usize) -> Result<(ClipShare, Option<ClipShare>)> {
        let record = self.require(id).await?;
        let tag = record
            .tags
            .get(tag_index)
            .ok_or(WorkflowError::TagIndexOutOfRange(tag_index))?;
        let clip = derive_clip(&record, tag)?;
        let replaced = self.inner.shares.pending().put(clip.clone()).await?;
        Ok((clip, replaced))
    }

    /// Submits a share, prefilling from the pending clip if there is one.
    pub async fn share(&self, form: ShareForm, user: &str) -> Result<ShareRecord> {
        self.inner.shares.submit(form, user).await
    }

    pub async fn dashboard(&self) -> DashboardStats {
        let records = self.inner.store.load_all().await;
        let shares = self.inner.shares.list().await.len();
        let searches = self.inner.counters.searches().await;
        dashboard(&records, shares, searches)
    }

    pub async fn report(&self, range: DateRange) -> Vec<ContentRecord> {
        within_range(&self.inner.store.load_all().await, range)
    }

    pub async fn usage(&self) -> Result<StorageUsage> {
        storage_usage(self.inner.kv.as_ref(), self.inner.settings.storage_capacity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;
    use crate::{AppError, ClipError, ContentType, Tag};

    fn manager() -> ContentManager {
        ContentManager::with_kv(Arc::new(MemoryKv::new()), Settings::default())
    }

    #[tokio::test]
    async fn search_counts_and_pages() {
        let m = manager();
        let page = m.search(&FilterSpec::default(), 1).await.unwrap();
        assert_eq!(page.total, m.store().seed().len());
        assert_eq!(m.counters().searches().await, 1);

        let spec = FilterSpec { content_type: Some(ContentType::Video), ..FilterSpec::default() };
        let videos = m.search(&spec, 1).await.unwrap();
        assert!(videos.items.iter().all(|r| r.is_video()));
        assert_eq!(m.counters().searches().await, 2);
    }

    #[tokio::test]
    async fn show_counts_views_and_reports_missing_ids() {
        let m = manager();
        assert_eq!(m.show(1).await.unwrap().1, 1);
        assert_eq!(m.show(1).await.unwrap().1, 2);
        assert!(matches!(m.show(-5).await, Err(AppError::Storage(StorageError::NotFound(_)))));
    }

    #[tokio::test]
    async fn queue_clip_checks_the_tag() {
        let m = manager();
        let final_video = m
            .store()
            .seed()
            .iter()
            .find(|r| r.is_video() && !r.tags.is_empty() && r.status() == crate::Status::Final)
            .cloned()
            .unwrap();

        let (clip, replaced) = m.queue_clip(final_video.id, 0).await.unwrap();
        assert_eq!(clip.video_id, final_video.id);
        assert_eq!(replaced, None);

        let err = m.queue_clip(final_video.id, 99).await.unwrap_err();
        assert!(matches!(err, AppError::Workflow(WorkflowError::TagIndexOutOfRange(99))));
    }

    #[tokio::test]
    async fn tagging_then_sharing_a_clip() {
        let m = manager();
        let video = m
            .upload(
                UploadRequest {
                    name: "Seed drill demo".into(),
                    department: "Agriculture".into(),
                    content_type: Some(ContentType::Video),
                    file: Some(Default::default()),
                    ..UploadRequest::default()
                },
                "asha",
            )
            .await
            .unwrap();

        let err = m.queue_clip(video.id, 0).await.unwrap_err();
        assert!(matches!(err, AppError::Workflow(WorkflowError::TagIndexOutOfRange(0))));

        let mut editor = m.editor(video.id).await.unwrap();
        editor.send_to_editing().unwrap();
        editor.add_tag(Tag::new("00:00:05", "00:00:20", "Innovation")).unwrap();
        let committed = m.commit_tags(&mut editor, "asha").await.unwrap();
        assert_eq!(committed.status(), crate::Status::Final);

        let (clip, _) = m.queue_clip(video.id, 0).await.unwrap();
        assert_eq!(clip.clip_duration, "00:00:15");

        let form = ShareForm {
            department: "Agriculture".into(),
            person_name: "Ravi".into(),
            email: "ravi@example.org".into(),
            mobile: "9876543210".into(),
            ..ShareForm::default()
        };
        let share = m.share(form, "asha").await.unwrap();
        assert!(share.is_clip());
        assert_eq!(share.file_name, "Seed drill demo [Clip: 00:00:05 - 00:00:20]");

        let actions: Vec<_> = m.audit().entries().await.into_iter().map(|e| e.action).collect();
        assert_eq!(actions, [AuditAction::Upload, AuditAction::Tag, AuditAction::Share]);
    }

    #[tokio::test]
    async fn raw_videos_cannot_be_clipped() {
        let m = manager();
        let raw = m
            .store()
            .seed()
            .iter()
            .find(|r| r.is_video() && r.status() == crate::Status::Raw)
            .cloned()
            .unwrap();
        let mut with_tag = raw.clone();
        with_tag.tags.push(Tag::new("00:00:01", "00:00:02", "Event"));
        let err = derive_clip(&with_tag, &with_tag.tags[0]).unwrap_err();
        assert!(matches!(err, AppError::Clip(ClipError::NotFinal(_))));
    }

    #[tokio::test]
    async fn dashboard_reflects_shares_and_searches() {
        let m = manager();
        m.search(&FilterSpec::default(), 1).await.unwrap();
        let stats = m.dashboard().await;
        assert_eq!(stats.total_uploads, m.store().seed().len());
        assert_eq!(stats.total_searches, 1);
        assert!(stats.total_shares >= 1);
        assert!(m.usage().await.unwrap().used > 0);
    }
}
