use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::kv::KeyValueStore;
use super::seed::seed_content;
use super::table::{keys, load_list, save_list};
use crate::{ContentRecord, RecordPatch, Result, StorageError};

/// The logical set of content records: an immutable seed followed by the
/// mutable set held in the key-value table.
///
/// Every mutation rewrites the whole mutable set. Within one process writes
/// are serialized; across processes the last writer wins.
pub struct ContentStore {
    kv: Arc<dyn KeyValueStore>,
    seed: Vec<ContentRecord>,
    write_lock: Mutex<()>,
}

impl ContentStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_seed(kv, seed_content().to_vec())
    }

    pub fn with_seed(kv: Arc<dyn KeyValueStore>, seed: Vec<ContentRecord>) -> Self {
        Self {
            kv,
            seed,
            write_lock: Mutex::new(()),
        }
    }

    pub fn seed(&self) -> &[ContentRecord] {
        &self.seed
    }

    fn is_seed(&self, id: i64) -> bool {
        self.seed.iter().any(|r| r.id == id)
    }

    pub async fn load_mutable(&self) -> Vec<ContentRecord> {
        load_list(self.kv.as_ref(), keys::CONTENT).await
    }

    /// Seed first, then the mutable set. Never fails.
    pub async fn load_all(&self) -> Vec<ContentRecord> {
        let mut all = self.seed.clone();
        all.extend(self.load_mutable().await);
        all
    }

    pub async fn get(&self, id: i64) -> Option<ContentRecord> {
        if let Some(record) = self.seed.iter().find(|r| r.id == id) {
            return Some(record.clone());
        }
        self.load_mutable().await.into_iter().find(|r| r.id == id)
    }

    async fn persist(&self, records: &[ContentRecord]) -> Result<()> {
        save_list(self.kv.as_ref(), keys::CONTENT, records).await
    }

    /// Appends a record, assigning a fresh id when it has none (`0`).
    pub async fn append(&self, mut record: ContentRecord) -> Result<ContentRecord> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_mutable().await;

        if record.id == 0 {
            let taken: HashSet<i64> = self
                .seed
                .iter()
                .chain(records.iter())
                .map(|r| r.id)
                .collect();
            record.id = next_free_id(&taken);
        }

        records.push(record.clone());
        self.persist(&records).await?;
        info!(id = record.id, name = %record.name, "appended content record");
        Ok(record)
    }

    /// Seed records cannot be edited.
    pub async fn update(&self, id: i64, patch: RecordPatch) -> Result<ContentRecord> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_mutable().await;

        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            if self.is_seed(id) {
                return Err(StorageError::SeedImmutable(id).into());
            }
            return Err(StorageError::NotFound(id.to_string()).into());
        };
        patch.apply(record);
        let updated = record.clone();

        self.persist(&records).await?;
        debug!(id, "updated content record");
        Ok(updated)
    }

    /// Removes mutable records with the given ids. Absent and seed ids are
    /// skipped silently. Returns how many records went away.
    pub async fn remove(&self, ids: &[i64]) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_mutable().await;
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        let removed = before - records.len();

        if removed > 0 {
            self.persist(&records).await?;
        }
        info!(requested = ids.len(), removed, "removed content records");
        Ok(removed)
    }

    /// Applies `change` to every mutable record whose id is listed.
    pub async fn modify_many<F>(&self, ids: &[i64], mut change: F) -> Result<usize>
    where
        F: FnMut(&mut ContentRecord),
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_mutable().await;
        let mut touched = 0;
        for record in records.iter_mut().filter(|r| ids.contains(&r.id)) {
            change(record);
            touched += 1;
        }

        if touched > 0 {
            self.persist(&records).await?;
        }
        Ok(touched)
    }
}

fn next_free_id(taken: &HashSet<i64>) -> i64 {
    let mut id = Utc::now().timestamp_millis();
    while taken.contains(&id) {
        id += 1;
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryKv;
    use crate::{AppError, ContentType, Status, Tag};

    fn record(name: &str) -> ContentRecord {
        ContentRecord {
            name: name.to_string(),
            department: "Health".to_string(),
            content_type: Some(ContentType::Video),
            ..ContentRecord::default()
        }
    }

    fn empty_store() -> (ContentStore, Arc<MemoryKv>) {
        let kv = Arc::new(MemoryKv::new());
        (ContentStore::with_seed(kv.clone(), Vec::new()), kv)
    }

    #[tokio::test]
    async fn append_assigns_unique_ids() {
        let (store, _kv) = empty_store();
        let a = store.append(record("a")).await.unwrap();
        let b = store.append(record("b")).await.unwrap();

        assert!(a.id > 0);
        assert_ne!(a.id, b.id);
        let all = store.load_all().await;
        assert_eq!(all.iter().filter(|r| r.id == a.id).count(), 1);
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn seed_comes_first_and_is_read_only() {
        let kv = Arc::new(MemoryKv::new());
        let seed = vec![ContentRecord { id: 1, ..record("seeded") }];
        let store = ContentStore::with_seed(kv, seed);
        let added = store.append(record("added")).await.unwrap();

        let names: Vec<_> = store.load_all().await.into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["seeded", "added"]);

        let err = store.update(1, RecordPatch::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::SeedImmutable(1))));
        assert_eq!(store.remove(&[1]).await.unwrap(), 0);
        assert_eq!(store.load_all().await.len(), 2);

        store.remove(&[added.id]).await.unwrap();
        assert_eq!(store.load_all().await.len(), 1);
    }

    #[tokio::test]
    async fn update_replaces_matching_record() {
        let (store, _kv) = empty_store();
        let added = store.append(record("clip")).await.unwrap();
        let tags = vec![Tag::new("00:00:05", "00:00:20", "Innovation")];
        let updated = store
            .update(added.id, RecordPatch::finalize_tags(tags.clone()))
            .await
            .unwrap();

        assert_eq!(updated.status(), Status::Final);
        assert_eq!(store.get(added.id).await.unwrap().tags, tags);

        let err = store.update(424242, RecordPatch::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn remove_keeps_others_in_order() {
        let (store, _kv) = empty_store();
        let mut ids = Vec::new();
        for name in ["one", "two", "three"] {
            ids.push(store.append(record(name)).await.unwrap().id);
        }
        assert_eq!(store.remove(&[ids[1], 999]).await.unwrap(), 1);

        let left: Vec<_> = store.load_all().await.into_iter().map(|r| r.id).collect();
        assert_eq!(left, vec![ids[0], ids[2]]);
    }

    #[tokio::test]
    async fn malformed_table_reads_as_empty() {
        let (store, kv) = empty_store();
        kv.set(keys::CONTENT, "this is not json").await.unwrap();
        assert!(store.load_all().await.is_empty());

        let added = store.append(record("fresh")).await.unwrap();
        assert_eq!(store.load_all().await, vec![added]);
    }

    #[tokio::test]
    async fn ids_from_the_table_are_kept() {
        let (store, kv) = empty_store();
        kv.set(keys::CONTENT, r#"[{"id": 77, "contentName": "old"}]"#)
            .await
            .unwrap();
        let all = store.load_all().await;
        assert_eq!(all[0].id, 77);
        assert_eq!(all[0].name, "old");
    }
}
