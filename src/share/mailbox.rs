use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::storage::table::{keys, load_value, save_value};
use crate::storage::KeyValueStore;
use crate::{ClipShare, Result};

/// Single slot holding a clip that was picked in the library but not yet
/// shared. Whoever takes it consumes it.
pub struct PendingShare {
    kv: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
}

impl PendingShare {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv, lock: Mutex::new(()) }
    }

    /// Stores `clip`, returning whatever unconsumed clip it displaced.
    pub async fn put(&self, clip: ClipShare) -> Result<Option<ClipShare>> {
        let _guard = self.lock.lock().await;
        let previous: Option<ClipShare> = load_value(self.kv.as_ref(), keys::PENDING_SHARE).await;
        if let Some(old) = &previous {
            warn!(
                video_id = old.video_id,
                clip_start = %old.clip_start,
                "replacing a pending clip that was never shared"
            );
        }
        save_value(self.kv.as_ref(), keys::PENDING_SHARE, &clip).await?;
        debug!(video_id = clip.video_id, "clip queued for sharing");
        Ok(previous)
    }

    pub async fn peek(&self) -> Option<ClipShare> {
        load_value(self.kv.as_ref(), keys::PENDING_SHARE).await
    }

    pub async fn take(&self) -> Result<Option<ClipShare>> {
        let slot = self.hold().await;
        let clip = slot.peek().await;
        slot.clear().await?;
        Ok(clip)
    }

    /// Locks the slot until the returned handle is dropped. No `put` or
    /// `take` lands while it is held.
    pub async fn hold(&self) -> HeldSlot<'_> {
        HeldSlot {
            pending: self,
            _guard: self.lock.lock().await,
        }
    }
}

pub struct HeldSlot<'a> {
    pending: &'a PendingShare,
    _guard: MutexGuard<'a, ()>,
}

impl HeldSlot<'_> {
    pub async fn peek(&self) -> Option<ClipShare> {
        self.pending.peek().await
    }

    pub async fn clear(self) -> Result<()> {
        self.pending.kv.remove(keys::PENDING_SHARE).await
    }
}
