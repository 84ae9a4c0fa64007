//! Local persistence port.

use async_trait::async_trait;

use crate::config::{ConfigPatch, StoreConfig};
use crate::error::StoreError;
use crate::ids::{ItemId, TagId};
use crate::item::{ClipboardItem, ImageMeta, ShareState, StoredItem};
use crate::sync::{PendingOp, PendingSyncOp};
use crate::tag::{Tag, TagSource, TagSyncStatus};

/// An item removed by the cleanup pass, with the share state it had so the
/// coordinator can fan out remote deletes for mirrored items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictedItem {
    pub id: ItemId,
    pub shared: ShareState,
}

/// Durable CRUD over the local tier. Every call is a single transaction:
/// a failure aborts only the enclosing operation and never corrupts
/// unrelated rows.
#[async_trait]
pub trait LocalStorePort: Send + Sync {
    // --- items -----------------------------------------------------------

    async fn insert_item(&self, item: &ClipboardItem) -> Result<(), StoreError>;

    /// Item with joined image metadata and tags, `None` when absent.
    async fn get_item(&self, id: &ItemId) -> Result<Option<StoredItem>, StoreError>;

    /// All items with joined image metadata and tags.
    async fn list_items(&self) -> Result<Vec<StoredItem>, StoreError>;

    async fn delete_item(&self, id: &ItemId) -> Result<(), StoreError>;

    async fn update_shared_status(&self, id: &ItemId, shared: ShareState)
        -> Result<(), StoreError>;

    /// Case-insensitive substring search over item content and tag names.
    async fn search_text(&self, keyword: &str) -> Result<Vec<StoredItem>, StoreError>;

    // --- image metadata --------------------------------------------------

    async fn insert_image_meta(&self, meta: &ImageMeta) -> Result<(), StoreError>;

    async fn get_image_meta(&self, data_id: &ItemId) -> Result<Option<ImageMeta>, StoreError>;

    // --- tags ------------------------------------------------------------

    /// Insert-or-reuse under the `(name, source)` uniqueness invariant.
    /// Returns the surviving row, which keeps its existing id when the pair
    /// already exists.
    async fn insert_tag(&self, tag: &Tag) -> Result<Tag, StoreError>;

    /// Case-insensitive lookup by the logical tag identity.
    async fn get_tag_by_name_and_source(
        &self,
        name: &str,
        source: TagSource,
    ) -> Result<Option<Tag>, StoreError>;

    /// Rewrite a tag's id in place, carrying all links along atomically.
    /// Identity reconciliation, not creation of a new row.
    async fn update_tag_id(&self, old_id: &TagId, new_id: &TagId) -> Result<(), StoreError>;

    async fn update_tag_sync_status(
        &self,
        tag_id: &TagId,
        status: TagSyncStatus,
    ) -> Result<(), StoreError>;

    async fn insert_data_tag(&self, data_id: &ItemId, tag_id: &TagId) -> Result<(), StoreError>;

    // --- retention -------------------------------------------------------

    /// Delete oldest-by-`created_at` items beyond `max_items`. Returns what
    /// was evicted.
    async fn enforce_max_clipboard_items(
        &self,
        max_items: u32,
    ) -> Result<Vec<EvictedItem>, StoreError>;

    /// Delete items older than `retention_days` relative to `now_secs`.
    /// Returns what was evicted.
    async fn delete_old_clipboard_items(
        &self,
        retention_days: u32,
        now_secs: i64,
    ) -> Result<Vec<EvictedItem>, StoreError>;

    // --- configuration ---------------------------------------------------

    async fn get_config(&self) -> Result<StoreConfig, StoreError>;

    async fn update_config(&self, patch: &ConfigPatch, now_secs: i64) -> Result<(), StoreError>;

    // --- pending-sync queue ----------------------------------------------

    async fn enqueue_pending_sync(
        &self,
        op: &PendingOp,
        now_secs: i64,
    ) -> Result<PendingSyncOp, StoreError>;

    async fn get_pending_sync_items(&self) -> Result<Vec<PendingSyncOp>, StoreError>;

    async fn clear_pending_item(&self, id: i64) -> Result<(), StoreError>;
}
