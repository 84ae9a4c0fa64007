//! Remote service port.

use async_trait::async_trait;
use std::path::Path;

use crate::error::RemoteError;
use crate::ids::{ItemId, TagId};
use crate::item::{ClipboardItem, ImageMeta, RemoteItem};
use crate::tag::{Tag, TagDraft};

/// Authenticated client for the account-scoped remote service.
///
/// Implementations own the token state and transparently refresh an expired
/// session (single-flight, at most one retry per request). Remote payloads
/// are normalized into [`RemoteItem`] before being handed back; that
/// transformation is total and never fails on missing optional fields.
#[async_trait]
pub trait RemoteClientPort: Send + Sync {
    // --- session ---------------------------------------------------------

    async fn login(&self, user_id: &str, password: &str) -> Result<(), RemoteError>;

    async fn signup(&self, user_id: &str, password: &str) -> Result<(), RemoteError>;

    /// Drop the session state. Idempotent.
    async fn logout(&self);

    async fn has_session(&self) -> bool;

    // --- items -----------------------------------------------------------

    async fn fetch_items(&self) -> Result<Vec<RemoteItem>, RemoteError>;

    async fn create_text_item(&self, item: &ClipboardItem) -> Result<(), RemoteError>;

    async fn upload_image(
        &self,
        item: &ClipboardItem,
        meta: &ImageMeta,
    ) -> Result<(), RemoteError>;

    async fn delete_item(&self, id: &ItemId) -> Result<(), RemoteError>;

    /// Tier-aware delete: the cloud copy stays, only the mirror marker goes.
    async fn local_delete(&self, id: &ItemId) -> Result<(), RemoteError>;

    /// Fetch a remote file (original image or thumbnail) to a local path.
    async fn download_file(&self, url: &str, dest: &Path) -> Result<(), RemoteError>;

    // --- tags ------------------------------------------------------------

    /// Create a tag remotely; the returned row carries the canonical id.
    async fn create_tag(&self, draft: &TagDraft) -> Result<Tag, RemoteError>;

    async fn create_data_tag(&self, data_id: &ItemId, tag_id: &TagId) -> Result<(), RemoteError>;

    // --- search / account ------------------------------------------------

    /// Server-side substring search over content and tag names.
    async fn search_by_content(&self, keyword: &str) -> Result<Vec<RemoteItem>, RemoteError>;

    async fn update_max_count(&self, limit: u32) -> Result<(), RemoteError>;
}
