//! The synchronization coordinator.
//!
//! Owns the two tier caches and fans every boundary operation out to the
//! local store and the remote client. Remote-directed mutations that cannot
//! run (no session) land in the pending queue and are replayed on the next
//! session establishment. Neither collaborator holds a back-reference here;
//! state-change notification goes through the injected [`ChangeNotifier`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use cc_core::ports::{
    ChangeNotifier, ClockPort, ImageProcessorPort, LocalStorePort, RemoteClientPort,
    TagClassifierPort,
};
use cc_core::tag::labels_for_text;
use cc_core::{
    merge_previews, ArchiveError, BatchReport, ClipboardItem, ConfigPatch, ImageMeta, ItemDraft,
    ItemId, ItemKind, PendingOp, PreviewItem, RemoteError, RemoteItem, ShareState, StoreConfig,
    StoreError, StoredItem, SyncTarget, Tag, TagDraft, TagId, TagSyncStatus,
};

use crate::cache::TierCache;
use crate::deps::CoordinatorDeps;

type AppResult<T> = Result<T, ArchiveError>;

pub struct SyncCoordinator {
    store: Arc<dyn LocalStorePort>,
    remote: Arc<dyn RemoteClientPort>,
    image_processor: Arc<dyn ImageProcessorPort>,
    classifier: Arc<dyn TagClassifierPort>,
    clock: Arc<dyn ClockPort>,
    notifier: Arc<dyn ChangeNotifier>,
    download_dir: PathBuf,
    local_cache: Mutex<TierCache>,
    cloud_cache: Mutex<TierCache>,
}

impl SyncCoordinator {
    pub fn new(deps: CoordinatorDeps) -> Self {
        Self {
            store: deps.store,
            remote: deps.remote,
            image_processor: deps.image_processor,
            classifier: deps.classifier,
            clock: deps.clock,
            notifier: deps.notifier,
            download_dir: deps.download_dir,
            local_cache: Mutex::new(TierCache::default()),
            cloud_cache: Mutex::new(TierCache::default()),
        }
    }

    // --- session ---------------------------------------------------------

    /// Log in and replay the pending queue against the fresh session.
    #[tracing::instrument(name = "coordinator.login", skip(self, password))]
    pub async fn login(&self, user_id: &str, password: &str) -> AppResult<BatchReport> {
        self.remote.login(user_id, password).await?;
        info!(user_id, "session established, replaying pending queue");
        let report = self.replay_pending().await?;
        self.mark_changed().await;
        Ok(report)
    }

    pub async fn signup(&self, user_id: &str, password: &str) -> AppResult<()> {
        self.remote.signup(user_id, password).await?;
        Ok(())
    }

    pub async fn logout(&self) {
        self.remote.logout().await;
        self.mark_changed().await;
    }

    // --- items -----------------------------------------------------------

    /// Add an item to the requested tier(s). The cloud leg runs first so the
    /// persisted `shared` state is accurate; when both tiers are targeted a
    /// cloud failure degrades to a local-only item plus a queued upload
    /// instead of failing the call.
    #[tracing::instrument(
        name = "coordinator.add_item",
        skip(self, draft),
        fields(kind = ?draft.kind, target = ?target)
    )]
    pub async fn add_item(&self, draft: ItemDraft, target: SyncTarget) -> AppResult<StoredItem> {
        if draft.content.is_empty() {
            return Err(ArchiveError::Validation("item content is empty".into()));
        }

        let id = draft
            .id
            .unwrap_or_else(ItemId::new);
        let created_at = draft.created_at.unwrap_or_else(|| self.clock.now_secs());

        let mut item = ClipboardItem {
            id,
            kind: draft.kind,
            format: draft.format,
            content: draft.content,
            created_at,
            shared: ShareState::Local,
        };

        // Thumbnail and dimensions come first; both tiers need them.
        let image = match item.kind {
            ItemKind::Image => Some(
                self.image_processor
                    .process(&item.id, Path::new(&item.content))
                    .await
                    .map_err(|e| ArchiveError::ImageMeta(e.to_string()))?,
            ),
            ItemKind::Text => None,
        };

        let mut cloud_ok = false;
        if target.includes_cloud() {
            let sent = match (&item.kind, &image) {
                (ItemKind::Text, _) => self.remote.create_text_item(&item).await,
                (ItemKind::Image, Some(meta)) => self.remote.upload_image(&item, meta).await,
                (ItemKind::Image, None) => unreachable!("image item without metadata"),
            };
            match sent {
                Ok(()) => cloud_ok = true,
                Err(e) if target == SyncTarget::Cloud => return Err(e.into()),
                Err(e) => {
                    warn!(id = %item.id, error = %e, "cloud leg failed, keeping item local");
                }
            }
        }

        item.shared = match target {
            SyncTarget::Local => ShareState::Local,
            SyncTarget::Cloud => ShareState::Cloud,
            SyncTarget::Both if cloud_ok => ShareState::Both,
            SyncTarget::Both => ShareState::Local,
        };

        if target.includes_local() {
            self.store.insert_item(&item).await?;
            if let Some(meta) = &image {
                self.store.insert_image_meta(meta).await?;
            }
            if target.includes_cloud() && !cloud_ok {
                self.store
                    .enqueue_pending_sync(
                        &PendingOp::Upload {
                            data_id: item.id.clone(),
                        },
                        self.clock.now_secs(),
                    )
                    .await?;
            }
        }

        // Derivation failures accumulate per tag and never abort the item.
        let tag_target = if target.includes_cloud() && !cloud_ok {
            SyncTarget::Local
        } else {
            target
        };
        let tags = self.derive_and_link_tags(&item, tag_target).await;

        self.mark_changed().await;
        Ok(StoredItem { item, image, tags })
    }

    /// Tier-aware delete. With no active session the remote leg is queued
    /// instead of failing the call.
    #[tracing::instrument(name = "coordinator.delete_item", skip(self), fields(id = %id, target = ?target))]
    pub async fn delete_item(&self, id: &ItemId, target: SyncTarget) -> AppResult<()> {
        let shared = self
            .store
            .get_item(id)
            .await?
            .map(|stored| stored.item.shared);

        if target.includes_local() {
            self.store.delete_item(id).await?;
        }

        match target {
            // Removing only the local copy of a mirrored item: the cloud
            // record stays but must stop claiming a local mirror.
            SyncTarget::Local => {
                if shared.is_some_and(ShareState::is_mirrored) {
                    self.remote_or_enqueue(PendingOp::LocalDelete {
                        data_id: id.clone(),
                    })
                    .await?;
                }
            }
            SyncTarget::Cloud | SyncTarget::Both => {
                self.remote_or_enqueue(PendingOp::Delete {
                    data_id: id.clone(),
                })
                .await?;
                // The surviving local row must stop claiming a remote
                // record that is gone (or queued to go).
                if !target.includes_local() && shared == Some(ShareState::Both) {
                    self.store.update_shared_status(id, ShareState::Local).await?;
                }
            }
        }

        self.mark_changed().await;
        Ok(())
    }

    // --- tags ------------------------------------------------------------

    /// Create-or-reuse a tag. Cloud-first when both tiers are targeted: the
    /// remote-assigned id is canonical and a pre-existing local row with the
    /// same `(name, source)` is rewritten to it rather than duplicated.
    #[tracing::instrument(name = "coordinator.add_tag", skip(self, draft), fields(target = ?target))]
    pub async fn add_tag(&self, draft: TagDraft, target: SyncTarget) -> AppResult<Tag> {
        if draft.name.trim().is_empty() {
            return Err(ArchiveError::Validation("tag name is empty".into()));
        }

        let tag = self.ensure_tag(&draft, target).await?;
        self.mark_changed().await;
        Ok(tag)
    }

    #[tracing::instrument(
        name = "coordinator.add_data_tag",
        skip(self),
        fields(data_id = %data_id, tag_id = %tag_id, target = ?target)
    )]
    pub async fn add_data_tag(
        &self,
        data_id: &ItemId,
        tag_id: &TagId,
        target: SyncTarget,
    ) -> AppResult<()> {
        if target.includes_cloud() {
            self.remote.create_data_tag(data_id, tag_id).await?;
        }
        if target.includes_local() {
            self.link_tag_locally(data_id, tag_id).await?;
        }
        self.mark_changed().await;
        Ok(())
    }

    // --- reads -----------------------------------------------------------

    /// Merged preview of both tiers. Either tier failing degrades to partial
    /// results; on a duplicate id the local copy's fields win.
    #[tracing::instrument(name = "coordinator.get_preview_data", skip(self))]
    pub async fn get_preview_data(&self) -> AppResult<Vec<PreviewItem>> {
        let local = match self.local_snapshot().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "local snapshot unavailable, serving cloud only");
                Vec::new()
            }
        };
        let cloud = match self.cloud_snapshot().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "cloud snapshot unavailable, serving local only");
                Vec::new()
            }
        };

        Ok(merge_previews(local, cloud))
    }

    /// Substring search over both tiers, concatenated cloud-then-local with
    /// no dedup. A cloud failure degrades to local-only results.
    #[tracing::instrument(name = "coordinator.search_items", skip(self))]
    pub async fn search_items(&self, keyword: &str) -> AppResult<Vec<PreviewItem>> {
        if keyword.trim().is_empty() {
            return Err(ArchiveError::Validation("search keyword is empty".into()));
        }

        let mut results = Vec::new();

        if self.remote.has_session().await {
            match self.remote.search_by_content(keyword).await {
                Ok(items) => results.extend(items.iter().map(RemoteItem::to_preview)),
                Err(e) => warn!(error = %e, "cloud search failed, serving local results"),
            }
        }

        let local = self.store.search_text(keyword).await?;
        results.extend(local.into_iter().map(StoredItem::into_preview));
        Ok(results)
    }

    // --- batch sync ------------------------------------------------------

    /// Push the given local items to the cloud. Items are processed
    /// independently; failures are collected per item.
    #[tracing::instrument(name = "coordinator.upload_selected_items", skip(self, ids), fields(count = ids.len()))]
    pub async fn upload_selected_items(&self, ids: &[ItemId]) -> AppResult<BatchReport> {
        let mut report = BatchReport::default();

        for id in ids {
            match self.push_item_to_cloud(id).await {
                Ok(()) => report.record_success(),
                Err(e) => {
                    warn!(id = %id, error = %e, "upload failed");
                    report.record_failure(id.clone(), &e);
                }
            }
        }

        if report.success_count > 0 {
            self.mark_changed().await;
        }
        Ok(report)
    }

    /// Materialize the given remote items locally: item row, image files and
    /// metadata, and tags reconciled against the local store.
    #[tracing::instrument(name = "coordinator.download_selected_items", skip(self, ids), fields(count = ids.len()))]
    pub async fn download_selected_items(&self, ids: &[ItemId]) -> AppResult<BatchReport> {
        let remote_items = self.remote.fetch_items().await?;
        let mut report = BatchReport::default();

        for id in ids {
            let found = remote_items.iter().find(|item| &item.id == id);
            let outcome = match found {
                Some(item) => self.pull_item_from_cloud(item).await,
                None => Err(ArchiveError::Store(StoreError::NotFound(format!(
                    "remote item {}",
                    id
                )))),
            };
            match outcome {
                Ok(()) => report.record_success(),
                Err(e) => {
                    warn!(id = %id, error = %e, "download failed");
                    report.record_failure(id.clone(), &e);
                }
            }
        }

        if report.success_count > 0 {
            self.mark_changed().await;
        }
        Ok(report)
    }

    /// Replay the pending queue against the current session. Each op is
    /// dequeued only after it has been applied successfully.
    #[tracing::instrument(name = "coordinator.replay_pending", skip(self))]
    pub async fn replay_pending(&self) -> AppResult<BatchReport> {
        let pending = self.store.get_pending_sync_items().await?;
        let mut report = BatchReport::default();

        for entry in pending {
            match self.apply_remote_op(&entry.op).await {
                Ok(()) => {
                    self.store.clear_pending_item(entry.id).await?;
                    report.record_success();
                }
                Err(e) => {
                    warn!(op = entry.op.kind(), error = %e, "pending op replay failed, kept queued");
                    let id = entry
                        .op
                        .data_id()
                        .cloned()
                        .unwrap_or_else(|| ItemId::from(entry.id.to_string()));
                    report.record_failure(id, &e);
                }
            }
        }

        if report.success_count > 0 {
            self.mark_changed().await;
        }
        Ok(report)
    }

    // --- housekeeping ----------------------------------------------------

    /// Enforce the item-count cap and the retention window. Evicted items
    /// that were mirrored get a best-effort remote delete; remote failures
    /// are accumulated, never propagated.
    #[tracing::instrument(name = "coordinator.cleanup", skip(self))]
    pub async fn cleanup(&self) -> AppResult<BatchReport> {
        let config = self.store.get_config().await?;

        let mut evicted = self
            .store
            .enforce_max_clipboard_items(config.local_limit.max(0) as u32)
            .await?;
        evicted.extend(
            self.store
                .delete_old_clipboard_items(config.day_limit.max(0) as u32, self.clock.now_secs())
                .await?,
        );

        let mut report = BatchReport::default();
        for item in &evicted {
            if item.shared != ShareState::Both {
                report.record_success();
                continue;
            }
            let op = PendingOp::Delete {
                data_id: item.id.clone(),
            };
            match self.remote_or_enqueue(op).await {
                Ok(()) => report.record_success(),
                Err(e) => {
                    warn!(id = %item.id, error = %e, "remote delete for evicted item failed");
                    report.record_failure(item.id.clone(), &e);
                }
            }
        }

        if !evicted.is_empty() {
            info!(evicted = evicted.len(), "cleanup evicted items");
            self.mark_changed().await;
        }
        Ok(report)
    }

    // --- configuration ---------------------------------------------------

    #[tracing::instrument(name = "coordinator.update_config", skip(self, patch))]
    pub async fn update_config(&self, patch: &ConfigPatch) -> AppResult<StoreConfig> {
        if patch.is_empty() {
            return Err(ArchiveError::Validation("empty config update".into()));
        }

        self.store
            .update_config(patch, self.clock.now_secs())
            .await?;
        let config = self.store.get_config().await?;
        self.mark_changed().await;
        Ok(config)
    }

    /// Push a new cloud quota; queued as a pending op when offline. The
    /// local mirror of the quota is updated either way.
    #[tracing::instrument(name = "coordinator.update_max_count_cloud", skip(self))]
    pub async fn update_max_count_cloud(&self, limit: u32) -> AppResult<()> {
        if limit == 0 {
            return Err(ArchiveError::Validation("cloud quota must be positive".into()));
        }

        self.remote_or_enqueue(PendingOp::UpdateMaxCount { limit })
            .await?;
        self.store
            .update_config(
                &ConfigPatch {
                    cloud_limit: Some(limit as i32),
                    ..ConfigPatch::default()
                },
                self.clock.now_secs(),
            )
            .await?;
        self.mark_changed().await;
        Ok(())
    }

    // --- internals -------------------------------------------------------

    async fn mark_changed(&self) {
        self.local_cache.lock().await.invalidate();
        self.cloud_cache.lock().await.invalidate();
        self.notifier.changed();
    }

    async fn local_snapshot(&self) -> AppResult<Vec<PreviewItem>> {
        if let Some(cached) = self.local_cache.lock().await.snapshot() {
            return Ok(cached);
        }

        let items = self.store.list_items().await?;
        let previews: Vec<PreviewItem> = items.into_iter().map(StoredItem::into_preview).collect();
        self.local_cache.lock().await.populate(previews.clone());
        Ok(previews)
    }

    async fn cloud_snapshot(&self) -> AppResult<Vec<PreviewItem>> {
        if !self.remote.has_session().await {
            return Ok(Vec::new());
        }
        if let Some(cached) = self.cloud_cache.lock().await.snapshot() {
            return Ok(cached);
        }

        let items = self.remote.fetch_items().await?;
        let previews: Vec<PreviewItem> = items.iter().map(RemoteItem::to_preview).collect();
        self.cloud_cache.lock().await.populate(previews.clone());
        Ok(previews)
    }

    /// Apply a remote-directed op now, or queue it when there is no usable
    /// session. Non-session remote failures propagate.
    async fn remote_or_enqueue(&self, op: PendingOp) -> AppResult<()> {
        if !self.remote.has_session().await {
            self.store
                .enqueue_pending_sync(&op, self.clock.now_secs())
                .await?;
            return Ok(());
        }

        match self.apply_remote_op(&op).await {
            Ok(()) => Ok(()),
            Err(ArchiveError::Remote(RemoteError::NoSession))
            | Err(ArchiveError::Remote(RemoteError::SessionExpired)) => {
                self.store
                    .enqueue_pending_sync(&op, self.clock.now_secs())
                    .await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn apply_remote_op(&self, op: &PendingOp) -> AppResult<()> {
        match op {
            // The item may have been deleted locally since the upload was
            // queued; nothing left to push then.
            PendingOp::Upload { data_id } => match self.push_item_to_cloud(data_id).await {
                Err(ArchiveError::Store(StoreError::NotFound(_))) => Ok(()),
                other => other,
            },
            PendingOp::Delete { data_id } => Ok(self.remote.delete_item(data_id).await?),
            PendingOp::LocalDelete { data_id } => Ok(self.remote.local_delete(data_id).await?),
            PendingOp::UpdateMaxCount { limit } => Ok(self.remote.update_max_count(*limit).await?),
        }
    }

    /// Push one local item (content, metadata, tags) to the cloud and flip
    /// its share state to `both`.
    async fn push_item_to_cloud(&self, id: &ItemId) -> AppResult<()> {
        let stored = self.store.get_item(id).await?.ok_or_else(|| {
            ArchiveError::Store(StoreError::NotFound(format!("clipboard item {}", id)))
        })?;

        match (&stored.item.kind, &stored.image) {
            (ItemKind::Text, _) => self.remote.create_text_item(&stored.item).await?,
            (ItemKind::Image, Some(meta)) => self.remote.upload_image(&stored.item, meta).await?,
            (ItemKind::Image, None) => {
                return Err(ArchiveError::ImageMeta(format!(
                    "image item {} has no metadata",
                    id
                )))
            }
        }

        for tag in &stored.tags {
            let canonical = self
                .remote
                .create_tag(&TagDraft {
                    name: tag.name.clone(),
                    source: tag.source,
                })
                .await?;
            if canonical.tag_id != tag.tag_id {
                self.store
                    .update_tag_id(&tag.tag_id, &canonical.tag_id)
                    .await?;
            }
            self.remote
                .create_data_tag(&stored.item.id, &canonical.tag_id)
                .await?;
            self.store
                .update_tag_sync_status(&canonical.tag_id, TagSyncStatus::Synced)
                .await?;
        }

        if stored.item.shared != ShareState::Both {
            self.store.update_shared_status(id, ShareState::Both).await?;
        }
        Ok(())
    }

    /// Materialize one remote item locally. An already-present item only has
    /// its share state flipped to `both`.
    async fn pull_item_from_cloud(&self, remote: &RemoteItem) -> AppResult<()> {
        if let Some(existing) = self.store.get_item(&remote.id).await? {
            if existing.item.shared != ShareState::Both {
                self.store
                    .update_shared_status(&remote.id, ShareState::Both)
                    .await?;
            }
            self.reconcile_remote_tags(&remote.id, &remote.tags).await?;
            return Ok(());
        }

        let mut content = remote.content.clone();
        let mut local_meta: Option<ImageMeta> = None;

        if remote.kind == ItemKind::Image {
            let meta = remote.image.as_ref().ok_or_else(|| {
                ArchiveError::ImageMeta(format!("remote image {} has no metadata", remote.id))
            })?;
            let original_url = meta.original_url.as_deref().ok_or_else(|| {
                ArchiveError::ImageMeta(format!("remote image {} has no file URL", remote.id))
            })?;

            let ext = extension_for(&remote.format);
            let file_path = self.download_dir.join(format!("{}.{}", remote.id, ext));
            self.remote.download_file(original_url, &file_path).await?;

            let thumbnail_path = match meta.thumbnail_url.as_deref() {
                Some(url) => {
                    let path = self
                        .download_dir
                        .join(format!("{}_thumb.{}", remote.id, ext));
                    self.remote.download_file(url, &path).await?;
                    Some(path.to_string_lossy().into_owned())
                }
                None => None,
            };

            content = file_path.to_string_lossy().into_owned();
            local_meta = Some(ImageMeta {
                data_id: remote.id.clone(),
                width: meta.width.unwrap_or(0),
                height: meta.height.unwrap_or(0),
                file_size: meta.file_size.unwrap_or(0),
                file_path: content.clone(),
                thumbnail_path,
            });
        }

        let item = ClipboardItem {
            id: remote.id.clone(),
            kind: remote.kind,
            format: remote.format.clone(),
            content,
            created_at: remote.created_at,
            shared: ShareState::Both,
        };
        self.store.insert_item(&item).await?;
        if let Some(meta) = &local_meta {
            self.store.insert_image_meta(meta).await?;
        }

        self.reconcile_remote_tags(&remote.id, &remote.tags).await?;
        Ok(())
    }

    /// Bring remote tag rows into the local store under their canonical ids
    /// and link them to the item.
    async fn reconcile_remote_tags(&self, data_id: &ItemId, tags: &[Tag]) -> AppResult<()> {
        for tag in tags {
            let local = self.reconcile_local_tag(tag).await?;
            self.link_tag_locally(data_id, &local.tag_id).await?;
        }
        Ok(())
    }

    /// Create-or-reuse a tag against the requested tier(s); see [`Self::add_tag`].
    async fn ensure_tag(&self, draft: &TagDraft, target: SyncTarget) -> AppResult<Tag> {
        if target.includes_cloud() {
            let canonical = self.remote.create_tag(draft).await?;
            if !target.includes_local() {
                return Ok(canonical);
            }
            return Ok(self.reconcile_local_tag(&canonical).await?);
        }

        if let Some(existing) = self
            .store
            .get_tag_by_name_and_source(&draft.name, draft.source)
            .await?
        {
            return Ok(existing);
        }

        let tag = Tag {
            tag_id: TagId::new(),
            name: draft.name.clone(),
            source: draft.source,
            sync_status: TagSyncStatus::Pending,
        };
        Ok(self.store.insert_tag(&tag).await?)
    }

    /// Cloud id wins: a pre-existing local row with the same logical
    /// identity is rewritten to the canonical id (links follow); otherwise
    /// the canonical row is inserted. Idempotent.
    async fn reconcile_local_tag(&self, canonical: &Tag) -> Result<Tag, StoreError> {
        match self
            .store
            .get_tag_by_name_and_source(&canonical.name, canonical.source)
            .await?
        {
            Some(existing) if existing.tag_id != canonical.tag_id => {
                self.store
                    .update_tag_id(&existing.tag_id, &canonical.tag_id)
                    .await?;
                self.store
                    .update_tag_sync_status(&canonical.tag_id, TagSyncStatus::Synced)
                    .await?;
            }
            Some(_) => {
                self.store
                    .update_tag_sync_status(&canonical.tag_id, TagSyncStatus::Synced)
                    .await?;
            }
            None => {
                self.store
                    .insert_tag(&Tag {
                        sync_status: TagSyncStatus::Synced,
                        ..canonical.clone()
                    })
                    .await?;
            }
        }

        Ok(Tag {
            sync_status: TagSyncStatus::Synced,
            ..canonical.clone()
        })
    }

    /// Link a tag to an item locally; an already-existing link is fine.
    async fn link_tag_locally(&self, data_id: &ItemId, tag_id: &TagId) -> Result<(), StoreError> {
        match self.store.insert_data_tag(data_id, tag_id).await {
            Ok(()) | Err(StoreError::Constraint(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Run the derivation pipeline for a new item and link each derived tag.
    /// Per-tag failures are logged and skipped; they never abort the item.
    async fn derive_and_link_tags(&self, item: &ClipboardItem, target: SyncTarget) -> Vec<Tag> {
        let labels: Vec<String> = match item.kind {
            ItemKind::Text => labels_for_text(&item.content)
                .into_iter()
                .map(str::to_string)
                .collect(),
            ItemKind::Image => match self
                .classifier
                .labels_for_image(Path::new(&item.content))
                .await
            {
                Ok(labels) => labels,
                Err(e) => {
                    warn!(id = %item.id, error = %e, "image classification failed");
                    Vec::new()
                }
            },
        };

        let mut tags = Vec::new();
        for label in labels {
            let tag = match self.ensure_tag(&TagDraft::auto(label.as_str()), target).await {
                Ok(tag) => tag,
                Err(e) => {
                    warn!(id = %item.id, label = %label, error = %e, "tag derivation failed");
                    continue;
                }
            };

            let linked = if target.includes_local() {
                self.link_tag_locally(&item.id, &tag.tag_id)
                    .await
                    .map_err(ArchiveError::from)
            } else {
                self.remote
                    .create_data_tag(&item.id, &tag.tag_id)
                    .await
                    .map_err(ArchiveError::from)
            };
            if target.includes_local() && target.includes_cloud() {
                if let Err(e) = self.remote.create_data_tag(&item.id, &tag.tag_id).await {
                    warn!(id = %item.id, label = %label, error = %e, "cloud tag link failed");
                }
            }

            match linked {
                Ok(()) => tags.push(tag),
                Err(e) => warn!(id = %item.id, label = %label, error = %e, "tag link failed"),
            }
        }
        tags
    }
}

fn extension_for(format: &str) -> &str {
    match format.rsplit('/').next() {
        Some(ext) if !ext.is_empty() => ext,
        _ => "bin",
    }
}
