//! # cc-core
//!
//! Core domain models and policies for ClipCloud.
//!
//! This crate contains pure business logic without any infrastructure
//! dependencies: the clipboard item and tag models, the error taxonomy,
//! the text tag pattern catalog, the token-refresh state machine, and the
//! ports the outer layers implement.

// Public module exports
pub mod config;
pub mod error;
pub mod ids;
pub mod item;
pub mod ports;
pub mod session;
pub mod sync;
pub mod tag;

// Re-export commonly used types at the crate root
pub use config::{ConfigPatch, StoreConfig};
pub use error::{ArchiveError, ErrorEnvelope, RemoteError, StoreError};
pub use ids::{ItemId, TagId};
pub use item::{
    merge_previews, ClipboardItem, ImageMeta, ItemDraft, ItemKind, PreviewItem, RemoteItem,
    ShareState, StoredItem, SyncTarget, Tier,
};
pub use session::{AuthTokens, RefreshState};
pub use sync::{BatchReport, ItemFailure, PendingOp, PendingSyncOp};
pub use tag::{Tag, TagDraft, TagSource, TagSyncStatus};
