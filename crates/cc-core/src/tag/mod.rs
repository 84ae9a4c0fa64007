//! Tag model.
//!
//! Tags are identified logically by `(name, source)` — case-insensitive on
//! the name — while `tag_id` is a tier-assigned identifier. When the local
//! store and the remote service invent the same logical tag independently,
//! the remote id is canonical and the local row is rewritten to it.

pub mod patterns;

use serde::{Deserialize, Serialize};

use crate::ids::TagId;

pub use patterns::{labels_for_text, TEXT_TAG_PATTERNS};

/// Who created the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    /// Derived by the tag pipeline (pattern catalog or image classifier).
    Auto,
    /// Explicitly created by the user.
    User,
}

impl TagSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(Self::Auto),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

/// Whether the local row has been reconciled against the remote tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSyncStatus {
    Synced,
    Pending,
}

impl TagSyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "synced" => Some(Self::Synced),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag_id: TagId,
    pub name: String,
    pub source: TagSource,
    pub sync_status: TagSyncStatus,
}

/// Fields for a tag that does not have an identity yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDraft {
    pub name: String,
    pub source: TagSource,
}

impl TagDraft {
    pub fn auto(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: TagSource::Auto,
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: TagSource::User,
        }
    }
}
