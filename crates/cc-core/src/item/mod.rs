//! Clipboard item model.
//!
//! A [`ClipboardItem`] is the persisted record of one captured clipboard
//! entry. Items live in up to two tiers (the local store and the remote
//! service); [`ShareState`] tracks which tiers currently hold the item, and
//! [`PreviewItem`] is the normalized presentation shape both tiers are
//! transformed into before they are merged for display.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::ItemId;
use crate::tag::Tag;

/// Kind of clipboard content. Stored as `txt` / `img`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Text,
    Image,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Image => "img",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "txt" => Some(Self::Text),
            "img" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Which tier(s) currently hold the item.
///
/// `Both` is a first-class persisted value: eviction needs to know whether a
/// remote record exists for an item it is about to drop, and upload
/// bookkeeping needs to distinguish "mirrored" from "cloud-originated".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareState {
    Local,
    Cloud,
    Both,
}

impl ShareState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
            Self::Both => "both",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "local" => Some(Self::Local),
            "cloud" => Some(Self::Cloud),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// True when a corresponding remote record is expected to exist.
    pub fn is_mirrored(self) -> bool {
        matches!(self, Self::Cloud | Self::Both)
    }
}

/// Tier a write operation is directed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncTarget {
    Local,
    Cloud,
    Both,
}

impl SyncTarget {
    pub fn includes_local(self) -> bool {
        matches!(self, Self::Local | Self::Both)
    }

    pub fn includes_cloud(self) -> bool {
        matches!(self, Self::Cloud | Self::Both)
    }
}

/// One of the two persistence domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Local,
    Cloud,
}

/// A persisted clipboard item. `content` is inline text for text items and a
/// file path (local) or URL (remote-originated) for image items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub format: String,
    pub content: String,
    /// Epoch seconds. The local row is the source of truth for ordering.
    pub created_at: i64,
    pub shared: ShareState,
}

/// Caller-supplied fields for a new item; id and timestamp are filled in by
/// the coordinator when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    pub id: Option<ItemId>,
    pub kind: ItemKind,
    pub format: String,
    pub content: String,
    pub created_at: Option<i64>,
}

/// Image metadata, 1:1 with an image-kind item. Deleted cascading with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    pub data_id: ItemId,
    pub width: i32,
    pub height: i32,
    pub file_size: i64,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
}

/// A local item together with its joined image metadata and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredItem {
    pub item: ClipboardItem,
    pub image: Option<ImageMeta>,
    pub tags: Vec<Tag>,
}

impl StoredItem {
    /// Normalize into the presentation shape. Local file paths become
    /// `file://` URLs so both tiers hand the caller the same field.
    pub fn into_preview(self) -> PreviewItem {
        let thumbnail_url = self
            .image
            .as_ref()
            .and_then(|m| m.thumbnail_path.as_ref())
            .map(|p| format!("file://{}", p));

        PreviewItem {
            id: self.item.id,
            kind: self.item.kind,
            format: self.item.format,
            content: self.item.content,
            created_at: self.item.created_at,
            shared: self.item.shared,
            tags: self.tags.into_iter().map(|t| t.name).collect(),
            thumbnail_url,
            source: Tier::Local,
        }
    }
}

/// Image metadata as reported by the remote service. Every field is optional
/// on the wire; normalization must stay total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteImageMeta {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub file_size: Option<i64>,
    pub original_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// An item as normalized from a remote payload, retaining the full tag rows
/// so download can reconcile tag identities against the local store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub format: String,
    pub content: String,
    pub created_at: i64,
    pub tags: Vec<Tag>,
    pub image: Option<RemoteImageMeta>,
}

impl RemoteItem {
    pub fn to_preview(&self) -> PreviewItem {
        PreviewItem {
            id: self.id.clone(),
            kind: self.kind,
            format: self.format.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
            shared: ShareState::Cloud,
            tags: self.tags.iter().map(|t| t.name.clone()).collect(),
            thumbnail_url: self.image.as_ref().and_then(|m| m.thumbnail_url.clone()),
            source: Tier::Cloud,
        }
    }
}

/// The normalized, merged presentation shape handed to the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub format: String,
    pub content: String,
    pub created_at: i64,
    pub shared: ShareState,
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub source: Tier,
}

/// Merge the two tier snapshots by id. On a duplicate id the local copy's
/// fields win; the result is ordered by `created_at` descending.
pub fn merge_previews(local: Vec<PreviewItem>, cloud: Vec<PreviewItem>) -> Vec<PreviewItem> {
    let mut merged: HashMap<ItemId, PreviewItem> = HashMap::new();

    for item in cloud {
        merged.insert(item.id.clone(), item);
    }
    for item in local {
        merged.insert(item.id.clone(), item);
    }

    let mut items: Vec<PreviewItem> = merged.into_values().collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(id: &str, created_at: i64, source: Tier, content: &str) -> PreviewItem {
        PreviewItem {
            id: ItemId::from(id),
            kind: ItemKind::Text,
            format: "text/plain".to_string(),
            content: content.to_string(),
            created_at,
            shared: match source {
                Tier::Local => ShareState::Local,
                Tier::Cloud => ShareState::Cloud,
            },
            tags: vec![],
            thumbnail_url: None,
            source,
        }
    }

    #[test]
    fn merge_prefers_local_copy_on_duplicate_id() {
        let local = vec![preview("a", 10, Tier::Local, "local text")];
        let cloud = vec![preview("a", 10, Tier::Cloud, "cloud text")];

        let merged = merge_previews(local, cloud);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].content, "local text");
        assert_eq!(merged[0].source, Tier::Local);
    }

    #[test]
    fn merge_sorts_by_created_at_descending() {
        let local = vec![preview("a", 5, Tier::Local, "old")];
        let cloud = vec![
            preview("b", 20, Tier::Cloud, "newest"),
            preview("c", 10, Tier::Cloud, "middle"),
        ];

        let merged = merge_previews(local, cloud);
        let ids: Vec<&str> = merged.iter().map(|i| i.id.as_ref()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn stored_item_preview_flattens_tags_and_thumbnail() {
        use crate::tag::{Tag, TagSource, TagSyncStatus};

        let stored = StoredItem {
            item: ClipboardItem {
                id: ItemId::from("i1"),
                kind: ItemKind::Image,
                format: "image/png".to_string(),
                content: "/data/i1.png".to_string(),
                created_at: 42,
                shared: ShareState::Local,
            },
            image: Some(ImageMeta {
                data_id: ItemId::from("i1"),
                width: 640,
                height: 480,
                file_size: 1024,
                file_path: "/data/i1.png".to_string(),
                thumbnail_path: Some("/data/thumb/i1_thumb.png".to_string()),
            }),
            tags: vec![Tag {
                tag_id: crate::ids::TagId::from("t1"),
                name: "cat".to_string(),
                source: TagSource::User,
                sync_status: TagSyncStatus::Synced,
            }],
        };

        let preview = stored.into_preview();
        assert_eq!(preview.tags, vec!["cat".to_string()]);
        assert_eq!(
            preview.thumbnail_url.as_deref(),
            Some("file:///data/thumb/i1_thumb.png")
        );
    }
}
