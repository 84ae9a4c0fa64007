//! Remote payload normalization.
//!
//! Maps the wire DTOs into the local item shape. The transformation is pure
//! and total: missing optional fields fall back to defaults, malformed rows
//! are dropped, and it never errors.

use serde::Deserialize;

use cc_core::{
    ItemId, ItemKind, RemoteItem, Tag, TagId, TagSource, TagSyncStatus,
};
use cc_core::item::RemoteImageMeta;

#[derive(Debug, Deserialize)]
pub struct ItemsEnvelope {
    #[serde(default)]
    pub rows: Vec<RemoteItemDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteItemDto {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub format: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<i64>,
    #[serde(default)]
    pub tags: Vec<RemoteTagDto>,
    pub image_meta: Option<RemoteImageMetaDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteTagDto {
    pub tag_id: Option<String>,
    pub name: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteImageMetaDto {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub file_size: Option<i64>,
    pub file_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub original_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Join a service-relative path onto the API base; absolute URLs pass
/// through untouched.
pub fn absolutize(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Normalize one remote row. Returns `None` only when the row has no id —
/// an id-less record cannot participate in merging or deletion.
pub fn normalize_item(dto: RemoteItemDto, base_url: &str) -> Option<RemoteItem> {
    let id = dto.id?;

    let kind = dto
        .kind
        .as_deref()
        .and_then(ItemKind::parse)
        .unwrap_or(ItemKind::Text);

    let tags = dto
        .tags
        .into_iter()
        .filter_map(normalize_tag)
        .collect();

    let image = dto.image_meta.map(|meta| RemoteImageMeta {
        width: meta.width,
        height: meta.height,
        file_size: meta.file_size,
        original_url: meta
            .original_url
            .or(meta.file_path)
            .map(|p| absolutize(base_url, &p)),
        thumbnail_url: meta
            .thumbnail_url
            .or(meta.thumbnail_path)
            .map(|p| absolutize(base_url, &p)),
    });

    Some(RemoteItem {
        id: ItemId::from(id),
        kind,
        format: dto.format.unwrap_or_else(|| "text/plain".to_string()),
        content: dto.content.unwrap_or_default(),
        created_at: dto.created_at.unwrap_or(0),
        tags,
        image,
    })
}

/// Normalize one tag row; rows without an id or name carry no usable
/// identity and are dropped.
fn normalize_tag(dto: RemoteTagDto) -> Option<Tag> {
    let tag_id = dto.tag_id?;
    let name = dto.name?;
    let source = dto
        .source
        .as_deref()
        .and_then(TagSource::parse)
        .unwrap_or(TagSource::Auto);

    Some(Tag {
        tag_id: TagId::from(tag_id),
        name,
        source,
        sync_status: TagSyncStatus::Synced,
    })
}

pub fn normalize_items(envelope: ItemsEnvelope, base_url: &str) -> Vec<RemoteItem> {
    envelope
        .rows
        .into_iter()
        .filter_map(|dto| normalize_item(dto, base_url))
        .collect()
}
