//! Row ⇄ domain mapping.

use cc_core::{
    ClipboardItem, ImageMeta, ItemId, ItemKind, PendingOp, PendingSyncOp, ShareState, StoreConfig,
    StoreError, Tag, TagId, TagSource, TagSyncStatus,
};

use crate::db::models::{
    ClipboardRow, ConfigRow, ImageMetaRow, NewPendingSyncRow, PendingSyncRow, TagRow,
};

pub fn item_to_row(item: &ClipboardItem) -> ClipboardRow {
    ClipboardRow {
        id: item.id.to_string(),
        kind: item.kind.as_str().to_string(),
        format: item.format.clone(),
        content: item.content.clone(),
        created_at: item.created_at,
        shared: item.shared.as_str().to_string(),
    }
}

pub fn item_from_row(row: &ClipboardRow) -> Result<ClipboardItem, StoreError> {
    let kind = ItemKind::parse(&row.kind)
        .ok_or_else(|| StoreError::Read(format!("unknown item kind '{}'", row.kind)))?;
    let shared = ShareState::parse(&row.shared)
        .ok_or_else(|| StoreError::Read(format!("unknown shared state '{}'", row.shared)))?;

    Ok(ClipboardItem {
        id: ItemId::from(row.id.clone()),
        kind,
        format: row.format.clone(),
        content: row.content.clone(),
        created_at: row.created_at,
        shared,
    })
}

pub fn image_meta_to_row(meta: &ImageMeta) -> ImageMetaRow {
    ImageMetaRow {
        data_id: meta.data_id.to_string(),
        width: meta.width,
        height: meta.height,
        file_size: meta.file_size,
        file_path: meta.file_path.clone(),
        thumbnail_path: meta.thumbnail_path.clone(),
    }
}

pub fn image_meta_from_row(row: &ImageMetaRow) -> ImageMeta {
    ImageMeta {
        data_id: ItemId::from(row.data_id.clone()),
        width: row.width,
        height: row.height,
        file_size: row.file_size,
        file_path: row.file_path.clone(),
        thumbnail_path: row.thumbnail_path.clone(),
    }
}

pub fn tag_to_row(tag: &Tag) -> TagRow {
    TagRow {
        tag_id: tag.tag_id.to_string(),
        name: tag.name.clone(),
        source: tag.source.as_str().to_string(),
        sync_status: tag.sync_status.as_str().to_string(),
    }
}

pub fn tag_from_row(row: &TagRow) -> Result<Tag, StoreError> {
    let source = TagSource::parse(&row.source)
        .ok_or_else(|| StoreError::Read(format!("unknown tag source '{}'", row.source)))?;
    let sync_status = TagSyncStatus::parse(&row.sync_status).ok_or_else(|| {
        StoreError::Read(format!("unknown tag sync status '{}'", row.sync_status))
    })?;

    Ok(Tag {
        tag_id: TagId::from(row.tag_id.clone()),
        name: row.name.clone(),
        source,
        sync_status,
    })
}

pub fn pending_op_to_row(op: &PendingOp, now_secs: i64) -> NewPendingSyncRow {
    let op_args = match op {
        PendingOp::UpdateMaxCount { limit } => Some(limit.to_string()),
        _ => None,
    };

    NewPendingSyncRow {
        op: op.kind().to_string(),
        data_id: op.data_id().map(|id| id.to_string()),
        op_args,
        enqueued_at: now_secs,
    }
}

pub fn pending_op_from_row(row: &PendingSyncRow) -> Result<PendingSyncOp, StoreError> {
    let op = match row.op.as_str() {
        "upload" => PendingOp::Upload {
            data_id: require_data_id(row)?,
        },
        "delete" => PendingOp::Delete {
            data_id: require_data_id(row)?,
        },
        "localDelete" => PendingOp::LocalDelete {
            data_id: require_data_id(row)?,
        },
        "updateMaxCount" => {
            let raw = row
                .op_args
                .as_deref()
                .ok_or_else(|| StoreError::Read("updateMaxCount without op_args".to_string()))?;
            let limit: u32 = raw
                .parse()
                .map_err(|_| StoreError::Read(format!("bad updateMaxCount args '{}'", raw)))?;
            PendingOp::UpdateMaxCount { limit }
        }
        other => return Err(StoreError::Read(format!("unknown pending op '{}'", other))),
    };

    Ok(PendingSyncOp {
        id: row.id,
        op,
        enqueued_at: row.enqueued_at,
    })
}

fn require_data_id(row: &PendingSyncRow) -> Result<ItemId, StoreError> {
    row.data_id
        .as_deref()
        .map(ItemId::from)
        .ok_or_else(|| StoreError::Read(format!("pending op '{}' without data_id", row.op)))
}

pub fn config_from_row(row: &ConfigRow) -> StoreConfig {
    StoreConfig {
        local_limit: row.local_limit,
        day_limit: row.day_limit,
        cloud_limit: row.cloud_limit,
        last_modified: row.last_modified,
    }
}
