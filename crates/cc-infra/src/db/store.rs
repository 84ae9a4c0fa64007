//! Diesel-backed implementation of the local store port.
//!
//! Every port call runs as a single transaction against one pooled
//! connection; a constraint or I/O failure aborts only the enclosing call.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;

use cc_core::ports::{EvictedItem, LocalStorePort};
use cc_core::{
    ClipboardItem, ConfigPatch, ImageMeta, ItemId, PendingOp, PendingSyncOp, ShareState,
    StoreConfig, StoreError, StoredItem, Tag, TagId, TagSource, TagSyncStatus,
};

use crate::db::executor::DbExecutor;
use crate::db::mappers;
use crate::db::models::{ClipboardRow, ConfigRow, DataTagRow, ImageMetaRow, PendingSyncRow, TagRow};
use crate::db::schema::{clipboard, config, data_tag, image_meta, pending_sync, tag};

pub struct DieselLocalStore<E> {
    executor: E,
}

impl<E> DieselLocalStore<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

/// Preserve typed store errors raised inside the executor closure; map
/// constraint violations; wrap anything else with the operation's cause.
fn as_store_err(e: anyhow::Error, wrap: impl FnOnce(String) -> StoreError) -> StoreError {
    match e.downcast::<StoreError>() {
        Ok(typed) => typed,
        Err(e) => {
            if let Some(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation,
                info,
            )) = e.downcast_ref::<diesel::result::Error>()
            {
                return StoreError::Constraint(info.message().to_string());
            }
            wrap(e.to_string())
        }
    }
}

/// `%keyword%` with LIKE metacharacters in the keyword neutralized, so user
/// input always means a literal substring.
fn like_substring_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Join image metadata and tags onto a set of item rows.
fn hydrate_items(
    conn: &mut SqliteConnection,
    rows: Vec<ClipboardRow>,
) -> anyhow::Result<Vec<StoredItem>> {
    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();

    let metas: HashMap<String, ImageMetaRow> = image_meta::table
        .filter(image_meta::data_id.eq_any(&ids))
        .load::<ImageMetaRow>(conn)?
        .into_iter()
        .map(|m| (m.data_id.clone(), m))
        .collect();

    let mut tags_by_item: HashMap<String, Vec<Tag>> = HashMap::new();
    let links: Vec<(DataTagRow, TagRow)> = data_tag::table
        .inner_join(tag::table)
        .filter(data_tag::data_id.eq_any(&ids))
        .load(conn)?;
    for (link, tag_row) in links {
        let tag = mappers::tag_from_row(&tag_row)?;
        tags_by_item.entry(link.data_id).or_default().push(tag);
    }

    rows.iter()
        .map(|row| {
            let item = mappers::item_from_row(row)?;
            let image = metas.get(&row.id).map(mappers::image_meta_from_row);
            let tags = tags_by_item.remove(&row.id).unwrap_or_default();
            Ok(StoredItem { item, image, tags })
        })
        .collect()
}

#[async_trait]
impl<E: DbExecutor> LocalStorePort for DieselLocalStore<E> {
    async fn insert_item(&self, item: &ClipboardItem) -> Result<(), StoreError> {
        let row = mappers::item_to_row(item);
        self.executor
            .run(|conn| {
                diesel::insert_into(clipboard::table)
                    .values(&row)
                    .execute(conn)?;
                Ok(())
            })
            .map_err(|e| as_store_err(e, StoreError::Create))
    }

    async fn get_item(&self, id: &ItemId) -> Result<Option<StoredItem>, StoreError> {
        let id_str = id.to_string();
        self.executor
            .run(|conn| {
                let row = clipboard::table
                    .filter(clipboard::id.eq(&id_str))
                    .first::<ClipboardRow>(conn)
                    .optional()?;

                match row {
                    Some(row) => Ok(hydrate_items(conn, vec![row])?.pop()),
                    None => Ok(None),
                }
            })
            .map_err(|e| as_store_err(e, StoreError::Read))
    }

    async fn list_items(&self) -> Result<Vec<StoredItem>, StoreError> {
        self.executor
            .run(|conn| {
                let rows = clipboard::table
                    .order(clipboard::created_at.desc())
                    .load::<ClipboardRow>(conn)?;
                hydrate_items(conn, rows)
            })
            .map_err(|e| as_store_err(e, StoreError::Read))
    }

    async fn delete_item(&self, id: &ItemId) -> Result<(), StoreError> {
        let id_str = id.to_string();
        self.executor
            .run(|conn| {
                // image_meta and data_tag rows go with the cascade
                diesel::delete(clipboard::table.filter(clipboard::id.eq(&id_str)))
                    .execute(conn)?;
                Ok(())
            })
            .map_err(|e| as_store_err(e, StoreError::Delete))
    }

    async fn update_shared_status(
        &self,
        id: &ItemId,
        shared: ShareState,
    ) -> Result<(), StoreError> {
        let id_str = id.to_string();
        self.executor
            .run(|conn| {
                let changed =
                    diesel::update(clipboard::table.filter(clipboard::id.eq(&id_str)))
                        .set(clipboard::shared.eq(shared.as_str()))
                        .execute(conn)?;
                if changed == 0 {
                    return Err(StoreError::NotFound(format!("item {}", id_str)).into());
                }
                Ok(())
            })
            .map_err(|e| as_store_err(e, StoreError::Update))
    }

    async fn search_text(&self, keyword: &str) -> Result<Vec<StoredItem>, StoreError> {
        let pattern = like_substring_pattern(keyword);
        self.executor
            .run(|conn| {
                let by_content: Vec<ClipboardRow> = clipboard::table
                    .filter(clipboard::content.like(&pattern).escape('\\'))
                    .load(conn)?;

                let tagged_ids: Vec<String> = data_tag::table
                    .inner_join(tag::table)
                    .filter(tag::name.like(&pattern).escape('\\'))
                    .select(data_tag::data_id)
                    .load(conn)?;
                let by_tag: Vec<ClipboardRow> = clipboard::table
                    .filter(clipboard::id.eq_any(&tagged_ids))
                    .load(conn)?;

                let mut rows: Vec<ClipboardRow> = by_content;
                for row in by_tag {
                    if !rows.iter().any(|r| r.id == row.id) {
                        rows.push(row);
                    }
                }
                rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

                hydrate_items(conn, rows)
            })
            .map_err(|e| as_store_err(e, StoreError::Read))
    }

    async fn insert_image_meta(&self, meta: &ImageMeta) -> Result<(), StoreError> {
        let row = mappers::image_meta_to_row(meta);
        self.executor
            .run(|conn| {
                diesel::insert_into(image_meta::table)
                    .values(&row)
                    .execute(conn)?;
                Ok(())
            })
            .map_err(|e| as_store_err(e, StoreError::Create))
    }

    async fn get_image_meta(&self, data_id: &ItemId) -> Result<Option<ImageMeta>, StoreError> {
        let id_str = data_id.to_string();
        self.executor
            .run(|conn| {
                let row = image_meta::table
                    .filter(image_meta::data_id.eq(&id_str))
                    .first::<ImageMetaRow>(conn)
                    .optional()?;
                Ok(row.as_ref().map(mappers::image_meta_from_row))
            })
            .map_err(|e| as_store_err(e, StoreError::Read))
    }

    async fn insert_tag(&self, new_tag: &Tag) -> Result<Tag, StoreError> {
        let row = mappers::tag_to_row(new_tag);
        let name = new_tag.name.clone();
        let source = new_tag.source;
        self.executor
            .run(move |conn| {
                conn.transaction(|conn| {
                    // Insert-or-ignore under UNIQUE(name, source); the
                    // readback returns whichever row survived.
                    diesel::insert_or_ignore_into(tag::table)
                        .values(&row)
                        .execute(conn)?;

                    let surviving = tag::table
                        .filter(tag::name.eq(&name))
                        .filter(tag::source.eq(source.as_str()))
                        .first::<TagRow>(conn)?;

                    Ok(mappers::tag_from_row(&surviving)?)
                })
            })
            .map_err(|e| as_store_err(e, StoreError::Create))
    }

    async fn get_tag_by_name_and_source(
        &self,
        name: &str,
        source: TagSource,
    ) -> Result<Option<Tag>, StoreError> {
        let name = name.to_string();
        self.executor
            .run(move |conn| {
                // tag.name is COLLATE NOCASE, so eq is case-insensitive
                let row = tag::table
                    .filter(tag::name.eq(&name))
                    .filter(tag::source.eq(source.as_str()))
                    .first::<TagRow>(conn)
                    .optional()?;
                Ok(row.as_ref().map(mappers::tag_from_row).transpose()?)
            })
            .map_err(|e| as_store_err(e, StoreError::Read))
    }

    async fn update_tag_id(&self, old_id: &TagId, new_id: &TagId) -> Result<(), StoreError> {
        if old_id == new_id {
            return Ok(());
        }
        let old = old_id.to_string();
        let new = new_id.to_string();
        self.executor
            .run(move |conn| {
                conn.transaction(|conn| {
                    let exists: i64 = tag::table
                        .filter(tag::tag_id.eq(&old))
                        .count()
                        .get_result(conn)?;
                    if exists == 0 {
                        return Err(StoreError::NotFound(format!("tag {}", old)).into());
                    }

                    let conflict: i64 = tag::table
                        .filter(tag::tag_id.eq(&new))
                        .count()
                        .get_result(conn)?;
                    if conflict > 0 {
                        return Err(StoreError::Constraint(format!(
                            "tag {} already exists",
                            new
                        ))
                        .into());
                    }

                    diesel::update(tag::table.filter(tag::tag_id.eq(&old)))
                        .set(tag::tag_id.eq(&new))
                        .execute(conn)?;

                    // ON UPDATE CASCADE already carried the links; this is a
                    // no-op when enforcement did its job.
                    diesel::update(data_tag::table.filter(data_tag::tag_id.eq(&old)))
                        .set(data_tag::tag_id.eq(&new))
                        .execute(conn)?;

                    Ok(())
                })
            })
            .map_err(|e| as_store_err(e, StoreError::Update))
    }

    async fn update_tag_sync_status(
        &self,
        tag_id: &TagId,
        status: TagSyncStatus,
    ) -> Result<(), StoreError> {
        let id_str = tag_id.to_string();
        self.executor
            .run(move |conn| {
                let changed = diesel::update(tag::table.filter(tag::tag_id.eq(&id_str)))
                    .set(tag::sync_status.eq(status.as_str()))
                    .execute(conn)?;
                if changed == 0 {
                    return Err(StoreError::NotFound(format!("tag {}", id_str)).into());
                }
                Ok(())
            })
            .map_err(|e| as_store_err(e, StoreError::Update))
    }

    async fn insert_data_tag(&self, data_id: &ItemId, tag_id: &TagId) -> Result<(), StoreError> {
        let row = DataTagRow {
            data_id: data_id.to_string(),
            tag_id: tag_id.to_string(),
        };
        self.executor
            .run(move |conn| {
                diesel::insert_or_ignore_into(data_tag::table)
                    .values(&row)
                    .execute(conn)?;
                Ok(())
            })
            .map_err(|e| as_store_err(e, StoreError::Create))
    }

    async fn enforce_max_clipboard_items(
        &self,
        max_items: u32,
    ) -> Result<Vec<EvictedItem>, StoreError> {
        self.executor
            .run(move |conn| {
                conn.transaction(|conn| {
                    let count: i64 = clipboard::table.count().get_result(conn)?;
                    let overflow = count - i64::from(max_items);
                    if overflow <= 0 {
                        return Ok(Vec::new());
                    }

                    let victims: Vec<ClipboardRow> = clipboard::table
                        .order(clipboard::created_at.asc())
                        .limit(overflow)
                        .load(conn)?;

                    let evicted = delete_rows(conn, &victims)?;
                    Ok(evicted)
                })
            })
            .map_err(|e| as_store_err(e, StoreError::Delete))
    }

    async fn delete_old_clipboard_items(
        &self,
        retention_days: u32,
        now_secs: i64,
    ) -> Result<Vec<EvictedItem>, StoreError> {
        let cutoff = now_secs - i64::from(retention_days) * 86_400;
        self.executor
            .run(move |conn| {
                conn.transaction(|conn| {
                    let victims: Vec<ClipboardRow> = clipboard::table
                        .filter(clipboard::created_at.lt(cutoff))
                        .load(conn)?;
                    let evicted = delete_rows(conn, &victims)?;
                    Ok(evicted)
                })
            })
            .map_err(|e| as_store_err(e, StoreError::Delete))
    }

    async fn get_config(&self) -> Result<StoreConfig, StoreError> {
        self.executor
            .run(|conn| {
                let row = config::table
                    .filter(config::id.eq(1))
                    .first::<ConfigRow>(conn)?;
                Ok(mappers::config_from_row(&row))
            })
            .map_err(|e| as_store_err(e, StoreError::Read))
    }

    async fn update_config(&self, patch: &ConfigPatch, now_secs: i64) -> Result<(), StoreError> {
        let patch = patch.clone();
        self.executor
            .run(move |conn| {
                conn.transaction(|conn| {
                    let current = config::table
                        .filter(config::id.eq(1))
                        .first::<ConfigRow>(conn)?;

                    diesel::update(config::table.filter(config::id.eq(1)))
                        .set((
                            config::local_limit
                                .eq(patch.local_limit.unwrap_or(current.local_limit)),
                            config::day_limit.eq(patch.day_limit.unwrap_or(current.day_limit)),
                            config::cloud_limit
                                .eq(patch.cloud_limit.unwrap_or(current.cloud_limit)),
                            config::last_modified.eq(now_secs),
                        ))
                        .execute(conn)?;
                    Ok(())
                })
            })
            .map_err(|e| as_store_err(e, StoreError::Update))
    }

    async fn enqueue_pending_sync(
        &self,
        op: &PendingOp,
        now_secs: i64,
    ) -> Result<PendingSyncOp, StoreError> {
        let row = mappers::pending_op_to_row(op, now_secs);
        self.executor
            .run(move |conn| {
                let inserted: PendingSyncRow = diesel::insert_into(pending_sync::table)
                    .values(&row)
                    .get_result(conn)?;
                Ok(mappers::pending_op_from_row(&inserted)?)
            })
            .map_err(|e| as_store_err(e, StoreError::Create))
    }

    async fn get_pending_sync_items(&self) -> Result<Vec<PendingSyncOp>, StoreError> {
        self.executor
            .run(|conn| {
                let rows: Vec<PendingSyncRow> = pending_sync::table
                    .order(pending_sync::id.asc())
                    .load(conn)?;
                rows.iter()
                    .map(|r| Ok(mappers::pending_op_from_row(r)?))
                    .collect()
            })
            .map_err(|e| as_store_err(e, StoreError::Read))
    }

    async fn clear_pending_item(&self, id: i64) -> Result<(), StoreError> {
        self.executor
            .run(move |conn| {
                diesel::delete(pending_sync::table.filter(pending_sync::id.eq(id)))
                    .execute(conn)?;
                Ok(())
            })
            .map_err(|e| as_store_err(e, StoreError::Delete))
    }
}

fn delete_rows(
    conn: &mut SqliteConnection,
    victims: &[ClipboardRow],
) -> anyhow::Result<Vec<EvictedItem>> {
    if victims.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = victims.iter().map(|r| r.id.clone()).collect();
    diesel::delete(clipboard::table.filter(clipboard::id.eq_any(&ids))).execute(conn)?;

    victims
        .iter()
        .map(|row| {
            let shared = ShareState::parse(&row.shared)
                .ok_or_else(|| StoreError::Read(format!("unknown shared state '{}'", row.shared)))?;
            Ok(EvictedItem {
                id: ItemId::from(row.id.clone()),
                shared,
            })
        })
        .collect()
}
