//! Row structs for the archive schema.

use diesel::prelude::*;

use crate::db::schema::{clipboard, config, data_tag, image_meta, pending_sync, tag};

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = clipboard)]
pub struct ClipboardRow {
    pub id: String,
    pub kind: String,
    pub format: String,
    pub content: String,
    pub created_at: i64,
    pub shared: String,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = image_meta)]
pub struct ImageMetaRow {
    pub data_id: String,
    pub width: i32,
    pub height: i32,
    pub file_size: i64,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = tag)]
pub struct TagRow {
    pub tag_id: String,
    pub name: String,
    pub source: String,
    pub sync_status: String,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = data_tag)]
pub struct DataTagRow {
    pub data_id: String,
    pub tag_id: String,
}

#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = pending_sync)]
pub struct PendingSyncRow {
    pub id: i64,
    pub op: String,
    pub data_id: Option<String>,
    pub op_args: Option<String>,
    pub enqueued_at: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pending_sync)]
pub struct NewPendingSyncRow {
    pub op: String,
    pub data_id: Option<String>,
    pub op_args: Option<String>,
    pub enqueued_at: i64,
}

#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = config)]
pub struct ConfigRow {
    pub id: i32,
    pub local_limit: i32,
    pub day_limit: i32,
    pub cloud_limit: i32,
    pub last_modified: i64,
}
