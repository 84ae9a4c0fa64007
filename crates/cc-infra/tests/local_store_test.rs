//! Local store integration tests against a real SQLite database.

use cc_core::ports::LocalStorePort;
use cc_core::{
    ClipboardItem, ConfigPatch, ImageMeta, ItemId, ItemKind, PendingOp, ShareState, Tag, TagDraft,
    TagId, TagSource, TagSyncStatus,
};
use cc_infra::db::{init_db_pool, DieselLocalStore, DieselSqliteExecutor};

struct TestStore {
    store: DieselLocalStore<DieselSqliteExecutor>,
    // Holds the database file alive for the test's duration.
    _dir: tempfile::TempDir,
}

fn test_store() -> TestStore {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("archive.db");
    let pool = init_db_pool(db_path.to_str().unwrap()).expect("init test db");
    TestStore {
        store: DieselLocalStore::new(DieselSqliteExecutor::new(pool)),
        _dir: dir,
    }
}

fn text_item(id: &str, created_at: i64, content: &str) -> ClipboardItem {
    ClipboardItem {
        id: ItemId::from(id),
        kind: ItemKind::Text,
        format: "text/plain".to_string(),
        content: content.to_string(),
        created_at,
        shared: ShareState::Local,
    }
}

fn tag(id: &str, draft: &TagDraft) -> Tag {
    Tag {
        tag_id: TagId::from(id),
        name: draft.name.clone(),
        source: draft.source,
        sync_status: TagSyncStatus::Pending,
    }
}

#[tokio::test]
async fn insert_and_get_round_trip() {
    let t = test_store();
    let item = text_item("a", 100, "hello");
    t.store.insert_item(&item).await.unwrap();

    let stored = t.store.get_item(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.item, item);
    assert!(stored.image.is_none());
    assert!(stored.tags.is_empty());

    assert!(t
        .store
        .get_item(&ItemId::from("missing"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn duplicate_item_id_is_a_constraint_error() {
    let t = test_store();
    let item = text_item("a", 100, "hello");
    t.store.insert_item(&item).await.unwrap();

    let err = t.store.insert_item(&item).await.unwrap_err();
    assert!(matches!(err, cc_core::StoreError::Constraint(_)));
}

#[tokio::test]
async fn tag_name_source_pair_is_unique() {
    let t = test_store();
    let draft = TagDraft::user("Cat");

    let first = t.store.insert_tag(&tag("t1", &draft)).await.unwrap();
    // Second insert with a different id and different case returns the
    // existing row, never a second one.
    let second = t
        .store
        .insert_tag(&tag("t2", &TagDraft::user("cat")))
        .await
        .unwrap();

    assert_eq!(first.tag_id, second.tag_id);
    assert_eq!(second.tag_id, TagId::from("t1"));

    // Same name under a different source is a distinct tag.
    let auto = t
        .store
        .insert_tag(&tag("t3", &TagDraft::auto("cat")))
        .await
        .unwrap();
    assert_eq!(auto.tag_id, TagId::from("t3"));
}

#[tokio::test]
async fn tag_lookup_is_case_insensitive() {
    let t = test_store();
    t.store
        .insert_tag(&tag("t1", &TagDraft::user("Receipt")))
        .await
        .unwrap();

    let found = t
        .store
        .get_tag_by_name_and_source("receipt", TagSource::User)
        .await
        .unwrap();
    assert_eq!(found.unwrap().tag_id, TagId::from("t1"));

    let absent = t
        .store
        .get_tag_by_name_and_source("receipt", TagSource::Auto)
        .await
        .unwrap();
    assert!(absent.is_none());
}

#[tokio::test]
async fn update_tag_id_rewrites_row_and_links_atomically() {
    let t = test_store();
    let item = text_item("a", 100, "tagged");
    t.store.insert_item(&item).await.unwrap();
    t.store
        .insert_tag(&tag("L1", &TagDraft::user("cat")))
        .await
        .unwrap();
    t.store
        .insert_data_tag(&item.id, &TagId::from("L1"))
        .await
        .unwrap();

    t.store
        .update_tag_id(&TagId::from("L1"), &TagId::from("C1"))
        .await
        .unwrap();

    // No row under the old id remains; the link followed the rewrite.
    let by_name = t
        .store
        .get_tag_by_name_and_source("cat", TagSource::User)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_name.tag_id, TagId::from("C1"));

    let stored = t.store.get_item(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.tags.len(), 1);
    assert_eq!(stored.tags[0].tag_id, TagId::from("C1"));

    // Rewriting to the id it already has is a no-op, not an error.
    t.store
        .update_tag_id(&TagId::from("C1"), &TagId::from("C1"))
        .await
        .unwrap();

    let err = t
        .store
        .update_tag_id(&TagId::from("L1"), &TagId::from("C2"))
        .await
        .unwrap_err();
    assert!(matches!(err, cc_core::StoreError::NotFound(_)));
}

#[tokio::test]
async fn deleting_an_item_cascades_to_meta_and_links() {
    let t = test_store();
    let mut item = text_item("img1", 100, "/data/img1.png");
    item.kind = ItemKind::Image;
    item.format = "image/png".to_string();
    t.store.insert_item(&item).await.unwrap();
    t.store
        .insert_image_meta(&ImageMeta {
            data_id: item.id.clone(),
            width: 10,
            height: 10,
            file_size: 99,
            file_path: "/data/img1.png".to_string(),
            thumbnail_path: None,
        })
        .await
        .unwrap();
    t.store
        .insert_tag(&tag("t1", &TagDraft::auto("사진")))
        .await
        .unwrap();
    t.store
        .insert_data_tag(&item.id, &TagId::from("t1"))
        .await
        .unwrap();

    t.store.delete_item(&item.id).await.unwrap();

    assert!(t.store.get_item(&item.id).await.unwrap().is_none());
    assert!(t.store.get_image_meta(&item.id).await.unwrap().is_none());
    // The tag row itself survives; only the link goes.
    assert!(t
        .store
        .get_tag_by_name_and_source("사진", TagSource::Auto)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn eviction_is_deterministic_oldest_first() {
    let t = test_store();
    for (id, ts) in [("a", 10), ("b", 20), ("c", 30), ("d", 40)] {
        t.store.insert_item(&text_item(id, ts, id)).await.unwrap();
    }

    let evicted = t.store.enforce_max_clipboard_items(3).await.unwrap();
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].id, ItemId::from("a"));

    let remaining = t.store.list_items().await.unwrap();
    assert_eq!(remaining.len(), 3);
    assert!(remaining.iter().all(|s| s.item.id != ItemId::from("a")));

    // Already under the limit: nothing to do.
    assert!(t
        .store
        .enforce_max_clipboard_items(3)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn retention_deletes_items_older_than_cutoff() {
    let t = test_store();
    let now = 100 * 86_400;
    t.store
        .insert_item(&text_item("old", now - 31 * 86_400, "old"))
        .await
        .unwrap();
    t.store
        .insert_item(&text_item("new", now - 86_400, "new"))
        .await
        .unwrap();

    let evicted = t.store.delete_old_clipboard_items(30, now).await.unwrap();
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].id, ItemId::from("old"));
    assert_eq!(t.store.list_items().await.unwrap().len(), 1);
}

#[tokio::test]
async fn search_matches_content_and_tag_names() {
    let t = test_store();
    t.store
        .insert_item(&text_item("a", 10, "my cat picture"))
        .await
        .unwrap();
    t.store
        .insert_item(&text_item("b", 20, "shopping list"))
        .await
        .unwrap();
    t.store
        .insert_tag(&tag("t1", &TagDraft::user("CatTag")))
        .await
        .unwrap();
    t.store
        .insert_data_tag(&ItemId::from("b"), &TagId::from("t1"))
        .await
        .unwrap();

    let hits = t.store.search_text("cat").await.unwrap();
    let ids: Vec<&str> = hits.iter().map(|s| s.item.id.as_ref()).collect();
    assert!(ids.contains(&"a"), "content match expected");
    assert!(ids.contains(&"b"), "tag-name match expected");

    assert!(t.store.search_text("zzz").await.unwrap().is_empty());
}

#[tokio::test]
async fn search_treats_like_metacharacters_as_literals() {
    let t = test_store();
    t.store
        .insert_item(&text_item("a", 10, "discount 100%"))
        .await
        .unwrap();
    t.store
        .insert_item(&text_item("b", 20, "discount 100x"))
        .await
        .unwrap();

    let hits = t.store.search_text("100%").await.unwrap();
    let ids: Vec<&str> = hits.iter().map(|s| s.item.id.as_ref()).collect();
    assert_eq!(ids, vec!["a"], "percent must only match itself");

    assert!(
        t.store.search_text("100_").await.unwrap().is_empty(),
        "underscore must not act as a single-character wildcard"
    );
}

#[tokio::test]
async fn pending_queue_round_trip() {
    let t = test_store();
    let op1 = t
        .store
        .enqueue_pending_sync(
            &PendingOp::Delete {
                data_id: ItemId::from("a"),
            },
            100,
        )
        .await
        .unwrap();
    let op2 = t
        .store
        .enqueue_pending_sync(&PendingOp::UpdateMaxCount { limit: 50 }, 101)
        .await
        .unwrap();

    let queued = t.store.get_pending_sync_items().await.unwrap();
    assert_eq!(queued.len(), 2);
    assert_eq!(queued[0].id, op1.id);
    assert_eq!(
        queued[1].op,
        PendingOp::UpdateMaxCount { limit: 50 }
    );

    t.store.clear_pending_item(op1.id).await.unwrap();
    let queued = t.store.get_pending_sync_items().await.unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].id, op2.id);
}

#[tokio::test]
async fn config_patch_keeps_unspecified_fields() {
    let t = test_store();
    let initial = t.store.get_config().await.unwrap();
    assert_eq!(initial.local_limit, 30);

    t.store
        .update_config(
            &ConfigPatch {
                local_limit: Some(50),
                day_limit: None,
                cloud_limit: None,
            },
            1234,
        )
        .await
        .unwrap();

    let updated = t.store.get_config().await.unwrap();
    assert_eq!(updated.local_limit, 50);
    assert_eq!(updated.day_limit, initial.day_limit);
    assert_eq!(updated.last_modified, 1234);
}

#[tokio::test]
async fn shared_status_update_requires_existing_row() {
    let t = test_store();
    t.store.insert_item(&text_item("a", 10, "x")).await.unwrap();

    t.store
        .update_shared_status(&ItemId::from("a"), ShareState::Both)
        .await
        .unwrap();
    let stored = t.store.get_item(&ItemId::from("a")).await.unwrap().unwrap();
    assert_eq!(stored.item.shared, ShareState::Both);

    let err = t
        .store
        .update_shared_status(&ItemId::from("missing"), ShareState::Both)
        .await
        .unwrap_err();
    assert!(matches!(err, cc_core::StoreError::NotFound(_)));
}
