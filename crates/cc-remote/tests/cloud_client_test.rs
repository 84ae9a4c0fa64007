use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Server, ServerGuard};

use cc_core::ports::RemoteClientPort;
use cc_core::{ClipboardItem, ItemKind, RemoteError, ShareState, TagDraft, TagSource};
use cc_remote::{CloudClient, RemoteConfig};

fn client_for(server: &ServerGuard) -> CloudClient {
    CloudClient::new(RemoteConfig::new(server.url()).with_timeout(Duration::from_secs(5)))
        .expect("client")
}

fn token_body(access: &str, refresh: &str) -> String {
    format!(
        r#"{{"access_token":"{}","refresh_token":"{}"}}"#,
        access, refresh
    )
}

async fn logged_in(server: &mut ServerGuard, access: &str, refresh: &str) -> CloudClient {
    let login = server
        .mock("POST", "/login")
        .with_status(200)
        .with_body(token_body(access, refresh))
        .create_async()
        .await;

    let client = client_for(server);
    client.login("user", "secret").await.expect("login");
    login.assert_async().await;
    client
}

fn text_item(id: &str, content: &str) -> ClipboardItem {
    ClipboardItem {
        id: id.into(),
        kind: ItemKind::Text,
        format: "text/plain".to_string(),
        content: content.to_string(),
        created_at: 1_700_000_000,
        shared: ShareState::Local,
    }
}

#[tokio::test]
async fn login_stores_a_session_and_logout_drops_it() {
    let mut server = Server::new_async().await;
    let client = logged_in(&mut server, "a1", "r1").await;

    assert!(client.has_session().await);
    client.logout().await;
    assert!(!client.has_session().await);
}

#[tokio::test]
async fn login_with_bad_credentials_is_rejected() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/login")
        .with_status(401)
        .with_body("invalid credentials")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.login("user", "wrong").await.unwrap_err();
    assert!(matches!(err, RemoteError::InvalidCredentials));
    assert!(!client.has_session().await);
}

#[tokio::test]
async fn signup_conflict_maps_to_duplicate_user() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/signup")
        .with_status(409)
        .with_body("user already exists")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.signup("user", "secret").await.unwrap_err();
    assert!(matches!(err, RemoteError::DuplicateUser(_)));
}

#[tokio::test]
async fn requests_without_a_session_fail_fast() {
    let server = Server::new_async().await;
    let client = client_for(&server);

    let err = client.fetch_items().await.unwrap_err();
    assert!(matches!(err, RemoteError::NoSession));
}

#[tokio::test]
async fn fetch_items_sends_the_bearer_token_and_normalizes_rows() {
    let mut server = Server::new_async().await;
    let items = server
        .mock("GET", "/clipboard-data")
        .match_header("authorization", "Bearer a1")
        .with_status(200)
        .with_body(
            r#"{"rows":[
                {"id":"c1","type":"txt","format":"text/plain","content":"hello","created_at":42,
                 "tags":[{"tag_id":"t1","name":"cat","source":"user"}]},
                {"type":"txt","content":"no id, dropped"}
            ]}"#,
        )
        .create_async()
        .await;

    let client = logged_in(&mut server, "a1", "r1").await;
    let rows = client.fetch_items().await.expect("fetch");

    items.assert_async().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id.as_ref(), "c1");
    assert_eq!(rows[0].content, "hello");
    assert_eq!(rows[0].tags[0].name, "cat");
}

#[tokio::test]
async fn expired_token_is_refreshed_and_the_request_replayed_once() {
    let mut server = Server::new_async().await;
    let stale = server
        .mock("GET", "/clipboard-data")
        .match_header("authorization", "Bearer a1")
        .with_status(401)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/refresh")
        .match_body(Matcher::PartialJsonString(
            r#"{"refresh_token":"r1"}"#.to_string(),
        ))
        .with_status(200)
        .with_body(token_body("a2", "r2"))
        .expect(1)
        .create_async()
        .await;
    let fresh = server
        .mock("GET", "/clipboard-data")
        .match_header("authorization", "Bearer a2")
        .with_status(200)
        .with_body(r#"{"rows":[{"id":"c1"}]}"#)
        .create_async()
        .await;

    let client = logged_in(&mut server, "a1", "r1").await;
    let rows = client.fetch_items().await.expect("fetch after refresh");

    stale.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn concurrent_expired_requests_share_a_single_refresh() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/clipboard-data")
        .match_header("authorization", "Bearer a1")
        .with_status(401)
        .expect_at_most(2)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/refresh")
        .with_status(200)
        .with_body(token_body("a2", "r2"))
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/clipboard-data")
        .match_header("authorization", "Bearer a2")
        .with_status(200)
        .with_body(r#"{"rows":[]}"#)
        .expect(2)
        .create_async()
        .await;

    let client = Arc::new(logged_in(&mut server, "a1", "r1").await);
    let (first, second) = tokio::join!(client.fetch_items(), client.fetch_items());

    first.expect("first fetch");
    second.expect("second fetch");
    refresh.assert_async().await;
}

#[tokio::test]
async fn failed_refresh_expires_the_session() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/clipboard-data")
        .match_header("authorization", "Bearer a1")
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("POST", "/refresh")
        .with_status(500)
        .with_body("refresh backend down")
        .create_async()
        .await;

    let client = logged_in(&mut server, "a1", "r1").await;
    let err = client.fetch_items().await.unwrap_err();

    assert!(matches!(err, RemoteError::SessionExpired));
    assert!(!client.has_session().await);
}

#[tokio::test]
async fn a_second_401_after_refresh_is_not_retried_again() {
    let mut server = Server::new_async().await;
    let stale = server
        .mock("GET", "/clipboard-data")
        .match_header("authorization", "Bearer a1")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", "/refresh")
        .with_status(200)
        .with_body(token_body("a2", "r2"))
        .create_async()
        .await;
    let still_stale = server
        .mock("GET", "/clipboard-data")
        .match_header("authorization", "Bearer a2")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let client = logged_in(&mut server, "a1", "r1").await;
    let err = client.fetch_items().await.unwrap_err();

    stale.assert_async().await;
    still_stale.assert_async().await;
    assert!(matches!(err, RemoteError::SessionExpired));
}

#[tokio::test]
async fn storage_exhaustion_maps_to_quota_exceeded() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/items")
        .with_status(507)
        .with_body("insufficient storage")
        .create_async()
        .await;

    let client = logged_in(&mut server, "a1", "r1").await;
    let err = client
        .create_text_item(&text_item("c1", "hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::QuotaExceeded));
}

#[tokio::test]
async fn create_tag_returns_the_canonical_row() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/tags")
        .match_body(Matcher::PartialJsonString(
            r#"{"name":"고양이","source":"user"}"#.to_string(),
        ))
        .with_status(200)
        .with_body(r#"{"tag_id":"C1","name":"고양이","source":"user"}"#)
        .create_async()
        .await;

    let client = logged_in(&mut server, "a1", "r1").await;
    let tag = client
        .create_tag(&TagDraft::user("고양이"))
        .await
        .expect("create tag");

    assert_eq!(tag.tag_id.as_ref(), "C1");
    assert_eq!(tag.source, TagSource::User);
}

#[tokio::test]
async fn search_passes_the_keyword_as_a_query_parameter() {
    let mut server = Server::new_async().await;
    let search = server
        .mock("GET", "/search-text")
        .match_query(Matcher::UrlEncoded("keyword".into(), "hello".into()))
        .with_status(200)
        .with_body(r#"{"rows":[{"id":"c9","content":"hello world"}]}"#)
        .create_async()
        .await;

    let client = logged_in(&mut server, "a1", "r1").await;
    let rows = client.search_by_content("hello").await.expect("search");

    search.assert_async().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id.as_ref(), "c9");
}

#[tokio::test]
async fn download_file_writes_the_body_to_the_destination() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/img.png")
        .with_status(200)
        .with_body(b"png-bytes".as_slice())
        .create_async()
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let dest = dir.path().join("images").join("img.png");

    let client = logged_in(&mut server, "a1", "r1").await;
    client
        .download_file(&format!("{}/files/img.png", server.url()), &dest)
        .await
        .expect("download");

    assert_eq!(std::fs::read(&dest).expect("read"), b"png-bytes");
}
