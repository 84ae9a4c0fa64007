//! Remote service client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use cc_core::ports::RemoteClientPort;
use cc_core::{
    AuthTokens, ClipboardItem, ImageMeta, ItemId, RemoteError, RemoteItem, Tag, TagDraft, TagId,
    TagSource, TagSyncStatus,
};

use crate::session::{RefreshTicket, SessionCell};
use crate::transform::{self, ItemsEnvelope};

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    user_id: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    tag_id: Option<String>,
    name: Option<String>,
    source: Option<String>,
}

pub struct CloudClient {
    http: Client,
    base_url: String,
    session: SessionCell,
}

impl CloudClient {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::Unreachable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session: SessionCell::default(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send an authenticated request. On a 401 the token is refreshed
    /// (single-flight across concurrent callers) and the request is replayed
    /// exactly once; a second 401 surfaces as session expiry.
    async fn send_authed(
        &self,
        build: impl Fn(&Client) -> RequestBuilder,
    ) -> Result<Response, RemoteError> {
        let mut token = self.session.access_token().await?;
        let mut retried = false;

        loop {
            let response = build(&self.http)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(map_transport)?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return check_status(response).await;
            }

            if retried {
                warn!("request failed authorization again after refresh");
                return Err(RemoteError::SessionExpired);
            }

            token = self.refreshed_access_token(&token).await?;
            retried = true;
        }
    }

    /// Obtain a usable access token after observing a 401 with `stale`.
    async fn refreshed_access_token(&self, stale: &str) -> Result<String, RemoteError> {
        match self.session.arm_refresh(stale).await? {
            RefreshTicket::AlreadyFresh { access_token } => Ok(access_token),
            RefreshTicket::Park(rx) => rx.await.map_err(|_| RemoteError::SessionExpired)?,
            RefreshTicket::Lead { refresh_token } => {
                debug!("access token expired, refreshing session");
                let outcome = self.call_refresh(&refresh_token).await;
                let result = match &outcome {
                    Ok(tokens) => Ok(tokens.access_token.clone()),
                    Err(_) => Err(RemoteError::SessionExpired),
                };
                self.session.resolve_refresh(outcome).await;
                result
            }
        }
    }

    async fn call_refresh(&self, refresh_token: &str) -> Result<AuthTokens, RemoteError> {
        let response = self
            .http
            .post(self.url("refresh"))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(map_transport)?;

        let response = check_status(response).await?;
        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(AuthTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }
}

fn map_transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Unreachable(e.to_string())
}

/// Map a non-2xx response to the error taxonomy. 401 never reaches here on
/// the authenticated path; on the credential endpoints the caller maps it
/// itself.
async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        402 | 413 | 507 => RemoteError::QuotaExceeded,
        409 => RemoteError::DuplicateUser(message),
        _ => RemoteError::Status {
            status: status.as_u16(),
            message,
        },
    })
}

#[async_trait]
impl RemoteClientPort for CloudClient {
    async fn login(&self, user_id: &str, password: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .post(self.url("login"))
            .json(&Credentials { user_id, password })
            .send()
            .await
            .map_err(map_transport)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(RemoteError::InvalidCredentials);
        }
        let response = check_status(response).await?;
        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        self.session
            .set_tokens(AuthTokens {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            })
            .await;
        Ok(())
    }

    async fn signup(&self, user_id: &str, password: &str) -> Result<(), RemoteError> {
        let response = self
            .http
            .post(self.url("signup"))
            .json(&Credentials { user_id, password })
            .send()
            .await
            .map_err(map_transport)?;

        check_status(response).await?;
        Ok(())
    }

    async fn logout(&self) {
        self.session.clear().await;
    }

    async fn has_session(&self) -> bool {
        self.session.has_session().await
    }

    async fn fetch_items(&self) -> Result<Vec<RemoteItem>, RemoteError> {
        let url = self.url("clipboard-data");
        let response = self.send_authed(|http| http.get(&url)).await?;

        let envelope: ItemsEnvelope = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(transform::normalize_items(envelope, &self.base_url))
    }

    async fn create_text_item(&self, item: &ClipboardItem) -> Result<(), RemoteError> {
        let url = self.url("items");
        let body = serde_json::json!({
            "id": item.id.to_string(),
            "type": item.kind.as_str(),
            "format": item.format,
            "content": item.content,
            "created_at": item.created_at,
        });

        self.send_authed(|http| http.post(&url).json(&body)).await?;
        Ok(())
    }

    async fn upload_image(
        &self,
        item: &ClipboardItem,
        meta: &ImageMeta,
    ) -> Result<(), RemoteError> {
        let bytes = tokio::fs::read(&meta.file_path)
            .await
            .map_err(|e| RemoteError::Unreachable(format!("read image file: {}", e)))?;

        let url = self.url("items/image");
        let id = item.id.to_string();
        let created_at = item.created_at.to_string();
        self.send_authed(|http| {
            http.post(&url)
                .query(&[
                    ("id", id.as_str()),
                    ("format", item.format.as_str()),
                    ("created_at", created_at.as_str()),
                ])
                .header(reqwest::header::CONTENT_TYPE, item.format.as_str())
                .body(bytes.clone())
        })
        .await?;
        Ok(())
    }

    async fn delete_item(&self, id: &ItemId) -> Result<(), RemoteError> {
        let url = self.url(&format!("items/{}", id));
        self.send_authed(|http| http.delete(&url)).await?;
        Ok(())
    }

    async fn local_delete(&self, id: &ItemId) -> Result<(), RemoteError> {
        let url = self.url("items/localDelete");
        let body = serde_json::json!({ "id": id.to_string() });
        self.send_authed(|http| http.post(&url).json(&body)).await?;
        Ok(())
    }

    async fn download_file(&self, url: &str, dest: &Path) -> Result<(), RemoteError> {
        let response = self.send_authed(|http| http.get(url)).await?;
        let bytes = response.bytes().await.map_err(map_transport)?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RemoteError::Unreachable(format!("create download dir: {}", e)))?;
        }
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| RemoteError::Unreachable(format!("write download: {}", e)))?;
        Ok(())
    }

    async fn create_tag(&self, draft: &TagDraft) -> Result<Tag, RemoteError> {
        let url = self.url("tags");
        let body = serde_json::json!({
            "name": draft.name,
            "source": draft.source.as_str(),
        });

        let response = self.send_authed(|http| http.post(&url).json(&body)).await?;
        let dto: TagResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        let tag_id = dto
            .tag_id
            .ok_or_else(|| RemoteError::Decode("tag response without tag_id".to_string()))?;

        Ok(Tag {
            tag_id: TagId::from(tag_id),
            name: dto.name.unwrap_or_else(|| draft.name.clone()),
            source: dto
                .source
                .as_deref()
                .and_then(TagSource::parse)
                .unwrap_or(draft.source),
            sync_status: TagSyncStatus::Synced,
        })
    }

    async fn create_data_tag(&self, data_id: &ItemId, tag_id: &TagId) -> Result<(), RemoteError> {
        let url = self.url("data-tags");
        let body = serde_json::json!({
            "data_id": data_id.to_string(),
            "tag_id": tag_id.to_string(),
        });
        self.send_authed(|http| http.post(&url).json(&body)).await?;
        Ok(())
    }

    async fn search_by_content(&self, keyword: &str) -> Result<Vec<RemoteItem>, RemoteError> {
        let url = self.url("search-text");
        let response = self
            .send_authed(|http| http.get(&url).query(&[("keyword", keyword)]))
            .await?;

        let envelope: ItemsEnvelope = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(transform::normalize_items(envelope, &self.base_url))
    }

    async fn update_max_count(&self, limit: u32) -> Result<(), RemoteError> {
        let url = self.url("user/max_count_cloud");
        let body = serde_json::json!({ "limit": limit });
        self.send_authed(|http| http.put(&url).json(&body)).await?;
        Ok(())
    }
}
