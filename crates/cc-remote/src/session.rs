//! Token state and single-flight refresh coordination.
//!
//! The state machine itself ([`RefreshState`]) lives in `cc-core`; this
//! module adds the runtime pieces: the token cell, the waiter queue, and the
//! rule that the task which flips `Idle → Refreshing` is the only one that
//! performs the HTTP refresh call. Everyone else parks on a oneshot and is
//! replayed or rejected when the single in-flight refresh resolves.

use tokio::sync::{oneshot, Mutex};

use cc_core::{AuthTokens, RefreshState, RemoteError};

#[derive(Default)]
struct SessionInner {
    tokens: Option<AuthTokens>,
    refresh: RefreshStateCell,
    waiters: Vec<oneshot::Sender<Result<String, RemoteError>>>,
}

struct RefreshStateCell(RefreshState);

impl Default for RefreshStateCell {
    fn default() -> Self {
        Self(RefreshState::Idle)
    }
}

/// What a 401-handling task must do next.
pub(crate) enum RefreshTicket {
    /// This task became the single refresher; it must call the refresh
    /// endpoint with the given refresh token and then resolve the cell.
    Lead { refresh_token: String },
    /// Another refresh is in flight; await the receiver for its outcome.
    Park(oneshot::Receiver<Result<String, RemoteError>>),
    /// The session was already refreshed since this task read its token;
    /// just retry with the fresh one.
    AlreadyFresh { access_token: String },
}

/// Process-wide session cell: initialized at startup, torn down at process
/// exit, never persisted.
#[derive(Default)]
pub(crate) struct SessionCell {
    inner: Mutex<SessionInner>,
}

impl SessionCell {
    pub async fn set_tokens(&self, tokens: AuthTokens) {
        self.inner.lock().await.tokens = Some(tokens);
    }

    pub async fn clear(&self) {
        self.inner.lock().await.tokens = None;
    }

    pub async fn has_session(&self) -> bool {
        self.inner.lock().await.tokens.is_some()
    }

    pub async fn access_token(&self) -> Result<String, RemoteError> {
        self.inner
            .lock()
            .await
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(RemoteError::NoSession)
    }

    /// Called by a task whose request just came back 401 with `stale` as its
    /// bearer token.
    pub async fn arm_refresh(&self, stale: &str) -> Result<RefreshTicket, RemoteError> {
        let mut inner = self.inner.lock().await;

        let tokens = inner.tokens.clone().ok_or(RemoteError::NoSession)?;
        if tokens.access_token != stale {
            return Ok(RefreshTicket::AlreadyFresh {
                access_token: tokens.access_token,
            });
        }

        if inner.refresh.0.begin() {
            Ok(RefreshTicket::Lead {
                refresh_token: tokens.refresh_token,
            })
        } else {
            let (tx, rx) = oneshot::channel();
            inner.waiters.push(tx);
            Ok(RefreshTicket::Park(rx))
        }
    }

    /// Lead task reports the refresh outcome. Success stores the rotated
    /// tokens and replays the parked tasks; failure clears the session
    /// (a half-refreshed session is unsafe to keep) and rejects them.
    pub async fn resolve_refresh(&self, outcome: Result<AuthTokens, RemoteError>) {
        let mut inner = self.inner.lock().await;
        inner.refresh.0.finish();

        let result = match outcome {
            Ok(tokens) => {
                let access = tokens.access_token.clone();
                inner.tokens = Some(tokens);
                Ok(access)
            }
            Err(_) => {
                inner.tokens = None;
                Err(RemoteError::SessionExpired)
            }
        };

        for waiter in inner.waiters.drain(..) {
            // A dropped receiver means the caller gave up on awaiting;
            // nothing to deliver.
            let _ = waiter.send(result.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(access: &str, refresh: &str) -> AuthTokens {
        AuthTokens {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    #[tokio::test]
    async fn second_concurrent_401_parks_instead_of_refreshing() {
        let cell = SessionCell::default();
        cell.set_tokens(tokens("a1", "r1")).await;

        match cell.arm_refresh("a1").await.unwrap() {
            RefreshTicket::Lead { refresh_token } => assert_eq!(refresh_token, "r1"),
            _ => panic!("expected lead ticket"),
        }

        let second = cell.arm_refresh("a1").await.unwrap();
        let rx = match second {
            RefreshTicket::Park(rx) => rx,
            _ => panic!("expected parked ticket"),
        };

        cell.resolve_refresh(Ok(tokens("a2", "r2"))).await;
        assert_eq!(rx.await.unwrap().unwrap(), "a2");
        assert_eq!(cell.access_token().await.unwrap(), "a2");
    }

    #[tokio::test]
    async fn stale_observation_after_refresh_gets_the_fresh_token() {
        let cell = SessionCell::default();
        cell.set_tokens(tokens("a2", "r2")).await;

        // This task still holds "a1" from before a completed refresh.
        match cell.arm_refresh("a1").await.unwrap() {
            RefreshTicket::AlreadyFresh { access_token } => assert_eq!(access_token, "a2"),
            _ => panic!("expected fresh token"),
        }
    }

    #[tokio::test]
    async fn refresh_failure_clears_session_and_rejects_waiters() {
        let cell = SessionCell::default();
        cell.set_tokens(tokens("a1", "r1")).await;

        let _lead = cell.arm_refresh("a1").await.unwrap();
        let rx = match cell.arm_refresh("a1").await.unwrap() {
            RefreshTicket::Park(rx) => rx,
            _ => panic!("expected parked ticket"),
        };

        cell.resolve_refresh(Err(RemoteError::Status {
            status: 500,
            message: "refresh failed".into(),
        }))
        .await;

        assert!(matches!(
            rx.await.unwrap(),
            Err(RemoteError::SessionExpired)
        ));
        assert!(!cell.has_session().await);
    }
}
