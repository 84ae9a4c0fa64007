//! Error taxonomy.
//!
//! Errors are classified by cause, never by transport detail: storage errors,
//! remote errors, validation, and derived-feature failures. The numeric codes
//! are the application-wide error map the UI layer keys messages off
//! (`E6xx` family). Raw driver or transport errors never cross the app
//! boundary — every externally visible failure is normalized to an
//! [`ErrorEnvelope`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures at the local persistence tier. A failure aborts only the
/// enclosing operation; unrelated rows are never touched.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("data create failed: {0}")]
    Create(String),

    #[error("data read failed: {0}")]
    Read(String),

    #[error("data update failed: {0}")]
    Update(String),

    #[error("data delete failed: {0}")]
    Delete(String),

    #[error("row not found: {0}")]
    NotFound(String),

    #[error("constraint violated: {0}")]
    Constraint(String),
}

/// Failures at the remote tier.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("remote service unreachable: {0}")]
    Unreachable(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no active session")]
    NoSession,

    #[error("session expired")]
    SessionExpired,

    #[error("account already exists: {0}")]
    DuplicateUser(String),

    #[error("cloud quota exceeded")]
    QuotaExceeded,

    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed remote payload: {0}")]
    Decode(String),
}

/// Top-level error surfaced by the coordinator.
#[derive(Debug, Clone, Error)]
pub enum ArchiveError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("tag derivation failed: {0}")]
    TagDerivation(String),

    #[error("image metadata extraction failed: {0}")]
    ImageMeta(String),
}

impl ArchiveError {
    /// Application error code, by cause.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E611",
            Self::Store(StoreError::Create(_)) => "E631",
            Self::Store(StoreError::Read(_)) => "E655",
            Self::Store(StoreError::Update(_)) => "E656",
            Self::Store(StoreError::Delete(_)) => "E650",
            Self::Store(StoreError::NotFound(_)) => "E633",
            Self::Store(StoreError::Constraint(_)) => "E642",
            Self::Remote(RemoteError::Unreachable(_)) => "E620",
            Self::Remote(RemoteError::InvalidCredentials) => "E401",
            Self::Remote(RemoteError::NoSession) => "E612",
            Self::Remote(RemoteError::SessionExpired) => "E612",
            Self::Remote(RemoteError::DuplicateUser(_)) => "E409",
            Self::Remote(RemoteError::QuotaExceeded) => "E651",
            Self::Remote(RemoteError::Status { .. }) => "E632",
            Self::Remote(RemoteError::Decode(_)) => "E641",
            Self::TagDerivation(_) => "E661",
            Self::ImageMeta(_) => "E660",
        }
    }
}

/// Detail block of the boundary error shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub module: String,
    pub context: String,
}

/// The `{success: false, error: {...}}` shape every externally visible
/// failure is normalized to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorDetail,
}

impl ErrorEnvelope {
    pub fn new(module: &str, context: &str, error: &ArchiveError) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: error.code().to_string(),
                message: error.to_string(),
                module: module.to_string(),
                context: context.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_cause_not_the_transport() {
        assert_eq!(
            ArchiveError::from(StoreError::Create("disk full".into())).code(),
            "E631"
        );
        assert_eq!(
            ArchiveError::from(RemoteError::QuotaExceeded).code(),
            "E651"
        );
        assert_eq!(ArchiveError::Validation("missing field".into()).code(), "E611");
    }

    #[test]
    fn envelope_is_the_documented_boundary_shape() {
        let err = ArchiveError::from(RemoteError::SessionExpired);
        let envelope = ErrorEnvelope::new("coordinator", "deleteItem", &err);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "E612");
        assert_eq!(json["error"]["module"], "coordinator");
    }
}
