//! Authenticated session state.
//!
//! The refresh flow is a pure two-state machine. Only the state definitions
//! and transition validation live here; the waiter queue and the actual HTTP
//! refresh call are runtime concerns of the remote client.
//!
//! ```text
//! Idle ──(401 received)──→ Refreshing ──(refresh resolved)──→ Idle
//! ```
//!
//! While `Refreshing`, further 401s must not start additional refresh calls
//! (single-flight); they park and are replayed or rejected when the one
//! in-flight refresh resolves.

use serde::{Deserialize, Serialize};

/// Opaque token pair produced by login and rotated by refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token-refresh state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshState {
    /// No refresh in flight.
    Idle,
    /// Exactly one refresh call is in flight.
    Refreshing,
}

impl RefreshState {
    pub fn is_refreshing(self) -> bool {
        self == Self::Refreshing
    }

    /// Arm the refresh. Returns `true` if the caller became the single
    /// refresher, `false` if one is already in flight and the caller must
    /// park instead.
    pub fn begin(&mut self) -> bool {
        match self {
            Self::Idle => {
                *self = Self::Refreshing;
                true
            }
            Self::Refreshing => false,
        }
    }

    /// Resolve the in-flight refresh, successful or not.
    pub fn finish(&mut self) {
        *self = Self::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_caller_becomes_the_refresher() {
        let mut state = RefreshState::Idle;
        assert!(state.begin());
        assert!(!state.begin());
        assert!(!state.begin());
        state.finish();
        assert!(state.begin());
    }
}
