//! Pending-sync queue and batch reporting types.

use serde::{Deserialize, Serialize};

use crate::ids::ItemId;

/// A remote-directed mutation deferred because the remote tier was
/// unreachable (typically: no session). Replayed best-effort on the next
/// successful session establishment; dequeued only after the replay
/// succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSyncOp {
    /// Store-assigned queue id.
    pub id: i64,
    pub op: PendingOp,
    /// Epoch seconds at enqueue time.
    pub enqueued_at: i64,
}

/// The deferred operation itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PendingOp {
    /// Push a local item to the remote tier. Enqueued when an add targeted
    /// at both tiers loses its cloud leg.
    Upload { data_id: ItemId },
    /// Delete the remote record outright.
    Delete { data_id: ItemId },
    /// Tier-aware delete: mark the remote record as no longer mirrored
    /// locally without removing the cloud copy.
    LocalDelete { data_id: ItemId },
    /// Push a new cloud quota to the account.
    UpdateMaxCount { limit: u32 },
}

impl PendingOp {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upload { .. } => "upload",
            Self::Delete { .. } => "delete",
            Self::LocalDelete { .. } => "localDelete",
            Self::UpdateMaxCount { .. } => "updateMaxCount",
        }
    }

    pub fn data_id(&self) -> Option<&ItemId> {
        match self {
            Self::Upload { data_id }
            | Self::Delete { data_id }
            | Self::LocalDelete { data_id } => Some(data_id),
            Self::UpdateMaxCount { .. } => None,
        }
    }
}

/// Per-item failure inside a batch operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    pub id: ItemId,
    pub code: String,
    pub message: String,
}

/// Outcome of a batch operation. Failures never abort sibling items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub success_count: u32,
    pub error_count: u32,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_failure(&mut self, id: ItemId, error: &crate::error::ArchiveError) {
        self.error_count += 1;
        self.failures.push(ItemFailure {
            id,
            code: error.code().to_string(),
            message: error.to_string(),
        });
    }
}
