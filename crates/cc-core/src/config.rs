//! User configuration record.
//!
//! A single durable row: local retention limits plus the cloud quota mirror.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of items kept locally.
    pub local_limit: i32,
    /// Items older than this many days are evicted.
    pub day_limit: i32,
    /// Account-level cloud quota, mirrored locally for display.
    pub cloud_limit: i32,
    /// Epoch seconds of the last config write.
    pub last_modified: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            local_limit: 30,
            day_limit: 30,
            cloud_limit: 30,
            last_modified: 0,
        }
    }
}

/// Partial config update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    pub local_limit: Option<i32>,
    pub day_limit: Option<i32>,
    pub cloud_limit: Option<i32>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.local_limit.is_none() && self.day_limit.is_none() && self.cloud_limit.is_none()
    }
}
