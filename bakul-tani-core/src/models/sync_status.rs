use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a locally written entity has been reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Written while offline, awaiting reconciliation
    Pending,
    #[default]
    Synced,
}

impl SyncStatus {
    /// Status for a write made with the given connectivity.
    pub fn for_connectivity(is_online: bool) -> Self {
        if is_online {
            SyncStatus::Synced
        } else {
            SyncStatus::Pending
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Pending => write!(f, "pending"),
            SyncStatus::Synced => write!(f, "synced"),
        }
    }
}
