//! Bakul Tani Core Library
//!
//! Offline-first inventory ledger: the state model, the reducer that
//! transforms it, snapshot persistence with migrations, and connectivity
//! driven reconciliation.

pub mod accounts;
pub mod action;
pub mod backup;
pub mod entry;
pub mod migration;
pub mod models;
pub mod persistence;
pub mod reducer;
pub mod reports;
pub mod state;
pub mod storage;
pub mod store;
pub mod sync;

pub use accounts::{AccountError, AccountRegistry, Registration};
pub use action::{Action, UserPatch};
pub use backup::BackupError;
pub use entry::EntryError;
pub use models::{
    Category, ChangeDirection, Item, Notification, NotificationKind, SyncStatus, Theme,
    Transaction, TransactionType, User, Warehouse,
};
pub use persistence::{LoadError, PersistError, PersistenceBridge};
pub use reducer::reduce;
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{Dispatch, SharedStore, Store};
pub use sync::{ConnectivityMonitor, ConnectivitySource, ManualConnectivity};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
