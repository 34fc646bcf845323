//! Persistence bridge between the store and durable storage.
//!
//! The state is written as a single JSON snapshot under [`STATE_KEY`] after
//! every change. Loading never fails from the caller's point of view: an
//! absent snapshot yields the default state, and a snapshot that cannot be
//! read, parsed or migrated is logged and replaced by the default state.

use serde_json::Value;
use thiserror::Error;

use crate::migration::{self, MigrationError};
use crate::state::AppState;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key of the persisted state snapshot.
pub const STATE_KEY: &str = "bakulTaniState";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Snapshot is not valid JSON: {0}")]
    Parse(serde_json::Error),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error("Snapshot does not match the state shape: {0}")]
    Shape(serde_json::Error),
}

/// Serializes a state snapshot tagged with the current schema version.
///
/// Notifications and the connectivity flag are never part of the output.
pub fn serialize_snapshot(state: &AppState) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(state)?;
    migration::stamp(&mut value);
    serde_json::to_string(&value)
}

/// Turns an already parsed snapshot into a state, running migrations.
pub fn snapshot_from_value(value: Value, is_online: bool) -> Result<AppState, LoadError> {
    let migrated = migration::migrate(value)?;
    let mut state: AppState = serde_json::from_value(migrated).map_err(LoadError::Shape)?;
    state.notifications.clear();
    state.is_online = is_online;
    Ok(state)
}

/// Parses, migrates and rehydrates a snapshot.
pub fn deserialize_snapshot(text: &str, is_online: bool) -> Result<AppState, LoadError> {
    let value: Value = serde_json::from_str(text).map_err(LoadError::Parse)?;
    snapshot_from_value(value, is_online)
}

/// Saves and loads state snapshots through a key-value store.
#[derive(Debug)]
pub struct PersistenceBridge<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceBridge<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: STATE_KEY.to_string(),
        }
    }

    /// Uses a custom storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save(&self, state: &AppState) -> Result<(), PersistError> {
        let snapshot = serialize_snapshot(state)?;
        self.store.set(&self.key, &snapshot)?;
        Ok(())
    }

    /// Loads the stored snapshot, if any, surfacing every failure.
    pub fn try_load(&self, is_online: bool) -> Result<Option<AppState>, LoadError> {
        match self.store.get(&self.key)? {
            Some(text) => deserialize_snapshot(&text, is_online).map(Some),
            None => Ok(None),
        }
    }

    /// Loads the stored snapshot, falling back to the default state.
    pub fn load(&self, is_online: bool) -> AppState {
        match self.try_load(is_online) {
            Ok(Some(state)) => {
                tracing::info!(
                    "Loaded snapshot with {} item(s), {} transaction(s)",
                    state.items.len(),
                    state.transactions.len()
                );
                state
            }
            Ok(None) => {
                tracing::info!("No stored snapshot found, starting with defaults");
                AppState::initial(is_online)
            }
            Err(e) => {
                tracing::warn!("Failed to rehydrate state: {}", e);
                AppState::initial(is_online)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::models::{
        Category, Item, Notification, SyncStatus, Theme, Transaction, TransactionType, User,
    };
    use crate::reducer::reduce;
    use crate::reducer::tests::state_strategy;
    use crate::storage::{FileStore, MemoryStore};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn populated_state() -> AppState {
        let mut state = AppState::initial(false);
        let item = Item::new("Benih Padi", "kg")
            .with_id("i1")
            .with_sku("BP-01")
            .with_category("c1")
            .with_warehouse("w1")
            .with_low_stock_threshold(2)
            .with_quantity(8);
        let transaction = Transaction::new("i1", TransactionType::In, 8).with_notes("panen");
        state = reduce(&state, Action::AddItem { item, transaction }).into_owned();
        state = reduce(&state, Action::AddCategory(Category::new("Pupuk").with_id("c3"))).into_owned();
        state = reduce(&state, Action::SetTheme(Theme::Light)).into_owned();
        state
    }

    #[test]
    fn test_load_absent_snapshot_uses_defaults() {
        let bridge = PersistenceBridge::new(MemoryStore::new());
        let state = bridge.load(false);
        assert_eq!(state, AppState::initial(false));
    }

    #[test]
    fn test_roundtrip_modulo_notifications() {
        let bridge = PersistenceBridge::new(MemoryStore::new());
        let mut state = populated_state();
        state.notifications.push(Notification::warning("transient"));

        bridge.save(&state).unwrap();
        let loaded = bridge.load(state.is_online);

        assert_eq!(loaded, state.without_notifications());
        assert_eq!(loaded.category("c3").unwrap().sync_status, SyncStatus::Pending);
    }

    #[test]
    fn test_roundtrip_without_warehouses() {
        let bridge = PersistenceBridge::new(MemoryStore::new());
        let state = reduce(
            &AppState::initial(true),
            Action::DeleteWarehouse {
                id: "w1".to_string(),
            },
        )
        .into_owned();
        assert!(state.current_warehouse_id.is_none());

        bridge.save(&state).unwrap();
        let raw = bridge.store().get(STATE_KEY).unwrap().unwrap();
        let raw: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(raw["currentWarehouseId"], Value::Null);
        assert_eq!(bridge.try_load(true).unwrap(), Some(state));
    }

    #[test]
    fn test_roundtrip_uncategorised_item() {
        let bridge = PersistenceBridge::new(MemoryStore::new());
        let state = reduce(
            &populated_state(),
            Action::DeleteCategory {
                id: "c1".to_string(),
            },
        )
        .into_owned();

        bridge.save(&state).unwrap();
        let raw = bridge.store().get(STATE_KEY).unwrap().unwrap();
        let raw: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(raw["items"][0]["categoryId"], "");
        assert_eq!(bridge.load(false), state);
    }

    #[test]
    fn test_saved_snapshot_is_versioned_and_excludes_ephemeral_fields() {
        let bridge = PersistenceBridge::new(MemoryStore::new());
        let mut state = populated_state();
        state.notifications.push(Notification::info("x"));
        bridge.save(&state).unwrap();

        let raw = bridge.store().get(STATE_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["schemaVersion"], migration::SCHEMA_VERSION);
        assert!(value.get("notifications").is_none());
        assert!(value.get("isOnline").is_none());
    }

    #[test]
    fn test_load_uses_live_connectivity() {
        let bridge = PersistenceBridge::new(MemoryStore::new());
        bridge.save(&AppState::initial(true)).unwrap();
        assert!(!bridge.load(false).is_online);
        assert!(bridge.load(true).is_online);
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_defaults() {
        let bridge = PersistenceBridge::new(MemoryStore::with_entry(STATE_KEY, "{not json"));
        assert!(matches!(bridge.try_load(true), Err(LoadError::Parse(_))));
        assert_eq!(bridge.load(true), AppState::initial(true));

        let bridge = PersistenceBridge::new(MemoryStore::with_entry(STATE_KEY, "42"));
        assert_eq!(bridge.load(true), AppState::initial(true));
    }

    #[test]
    fn test_corrupt_collection_keeps_rest_of_state() {
        let state = reduce(
            &populated_state(),
            Action::UpdateUser(User::new("Sari", "sari@tani.id", "Staff")),
        )
        .into_owned();
        let mut value: Value = serde_json::from_str(&serialize_snapshot(&state).unwrap()).unwrap();
        assert_eq!(value["schemaVersion"], migration::SCHEMA_VERSION);
        value["transactions"] = Value::from("corrupt");

        let bridge = PersistenceBridge::new(MemoryStore::with_entry(STATE_KEY, value.to_string()));
        let loaded = bridge.load(false);

        assert_eq!(loaded.user.name, "Sari");
        assert!(loaded.transactions.is_empty());
        assert_eq!(loaded.items, state.items);
        assert_eq!(loaded.theme, Theme::Light);
    }

    #[test]
    fn test_legacy_snapshot_missing_theme_and_warehouse_selection() {
        let legacy = r#"{
            "items": [{"id": "1700", "name": "Cangkul", "unit": "pcs", "sku": "",
                       "categoryId": "c2", "lowStockThreshold": 1, "quantity": 4,
                       "createdAt": "2024-03-01T10:00:00.000Z"}],
            "transactions": [],
            "categories": [{"id": "c2", "name": "Alat"}],
            "warehouses": [{"id": "w3", "name": "Gudang Tiga", "capacity": 50}],
            "user": {"name": "Sari", "email": "sari@tani.id"},
            "notifications": [{"id": "n", "message": "old", "type": "info"}],
            "isLoggedIn": true,
            "isOnline": false
        }"#;
        let bridge = PersistenceBridge::new(MemoryStore::with_entry(STATE_KEY, legacy));
        let state = bridge.try_load(true).unwrap().unwrap();

        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.current_warehouse_id.as_deref(), Some("w3"));
        assert_eq!(state.items[0].warehouse_id.as_deref(), Some("w3"));
        assert_eq!(state.categories[0].sync_status, SyncStatus::Synced);
        assert_eq!(state.user.position, "Owner");
        assert!(state.notifications.is_empty());
        assert!(state.is_online);
        assert!(state.is_logged_in);
    }

    #[test]
    fn test_file_backed_bridge() {
        let temp_dir = TempDir::new().unwrap();
        let bridge = PersistenceBridge::new(FileStore::new(temp_dir.path().to_path_buf()));
        let state = populated_state();
        bridge.save(&state).unwrap();

        let reopened = PersistenceBridge::new(FileStore::new(temp_dir.path().to_path_buf()));
        assert_eq!(reopened.load(false), state);
    }

    proptest! {
        #[test]
        fn prop_snapshot_roundtrip(state in state_strategy()) {
            let text = serialize_snapshot(&state).unwrap();
            let loaded = deserialize_snapshot(&text, state.is_online).unwrap();
            prop_assert_eq!(loaded, state.without_notifications());
        }
    }
}
