//! The state container.
//!
//! `Store` owns the current `AppState` and the persistence bridge. All
//! mutation goes through [`Store::dispatch`]: the reducer computes the next
//! state and, when something changed, the snapshot is written out.
//!
//! `SharedStore` wraps a store for use from async tasks (the connectivity
//! monitor and its timers). Dispatches through it are serialized by a mutex.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::action::Action;
use crate::persistence::{PersistError, PersistenceBridge};
use crate::reducer::reduce;
use crate::state::AppState;
use crate::storage::KeyValueStore;

/// Anything that accepts actions.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, action: Action);
}

#[derive(Debug)]
pub struct Store<S> {
    state: AppState,
    persistence: PersistenceBridge<S>,
}

impl<S: KeyValueStore> Store<S> {
    /// Rehydrates the store from its persisted snapshot.
    pub fn open(persistence: PersistenceBridge<S>, is_online: bool) -> Self {
        let state = persistence.load(is_online);
        Self { state, persistence }
    }

    /// Creates a store around an explicit state without reading storage.
    pub fn with_state(persistence: PersistenceBridge<S>, state: AppState) -> Self {
        Self { state, persistence }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn persistence(&self) -> &PersistenceBridge<S> {
        &self.persistence
    }

    /// Applies an action and persists the result.
    ///
    /// Returns whether the state changed. A failed write is reported but the
    /// in-memory transition is kept.
    pub fn dispatch(&mut self, action: Action) -> Result<bool, PersistError> {
        let name = action.name();
        let next = match reduce(&self.state, action) {
            Cow::Borrowed(_) => {
                tracing::debug!("{} left state unchanged", name);
                return Ok(false);
            }
            Cow::Owned(next) => next,
        };
        self.state = next;
        tracing::debug!("Applied {}", name);

        self.persistence.save(&self.state)?;
        Ok(true)
    }

    /// Applies several actions in order, stopping at the first failed write.
    pub fn dispatch_all(
        &mut self,
        actions: impl IntoIterator<Item = Action>,
    ) -> Result<(), PersistError> {
        for action in actions {
            self.dispatch(action)?;
        }
        Ok(())
    }
}

/// Thread-safe handle to a store.
#[derive(Debug)]
pub struct SharedStore<S> {
    inner: Arc<Mutex<Store<S>>>,
}

impl<S> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: KeyValueStore> SharedStore<S> {
    pub fn new(store: Store<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store<S>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.lock().state().clone()
    }

    /// Runs `f` against the current state while holding the lock.
    pub fn read<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        f(self.lock().state())
    }

    /// Dispatches and reports persistence failures to the caller.
    pub fn try_dispatch(&self, action: Action) -> Result<bool, PersistError> {
        self.lock().dispatch(action)
    }
}

impl<S: KeyValueStore> Dispatch for SharedStore<S> {
    fn dispatch(&self, action: Action) {
        if let Err(e) = self.try_dispatch(action) {
            tracing::warn!("Failed to persist state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Notification, SyncStatus};
    use crate::persistence::STATE_KEY;
    use crate::storage::{MemoryStore, StorageError};

    fn memory_store(is_online: bool) -> Store<MemoryStore> {
        Store::open(PersistenceBridge::new(MemoryStore::new()), is_online)
    }

    #[test]
    fn test_dispatch_persists_changes() {
        let mut store = memory_store(true);
        let changed = store
            .dispatch(Action::AddCategory(Category::new("Pupuk").with_id("c3")))
            .unwrap();
        assert!(changed);

        let raw = store.persistence().store().get(STATE_KEY).unwrap().unwrap();
        assert!(raw.contains("Pupuk"));
    }

    #[test]
    fn test_noop_dispatch_does_not_write() {
        let mut store = memory_store(true);
        assert!(!store.dispatch(Action::Unknown).unwrap());
        assert!(store.persistence().store().get(STATE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_reopen_restores_state_without_notifications() {
        let mut store = memory_store(false);
        store
            .dispatch_all([
                Action::AddCategory(Category::new("Pupuk").with_id("c3")),
                Action::AddNotification(Notification::info("hello")),
            ])
            .unwrap();

        let raw = store.persistence().store().get(STATE_KEY).unwrap().unwrap();
        let reopened = Store::open(
            PersistenceBridge::new(MemoryStore::with_entry(STATE_KEY, raw)),
            true,
        );
        let category = reopened.state().category("c3").unwrap();
        assert_eq!(category.sync_status, SyncStatus::Pending);
        assert!(reopened.state().notifications.is_empty());
        assert!(reopened.state().is_online);
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    #[test]
    fn test_failed_write_keeps_transition() {
        let mut store = Store::open(PersistenceBridge::new(FailingStore), true);
        let result = store.dispatch(Action::SetOnlineStatus(false));
        assert!(result.is_err());
        assert!(!store.state().is_online);
    }

    #[test]
    fn test_shared_store_dispatch() {
        let shared = SharedStore::new(memory_store(true));
        let handle = shared.clone();
        handle.dispatch(Action::SetOnlineStatus(false));

        assert!(!shared.snapshot().is_online);
        assert_eq!(shared.read(|s| s.categories.len()), 2);
    }
}
