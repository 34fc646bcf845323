//! One CLI invocation's view of the application.
//!
//! A session rehydrates the store from the data directory, reads the
//! simulated network flag once, and wires a connectivity monitor to the
//! store. Timers run on a tokio runtime owned by the session.

use std::sync::Arc;
use std::time::Duration;

use bakul_tani_core::persistence::PersistError;
use bakul_tani_core::{
    Action, AppState, ConnectivityMonitor, ConnectivitySource, FileStore, KeyValueStore,
    ManualConnectivity, PersistenceBridge, SharedStore, Store,
};
use tokio::runtime::Runtime;

use crate::config::Config;

/// Storage key of the simulated network flag.
pub const NETWORK_KEY: &str = "bakulTani_network";

#[derive(Debug)]
pub enum SessionError {
    Runtime(std::io::Error),
    Offline,
    ForcedOffline,
    Persist(PersistError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
            SessionError::Offline => {
                write!(f, "Cannot sync while offline. Run 'bakul network online' first.")
            }
            SessionError::ForcedOffline => write!(
                f,
                "Offline mode is forced by configuration (offline / BAKUL_OFFLINE)"
            ),
            SessionError::Persist(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<PersistError> for SessionError {
    fn from(e: PersistError) -> Self {
        SessionError::Persist(e)
    }
}

pub struct Session {
    files: FileStore,
    store: SharedStore<FileStore>,
    connectivity: ManualConnectivity,
    monitor: ConnectivityMonitor<SharedStore<FileStore>>,
    forced_offline: bool,
    runtime: Runtime,
}

impl Session {
    pub fn open(config: &Config) -> Result<Self, SessionError> {
        let files = FileStore::new(config.data_dir.value.clone());
        let forced_offline = config.offline.value;
        let is_online = !forced_offline && read_network_flag(&files);
        tracing::debug!(
            "Opening session in {} ({})",
            files.data_dir().display(),
            if is_online { "online" } else { "offline" }
        );

        let connectivity = ManualConnectivity::new(is_online);
        let store = SharedStore::new(Store::open(
            PersistenceBridge::new(files.clone()),
            connectivity.is_online(),
        ));
        let monitor = ConnectivityMonitor::new(
            Arc::new(store.clone()),
            connectivity.is_online(),
            Duration::from_millis(config.sync.delay_ms),
        );
        let runtime = Runtime::new().map_err(SessionError::Runtime)?;

        Ok(Self {
            files,
            store,
            connectivity,
            monitor,
            forced_offline,
            runtime,
        })
    }

    /// The durable store backing this session.
    pub fn files(&self) -> &FileStore {
        &self.files
    }

    pub fn state(&self) -> AppState {
        self.store.snapshot()
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn is_forced_offline(&self) -> bool {
        self.forced_offline
    }

    /// Dispatches actions in order, persisting after each change.
    pub fn dispatch_all(
        &self,
        actions: impl IntoIterator<Item = Action>,
    ) -> Result<(), SessionError> {
        for action in actions {
            self.store.try_dispatch(action)?;
        }
        Ok(())
    }

    /// Dispatches a single action and reports whether the state changed.
    pub fn dispatch(&self, action: Action) -> Result<bool, SessionError> {
        Ok(self.store.try_dispatch(action)?)
    }

    /// Flips the simulated network and lets the monitor react.
    ///
    /// Coming online waits for the delayed reconciliation to finish.
    /// Returns whether the flag changed.
    pub fn set_online(&mut self, is_online: bool) -> Result<bool, SessionError> {
        if is_online && self.forced_offline {
            return Err(SessionError::ForcedOffline);
        }
        write_network_flag(&self.files, is_online);

        if !self.connectivity.set_online(is_online) {
            return Ok(false);
        }
        let monitor = &mut self.monitor;
        self.runtime.block_on(async {
            monitor.handle(is_online);
            monitor.settle().await;
        });
        Ok(true)
    }

    /// Reconciles pending entities after the configured delay.
    ///
    /// Returns false when nothing was pending.
    pub fn reconcile(&mut self) -> Result<bool, SessionError> {
        if !self.is_online() {
            return Err(SessionError::Offline);
        }
        if !self.store.read(AppState::has_pending) {
            return Ok(false);
        }
        let monitor = &mut self.monitor;
        self.runtime.block_on(async {
            monitor.schedule_reconciliation();
            monitor.settle().await;
        });
        Ok(true)
    }

    /// Prints the notifications raised during this session.
    pub fn print_notifications(&self) {
        self.store.read(|s| {
            for notification in &s.notifications {
                println!("{}", notification);
            }
        });
    }
}

fn read_network_flag(files: &FileStore) -> bool {
    match files.get(NETWORK_KEY) {
        Ok(Some(text)) => serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable network flag: {}", e);
            true
        }),
        Ok(None) => true,
        Err(e) => {
            tracing::warn!("Failed to read network flag: {}", e);
            true
        }
    }
}

fn write_network_flag(files: &FileStore, is_online: bool) {
    if let Err(e) = files.set(NETWORK_KEY, if is_online { "true" } else { "false" }) {
        tracing::warn!("Failed to save network flag: {}", e);
    }
}

/// Performs auto-sync if enabled and the session is online.
///
/// Errors are reported and otherwise ignored, so commands still run when
/// reconciliation fails.
pub fn try_auto_sync(session: &mut Session, config: &Config) {
    if !config.sync.auto_sync || !session.is_online() {
        return;
    }
    match session.reconcile() {
        Ok(true) => tracing::info!("Auto-sync reconciled pending entities"),
        Ok(false) => {}
        Err(e) => eprintln!("Auto-sync: {}", e),
    }
}
