//! Connectivity tracking and reconciliation.
//!
//! A [`ConnectivitySource`] reports whether the device is online and
//! publishes changes. The [`ConnectivityMonitor`] turns those changes into
//! actions: going offline marks the state offline and warns the user; coming
//! back online marks it online and, after a short delay, reconciles every
//! pending category and warehouse.
//!
//! The delayed reconciliation runs through a [`SyncScheduler`]. Scheduling a
//! new reconciliation, or going offline, cancels the one still waiting, so a
//! burst of flips produces a single `SYNC_DATA`.

mod connectivity;
mod monitor;
mod scheduler;

pub use connectivity::{ConnectivitySource, ManualConnectivity};
pub use monitor::{
    ConnectivityMonitor, DEFAULT_SYNC_DELAY, OFFLINE_MESSAGE, SYNCED_MESSAGE,
};
pub use scheduler::SyncScheduler;
