use std::sync::Arc;
use std::time::Duration;

use super::connectivity::ConnectivitySource;
use super::scheduler::SyncScheduler;
use crate::action::Action;
use crate::models::Notification;
use crate::store::Dispatch;

/// Delay between coming back online and reconciling.
pub const DEFAULT_SYNC_DELAY: Duration = Duration::from_millis(1000);

pub const OFFLINE_MESSAGE: &str =
    "You are offline. Changes are saved locally and marked pending.";

pub const SYNCED_MESSAGE: &str = "Connection restored. Data has been synchronized.";

/// Turns connectivity transitions into actions.
pub struct ConnectivityMonitor<D> {
    dispatcher: Arc<D>,
    scheduler: SyncScheduler,
    is_online: bool,
}

impl<D: Dispatch + 'static> ConnectivityMonitor<D> {
    /// `is_online` is the flag the store was opened with.
    pub fn new(dispatcher: Arc<D>, is_online: bool, delay: Duration) -> Self {
        Self {
            dispatcher,
            scheduler: SyncScheduler::new(delay),
            is_online,
        }
    }

    pub fn is_online(&self) -> bool {
        self.is_online
    }

    /// Whether a reconciliation is waiting for its delay.
    pub fn sync_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Handles a reported connectivity value.
    ///
    /// Returns whether it was a transition. Repeated reports of the current
    /// value are ignored.
    pub fn handle(&mut self, is_online: bool) -> bool {
        if is_online == self.is_online {
            return false;
        }
        self.is_online = is_online;

        if is_online {
            self.went_online();
        } else {
            self.went_offline();
        }
        true
    }

    fn went_offline(&mut self) {
        if self.scheduler.cancel() {
            tracing::debug!("Cancelled pending reconciliation");
        }
        tracing::info!("Connectivity lost");
        self.dispatcher.dispatch(Action::SetOnlineStatus(false));
        self.dispatcher
            .dispatch(Action::AddNotification(Notification::warning(OFFLINE_MESSAGE)));
    }

    fn went_online(&mut self) {
        tracing::info!(
            "Connectivity restored, reconciling in {}ms",
            self.scheduler.delay().as_millis()
        );
        self.dispatcher.dispatch(Action::SetOnlineStatus(true));
        self.schedule_reconciliation();
    }

    /// Schedules a reconciliation after the delay, replacing a pending one.
    pub fn schedule_reconciliation(&mut self) {
        let dispatcher = Arc::clone(&self.dispatcher);
        self.scheduler.schedule(move || {
            dispatcher.dispatch(Action::SyncData);
            dispatcher.dispatch(Action::AddNotification(Notification::success(SYNCED_MESSAGE)));
        });
    }

    /// Waits until the pending reconciliation, if any, has run.
    pub async fn settle(&mut self) {
        self.scheduler.wait().await;
    }

    /// Follows a connectivity source until it is dropped.
    ///
    /// Changes that happen faster than the monitor observes them are
    /// coalesced, and only the latest value is handled.
    pub async fn run<C: ConnectivitySource>(&mut self, source: &C) {
        let mut receiver = source.subscribe();
        self.handle(*receiver.borrow_and_update());

        while receiver.changed().await.is_ok() {
            let is_online = *receiver.borrow_and_update();
            self.handle(is_online);
        }
        tracing::debug!("Connectivity source closed");
    }
}
