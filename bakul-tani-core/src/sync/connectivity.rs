use std::sync::Arc;

use tokio::sync::watch;

/// Reports connectivity and publishes changes to it.
pub trait ConnectivitySource: Send + Sync {
    fn is_online(&self) -> bool;

    /// Receiver that observes every later change of the online flag.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Connectivity flag driven by hand, from the CLI or from tests.
#[derive(Debug, Clone)]
pub struct ManualConnectivity {
    sender: Arc<watch::Sender<bool>>,
}

impl ManualConnectivity {
    pub fn new(is_online: bool) -> Self {
        let (sender, _) = watch::channel(is_online);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sets the flag. Subscribers are only woken when the value changes.
    pub fn set_online(&self, is_online: bool) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == is_online {
                false
            } else {
                *current = is_online;
                true
            }
        })
    }
}

impl Default for ManualConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivitySource for ManualConnectivity {
    fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}
