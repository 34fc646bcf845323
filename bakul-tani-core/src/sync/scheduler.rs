use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs one delayed task at a time.
///
/// Every schedule or cancel bumps a generation counter. A task only runs if
/// the generation it was scheduled under is still current when its timer
/// fires, and the check and the task run under the same lock as the bump.
/// A cancelled task therefore either ran before the cancel or never runs.
#[derive(Debug)]
pub struct SyncScheduler {
    delay: Duration,
    generation: Arc<Mutex<u64>>,
    pending: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(Mutex::new(0)),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a scheduled task is still waiting to run.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Schedules `task` after the delay, cancelling any pending task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.bump();
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }

        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let current = generation.lock().unwrap_or_else(|e| e.into_inner());
            if *current == token {
                task();
            } else {
                tracing::debug!("Skipping superseded reconciliation");
            }
        }));
    }

    /// Cancels the pending task. Returns whether one was waiting.
    pub fn cancel(&mut self) -> bool {
        self.bump();
        match self.pending.take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    /// Waits for the pending task, if any, to run or be cancelled.
    pub async fn wait(&mut self) {
        if let Some(handle) = self.pending.take() {
            // A cancelled task resolves with a JoinError, which is expected.
            let _ = handle.await;
        }
    }

    fn bump(&self) -> u64 {
        let mut generation = self.generation.lock().unwrap_or_else(|e| e.into_inner());
        *generation += 1;
        *generation
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
