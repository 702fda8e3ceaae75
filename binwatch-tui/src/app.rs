use std::sync::Arc;

use binwatch_core::{
    classify::{DerivedState, derive},
    model::SyncState,
    sync::Synchronizer,
};
use tokio::sync::watch;

pub(crate) struct App {
    pub sync: Arc<Synchronizer>,
    pub state: SyncState,
    updates: watch::Receiver<SyncState>,
}

impl App {
    pub(crate) fn new(sync: Arc<Synchronizer>) -> Self {
        let updates = sync.subscribe();
        let state = updates.borrow().clone();
        Self {
            sync,
            state,
            updates,
        }
    }

    /// Pull the latest published state, if any.
    pub(crate) fn poll_updates(&mut self) {
        if self.updates.has_changed().unwrap_or(false) {
            self.state = self.updates.borrow_and_update().clone();
        }
    }

    pub(crate) fn derived(&self) -> DerivedState {
        derive(&self.state.snapshot)
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.state.status.is_loading || self.state.status.is_refreshing
    }

    /// Kick off a manual refresh in the background. Ignored while an attempt is running.
    pub(crate) fn request_refresh(&self) -> bool {
        if self.is_busy() {
            return false;
        }

        let sync = Arc::clone(&self.sync);
        tokio::spawn(async move {
            if let Err(err) = sync.refresh_now().await {
                tracing::debug!(error = %err, "manual refresh failed");
            }
        });
        true
    }
}
