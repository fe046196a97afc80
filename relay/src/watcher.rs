//! Background poller keeping pending transactions and safe info fresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::RelayClient;
use crate::store::HubStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically refreshes the selected safe's pending queue and info.
///
/// Every refresh goes through the store's ticket protocol, so a slow
/// response from an earlier tick can never overwrite a newer one. Ticks
/// that find a fetch already in flight are skipped entirely.
pub struct Watcher {
    store: Arc<HubStore>,
    relay: Arc<RelayClient>,
    interval: Duration,
}

/// Handle for a running watcher. Dropping it does not stop the task;
/// call [`WatcherHandle::shutdown`].
pub struct WatcherHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Signals the watcher to stop and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

impl Watcher {
    pub fn new(store: Arc<HubStore>, relay: Arc<RelayClient>) -> Self {
        Self {
            store,
            relay,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawns the polling loop on the current runtime.
    pub fn spawn(self) -> WatcherHandle {
        let (stop, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.tick().await,
                    _ = stopped.changed() => {
                        if *stopped.borrow() {
                            debug!("watcher stopping");
                            return;
                        }
                    }
                }
            }
        });
        WatcherHandle { stop, task }
    }

    async fn tick(&self) {
        let Some(selected) = self.store.selected_safe() else {
            return;
        };
        let safe = selected.safe_address;

        self.refresh_info(safe).await;
        self.refresh_pending(safe).await;
    }

    async fn refresh_info(&self, safe: alloy_primitives::Address) {
        let ticket = self.store.with_state(|state| {
            if state.info.is_fetching() {
                None
            } else {
                Some(state.info.begin())
            }
        });
        let Some(ticket) = ticket else {
            debug!(%safe, "info fetch already in flight, skipping tick");
            return;
        };

        match self.relay.safe_info(safe).await {
            Ok(info) => {
                self.store.with_state(|state| state.info.commit(ticket, info));
            }
            Err(err) => {
                warn!(%safe, error = %err, "safe info refresh failed");
                self.store.with_state(|state| state.info.abort(ticket));
            }
        }
    }

    async fn refresh_pending(&self, safe: alloy_primitives::Address) {
        let current_nonce = self
            .store
            .read_state(|state| state.info.get().map(|info| info.nonce))
            .unwrap_or(0);

        let ticket = self.store.with_state(|state| {
            if state.pending.is_fetching() {
                None
            } else {
                Some(state.pending.begin())
            }
        });
        let Some(ticket) = ticket else {
            debug!(%safe, "pending fetch already in flight, skipping tick");
            return;
        };

        match self.relay.pending_transactions(safe, current_nonce).await {
            Ok(page) => {
                self.store.commit_pending(ticket, page);
            }
            Err(err) => {
                warn!(%safe, error = %err, "pending refresh failed");
                self.store.with_state(|state| state.pending.abort(ticket));
            }
        }
    }
}
