//! Per-consumer progress state.
//!
//! A `ProgressTracker` follows at most one operation at a time. Subscribing
//! again tears the previous subscription down first, so a consumer never has
//! two listeners. The displayed `ProgressState` is published on a watch
//! channel; an optional callback sees every applied update.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::channel::ProgressChannel;
use super::subscription::Unsubscriber;
use crate::error::Result;
use crate::models::ProgressState;

struct Active {
    operation_id: String,
    unsubscriber: Unsubscriber,
    pump: JoinHandle<()>,
}

pub struct ProgressTracker {
    channel: ProgressChannel,
    state: watch::Sender<ProgressState>,
    active: Option<Active>,
}

impl ProgressTracker {
    pub fn new(channel: ProgressChannel) -> Self {
        let (state, _) = watch::channel(ProgressState::default());
        Self {
            channel,
            state,
            active: None,
        }
    }

    pub fn watch(&self) -> watch::Receiver<ProgressState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ProgressState {
        self.state.borrow().clone()
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.operation_id.as_str())
    }

    pub async fn subscribe(&mut self, operation_id: &str) -> Result<()> {
        self.subscribe_with(operation_id, |_| {}).await
    }

    /// Follow `operation_id`, calling `on_update` with the state after each
    /// applied update. Connection failures leave `connected: false` in the
    /// state and are returned; the tracker stays usable.
    pub async fn subscribe_with<F>(&mut self, operation_id: &str, mut on_update: F) -> Result<()>
    where
        F: FnMut(&ProgressState) + Send + 'static,
    {
        self.unsubscribe();
        self.state.send_replace(ProgressState::default());

        let mut subscription = match self.channel.subscribe(operation_id).await {
            Ok(sub) => sub,
            Err(e) => {
                tracing::warn!("Progress unavailable for {}: {}", operation_id, e);
                self.state.send_modify(|s| {
                    s.connected = false;
                    s.error = Some(e.message());
                });
                return Err(e);
            }
        };
        self.state.send_modify(|s| s.connected = true);
        tracing::debug!("Following {} as {}", subscription.operation_id(), subscription.id());

        let unsubscriber = subscription.unsubscriber();
        let guard = unsubscriber.clone();
        let state = self.state.clone();
        let pump = tokio::spawn(async move {
            while let Some(update) = subscription.recv().await {
                let mut snapshot = None;
                // Checked under the watch lock so a replaced subscription
                // cannot write over the fresh state
                state.send_if_modified(|s| {
                    if guard.is_unsubscribed() {
                        return false;
                    }
                    s.apply(&update);
                    snapshot = Some(s.clone());
                    true
                });
                let Some(snapshot) = snapshot else { break };
                on_update(&snapshot);
                if snapshot.is_finished() {
                    subscription.unsubscribe();
                    return;
                }
            }
            if !guard.is_unsubscribed() {
                // Stream ended without a terminal update: the transport dropped
                state.send_modify(|s| s.connected = false);
            }
        });

        self.active = Some(Active {
            operation_id: operation_id.to_string(),
            unsubscriber,
            pump,
        });
        Ok(())
    }

    /// Stop following the current operation. Safe to call repeatedly.
    pub fn unsubscribe(&mut self) {
        if let Some(active) = self.active.take() {
            active.unsubscriber.unsubscribe();
            active.pump.abort();
        }
    }

    /// Resolve once the followed operation completes or fails, or the
    /// channel drops. Returns the final state.
    pub async fn wait_finished(&self) -> ProgressState {
        let mut rx = self.state.subscribe();
        let result = rx
            .wait_for(|s| s.is_finished() || !s.connected)
            .await
            .map(|s| s.clone());
        match result {
            Ok(state) => state,
            Err(_) => self.state(),
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
