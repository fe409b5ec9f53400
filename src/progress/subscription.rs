//! Subscription handles.
//!
//! A `Subscription` is the receiving end for one operation's updates; its
//! `Unsubscriber` is the cancel capability, cloneable so a consumer can keep
//! it while the receiving end lives in another task. Unsubscribing is
//! idempotent, works after the channel has disconnected, and takes effect
//! immediately: the dispatcher stops routing and `recv` returns `None`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::mpsc;

use super::channel::ChannelInner;
use super::frame::Frame;
use crate::models::ProgressUpdate;

struct UnsubscribeState {
    subscription_id: String,
    channel: Weak<ChannelInner>,
    done: AtomicBool,
}

#[derive(Clone)]
pub struct Unsubscriber {
    state: Arc<UnsubscribeState>,
}

impl Unsubscriber {
    pub fn unsubscribe(&self) {
        if self.state.done.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(channel) = self.state.channel.upgrade() else {
            return;
        };
        let id = &self.state.subscription_id;
        if channel.dispatcher.remove(id) {
            // Not connected any more is fine: the broker forgot us already
            if let Err(e) = channel.send(Frame::unsubscribe(id)) {
                tracing::debug!("UNSUBSCRIBE {} not sent: {}", id, e);
            }
        }
        tracing::debug!("Unsubscribed {}", id);
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.state.done.load(Ordering::SeqCst)
    }
}

pub struct Subscription {
    operation_id: String,
    rx: mpsc::UnboundedReceiver<ProgressUpdate>,
    unsubscriber: Unsubscriber,
}

impl Subscription {
    pub(crate) fn new(
        subscription_id: String,
        operation_id: String,
        rx: mpsc::UnboundedReceiver<ProgressUpdate>,
        channel: Weak<ChannelInner>,
    ) -> Self {
        Self {
            operation_id,
            rx,
            unsubscriber: Unsubscriber {
                state: Arc::new(UnsubscribeState {
                    subscription_id,
                    channel,
                    done: AtomicBool::new(false),
                }),
            },
        }
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn id(&self) -> &str {
        &self.unsubscriber.state.subscription_id
    }

    pub fn unsubscriber(&self) -> Unsubscriber {
        self.unsubscriber.clone()
    }

    /// Next update in transport order; `None` once unsubscribed or the
    /// connection dropped.
    pub async fn recv(&mut self) -> Option<ProgressUpdate> {
        if self.unsubscriber.is_unsubscribed() {
            return None;
        }
        let update = self.rx.recv().await;
        if self.unsubscriber.is_unsubscribed() {
            return None;
        }
        update
    }

    pub fn unsubscribe(&mut self) {
        self.unsubscriber.unsubscribe();
        self.rx.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscriber.unsubscribe();
    }
}
