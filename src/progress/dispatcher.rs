//! Routes inbound MESSAGE frames to per-subscription listeners.
//!
//! The reader task owns nothing but an `Arc<Dispatcher>`; subscriptions
//! register an mpsc sender under their STOMP subscription id and get updates
//! pushed in transport order. Payloads that fail to parse are dropped here.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::frame::{Command, Frame};
use crate::models::ProgressUpdate;

struct Listener {
    operation_id: String,
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

#[derive(Default)]
pub struct Dispatcher {
    listeners: Mutex<HashMap<String, Listener>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, subscription_id: &str, operation_id: &str, tx: mpsc::UnboundedSender<ProgressUpdate>) {
        self.listeners.lock().insert(
            subscription_id.to_string(),
            Listener {
                operation_id: operation_id.to_string(),
                tx,
            },
        );
    }

    /// Returns whether a listener was registered under `subscription_id`.
    pub fn remove(&self, subscription_id: &str) -> bool {
        self.listeners.lock().remove(subscription_id).is_some()
    }

    /// Drop every listener, ending their streams. Returns the removed ids.
    pub fn clear(&self) -> Vec<String> {
        self.listeners.lock().drain().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Operation ids with a live listener.
    pub fn operations(&self) -> Vec<String> {
        self.listeners
            .lock()
            .values()
            .map(|l| l.operation_id.clone())
            .collect()
    }

    pub fn dispatch(&self, frame: &Frame) {
        match frame.command {
            Command::Message => self.route(frame),
            Command::Error => {
                tracing::error!(
                    "Progress broker error: {} {}",
                    frame.get("message").unwrap_or(""),
                    frame.body
                );
            }
            Command::Receipt => {}
            other => tracing::debug!("Ignoring unexpected {} frame", other),
        }
    }

    fn route(&self, frame: &Frame) {
        let Some(subscription_id) = frame.get("subscription") else {
            tracing::warn!("Dropping MESSAGE frame without subscription header");
            return;
        };

        let update = match ProgressUpdate::parse(&frame.body) {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!(
                    "Dropping malformed progress payload on {}: {}",
                    frame.get("destination").unwrap_or(subscription_id),
                    e
                );
                return;
            }
        };

        let mut listeners = self.listeners.lock();
        let closed = match listeners.get(subscription_id) {
            Some(listener) => listener.tx.send(update).is_err(),
            None => {
                // Unsubscribed while the message was in flight
                tracing::debug!("No listener for subscription {}", subscription_id);
                false
            }
        };
        if closed {
            listeners.remove(subscription_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(subscription: &str, body: &str) -> Frame {
        Frame::new(Command::Message)
            .header("subscription", subscription)
            .header("destination", "/topic/progress/op")
            .body(body)
    }

    #[test]
    fn test_routes_to_matching_listener_only() {
        let dispatcher = Dispatcher::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        dispatcher.register("sub-0", "a", tx_a);
        dispatcher.register("sub-1", "b", tx_b);

        dispatcher.dispatch(&message("sub-1", r#"{"message":"hello","percentage":10}"#));

        assert!(rx_a.try_recv().is_err());
        let update = rx_b.try_recv().unwrap();
        assert_eq!(update.message.as_deref(), Some("hello"));
    }

    #[test]
    fn test_malformed_payload_is_dropped() {
        let dispatcher = Dispatcher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatcher.register("sub-0", "a", tx);

        dispatcher.dispatch(&message("sub-0", "this is not json"));
        assert!(rx.try_recv().is_err());

        // Later well-formed updates still arrive
        dispatcher.dispatch(&message("sub-0", r#"{"status":"completed"}"#));
        assert!(rx.try_recv().is_ok());
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn test_preserves_transport_order() {
        let dispatcher = Dispatcher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatcher.register("sub-0", "a", tx);
        for pct in [10, 20, 30] {
            dispatcher.dispatch(&message("sub-0", &format!(r#"{{"percentage":{pct}}}"#)));
        }
        let seen: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|u| u.percentage.unwrap_or_default() as u32)
            .collect();
        assert_eq!(seen, vec![10, 20, 30]);
    }

    #[test]
    fn test_removed_listener_gets_nothing() {
        let dispatcher = Dispatcher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatcher.register("sub-0", "a", tx);
        assert!(dispatcher.remove("sub-0"));
        assert!(!dispatcher.remove("sub-0"));

        dispatcher.dispatch(&message("sub-0", r#"{"percentage":50}"#));
        // Sender was dropped with the listener
        assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected)));
    }

    #[test]
    fn test_closed_receiver_is_pruned() {
        let dispatcher = Dispatcher::new();
        let (tx, rx) = mpsc::unbounded_channel();
        dispatcher.register("sub-0", "a", tx);
        drop(rx);
        dispatcher.dispatch(&message("sub-0", r#"{"percentage":50}"#));
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_clear_returns_ids() {
        let dispatcher = Dispatcher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        dispatcher.register("sub-7", "op", tx);
        assert_eq!(dispatcher.operations(), vec!["op".to_string()]);
        assert_eq!(dispatcher.clear(), vec!["sub-7".to_string()]);
        assert!(dispatcher.is_empty());
    }
}
