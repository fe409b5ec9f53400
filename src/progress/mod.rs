//! Progress Channel Client - live progress for long-running operations.
//!
//! The backend publishes updates over STOMP on `/topic/progress/{operationId}`.
//! - `frame`: STOMP frame encode/decode
//! - `dispatcher`: routes MESSAGE frames to per-subscription listeners
//! - `channel`: the shared connection handle (`ProgressChannel`)
//! - `subscription`: receiving end plus cancel capability for one topic
//! - `tracker`: one-operation-at-a-time consumer holding `ProgressState`
//!
//! Subscription state machine: unsubscribed → running → completed | error.
//! Terminal states end the subscription; following a new operation starts a
//! new machine. Nothing here retries a failed operation.

pub mod channel;
pub mod dispatcher;
pub mod frame;
pub mod subscription;
pub mod tracker;

pub use channel::{ProgressChannel, topic_for};
pub use subscription::{Subscription, Unsubscriber};
pub use tracker::ProgressTracker;

/// Fresh opaque id for a new operation's progress topic.
pub fn new_operation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
