//! File Manager client - drive a remote file-manager backend from Rust.
//!
//! The backend does the real work (renaming, organizing, extracting,
//! photo organization, duplicate removal); this crate calls it, follows
//! progress over its STOMP channel and lets a user pick directories on the
//! server's filesystem.
//!
//! - `api`: typed HTTP client (`ApiClient`, `BrowseApi`, `OperationsApi`)
//! - `progress`: shared progress channel, subscriptions, `ProgressTracker`
//! - `controller`: request/loading/result/error lifecycle for one call
//! - `navigator`: directory picker state machine
//! - `forms`: the five operations' inputs and validation
//! - `models`: wire DTOs
//! - `config`, `error`: configuration and error normalisation

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod forms;
pub mod models;
pub mod navigator;
pub mod progress;

pub use api::{ApiClient, BrowseApi, OperationsApi};
pub use config::ClientConfig;
pub use controller::{ExecutionState, OperationController};
pub use error::{ClientError, ErrorResponse, Result};
pub use navigator::DirectoryNavigator;
pub use progress::{ProgressChannel, ProgressTracker};
