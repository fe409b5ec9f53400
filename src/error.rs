//! Client error types and normalisation to the backend's error shape.
//!
//! Defines `ClientError` for every failure the client can observe and
//! `ErrorResponse`, the single `{success:false, message, error?}` shape that
//! consumers display. Whatever went wrong (network, HTTP status, backend
//! rejection, malformed body) ends up as one message string.
//!
//! Error mappings:
//! - `Http` → message from reqwest, `error` = "NetworkError"
//! - `Remote` → the backend's own `message`/`error` fields
//! - `Decode` → "Invalid response from server", `error` = "DecodeError"
//! - `Transport`, `Protocol` → progress channel failures
//! - `Validation` → inline form errors, never sent over the wire

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Remote {
        status: u16,
        message: String,
        error: Option<String>,
        field_errors: Option<BTreeMap<String, String>>,
    },

    #[error("Invalid response from server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Progress channel error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Progress protocol error: {0}")]
    Protocol(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// The one error shape every failure is reduced to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, rename = "errors", skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
            field_errors: None,
        }
    }
}

impl ClientError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ClientError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Build a `Remote` error from a non-2xx status and its raw body.
    ///
    /// Bodies that are not the backend's JSON error shape still produce a
    /// usable message, falling back to the status line.
    pub fn from_status(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) if !parsed.message.is_empty() => ClientError::Remote {
                status,
                message: parsed.message,
                error: parsed.error,
                field_errors: parsed.field_errors,
            },
            _ => {
                let trimmed = body.trim();
                let message = if trimmed.is_empty() || trimmed.starts_with('<') {
                    format!("Request failed with status {}", status)
                } else {
                    trimmed.to_string()
                };
                ClientError::Remote {
                    status,
                    message,
                    error: None,
                    field_errors: None,
                }
            }
        }
    }

    /// Reduce any failure to the shape shown in error banners.
    pub fn normalize(&self) -> ErrorResponse {
        match self {
            ClientError::Http(e) => ErrorResponse {
                error: Some("NetworkError".to_string()),
                ..ErrorResponse::new(if e.is_timeout() {
                    "Request timed out".to_string()
                } else if e.is_connect() {
                    "Could not connect to server".to_string()
                } else {
                    e.to_string()
                })
            },
            ClientError::Remote {
                message,
                error,
                field_errors,
                ..
            } => ErrorResponse {
                success: false,
                message: message.clone(),
                error: error.clone(),
                field_errors: field_errors.clone(),
            },
            ClientError::Decode(_) => ErrorResponse {
                error: Some("DecodeError".to_string()),
                ..ErrorResponse::new("Invalid response from server")
            },
            ClientError::Transport(_) | ClientError::Protocol(_) => ErrorResponse {
                error: Some("ProgressChannelError".to_string()),
                ..ErrorResponse::new(self.to_string())
            },
            ClientError::Validation { .. } => ErrorResponse {
                error: Some("ValidationError".to_string()),
                ..ErrorResponse::new(self.to_string())
            },
            ClientError::Config(msg) => ErrorResponse::new(msg.clone()),
        }
    }

    /// Shortcut for the banner text.
    pub fn message(&self) -> String {
        self.normalize().message
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
