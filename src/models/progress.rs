//! Progress channel DTOs.
//!
//! - `ProgressUpdate`: one push message from `/topic/progress/{operationId}`
//! - `ProgressStatus`: running / completed / error
//! - `ProgressState`: what a consumer displays, folded from updates

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[serde(alias = "in_progress")]
    Running,
    Completed,
    Error,
    /// Any status string this client does not know about
    #[serde(other)]
    Unknown,
}

impl ProgressStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProgressStatus::Completed | ProgressStatus::Error)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProgressStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl ProgressUpdate {
    /// Parse a textual push payload. Callers drop the update on error.
    pub fn parse(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressState {
    pub connected: bool,
    /// `None` until the first update arrives
    pub status: Option<ProgressStatus>,
    pub message: Option<String>,
    /// `None` means indeterminate
    pub percentage: Option<u8>,
    pub current: Option<u64>,
    pub total: Option<u64>,
    pub detail: Option<String>,
    pub error: Option<String>,
}

impl ProgressState {
    /// Fold one update into the displayed state.
    ///
    /// Every update replaces the displayed fields, so a field it leaves out
    /// is cleared (a missing percentage means indeterminate). Only the status
    /// carries over: an update without a known status keeps the previous one,
    /// or means running.
    pub fn apply(&mut self, update: &ProgressUpdate) {
        let status = match update.status {
            Some(ProgressStatus::Unknown) | None => {
                self.status.unwrap_or(ProgressStatus::Running)
            }
            Some(s) => s,
        };
        self.status = Some(status);

        self.message = update.message.clone();
        self.current = update.current;
        self.total = update.total;
        self.detail = update.detail.clone();
        self.percentage = match (update.percentage, update.current, update.total) {
            (Some(pct), _, _) if pct.is_finite() => Some(pct.clamp(0.0, 100.0).round() as u8),
            (_, Some(current), Some(total)) if total > 0 => {
                let scaled = u128::from(current.min(total)) * 100 / u128::from(total);
                Some(scaled as u8)
            }
            _ => None,
        };
        if status == ProgressStatus::Completed && self.percentage.is_none() {
            self.percentage = Some(100);
        }

        self.error = update.error.clone();
        if status == ProgressStatus::Error && self.error.is_none() {
            self.error = Some(
                update
                    .message
                    .clone()
                    .unwrap_or_else(|| "Operation failed".to_string()),
            );
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_some_and(ProgressStatus::is_terminal)
    }
}
