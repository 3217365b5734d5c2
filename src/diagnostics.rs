//! Failure diagnostics log.
//!
//! Every failed backend request reported through
//! [`ToastNotifier::report_failure`](crate::toast::ToastNotifier::report_failure)
//! is appended here, so a user-visible toast can be matched with the
//! underlying cause afterwards.
//!
//! Log file: `~/.dtf/client-events.jsonl`

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// One diagnostic entry. One line per failed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    pub timestamp: String,
    /// Operation that failed, e.g. `"delete_instance"`.
    pub operation: String,
    pub url: String,
    /// HTTP status, when the backend answered.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    pub detail: String,
}

impl DiagnosticEvent {
    pub fn from_error(operation: &str, error: &ClientError) -> Self {
        let status = match error {
            ClientError::Status { code, .. } => Some(*code),
            _ => None,
        };
        Self {
            timestamp: Utc::now().to_rfc3339(),
            operation: operation.to_string(),
            url: error.url().to_string(),
            status,
            detail: error.to_string(),
        }
    }
}

/// Append one event as a JSON line, creating parent directories.
pub fn append_event(path: &Path, event: &DiagnosticEvent) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;

    Ok(())
}

pub fn diagnostics_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".dtf").join("client-events.jsonl"))
}
