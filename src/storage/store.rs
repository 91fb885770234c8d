//! Persistent state store
//!
//! Three plain-text artifacts under the storage layout: the status scalar,
//! the last-outcome scalar, and the append-only log blob. Durability is
//! best-effort: reads degrade to defaults and writes never fail the caller,
//! with diagnostics going to the tracing channel.

use std::str::FromStr;

use tracing::warn;

use crate::deploy::status::{DeployStatus, LastOutcome};
use crate::filesys::file::File;
use crate::storage::layout::StorageLayout;

/// File-backed store for the three deployment state scalars
#[derive(Debug, Clone)]
pub struct StateStore {
    status_file: File,
    outcome_file: File,
    log_file: File,
}

impl StateStore {
    /// Create a store over the given layout
    pub fn new(layout: &StorageLayout) -> Self {
        Self {
            status_file: layout.status_file(),
            outcome_file: layout.outcome_file(),
            log_file: layout.log_file(),
        }
    }

    /// Load the persisted status, degrading to `Idle` when unreadable
    pub async fn load_status(&self) -> DeployStatus {
        if !self.status_file.exists().await {
            return DeployStatus::Idle;
        }
        match self.status_file.read_string().await {
            // FromStr is total: unrecognized content parses to Unknown
            Ok(contents) => DeployStatus::from_str(&contents).unwrap_or(DeployStatus::Unknown),
            Err(e) => {
                warn!("Failed to read status file, assuming idle: {}", e);
                DeployStatus::Idle
            }
        }
    }

    /// Persist the status scalar (best-effort)
    pub async fn save_status(&self, status: DeployStatus) {
        if let Err(e) = self.status_file.write_string(status.as_str()).await {
            warn!("Failed to persist status: {}", e);
        }
    }

    /// Load the persisted last outcome, degrading to `Unknown` when unreadable
    pub async fn load_outcome(&self) -> LastOutcome {
        if !self.outcome_file.exists().await {
            return LastOutcome::Unknown;
        }
        match self.outcome_file.read_string().await {
            Ok(contents) => LastOutcome::from_str(&contents).unwrap_or(LastOutcome::Unknown),
            Err(e) => {
                warn!("Failed to read outcome file, assuming unknown: {}", e);
                LastOutcome::Unknown
            }
        }
    }

    /// Persist the last-outcome scalar (best-effort)
    pub async fn save_outcome(&self, outcome: LastOutcome) {
        if let Err(e) = self.outcome_file.write_string(outcome.as_str()).await {
            warn!("Failed to persist outcome: {}", e);
        }
    }

    /// Load the persisted log blob, degrading to empty when unreadable
    pub async fn load_log(&self) -> String {
        if !self.log_file.exists().await {
            return String::new();
        }
        match self.log_file.read_string().await {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read log file, assuming empty: {}", e);
                String::new()
            }
        }
    }

    /// Append a chunk to the log blob in place (best-effort)
    pub async fn append_log(&self, chunk: &str) {
        if let Err(e) = self.log_file.append_string(chunk).await {
            warn!("Failed to append to log file: {}", e);
        }
    }

    /// Replace the log blob wholesale (best-effort)
    pub async fn save_log(&self, contents: &str) {
        if let Err(e) = self.log_file.write_string(contents).await {
            warn!("Failed to persist log file: {}", e);
        }
    }
}
