//! Whole-state snapshots for saving and restoring a session

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use dv_core::Preferences;
use dv_data::DataSheet;

use crate::chart::ChartSet;

/// Format version written into every snapshot
pub const SESSION_VERSION: u32 = 1;

/// Errors that can occur while saving or restoring a session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Corrupt session: {0}")]
    Corrupt(String),

    #[error("Unsupported session version {0}")]
    UnsupportedVersion(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Complete state of a session: preferences, the data sheet with its
/// parameters, designs and clusters, and every chart with its axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    version: u32,
    saved_at: DateTime<Utc>,
    pub preferences: Preferences,
    pub data_sheet: DataSheet,
    pub charts: ChartSet,
}

impl Session {
    /// Snapshot the given state
    pub fn capture(preferences: &Preferences, data_sheet: &DataSheet, charts: &ChartSet) -> Self {
        Self {
            version: SESSION_VERSION,
            saved_at: Utc::now(),
            preferences: preferences.clone(),
            data_sheet: data_sheet.clone(),
            charts: charts.clone(),
        }
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a snapshot, checking every invariant the model relies on and
    /// rebuilding the axes' filter caches
    pub fn from_json(text: &str) -> Result<Self, SessionError> {
        let mut session: Session = serde_json::from_str(text)?;
        if session.version != SESSION_VERSION {
            return Err(SessionError::UnsupportedVersion(session.version));
        }

        session.data_sheet.validate().map_err(SessionError::Corrupt)?;
        for chart in session.charts.iter() {
            chart.validate(&session.data_sheet).map_err(SessionError::Corrupt)?;
        }

        session
            .charts
            .apply_filters(&session.data_sheet)
            .map_err(|e| SessionError::Corrupt(e.to_string()))?;

        Ok(session)
    }

    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!("Saved session to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(path)?;
        let session = Self::from_json(&text)?;
        tracing::info!(
            "Restored session from {} ({} designs, {} charts)",
            path.display(),
            session.data_sheet.design_count(),
            session.charts.len()
        );
        Ok(session)
    }

    /// Take the restored state apart
    pub fn into_parts(self) -> (Preferences, DataSheet, ChartSet) {
        (self.preferences, self.data_sheet, self.charts)
    }
}
