//! Core functionality for the design explorer
//! 
//! This crate provides the application-wide configuration object, shared
//! identifiers and the state-changed event bus used by collaborators that
//! sit around the data and chart model.

pub mod events;
pub mod settings;

// Re-export commonly used types
pub use events::EventBus;
pub use settings::{
    AxisDefaults, DisplaySettings, ImportSettings, NumberLocale, Preferences,
};

/// Chart identifier type
pub type ChartId = uuid::Uuid;

/// Create a fresh chart identifier
pub fn new_chart_id() -> ChartId {
    uuid::Uuid::new_v4()
}
