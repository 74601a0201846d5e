//! Axis, filter and chart model for exploring designs
//!
//! A [`ParallelCoordinatesChart`] keeps one [`Axis`] per parameter of a
//! [`DataSheet`](dv_data::DataSheet). Each axis holds a display range and a
//! pair of [`Filter`]s; a design is visible when every active axis accepts
//! its value. Nothing here pushes notifications: after changing the data
//! sheet, callers run [`ChartSet::synchronize`] and pull the new state.

pub mod axis;
pub mod chart;
pub mod filter;
pub mod parallel_coordinates;
pub mod scatter;
pub mod session;

use thiserror::Error;
use dv_data::DataError;

// Re-exports
pub use axis::Axis;
pub use chart::{Chart, ChartSet};
pub use filter::{BoundKind, CategoryFilter, Filter};
pub use parallel_coordinates::ParallelCoordinatesChart;
pub use scatter::ScatterChart2D;
pub use session::{Session, SessionError};

/// Errors that can occur in chart operations
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not applicable: {0}")]
    NotApplicable(String),

    #[error("A chart needs at least one parameter")]
    NoParametersDefined,

    #[error("Axis for '{0}' already exists")]
    AxisExists(String),

    #[error("Index {index} out of range for {len} axes")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Value {0} is not finite")]
    NonFiniteValue(f64),

    #[error(transparent)]
    Data(#[from] DataError),
}
