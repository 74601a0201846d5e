//! Parameters, designs and the data sheet that holds them

pub mod cluster;
pub mod design;
pub mod locale;
pub mod parameter;
pub mod schema;
pub mod sheet;
pub mod sources;

use thiserror::Error;

// Re-exports
pub use cluster::{Cluster, ClusterId, ClusterSet};
pub use design::{Design, DesignId};
pub use locale::{format_number, parse_number};
pub use parameter::Parameter;
pub use schema::ColumnKind;
pub use sheet::{DataSheet, UpdateSummary};
pub use sources::CsvSource;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Row {row} has {found} fields, expected {expected}")]
    DataFormat { row: usize, expected: usize, found: usize },

    #[error("Ambiguous or malformed number '{value}'")]
    NumberFormat { value: String },

    #[error("Inconsistent data: {0}")]
    InconsistentData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not applicable: {0}")]
    NotApplicable(String),

    #[error("Index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}
