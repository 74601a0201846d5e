//! Rows of a data sheet

use serde::{Deserialize, Serialize};

use crate::cluster::ClusterId;

/// Design identifier, unique within a data sheet
pub type DesignId = u64;

/// One row of a data sheet.
///
/// `values` holds one entry per parameter, in the sheet's parameter order.
/// Numeric parameters store the value itself, discrete parameters store the
/// category ordinal. Whether the design is visible is not stored here; every
/// chart works that out from its own axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    id: DesignId,
    values: Vec<f64>,
    selected: bool,
    cluster: Option<ClusterId>,
}

impl Design {
    pub(crate) fn new(id: DesignId, values: Vec<f64>) -> Self {
        Self {
            id,
            values,
            selected: false,
            cluster: None,
        }
    }

    pub fn id(&self) -> DesignId {
        self.id
    }

    /// Value at parameter position `index`
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Cluster this design is tagged into, if any
    pub fn cluster(&self) -> Option<ClusterId> {
        self.cluster
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<f64> {
        &mut self.values
    }

    pub(crate) fn set_values(&mut self, values: Vec<f64>) {
        self.values = values;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_cluster(&mut self, cluster: Option<ClusterId>) {
        self.cluster = cluster;
    }
}
