//! Named groups designs can be tagged into

use serde::{Deserialize, Serialize};

use crate::DataError;

/// Cluster identifier
pub type ClusterId = u32;

/// Colors handed out to new clusters in turn (RGBA)
const PALETTE: [[u8; 4]; 6] = [
    [228, 26, 28, 255],
    [55, 126, 184, 255],
    [77, 175, 74, 255],
    [152, 78, 163, 255],
    [255, 127, 0, 255],
    [166, 86, 40, 255],
];

/// A named group of designs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub name: String,
    pub color: [u8; 4],

    /// Designs of inactive clusters are not displayed
    pub active: bool,
}

/// The clusters of one data sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
    next_id: ClusterId,
}

impl ClusterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an active cluster and return its id
    pub fn add(&mut self, name: impl Into<String>) -> ClusterId {
        let id = self.next_id;
        self.next_id += 1;
        self.clusters.push(Cluster {
            id,
            name: name.into(),
            color: PALETTE[id as usize % PALETTE.len()],
            active: true,
        });
        id
    }

    pub fn get(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: ClusterId) -> Option<&mut Cluster> {
        self.clusters.iter_mut().find(|c| c.id == id)
    }

    /// Whether designs of cluster `id` are displayed; unknown ids count as active
    pub fn is_active(&self, id: ClusterId) -> bool {
        self.get(id).map(|c| c.active).unwrap_or(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub(crate) fn remove(&mut self, id: ClusterId) -> Result<Cluster, DataError> {
        let pos = self
            .clusters
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DataError::NotFound(format!("cluster {}", id)))?;
        Ok(self.clusters.remove(pos))
    }

    pub(crate) fn next_id(&self) -> ClusterId {
        self.next_id
    }
}
