//! Filter bounds of an axis

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which end of an axis a filter sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundKind {
    Upper,
    Lower,
}

/// Direction in which a filter lets values through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admits {
    AtOrBelow,
    AtOrAbove,
}

/// A single numeric bound.
///
/// The filter itself does not know whether it currently acts as the low or
/// the high end of the window; the owning axis decides that and passes the
/// comparison direction in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    bound: BoundKind,
    value: f64,
}

impl Filter {
    pub fn new(bound: BoundKind, value: f64) -> Self {
        Self { bound, value }
    }

    pub fn bound(&self) -> BoundKind {
        self.bound
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether `v` lies on the admitted side of the threshold (inclusive)
    pub fn accepts(&self, v: f64, direction: Admits) -> bool {
        match direction {
            Admits::AtOrBelow => v <= self.value,
            Admits::AtOrAbove => v >= self.value,
        }
    }

    /// Store `v` clamped into `[lo, hi]` and return the stored value
    pub fn set_value(&mut self, v: f64, lo: f64, hi: f64) -> f64 {
        self.value = v.clamp(lo, hi);
        self.value
    }

    pub(crate) fn set_unclamped(&mut self, v: f64) {
        self.value = v;
    }
}

/// Category selection of a discrete axis.
///
/// `known` is the number of categories the selection has seen. Categories
/// that appear later are selected when the filter is extended to them, so
/// fresh data shows up until the user deselects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFilter {
    selected: BTreeSet<usize>,
    known: usize,
}

impl CategoryFilter {
    /// Filter over `count` categories with all of them selected
    pub fn all(count: usize) -> Self {
        Self {
            selected: (0..count).collect(),
            known: count,
        }
    }

    pub fn accepts(&self, ordinal: usize) -> bool {
        self.selected.contains(&ordinal)
    }

    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn known(&self) -> usize {
        self.known
    }

    /// Replace the selection; ordinals beyond the known categories are dropped
    pub fn select(&mut self, ordinals: impl IntoIterator<Item = usize>) {
        let known = self.known;
        self.selected = ordinals.into_iter().filter(|&o| o < known).collect();
    }

    /// Flip one category; returns whether it is now selected
    pub fn toggle(&mut self, ordinal: usize) -> bool {
        if ordinal >= self.known {
            return false;
        }
        if !self.selected.remove(&ordinal) {
            self.selected.insert(ordinal);
            return true;
        }
        false
    }

    pub fn select_all(&mut self) {
        self.selected = (0..self.known).collect();
    }

    /// Grow to `count` categories, selecting the new ones
    pub fn extend_to(&mut self, count: usize) {
        if count > self.known {
            self.selected.extend(self.known..count);
            self.known = count;
        }
    }
}
