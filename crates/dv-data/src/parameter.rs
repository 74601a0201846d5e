//! Column descriptions

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use dv_core::NumberLocale;

use crate::locale::format_number;
use crate::schema::ColumnKind;
use crate::DataError;

/// One column of a data sheet.
///
/// The numeric/discrete classification is decided when the column is first
/// imported and never changes afterwards. Discrete parameters keep their
/// distinct values in first-seen order; a value's position in that order is
/// its ordinal, which is what designs store for this column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    kind: ColumnKind,
    categories: IndexSet<String>,
}

impl Parameter {
    /// Create a numeric parameter
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
            categories: IndexSet::new(),
        }
    }

    /// Create a discrete parameter with no categories yet
    pub fn discrete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Discrete,
            categories: IndexSet::new(),
        }
    }

    pub(crate) fn with_kind(name: impl Into<String>, kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Numeric => Self::numeric(name),
            ColumnKind::Discrete => Self::discrete(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    /// Ordinal of a discrete value, appending it when it has not been seen.
    ///
    /// Existing ordinals never move, so filters that refer to them stay valid
    /// across updates.
    pub fn value_index(&mut self, raw: &str) -> Result<usize, DataError> {
        if self.is_numeric() {
            return Err(DataError::NotApplicable(format!(
                "parameter '{}' is numeric and has no categories",
                self.name
            )));
        }
        let (index, _) = self.categories.insert_full(raw.trim().to_string());
        Ok(index)
    }

    /// Ordinal of a known discrete value
    pub fn ordinal_of(&self, raw: &str) -> Option<usize> {
        self.categories.get_index_of(raw.trim())
    }

    /// Category at `ordinal`
    pub fn category(&self, ordinal: usize) -> Option<&str> {
        self.categories.get_index(ordinal).map(String::as_str)
    }

    /// Categories in ordinal order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Human readable form of a stored design value
    pub fn display_value(&self, value: f64, locale: &NumberLocale) -> String {
        match self.kind {
            ColumnKind::Numeric => format_number(value, locale),
            ColumnKind::Discrete => self
                .category(value as usize)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", value)),
        }
    }
}
