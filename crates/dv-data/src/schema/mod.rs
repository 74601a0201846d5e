use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use dv_core::NumberLocale;

use crate::locale::parse_number;
use crate::DataError;

/// Numeric or discrete classification of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Discrete,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }
}

/// Classifies the columns of raw import rows
pub struct ColumnClassifier {
    locale: NumberLocale,
}

impl ColumnClassifier {
    /// Create a classifier for the given number locale
    pub fn new(locale: NumberLocale) -> Self {
        Self { locale }
    }

    /// Classify every column of `rows`, which must all be `width` wide.
    ///
    /// Columns are inspected in parallel; when several columns fail, the
    /// error of any one of them is returned.
    pub fn classify_all(&self, rows: &[Vec<String>], width: usize) -> Result<Vec<ColumnKind>, DataError> {
        (0..width)
            .into_par_iter()
            .map(|col_idx| self.classify(rows.iter().map(|row| row[col_idx].as_str())))
            .collect()
    }

    /// Classify a single column.
    ///
    /// Any plain text makes the column discrete. A column whose cells are
    /// all number-like is numeric, unless one of them is malformed, which is
    /// reported rather than letting the column silently turn discrete.
    pub fn classify<'a>(&self, values: impl Iterator<Item = &'a str>) -> Result<ColumnKind, DataError> {
        let mut first_malformed = None;

        for value in values {
            match parse_number(value, &self.locale) {
                Ok(Some(_)) => {}
                Ok(None) => return Ok(ColumnKind::Discrete),
                Err(e) => {
                    if first_malformed.is_none() {
                        first_malformed = Some(e);
                    }
                }
            }
        }

        match first_malformed {
            Some(e) => Err(e),
            None => Ok(ColumnKind::Numeric),
        }
    }
}
