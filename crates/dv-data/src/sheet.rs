//! The table of parameters and designs

use ahash::AHashSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use dv_core::NumberLocale;

use crate::cluster::{ClusterId, ClusterSet};
use crate::design::{Design, DesignId};
use crate::locale::parse_number;
use crate::parameter::Parameter;
use crate::schema::{ColumnClassifier, ColumnKind};
use crate::DataError;

/// Outcome of a successful update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Existing designs that received new values
    pub matched: usize,
    /// Rows that became new designs
    pub appended: usize,
    /// Existing designs dropped because the update had fewer rows
    pub pruned: usize,
}

/// Authoritative store of parameters and designs.
///
/// Every design holds exactly one value per parameter, in parameter order.
/// Import and update either succeed completely or leave the sheet untouched.
/// The sheet never notifies anyone; callers re-derive chart state after a
/// successful mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSheet {
    parameters: IndexMap<String, Parameter>,
    designs: Vec<Design>,
    clusters: ClusterSet,
    next_design_id: DesignId,
}

/// Rows split into names and body, checked for a consistent width
struct RawTable<'a> {
    names: Vec<String>,
    body: &'a [Vec<String>],
}

impl<'a> RawTable<'a> {
    fn parse(rows: &'a [Vec<String>], has_headers: bool) -> Result<Self, DataError> {
        let Some(first) = rows.first() else {
            return Ok(Self { names: Vec::new(), body: &[] });
        };
        let width = first.len();

        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(DataError::DataFormat {
                row: idx + 1,
                expected: width,
                found: row.len(),
            });
        }

        let (names, body) = if has_headers {
            (unique_names(first), &rows[1..])
        } else {
            ((1..=width).map(generated_name).collect(), rows)
        };

        Ok(Self { names, body })
    }

    fn width(&self) -> usize {
        self.names.len()
    }
}

fn generated_name(position: usize) -> String {
    format!("Parameter {}", position)
}

/// Blank header cells get a generated name, repeated names a numeric suffix
fn unique_names(header: &[String]) -> Vec<String> {
    let mut seen = AHashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let base = match raw.trim() {
                "" => generated_name(idx + 1),
                name => name.to_string(),
            };
            let mut name = base.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{} ({})", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

impl DataSheet {
    /// Create an empty data sheet
    pub fn new() -> Self {
        Self {
            next_design_id: 1,
            ..Self::default()
        }
    }

    /// Build a data sheet from raw rows
    pub fn from_rows(rows: &[Vec<String>], has_headers: bool, locale: &NumberLocale) -> Result<Self, DataError> {
        let mut sheet = Self::new();
        sheet.import_from(rows, has_headers, locale)?;
        Ok(sheet)
    }

    /// Replace the whole content of the sheet with `rows`.
    ///
    /// Columns whose cells all parse as numbers become numeric parameters,
    /// all others discrete. On error the sheet is unchanged.
    pub fn import_from(&mut self, rows: &[Vec<String>], has_headers: bool, locale: &NumberLocale) -> Result<(), DataError> {
        let table = RawTable::parse(rows, has_headers)?;
        let kinds = ColumnClassifier::new(*locale).classify_all(table.body, table.width())?;

        let mut parameters: Vec<Parameter> = table
            .names
            .iter()
            .zip(&kinds)
            .map(|(name, kind)| Parameter::with_kind(name.clone(), *kind))
            .collect();

        let mut designs = Vec::with_capacity(table.body.len());
        for (idx, row) in table.body.iter().enumerate() {
            let values = row_values(row, &mut parameters, locale)?;
            designs.push(Design::new(idx as DesignId + 1, values));
        }

        self.next_design_id = designs.len() as DesignId + 1;
        self.parameters = parameters
            .into_iter()
            .map(|p| (p.name().to_string(), p))
            .collect();
        self.designs = designs;
        self.clusters = ClusterSet::new();

        tracing::info!(
            "Imported {} parameters and {} designs",
            self.parameters.len(),
            self.designs.len()
        );
        Ok(())
    }

    /// Bring the sheet in line with a fresh copy of its source.
    ///
    /// Rows are matched to designs by position: matched designs keep their
    /// id, selection and cluster, surplus designs are dropped and surplus rows
    /// become new designs. The column count, the header names (if any) and
    /// every numeric parameter's classification must stay the same, otherwise
    /// the update fails with [`DataError::InconsistentData`] and the sheet is
    /// left exactly as it was. A sheet without designs takes its
    /// classification from the update's rows instead.
    pub fn update_from(&mut self, rows: &[Vec<String>], has_headers: bool, locale: &NumberLocale) -> Result<UpdateSummary, DataError> {
        let result = self.stage_update(rows, has_headers, locale);
        let (parameters, designs, next_design_id, summary) = match result {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!("Rejected data update: {}", e);
                return Err(e);
            }
        };

        self.parameters = parameters;
        self.designs = designs;
        self.next_design_id = next_design_id;

        tracing::info!(
            "Updated data: {} matched, {} appended, {} pruned",
            summary.matched,
            summary.appended,
            summary.pruned
        );
        Ok(summary)
    }

    /// Compute the post-update state without touching `self`
    fn stage_update(
        &self,
        rows: &[Vec<String>],
        has_headers: bool,
        locale: &NumberLocale,
    ) -> Result<(IndexMap<String, Parameter>, Vec<Design>, DesignId, UpdateSummary), DataError> {
        let table = RawTable::parse(rows, has_headers)?;

        // An empty update carries no width to compare
        if !rows.is_empty() && table.width() != self.parameters.len() {
            return Err(DataError::InconsistentData(format!(
                "update has {} columns, data sheet has {} parameters",
                table.width(),
                self.parameters.len()
            )));
        }
        if has_headers && !rows.is_empty() {
            if let Some((new, old)) = table
                .names
                .iter()
                .zip(self.parameters.keys())
                .find(|(new, old)| new != old)
            {
                return Err(DataError::InconsistentData(format!(
                    "column '{}' does not match parameter '{}'",
                    new, old
                )));
            }
        }

        // A sheet without designs has no values tied to its classification,
        // so the first rows it receives decide it, as on import
        let mut parameters: Vec<Parameter> = if self.designs.is_empty() && !table.body.is_empty() {
            let kinds = ColumnClassifier::new(*locale).classify_all(table.body, table.width())?;
            self.parameters
                .keys()
                .zip(kinds)
                .map(|(name, kind)| Parameter::with_kind(name.clone(), kind))
                .collect()
        } else {
            self.parameters.values().cloned().collect()
        };
        let mut designs = Vec::with_capacity(table.body.len());
        let mut next_design_id = self.next_design_id;
        for (idx, row) in table.body.iter().enumerate() {
            let values = row_values(row, &mut parameters, locale)?;
            match self.designs.get(idx) {
                Some(existing) => {
                    let mut design = existing.clone();
                    design.set_values(values);
                    designs.push(design);
                }
                None => {
                    designs.push(Design::new(next_design_id, values));
                    next_design_id += 1;
                }
            }
        }

        let matched = table.body.len().min(self.designs.len());
        let summary = UpdateSummary {
            matched,
            appended: table.body.len() - matched,
            pruned: self.designs.len() - matched,
        };
        let parameters = parameters
            .into_iter()
            .map(|p| (p.name().to_string(), p))
            .collect();

        Ok((parameters, designs, next_design_id, summary))
    }

    /// Remove the designs at the given row indices.
    ///
    /// All indices are checked before anything is removed. Returns the ids
    /// of the removed designs.
    pub fn remove_designs(&mut self, indices: &[usize]) -> Result<Vec<DesignId>, DataError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.designs.len()) {
            return Err(DataError::IndexOutOfRange {
                index,
                len: self.designs.len(),
            });
        }

        let doomed: AHashSet<usize> = indices.iter().copied().collect();
        let mut removed = Vec::with_capacity(doomed.len());
        let mut row = 0;
        self.designs.retain(|design| {
            let keep = !doomed.contains(&row);
            if !keep {
                removed.push(design.id());
            }
            row += 1;
            keep
        });

        tracing::info!("Removed {} designs", removed.len());
        Ok(removed)
    }

    /// Remove a parameter and its value from every design
    pub fn remove_parameter(&mut self, name: &str) -> Result<Parameter, DataError> {
        let (index, _, parameter) = self
            .parameters
            .shift_remove_full(name)
            .ok_or_else(|| DataError::NotFound(format!("parameter '{}'", name)))?;

        for design in &mut self.designs {
            design.values_mut().remove(index);
        }

        tracing::info!("Removed parameter '{}'", name);
        Ok(parameter)
    }

    /// Change the declaration order of parameters. Chart axis order is not
    /// affected.
    pub fn move_parameter(&mut self, from: usize, to: usize) -> Result<(), DataError> {
        let len = self.parameters.len();
        for index in [from, to] {
            if index >= len {
                return Err(DataError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        self.parameters.move_index(from, to);
        for design in &mut self.designs {
            let values = design.values_mut();
            let value = values.remove(from);
            values.insert(to, value);
        }

        tracing::debug!("Moved parameter from {} to {}", from, to);
        Ok(())
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Parameter by name
    pub fn parameter(&self, name: &str) -> Result<&Parameter, DataError> {
        self.parameters
            .get(name)
            .ok_or_else(|| DataError::NotFound(format!("parameter '{}'", name)))
    }

    /// Parameter at declaration position `index`
    pub fn parameter_at(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get_index(index).map(|(_, p)| p)
    }

    /// Declaration position of a parameter
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameters.get_index_of(name)
    }

    pub fn designs(&self) -> &[Design] {
        &self.designs
    }

    pub fn design_count(&self) -> usize {
        self.designs.len()
    }

    /// Design at row `index`
    pub fn design(&self, index: usize) -> Option<&Design> {
        self.designs.get(index)
    }

    pub fn design_by_id(&self, id: DesignId) -> Option<&Design> {
        self.designs.iter().find(|d| d.id() == id)
    }

    /// Value of `design` for the named parameter
    pub fn value(&self, design: &Design, parameter: &str) -> Result<f64, DataError> {
        let index = self
            .parameter_index(parameter)
            .ok_or_else(|| DataError::NotFound(format!("parameter '{}'", parameter)))?;
        design
            .value(index)
            .ok_or_else(|| DataError::NotFound(format!("value of design {} for '{}'", design.id(), parameter)))
    }

    /// Smallest and largest value of a numeric parameter; `None` without designs
    pub fn numeric_range(&self, parameter: &str) -> Result<Option<(f64, f64)>, DataError> {
        let index = self
            .parameter_index(parameter)
            .ok_or_else(|| DataError::NotFound(format!("parameter '{}'", parameter)))?;
        if !self.parameters[index].is_numeric() {
            return Err(DataError::NotApplicable(format!(
                "parameter '{}' is discrete",
                parameter
            )));
        }

        Ok(self
            .designs
            .iter()
            .filter_map(|d| d.value(index))
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            }))
    }

    /// Select exactly the designs at `indices`
    pub fn set_selected(&mut self, indices: &[usize]) -> Result<(), DataError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.designs.len()) {
            return Err(DataError::IndexOutOfRange {
                index,
                len: self.designs.len(),
            });
        }
        let chosen: AHashSet<usize> = indices.iter().copied().collect();
        for (row, design) in self.designs.iter_mut().enumerate() {
            design.set_selected(chosen.contains(&row));
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for design in &mut self.designs {
            design.set_selected(false);
        }
    }

    pub fn selected_designs(&self) -> impl Iterator<Item = &Design> {
        self.designs.iter().filter(|d| d.is_selected())
    }

    pub fn clusters(&self) -> &ClusterSet {
        &self.clusters
    }

    pub fn clusters_mut(&mut self) -> &mut ClusterSet {
        &mut self.clusters
    }

    /// Tag the designs at `indices` into `cluster`, or untag them with `None`
    pub fn assign_cluster(&mut self, indices: &[usize], cluster: Option<ClusterId>) -> Result<(), DataError> {
        if let Some(id) = cluster {
            if self.clusters.get(id).is_none() {
                return Err(DataError::NotFound(format!("cluster {}", id)));
            }
        }
        if let Some(&index) = indices.iter().find(|&&i| i >= self.designs.len()) {
            return Err(DataError::IndexOutOfRange {
                index,
                len: self.designs.len(),
            });
        }
        for &index in indices {
            self.designs[index].set_cluster(cluster);
        }
        Ok(())
    }

    /// Remove a cluster; its designs become untagged
    pub fn remove_cluster(&mut self, id: ClusterId) -> Result<(), DataError> {
        let cluster = self.clusters.remove(id)?;
        for design in &mut self.designs {
            if design.cluster() == Some(id) {
                design.set_cluster(None);
            }
        }
        tracing::debug!("Removed cluster '{}'", cluster.name);
        Ok(())
    }

    /// Check the structural invariants, e.g. after deserialization
    pub fn validate(&self) -> Result<(), String> {
        let width = self.parameters.len();
        let mut ids = AHashSet::with_capacity(self.designs.len());

        for (key, parameter) in &self.parameters {
            if key != parameter.name() {
                return Err(format!("parameter key '{}' names '{}'", key, parameter.name()));
            }
        }

        for design in &self.designs {
            if !ids.insert(design.id()) {
                return Err(format!("duplicate design id {}", design.id()));
            }
            if design.id() >= self.next_design_id {
                return Err(format!("design id {} was never issued", design.id()));
            }
            if design.values().len() != width {
                return Err(format!(
                    "design {} has {} values for {} parameters",
                    design.id(),
                    design.values().len(),
                    width
                ));
            }
            for (value, parameter) in design.values().iter().zip(self.parameters.values()) {
                let valid = match parameter.kind() {
                    ColumnKind::Numeric => value.is_finite(),
                    ColumnKind::Discrete => {
                        value.fract() == 0.0 && *value >= 0.0 && (*value as usize) < parameter.category_count()
                    }
                };
                if !valid {
                    return Err(format!(
                        "design {} has invalid value {} for '{}'",
                        design.id(),
                        value,
                        parameter.name()
                    ));
                }
            }
            if let Some(cluster) = design.cluster() {
                if self.clusters.get(cluster).is_none() {
                    return Err(format!("design {} refers to unknown cluster {}", design.id(), cluster));
                }
            }
        }

        if self.clusters.iter().any(|c| c.id >= self.clusters.next_id()) {
            return Err("cluster id was never issued".to_string());
        }
        Ok(())
    }
}

/// Convert one row into design values, registering discrete categories
fn row_values(row: &[String], parameters: &mut [Parameter], locale: &NumberLocale) -> Result<Vec<f64>, DataError> {
    row.iter()
        .zip(parameters.iter_mut())
        .map(|(cell, parameter)| {
            if parameter.is_numeric() {
                parse_number(cell, locale)?.ok_or_else(|| {
                    DataError::InconsistentData(format!(
                        "value '{}' is not a number but parameter '{}' is numeric",
                        cell,
                        parameter.name()
                    ))
                })
            } else {
                parameter.value_index(cell).map(|ordinal| ordinal as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn en() -> NumberLocale {
        NumberLocale::english()
    }

    fn sample() -> DataSheet {
        DataSheet::from_rows(
            &rows(&[
                &["speed", "mode"],
                &["1", "low"],
                &["5", "high"],
                &["9", "low"],
            ]),
            true,
            &en(),
        )
        .unwrap()
    }

    #[test]
    fn test_import_classifies_columns() {
        let sheet = sample();
        assert_eq!(sheet.parameter_count(), 2);
        assert!(sheet.parameter("speed").unwrap().is_numeric());
        let mode = sheet.parameter("mode").unwrap();
        assert!(!mode.is_numeric());
        assert_eq!(mode.categories().collect::<Vec<_>>(), vec!["low", "high"]);

        let ids: Vec<_> = sheet.designs().iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(sheet.designs()[1].values(), &[5.0, 1.0]);
    }

    #[test]
    fn test_import_inconsistent_width() {
        let mut sheet = sample();
        let before = sheet.clone();
        let result = sheet.import_from(&rows(&[&["a", "b"], &["1"]]), true, &en());
        assert!(matches!(
            result,
            Err(DataError::DataFormat { row: 2, expected: 2, found: 1 })
        ));
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_import_without_headers() {
        let sheet = DataSheet::from_rows(&rows(&[&["1", "x"], &["2", "y"]]), false, &en()).unwrap();
        let names: Vec<_> = sheet.parameters().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["Parameter 1", "Parameter 2"]);
        assert_eq!(sheet.design_count(), 2);
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let sheet = DataSheet::from_rows(&rows(&[&["x", "x", " "], &["1", "2", "3"]]), true, &en()).unwrap();
        let names: Vec<_> = sheet.parameters().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["x", "x (2)", "Parameter 3"]);
    }

    #[test]
    fn test_update_matches_positionally() {
        let mut sheet = sample();
        sheet.set_selected(&[1]).unwrap();

        let summary = sheet
            .update_from(
                &rows(&[&["speed", "mode"], &["2", "low"], &["6", "mid"], &["7", "high"], &["8", "low"]]),
                true,
                &en(),
            )
            .unwrap();

        assert_eq!(summary, UpdateSummary { matched: 3, appended: 1, pruned: 0 });
        assert_eq!(sheet.design_count(), 4);
        assert_eq!(sheet.designs()[1].values(), &[6.0, 2.0]);
        assert!(sheet.designs()[1].is_selected());
        assert_eq!(sheet.designs()[3].id(), 4);
    }

    #[test]
    fn test_update_prunes_rows() {
        let mut sheet = sample();
        let summary = sheet
            .update_from(&rows(&[&["speed", "mode"], &["3", "high"]]), true, &en())
            .unwrap();
        assert_eq!(summary.pruned, 2);
        assert_eq!(sheet.design_count(), 1);
        assert_eq!(sheet.designs()[0].id(), 1);

        // Ids of pruned designs are not handed out again
        sheet
            .update_from(&rows(&[&["speed", "mode"], &["3", "high"], &["4", "low"]]), true, &en())
            .unwrap();
        assert_eq!(sheet.designs()[1].id(), 4);
    }

    #[test]
    fn test_update_rejects_changed_header() {
        let mut sheet = sample();
        let before = sheet.clone();
        let result = sheet.update_from(&rows(&[&["velocity", "mode"], &["3", "high"]]), true, &en());
        assert!(matches!(result, Err(DataError::InconsistentData(_))));
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_update_rejects_column_count_change() {
        let mut sheet = sample();
        let before = sheet.clone();
        let result = sheet.update_from(&rows(&[&["1", "low", "x"]]), false, &en());
        assert!(matches!(result, Err(DataError::InconsistentData(_))));
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_discrete_parameter_accepts_numbers_on_update() {
        let mut sheet = sample();
        sheet
            .update_from(&rows(&[&["speed", "mode"], &["3", "42"]]), true, &en())
            .unwrap();
        let mode = sheet.parameter("mode").unwrap();
        assert!(!mode.is_numeric());
        assert_eq!(mode.ordinal_of("42"), Some(2));
    }

    #[test]
    fn test_remove_designs() {
        let mut sheet = sample();
        let removed = sheet.remove_designs(&[2, 0, 2]).unwrap();
        assert_eq!(removed, vec![1, 3]);
        assert_eq!(sheet.design_count(), 1);
        assert_eq!(sheet.designs()[0].id(), 2);
        assert_eq!(sheet.parameter_count(), 2);
    }

    #[test]
    fn test_remove_designs_out_of_range() {
        let mut sheet = sample();
        let before = sheet.clone();
        assert!(matches!(
            sheet.remove_designs(&[0, 3]),
            Err(DataError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_remove_parameter() {
        let mut sheet = sample();
        sheet.remove_parameter("speed").unwrap();
        assert_eq!(sheet.parameter_count(), 1);
        assert!(sheet.designs().iter().all(|d| d.values().len() == 1));
        assert_eq!(sheet.value(&sheet.designs()[1], "mode").unwrap(), 1.0);
        assert!(matches!(sheet.remove_parameter("speed"), Err(DataError::NotFound(_))));
    }

    #[test]
    fn test_move_parameter() {
        let mut sheet = sample();
        sheet.move_parameter(1, 0).unwrap();
        assert_eq!(sheet.parameter_at(0).unwrap().name(), "mode");
        assert_eq!(sheet.designs()[1].values(), &[1.0, 5.0]);
        assert_eq!(sheet.value(&sheet.designs()[1], "speed").unwrap(), 5.0);
        assert!(sheet.move_parameter(0, 2).is_err());
        sheet.validate().unwrap();
    }

    #[test]
    fn test_numeric_range() {
        let sheet = sample();
        assert_eq!(sheet.numeric_range("speed").unwrap(), Some((1.0, 9.0)));
        assert!(matches!(sheet.numeric_range("mode"), Err(DataError::NotApplicable(_))));
        assert!(matches!(sheet.numeric_range("nope"), Err(DataError::NotFound(_))));
    }

    #[test]
    fn test_selection() {
        let mut sheet = sample();
        sheet.set_selected(&[0, 2]).unwrap();
        let selected: Vec<_> = sheet.selected_designs().map(|d| d.id()).collect();
        assert_eq!(selected, vec![1, 3]);
        sheet.clear_selection();
        assert_eq!(sheet.selected_designs().count(), 0);
    }

    #[test]
    fn test_clusters() {
        let mut sheet = sample();
        let id = sheet.clusters_mut().add("fast");
        sheet.assign_cluster(&[2], Some(id)).unwrap();
        assert_eq!(sheet.designs()[2].cluster(), Some(id));
        assert!(sheet.assign_cluster(&[0], Some(id + 1)).is_err());

        sheet.remove_cluster(id).unwrap();
        assert_eq!(sheet.designs()[2].cluster(), None);
        sheet.validate().unwrap();
    }

    #[test]
    fn test_validate_detects_arity_mismatch() {
        let mut sheet = sample();
        sheet.designs[0].values_mut().pop();
        assert!(sheet.validate().is_err());
    }
}
