//! Parallel coordinates chart model

use serde::{Deserialize, Serialize};
use dv_core::{ChartId, Preferences};
use dv_data::{DataSheet, Design, DesignId};

use crate::axis::Axis;
use crate::ChartError;

/// Ordered axes over one data sheet.
///
/// There is one axis per parameter. Axis order is independent of the sheet's
/// parameter order. A design is visible when every active axis accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelCoordinatesChart {
    id: ChartId,
    title: String,
    axes: Vec<Axis>,
    show_only_selected: bool,
}

impl ParallelCoordinatesChart {
    /// Create a chart with an axis for every parameter, in parameter order
    pub fn new(sheet: &DataSheet, preferences: &Preferences) -> Result<Self, ChartError> {
        if sheet.parameter_count() == 0 {
            return Err(ChartError::NoParametersDefined);
        }

        let axes = sheet
            .parameters()
            .map(|p| Axis::new(sheet, p.name(), &preferences.axis))
            .collect::<Result<Vec<_>, _>>()?;

        let mut chart = Self {
            id: dv_core::new_chart_id(),
            title: "Parallel Coordinates".to_string(),
            axes,
            show_only_selected: preferences.display.show_only_selected,
        };
        chart.apply_filters(sheet)?;

        tracing::info!("Created parallel coordinates chart with {} axes", chart.axes.len());
        Ok(chart)
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn show_only_selected(&self) -> bool {
        self.show_only_selected
    }

    pub fn set_show_only_selected(&mut self, show_only_selected: bool) {
        self.show_only_selected = show_only_selected;
    }

    /// Axes in display order
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    pub fn axis_at(&self, index: usize) -> Option<&Axis> {
        self.axes.get(index)
    }

    /// Display position of the axis for `parameter`
    pub fn axis_position(&self, parameter: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.parameter_name() == parameter)
    }

    pub fn get_axis(&self, parameter: &str) -> Result<&Axis, ChartError> {
        self.axes
            .iter()
            .find(|a| a.parameter_name() == parameter)
            .ok_or_else(|| ChartError::NotFound(format!("axis '{}'", parameter)))
    }

    pub fn get_axis_mut(&mut self, parameter: &str) -> Result<&mut Axis, ChartError> {
        self.axes
            .iter_mut()
            .find(|a| a.parameter_name() == parameter)
            .ok_or_else(|| ChartError::NotFound(format!("axis '{}'", parameter)))
    }

    /// Append an axis for a parameter of `sheet`
    pub fn add_axis(&mut self, sheet: &DataSheet, parameter: &str, preferences: &Preferences) -> Result<(), ChartError> {
        if self.axis_position(parameter).is_some() {
            return Err(ChartError::AxisExists(parameter.to_string()));
        }
        let mut axis = Axis::new(sheet, parameter, &preferences.axis)?;
        axis.apply_filters(sheet)?;
        self.axes.push(axis);
        tracing::debug!("Added axis '{}'", parameter);
        Ok(())
    }

    pub fn remove_axis(&mut self, parameter: &str) -> Result<Axis, ChartError> {
        let index = self
            .axis_position(parameter)
            .ok_or_else(|| ChartError::NotFound(format!("axis '{}'", parameter)))?;
        tracing::debug!("Removed axis '{}'", parameter);
        Ok(self.axes.remove(index))
    }

    /// Move the axis at `from` to position `to`; other axes keep their state
    pub fn move_axis(&mut self, from: usize, to: usize) -> Result<(), ChartError> {
        let len = self.axes.len();
        for index in [from, to] {
            if index >= len {
                return Err(ChartError::IndexOutOfRange { index, len });
            }
        }
        let axis = self.axes.remove(from);
        self.axes.insert(to, axis);
        Ok(())
    }

    /// Whether every active axis accepts `design`
    pub fn is_design_visible(&self, sheet: &DataSheet, design: &Design) -> Result<bool, ChartError> {
        for axis in self.axes.iter().filter(|a| a.is_active()) {
            if !axis.accepts(sheet, design)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether `design` is drawn: visible, not in an inactive cluster, and
    /// selected if only selected designs are shown
    pub fn is_design_displayed(&self, sheet: &DataSheet, design: &Design) -> Result<bool, ChartError> {
        if self.show_only_selected && !design.is_selected() {
            return Ok(false);
        }
        if let Some(cluster) = design.cluster() {
            if !sheet.clusters().is_active(cluster) {
                return Ok(false);
            }
        }
        self.is_design_visible(sheet, design)
    }

    /// Ids of the visible designs, in row order
    pub fn visible_design_ids(&self, sheet: &DataSheet) -> Result<Vec<DesignId>, ChartError> {
        let mut ids = Vec::new();
        for design in sheet.designs() {
            if self.is_design_visible(sheet, design)? {
                ids.push(design.id());
            }
        }
        Ok(ids)
    }

    pub fn visible_count(&self, sheet: &DataSheet) -> Result<usize, ChartError> {
        Ok(self.visible_design_ids(sheet)?.len())
    }

    /// Refresh the filter cache of every axis
    pub fn apply_filters(&mut self, sheet: &DataSheet) -> Result<(), ChartError> {
        for axis in &mut self.axes {
            axis.apply_filters(sheet)?;
        }
        Ok(())
    }

    pub fn reset_all_filters(&mut self) {
        for axis in &mut self.axes {
            axis.reset_filters();
        }
    }

    /// Re-derive axis state after the data sheet changed.
    ///
    /// Axes of removed parameters are dropped, new parameters get an axis at
    /// the end, and every axis is synced to the data and has its filters
    /// re-applied.
    pub fn synchronize(&mut self, sheet: &DataSheet, preferences: &Preferences) -> Result<(), ChartError> {
        if sheet.parameter_count() == 0 {
            return Err(ChartError::NoParametersDefined);
        }

        let before = self.axes.len();
        self.axes.retain(|a| sheet.parameter_index(a.parameter_name()).is_some());
        let dropped = before - self.axes.len();

        let missing: Vec<String> = sheet
            .parameters()
            .filter(|p| self.axis_position(p.name()).is_none())
            .map(|p| p.name().to_string())
            .collect();
        for name in &missing {
            self.axes.push(Axis::new(sheet, name, &preferences.axis)?);
        }

        for axis in &mut self.axes {
            axis.sync_with_data(sheet)?;
            axis.apply_filters(sheet)?;
        }

        tracing::debug!(
            "Synchronized chart {}: {} axes dropped, {} added",
            self.id,
            dropped,
            missing.len()
        );
        Ok(())
    }

    /// Check that the axes cover exactly the parameters of `sheet`
    pub(crate) fn validate(&self, sheet: &DataSheet) -> Result<(), String> {
        if self.axes.len() != sheet.parameter_count() {
            return Err(format!(
                "chart {} has {} axes for {} parameters",
                self.id,
                self.axes.len(),
                sheet.parameter_count()
            ));
        }
        for (position, axis) in self.axes.iter().enumerate() {
            let name = axis.parameter_name();
            if self.axis_position(name) != Some(position) {
                return Err(format!("chart {} has two axes for '{}'", self.id, name));
            }
            let parameter = sheet
                .parameter(name)
                .map_err(|_| format!("chart {} has an axis for unknown parameter '{}'", self.id, name))?;
            if parameter.kind() != axis.kind() {
                return Err(format!("axis '{}' disagrees with its parameter's classification", name));
            }
            if let Some(categories) = axis.categories() {
                if categories.known() > parameter.category_count() {
                    return Err(format!("axis '{}' knows more categories than its parameter", name));
                }
            }
            let values = [axis.min(), axis.max(), axis.lower_filter().value(), axis.upper_filter().value()];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(format!("axis '{}' has a non-finite range or filter", name));
            }
        }
        Ok(())
    }
}
