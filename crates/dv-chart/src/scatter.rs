//! Two-parameter scatter chart

use serde::{Deserialize, Serialize};
use dv_core::ChartId;
use dv_data::DataSheet;

use crate::ChartError;

/// Scatter chart over two parameters. It carries no axis or filter state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterChart2D {
    id: ChartId,
    title: String,
    x_parameter: String,
    y_parameter: String,
}

impl ScatterChart2D {
    /// Create a scatter chart over the first two parameters of `sheet`
    pub fn new(sheet: &DataSheet) -> Result<Self, ChartError> {
        let (x, y) = default_pair(sheet)?;
        Ok(Self {
            id: dv_core::new_chart_id(),
            title: "Scatter".to_string(),
            x_parameter: x,
            y_parameter: y,
        })
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

    pub fn x_parameter(&self) -> &str {
        &self.x_parameter
    }

    pub fn y_parameter(&self) -> &str {
        &self.y_parameter
    }

    /// Plot `x` against `y`; both must be parameters of `sheet`
    pub fn set_parameters(&mut self, sheet: &DataSheet, x: &str, y: &str) -> Result<(), ChartError> {
        sheet.parameter(x)?;
        sheet.parameter(y)?;
        self.x_parameter = x.to_string();
        self.y_parameter = y.to_string();
        Ok(())
    }

    /// Fall back to the default pair when a plotted parameter disappeared
    pub fn synchronize(&mut self, sheet: &DataSheet) -> Result<(), ChartError> {
        let (x, y) = default_pair(sheet)?;
        if sheet.parameter_index(&self.x_parameter).is_none() {
            self.x_parameter = x;
        }
        if sheet.parameter_index(&self.y_parameter).is_none() {
            self.y_parameter = y;
        }
        Ok(())
    }

    pub(crate) fn validate(&self, sheet: &DataSheet) -> Result<(), String> {
        for name in [&self.x_parameter, &self.y_parameter] {
            if sheet.parameter_index(name).is_none() {
                return Err(format!("scatter chart {} plots unknown parameter '{}'", self.id, name));
            }
        }
        Ok(())
    }
}

fn default_pair(sheet: &DataSheet) -> Result<(String, String), ChartError> {
    let first = sheet.parameter_at(0).ok_or(ChartError::NoParametersDefined)?;
    let second = sheet.parameter_at(1).unwrap_or(first);
    Ok((first.name().to_string(), second.name().to_string()))
}
