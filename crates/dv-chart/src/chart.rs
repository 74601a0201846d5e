//! Chart variants and the set of charts over one data sheet

use serde::{Deserialize, Serialize};
use dv_core::{ChartId, Preferences};
use dv_data::{DataSheet, Parameter};

use crate::parallel_coordinates::ParallelCoordinatesChart;
use crate::scatter::ScatterChart2D;
use crate::ChartError;

/// A chart of any kind. Only parallel coordinates charts carry axis and
/// filter state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Chart {
    ParallelCoordinates(ParallelCoordinatesChart),
    Scatter2D(ScatterChart2D),
}

impl Chart {
    pub fn id(&self) -> ChartId {
        match self {
            Chart::ParallelCoordinates(chart) => chart.id(),
            Chart::Scatter2D(chart) => chart.id(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Chart::ParallelCoordinates(chart) => chart.title(),
            Chart::Scatter2D(chart) => chart.title(),
        }
    }

    pub fn as_parallel_coordinates(&self) -> Option<&ParallelCoordinatesChart> {
        match self {
            Chart::ParallelCoordinates(chart) => Some(chart),
            Chart::Scatter2D(_) => None,
        }
    }

    pub fn as_parallel_coordinates_mut(&mut self) -> Option<&mut ParallelCoordinatesChart> {
        match self {
            Chart::ParallelCoordinates(chart) => Some(chart),
            Chart::Scatter2D(_) => None,
        }
    }

    /// Re-derive chart state after the data sheet changed
    pub fn synchronize(&mut self, sheet: &DataSheet, preferences: &Preferences) -> Result<(), ChartError> {
        match self {
            Chart::ParallelCoordinates(chart) => chart.synchronize(sheet, preferences),
            Chart::Scatter2D(chart) => chart.synchronize(sheet),
        }
    }

    pub(crate) fn validate(&self, sheet: &DataSheet) -> Result<(), String> {
        match self {
            Chart::ParallelCoordinates(chart) => chart.validate(sheet),
            Chart::Scatter2D(chart) => chart.validate(sheet),
        }
    }
}

impl From<ParallelCoordinatesChart> for Chart {
    fn from(chart: ParallelCoordinatesChart) -> Self {
        Chart::ParallelCoordinates(chart)
    }
}

impl From<ScatterChart2D> for Chart {
    fn from(chart: ScatterChart2D) -> Self {
        Chart::Scatter2D(chart)
    }
}

/// All charts open on one data sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    charts: Vec<Chart>,
}

impl ChartSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chart and return its id
    pub fn add(&mut self, chart: impl Into<Chart>) -> ChartId {
        let chart = chart.into();
        let id = chart.id();
        tracing::debug!("Added chart '{}' ({})", chart.title(), id);
        self.charts.push(chart);
        id
    }

    pub fn remove(&mut self, id: ChartId) -> Result<Chart, ChartError> {
        let index = self
            .charts
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| ChartError::NotFound(format!("chart {}", id)))?;
        Ok(self.charts.remove(index))
    }

    pub fn get(&self, id: ChartId) -> Result<&Chart, ChartError> {
        self.charts
            .iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| ChartError::NotFound(format!("chart {}", id)))
    }

    pub fn get_mut(&mut self, id: ChartId) -> Result<&mut Chart, ChartError> {
        self.charts
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| ChartError::NotFound(format!("chart {}", id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chart> {
        self.charts.iter()
    }

    pub fn parallel_coordinates(&self) -> impl Iterator<Item = &ParallelCoordinatesChart> {
        self.charts.iter().filter_map(Chart::as_parallel_coordinates)
    }

    pub fn parallel_coordinates_mut(&mut self) -> impl Iterator<Item = &mut ParallelCoordinatesChart> {
        self.charts.iter_mut().filter_map(Chart::as_parallel_coordinates_mut)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Re-derive the state of every chart after the data sheet changed
    pub fn synchronize(&mut self, sheet: &DataSheet, preferences: &Preferences) -> Result<(), ChartError> {
        for chart in &mut self.charts {
            chart.synchronize(sheet, preferences)?;
        }
        Ok(())
    }

    /// Refresh the filter caches of every parallel coordinates chart
    pub fn apply_filters(&mut self, sheet: &DataSheet) -> Result<(), ChartError> {
        for chart in self.parallel_coordinates_mut() {
            chart.apply_filters(sheet)?;
        }
        Ok(())
    }

    /// Move the axis of `parameter` to position `to` in every parallel
    /// coordinates chart.
    ///
    /// Each chart moves its own axis; positions are checked in all charts
    /// before any of them changes.
    pub fn move_axis_everywhere(&mut self, parameter: &str, to: usize) -> Result<(), ChartError> {
        let mut moves = Vec::new();
        for (index, chart) in self.charts.iter().enumerate() {
            let Some(chart) = chart.as_parallel_coordinates() else {
                continue;
            };
            let from = chart
                .axis_position(parameter)
                .ok_or_else(|| ChartError::NotFound(format!("axis '{}' in chart {}", parameter, chart.id())))?;
            if to >= chart.axis_count() {
                return Err(ChartError::IndexOutOfRange {
                    index: to,
                    len: chart.axis_count(),
                });
            }
            moves.push((index, from));
        }

        for (index, from) in moves {
            if let Some(chart) = self.charts[index].as_parallel_coordinates_mut() {
                chart.move_axis(from, to)?;
            }
        }
        tracing::debug!("Moved axis '{}' to {} in all charts", parameter, to);
        Ok(())
    }

    /// Remove a parameter from the sheet and bring every chart in line
    pub fn remove_parameter(&mut self, sheet: &mut DataSheet, name: &str, preferences: &Preferences) -> Result<Parameter, ChartError> {
        if sheet.parameter_count() == 1 && sheet.parameter_index(name).is_some() && !self.is_empty() {
            return Err(ChartError::NoParametersDefined);
        }
        let parameter = sheet.remove_parameter(name)?;
        self.synchronize(sheet, preferences)?;
        Ok(parameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dv_core::NumberLocale;

    fn sheet() -> DataSheet {
        let rows: Vec<Vec<String>> = [["a", "b", "c"], ["1", "x", "3"], ["2", "y", "4"]]
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect();
        DataSheet::from_rows(&rows, true, &NumberLocale::english()).unwrap()
    }

    fn order(chart: &ParallelCoordinatesChart) -> Vec<&str> {
        chart.axes().iter().map(|a| a.parameter_name()).collect()
    }

    #[test]
    fn test_move_axis_in_each_chart() {
        let sheet = sheet();
        let prefs = Preferences::default();
        let mut charts = ChartSet::new();
        let first = charts.add(ParallelCoordinatesChart::new(&sheet, &prefs).unwrap());
        let mut other = ParallelCoordinatesChart::new(&sheet, &prefs).unwrap();
        other.move_axis(2, 0).unwrap();
        let second = charts.add(other);
        charts.add(ScatterChart2D::new(&sheet).unwrap());

        charts.move_axis_everywhere("a", 1).unwrap();

        let first = charts.get(first).unwrap().as_parallel_coordinates().unwrap();
        assert_eq!(order(first), vec!["b", "a", "c"]);
        let second = charts.get(second).unwrap().as_parallel_coordinates().unwrap();
        assert_eq!(order(second), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_move_axis_everywhere_is_all_or_nothing() {
        let sheet = sheet();
        let prefs = Preferences::default();
        let mut charts = ChartSet::new();
        charts.add(ParallelCoordinatesChart::new(&sheet, &prefs).unwrap());
        let mut short = ParallelCoordinatesChart::new(&sheet, &prefs).unwrap();
        short.remove_axis("b").unwrap();
        charts.add(short);

        let before = charts.clone();
        assert!(matches!(
            charts.move_axis_everywhere("a", 2),
            Err(ChartError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(charts, before);
    }

    #[test]
    fn test_remove_parameter_cascades() {
        let mut sheet = sheet();
        let prefs = Preferences::default();
        let mut charts = ChartSet::new();
        let pc = charts.add(ParallelCoordinatesChart::new(&sheet, &prefs).unwrap());
        let mut scatter = ScatterChart2D::new(&sheet).unwrap();
        scatter.set_parameters(&sheet, "c", "a").unwrap();
        let sc = charts.add(scatter);

        charts.remove_parameter(&mut sheet, "c", &prefs).unwrap();

        let pc = charts.get(pc).unwrap().as_parallel_coordinates().unwrap();
        assert_eq!(order(pc), vec!["a", "b"]);
        match charts.get(sc).unwrap() {
            Chart::Scatter2D(chart) => assert_eq!(chart.x_parameter(), "a"),
            other => panic!("unexpected chart {:?}", other),
        }
        assert!(charts.remove_parameter(&mut sheet, "c", &prefs).is_err());
    }

    #[test]
    fn test_cannot_remove_last_parameter_under_charts() {
        let rows = vec![vec!["only".to_string()], vec!["1".to_string()]];
        let mut sheet = DataSheet::from_rows(&rows, true, &NumberLocale::english()).unwrap();
        let prefs = Preferences::default();
        let mut charts = ChartSet::new();
        charts.add(ParallelCoordinatesChart::new(&sheet, &prefs).unwrap());

        assert!(matches!(
            charts.remove_parameter(&mut sheet, "only", &prefs),
            Err(ChartError::NoParametersDefined)
        ));
        assert_eq!(sheet.parameter_count(), 1);
    }

    #[test]
    fn test_get_and_remove() {
        let sheet = sheet();
        let mut charts = ChartSet::new();
        let id = charts.add(ScatterChart2D::new(&sheet).unwrap());
        assert_eq!(charts.len(), 1);
        assert_eq!(charts.parallel_coordinates().count(), 0);
        assert_eq!(charts.remove(id).unwrap().id(), id);
        assert!(charts.get(id).is_err());
        assert!(charts.is_empty());
    }
}
