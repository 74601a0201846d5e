//! Per-parameter range and filter state of a parallel coordinates chart

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use dv_core::settings::{AxisDefaults, MIN_TIC_COUNT};
use dv_data::{ColumnKind, DataSheet, Design, DesignId};

use crate::filter::{Admits, BoundKind, CategoryFilter, Filter};
use crate::ChartError;

/// Range used when a numeric parameter has no designs to fit to
const EMPTY_RANGE: (f64, f64) = (0.0, 1.0);

/// Display range and filter window for one parameter.
///
/// The axis refers to its parameter by name and looks values up through the
/// data sheet, which stays the owner of the parameter. Two independent modes
/// shape its behaviour: `auto_fit` decides where `min`/`max` come from and
/// `inverted` turns the filter window from "keep the inside" into "keep the
/// outside".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    parameter: String,
    kind: ColumnKind,
    min: f64,
    max: f64,
    auto_fit: bool,
    inverted: bool,
    active: bool,
    tic_count: u32,
    upper_filter: Filter,
    lower_filter: Filter,
    categories: Option<CategoryFilter>,

    /// Designs outside the filter window as of the last `apply_filters`.
    /// A snapshot for callers that poll; visibility queries evaluate the
    /// filters directly and never read it.
    #[serde(skip)]
    rejected: AHashSet<DesignId>,
}

impl Axis {
    /// Create an axis for the named parameter of `sheet`
    pub fn new(sheet: &DataSheet, parameter: &str, defaults: &AxisDefaults) -> Result<Self, ChartError> {
        let param = sheet.parameter(parameter)?;
        let (min, max, categories) = match param.kind() {
            ColumnKind::Numeric => {
                let (min, max) = sheet.numeric_range(parameter)?.unwrap_or(EMPTY_RANGE);
                (min, max, None)
            }
            ColumnKind::Discrete => {
                let count = param.category_count();
                (0.0, category_max(count), Some(CategoryFilter::all(count)))
            }
        };

        let mut axis = Self {
            parameter: parameter.to_string(),
            kind: param.kind(),
            min,
            max,
            auto_fit: defaults.auto_fit,
            inverted: defaults.inverted,
            active: defaults.active,
            tic_count: defaults.effective_tic_count(),
            upper_filter: Filter::new(BoundKind::Upper, max),
            lower_filter: Filter::new(BoundKind::Lower, min),
            categories,
            rejected: AHashSet::new(),
        };
        axis.reset_filters();
        Ok(axis)
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_auto_fit(&self) -> bool {
        self.auto_fit
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tic_count(&self) -> u32 {
        self.tic_count
    }

    pub fn upper_filter(&self) -> &Filter {
        &self.upper_filter
    }

    pub fn lower_filter(&self) -> &Filter {
        &self.lower_filter
    }

    /// Category selection; `None` for numeric axes
    pub fn categories(&self) -> Option<&CategoryFilter> {
        self.categories.as_ref()
    }

    /// Lower and upper end of the filter window, whichever filter holds them
    pub fn filter_window(&self) -> (f64, f64) {
        let (a, b) = (self.lower_filter.value(), self.upper_filter.value());
        (a.min(b), a.max(b))
    }

    /// Set `min`/`max` to the extrema of the parameter's current values.
    ///
    /// Filter values are left alone. Without designs the range is kept.
    pub fn autofit(&mut self, sheet: &DataSheet) -> Result<(), ChartError> {
        self.require_numeric("autofit")?;
        if let Some((min, max)) = sheet.numeric_range(&self.parameter)? {
            self.min = min;
            self.max = max;
            tracing::debug!("Autofit '{}' to [{}, {}]", self.parameter, min, max);
        }
        Ok(())
    }

    /// Switch the range source. Turning autofit on refits immediately,
    /// turning it off keeps the current range as the manual one.
    pub fn set_auto_fit(&mut self, auto_fit: bool, sheet: &DataSheet) -> Result<(), ChartError> {
        if auto_fit {
            match self.kind {
                ColumnKind::Numeric => self.autofit(sheet)?,
                ColumnKind::Discrete => self.fit_categories(sheet)?,
            }
        }
        self.auto_fit = auto_fit;
        Ok(())
    }

    /// Set a manual range; turns autofit off
    pub fn set_range(&mut self, min: f64, max: f64) -> Result<(), ChartError> {
        self.require_numeric("manual range")?;
        for value in [min, max] {
            if !value.is_finite() {
                return Err(ChartError::NonFiniteValue(value));
            }
        }
        self.min = min;
        self.max = max;
        self.auto_fit = false;
        Ok(())
    }

    /// Open the filter window to the whole range.
    ///
    /// On an inverted axis the upper filter takes `min` and the lower filter
    /// `max`; the window itself is the same either way. Discrete axes select
    /// every category.
    pub fn reset_filters(&mut self) {
        if self.inverted {
            self.upper_filter.set_unclamped(self.min);
            self.lower_filter.set_unclamped(self.max);
        } else {
            self.lower_filter.set_unclamped(self.min);
            self.upper_filter.set_unclamped(self.max);
        }
        if let Some(categories) = &mut self.categories {
            categories.select_all();
        }
    }

    /// Move one filter, clamped into the axis range. Returns the stored value.
    pub fn set_filter_value(&mut self, bound: BoundKind, value: f64) -> Result<f64, ChartError> {
        self.require_numeric("numeric filter")?;
        if !value.is_finite() {
            return Err(ChartError::NonFiniteValue(value));
        }
        let (lo, hi) = self.ordered_range();
        let filter = match bound {
            BoundKind::Upper => &mut self.upper_filter,
            BoundKind::Lower => &mut self.lower_filter,
        };
        Ok(filter.set_value(value, lo, hi))
    }

    /// Replace the category selection of a discrete axis
    pub fn select_categories(&mut self, ordinals: impl IntoIterator<Item = usize>) -> Result<(), ChartError> {
        let parameter = &self.parameter;
        let categories = self.categories.as_mut().ok_or_else(|| {
            ChartError::NotApplicable(format!("category selection on numeric axis '{}'", parameter))
        })?;
        categories.select(ordinals);
        Ok(())
    }

    /// Flip one category of a discrete axis; returns whether it is now selected
    pub fn toggle_category(&mut self, ordinal: usize) -> Result<bool, ChartError> {
        let parameter = &self.parameter;
        let categories = self.categories.as_mut().ok_or_else(|| {
            ChartError::NotApplicable(format!("category selection on numeric axis '{}'", parameter))
        })?;
        Ok(categories.toggle(ordinal))
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    /// Inactive axes let every design through
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_tic_count(&mut self, tic_count: u32) {
        self.tic_count = tic_count.max(MIN_TIC_COUNT);
    }

    /// Whether a stored design value lies inside the filter window.
    ///
    /// Numeric axes accept `low <= v <= high`, where `low`/`high` are the
    /// smaller and larger of the two filter values. Inverted axes accept
    /// `v <= low || v >= high` instead, so both ends of the window are kept
    /// in either mode. Discrete axes accept the selected categories.
    pub fn accepts_value(&self, value: f64) -> bool {
        if let Some(categories) = &self.categories {
            return value >= 0.0 && categories.accepts(value as usize);
        }

        let (low, high) = if self.lower_filter.value() <= self.upper_filter.value() {
            (&self.lower_filter, &self.upper_filter)
        } else {
            (&self.upper_filter, &self.lower_filter)
        };

        if self.inverted {
            low.accepts(value, Admits::AtOrBelow) || high.accepts(value, Admits::AtOrAbove)
        } else {
            low.accepts(value, Admits::AtOrAbove) && high.accepts(value, Admits::AtOrBelow)
        }
    }

    /// Whether `design` lies inside the filter window
    pub fn accepts(&self, sheet: &DataSheet, design: &Design) -> Result<bool, ChartError> {
        let index = self.parameter_index(sheet)?;
        let value = design.value(index).ok_or_else(|| {
            ChartError::NotFound(format!("value of design {} for '{}'", design.id(), self.parameter))
        })?;
        Ok(self.accepts_value(value))
    }

    /// Recompute which designs of `sheet` lie outside the filter window.
    /// Returns the number of rejected designs.
    pub fn apply_filters(&mut self, sheet: &DataSheet) -> Result<usize, ChartError> {
        let index = self.parameter_index(sheet)?;
        self.rejected = sheet
            .designs()
            .iter()
            .filter(|d| d.value(index).map_or(true, |v| !self.accepts_value(v)))
            .map(Design::id)
            .collect();
        Ok(self.rejected.len())
    }

    /// Whether a design was outside the window at the last `apply_filters`.
    ///
    /// Filter changes since then are not reflected until the next
    /// `apply_filters`; use [`Axis::accepts`] for the live answer.
    pub fn is_filtered(&self, id: DesignId) -> bool {
        self.rejected.contains(&id)
    }

    /// Bring range and filters in line with changed data.
    ///
    /// An autofit range is recomputed. A filter sitting exactly on an end of
    /// the old range moves to the same end of the new one; other filters are
    /// clamped into the new range. Discrete axes pick up new categories and
    /// select them.
    pub fn sync_with_data(&mut self, sheet: &DataSheet) -> Result<(), ChartError> {
        let param = sheet.parameter(&self.parameter)?;
        if param.kind() != self.kind {
            // Only a sheet that held no values can be reclassified
            let defaults = AxisDefaults {
                tic_count: self.tic_count,
                auto_fit: self.auto_fit,
                active: self.active,
                inverted: self.inverted,
            };
            *self = Axis::new(sheet, &self.parameter, &defaults)?;
            tracing::debug!("Rebuilt axis '{}' as {:?}", self.parameter, self.kind);
            return Ok(());
        }

        let (old_lo, old_hi) = self.ordered_range();
        match self.kind {
            ColumnKind::Numeric if self.auto_fit => self.autofit(sheet)?,
            ColumnKind::Numeric => {}
            ColumnKind::Discrete => {
                if let Some(categories) = &mut self.categories {
                    categories.extend_to(param.category_count());
                }
                if self.auto_fit {
                    self.fit_categories(sheet)?;
                }
            }
        }

        let (lo, hi) = self.ordered_range();
        if (lo, hi) != (old_lo, old_hi) {
            let lower_holds_low = match self.lower_filter.value().partial_cmp(&self.upper_filter.value()) {
                Some(std::cmp::Ordering::Less) => true,
                Some(std::cmp::Ordering::Greater) => false,
                _ => !self.inverted,
            };
            let (low_end, high_end) = if lower_holds_low {
                (&mut self.lower_filter, &mut self.upper_filter)
            } else {
                (&mut self.upper_filter, &mut self.lower_filter)
            };

            let low = low_end.value();
            low_end.set_unclamped(if low == old_lo {
                lo
            } else if low == old_hi {
                hi
            } else {
                low.clamp(lo, hi)
            });

            let high = high_end.value();
            high_end.set_unclamped(if high == old_hi {
                hi
            } else if high == old_lo {
                lo
            } else {
                high.clamp(lo, hi)
            });
        }
        Ok(())
    }

    fn fit_categories(&mut self, sheet: &DataSheet) -> Result<(), ChartError> {
        let count = sheet.parameter(&self.parameter)?.category_count();
        self.min = 0.0;
        self.max = category_max(count);
        Ok(())
    }

    fn ordered_range(&self) -> (f64, f64) {
        (self.min.min(self.max), self.min.max(self.max))
    }

    fn parameter_index(&self, sheet: &DataSheet) -> Result<usize, ChartError> {
        sheet
            .parameter_index(&self.parameter)
            .ok_or_else(|| ChartError::NotFound(format!("parameter '{}'", self.parameter)))
    }

    fn require_numeric(&self, operation: &str) -> Result<(), ChartError> {
        if self.is_numeric() {
            Ok(())
        } else {
            Err(ChartError::NotApplicable(format!(
                "{} on discrete axis '{}'",
                operation, self.parameter
            )))
        }
    }
}

fn category_max(count: usize) -> f64 {
    count.saturating_sub(1) as f64
}
