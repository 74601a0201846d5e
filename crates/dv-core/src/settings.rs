//! Application preferences
//!
//! A single `Preferences` value is created at start-up and passed by
//! reference to everything that needs it. Nothing in the workspace reaches
//! for a global instance.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Smallest tic count an axis accepts
pub const MIN_TIC_COUNT: u32 = 2;

/// Application preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// How delimited files are turned into parameters and designs
    pub import: ImportSettings,

    /// Initial state of newly created axes
    pub axis: AxisDefaults,

    /// Which designs a chart displays
    pub display: DisplaySettings,
}

/// Import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Field delimiter of imported files
    pub delimiter: char,

    /// Whether the first row holds parameter names
    pub has_headers: bool,

    /// Locale used to parse numbers
    pub locale: NumberLocale,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_headers: true,
            locale: NumberLocale::default(),
        }
    }
}

/// Decimal and grouping symbols of a number locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberLocale {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl NumberLocale {
    /// `1,234.5`
    pub const fn english() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }

    /// `1.234,5`
    pub const fn german() -> Self {
        Self {
            decimal_separator: ',',
            grouping_separator: '.',
        }
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::english()
    }
}

/// Defaults applied to every new axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisDefaults {
    pub tic_count: u32,
    pub auto_fit: bool,
    pub active: bool,
    pub inverted: bool,
}

impl Default for AxisDefaults {
    fn default() -> Self {
        Self {
            tic_count: 11,
            auto_fit: true,
            active: true,
            inverted: false,
        }
    }
}

impl AxisDefaults {
    /// Tic count with the lower limit applied
    pub fn effective_tic_count(&self) -> u32 {
        self.tic_count.max(MIN_TIC_COUNT)
    }
}

/// Display settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Only display designs that are currently selected
    pub show_only_selected: bool,
}

impl Preferences {
    /// Load preferences from a JSON file, falling back to defaults when the
    /// file does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No preferences at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences from {}", path.display()))?;
        let preferences = serde_json::from_str(&text)
            .with_context(|| format!("Invalid preferences file {}", path.display()))?;

        tracing::info!("Loaded preferences from {}", path.display());
        Ok(preferences)
    }

    /// Save preferences as pretty-printed JSON
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write preferences to {}", path.display()))?;
        Ok(())
    }
}
