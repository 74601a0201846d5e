use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use dv_core::ImportSettings;

use crate::sheet::{DataSheet, UpdateSummary};
use crate::DataError;

/// Delimited text file feeding a data sheet
pub struct CsvSource {
    /// Path to the file
    path: PathBuf,
    /// Delimiter, header and locale settings
    settings: ImportSettings,
}

impl CsvSource {
    /// Create a source for `path` read with `settings`
    pub fn new(path: impl Into<PathBuf>, settings: ImportSettings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record of the file as raw strings.
    ///
    /// Records of differing length are passed through unchanged so that the
    /// data sheet can report them.
    pub fn read_rows(&self) -> Result<Vec<Vec<String>>, DataError> {
        let file = File::open(&self.path)?;
        let rows = Self::rows_from_reader(BufReader::new(file), self.settings.delimiter)?;
        tracing::debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    /// Read raw rows from any reader
    pub fn rows_from_reader<R: Read>(reader: R, delimiter: char) -> Result<Vec<Vec<String>>, DataError> {
        if !delimiter.is_ascii() {
            return Err(DataError::Csv(format!("delimiter '{}' is not ASCII", delimiter)));
        }

        let mut csv_reader = ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }
        Ok(rows)
    }

    /// Build a new data sheet from the file
    pub fn load(&self) -> Result<DataSheet, DataError> {
        let rows = self.read_rows()?;
        DataSheet::from_rows(&rows, self.settings.has_headers, &self.settings.locale)
    }

    /// Update `sheet` from the current content of the file
    pub fn update(&self, sheet: &mut DataSheet) -> Result<UpdateSummary, DataError> {
        let rows = self.read_rows()?;
        sheet.update_from(&rows, self.settings.has_headers, &self.settings.locale)
    }

    /// Source name for display
    pub fn source_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
    }
}
