//! Sources that turn files into raw rows for import and update

pub mod csv_source;

pub use csv_source::CsvSource;
