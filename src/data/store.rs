//! Delimited-file persistence for rate tables
//!
//! Files live under one data directory and are addressed by a logical file
//! name. Layout:
//!
//! ```text
//! Date;CHF/PLN;USD/PLN
//! 2024-01-02;4,0;4,2
//! 2024-01-03;;4,25
//! ```
//!
//! The first column is always `Date` (`%Y-%m-%d`). Missing values are empty
//! fields. Values use the shortest representation that parses back to the
//! same `f64`, with `.` swapped for the configured decimal marker, so a
//! write followed by a read gives back an identical table.

use super::table::{Column, RateTable};
use crate::error::{RatesError, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DATE_COLUMN: &str = "Date";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field separator and decimal marker used for a persisted table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFormat {
    pub separator: String,
    pub decimal: String,
}

impl CsvFormat {
    pub fn new(separator: impl Into<String>, decimal: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            decimal: decimal.into(),
        }
    }

    /// Check both markers are set and usable together
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(RatesError::Validation("sep has not been set".to_string()));
        }
        if self.decimal.is_empty() {
            return Err(RatesError::Validation(
                "decimal has not been set".to_string(),
            ));
        }
        if self.separator.len() != 1 || !self.separator.is_ascii() {
            return Err(RatesError::Validation(format!(
                "sep must be a single ASCII character, got '{}'",
                self.separator
            )));
        }
        if self
            .decimal
            .chars()
            .any(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            return Err(RatesError::Validation(format!(
                "decimal must not contain digits or signs, got '{}'",
                self.decimal
            )));
        }
        if self.separator == self.decimal {
            return Err(RatesError::Validation(format!(
                "sep and decimal must differ, both are '{}'",
                self.separator
            )));
        }
        Ok(())
    }

    fn delimiter(&self) -> u8 {
        self.separator.as_bytes()[0]
    }

    fn render(&self, value: Option<f64>) -> String {
        match value {
            Some(v) if self.decimal == "." => v.to_string(),
            Some(v) => v.to_string().replace('.', &self.decimal),
            None => String::new(),
        }
    }

    fn parse(&self, field: &str) -> Option<std::result::Result<f64, std::num::ParseFloatError>> {
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some(field.replace(self.decimal.as_str(), ".").parse())
    }
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self::new(",", ".")
    }
}

/// File store for full and selected rate tables
#[derive(Debug, Clone)]
pub struct RateStore {
    data_dir: PathBuf,
}

impl RateStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Physical location of a logical file name
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Persist the complete table
    pub fn write_all(&self, name: &str, table: &RateTable, format: &CsvFormat) -> Result<PathBuf> {
        validate_request(name, format)?;
        self.write_table(name, table, format)
    }

    /// Load a table previously stored with [`RateStore::write_all`]
    pub fn read_all(&self, name: &str, format: &CsvFormat) -> Result<RateTable> {
        validate_request(name, format)?;
        self.read_table(name, format)
    }

    /// Persist only `columns` that exist in `table`
    ///
    /// Requested names missing from the table are dropped silently; an empty
    /// request is rejected.
    pub fn write_selected<S: AsRef<str>>(
        &self,
        name: &str,
        table: &RateTable,
        columns: &[S],
        format: &CsvFormat,
    ) -> Result<PathBuf> {
        validate_request(name, format)?;
        if columns.is_empty() {
            return Err(RatesError::Validation(
                "No currency have been selected".to_string(),
            ));
        }

        let selected = table.select(columns);
        for requested in columns.iter().map(|c| c.as_ref()) {
            if !selected.has_column(requested) {
                log::debug!("Ignoring unknown column {} in selection", requested);
            }
        }

        self.write_table(name, &selected, format)
    }

    /// Load a table previously stored with [`RateStore::write_selected`]
    pub fn read_selected(&self, name: &str, format: &CsvFormat) -> Result<RateTable> {
        validate_request(name, format)?;
        self.read_table(name, format)
    }

    fn write_table(&self, name: &str, table: &RateTable, format: &CsvFormat) -> Result<PathBuf> {
        let mut writer = WriterBuilder::new()
            .delimiter(format.delimiter())
            .from_writer(Vec::new());

        let mut header = vec![DATE_COLUMN.to_string()];
        header.extend(table.column_names().into_iter().map(String::from));
        writer.write_record(&header)?;

        for (row, date) in table.dates().iter().enumerate() {
            let mut record = Vec::with_capacity(table.num_columns() + 1);
            record.push(date.format(DATE_FORMAT).to_string());
            record.extend(table.columns().iter().map(|c| format.render(c.values[row])));
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| RatesError::IoError(e.into_error()))?;

        let path = self.path_for(name);
        fs::create_dir_all(&self.data_dir)
            .and_then(|_| fs::write(&path, bytes))
            .map_err(|e| storage_error(&path, e))?;

        log::info!(
            "Saved {} rows x {} columns to {}",
            table.num_rows(),
            table.num_columns(),
            path.display()
        );
        Ok(path)
    }

    fn read_table(&self, name: &str, format: &CsvFormat) -> Result<RateTable> {
        let path = self.path_for(name);
        let file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                log::error!("Couldn't read file {}", path.display());
                RatesError::NotFound { path: path.clone() }
            }
            _ => read_error(&path, e),
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(format.delimiter())
            .has_headers(true)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        match headers.get(0) {
            Some(DATE_COLUMN) => {}
            other => {
                return Err(RatesError::MalformedData(format!(
                    "{}: first column must be {}, found {:?}",
                    path.display(),
                    DATE_COLUMN,
                    other
                )))
            }
        }

        let mut index: Vec<NaiveDate> = Vec::new();
        let mut columns: Vec<Column> = headers
            .iter()
            .skip(1)
            .map(|name| Column {
                name: name.to_string(),
                values: Vec::new(),
            })
            .collect();

        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let date_str = record.get(0).unwrap_or_default();
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|_| {
                RatesError::MalformedData(format!(
                    "{}:{}: invalid date '{}'",
                    path.display(),
                    line,
                    date_str
                ))
            })?;
            index.push(date);

            for (pos, column) in columns.iter_mut().enumerate() {
                let field = record.get(pos + 1).unwrap_or_default();
                let value = format
                    .parse(field)
                    .transpose()
                    .map_err(|_| {
                        RatesError::MalformedData(format!(
                            "{}:{}: invalid value '{}' in column {}",
                            path.display(),
                            line,
                            field,
                            column.name
                        ))
                    })?;
                column.values.push(value);
            }
        }

        log::debug!("Read {} rows from {}", index.len(), path.display());
        RateTable::from_parts(index, columns)
    }
}

/// Reject empty names/markers before touching the filesystem
fn validate_request(name: &str, format: &CsvFormat) -> Result<()> {
    validate_file_name(name)?;
    format.validate()
}

/// A logical file name must be set and stay inside the data directory
pub(crate) fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RatesError::Validation(
            "file_name has not been set".to_string(),
        ));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(RatesError::Validation(format!(
            "file_name must be a plain file name, got '{}'",
            name
        )));
    }
    Ok(())
}

fn read_error(path: &Path, error: std::io::Error) -> RatesError {
    log::error!("Couldn't open {} for reading: {}", path.display(), error);
    RatesError::IoError(error)
}

fn storage_error(path: &Path, error: std::io::Error) -> RatesError {
    if error.kind() == ErrorKind::PermissionDenied {
        log::error!(
            "CRITICAL: Program was not permitted to save/overwrite file {}",
            path.display()
        );
        RatesError::StorageAccess {
            path: path.to_path_buf(),
        }
    } else {
        RatesError::IoError(error)
    }
}
