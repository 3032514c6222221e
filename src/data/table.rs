//! Multi-column rate table sharing one date index
//!
//! A [`RateTable`] is the outer join of several [`RateSeries`] on their
//! dates. Dates a series does not cover show up as `None` in its column.
//! Column order is insertion order, so tables built from the same inputs
//! always serialize identically.

use super::series::RateSeries;
use crate::error::{RatesError, Result};
use chrono::NaiveDate;
use hashbrown::HashMap;
use std::collections::BTreeSet;

/// One named column of a table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Date-indexed table of exchange rates, one column per instrument pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    index: Vec<NaiveDate>,
    columns: Vec<Column>,
    /// Column name -> position in `columns`
    positions: HashMap<String, usize>,
}

impl RateTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an index and columns, validating shape
    pub fn from_parts(index: Vec<NaiveDate>, columns: Vec<Column>) -> Result<Self> {
        if let Some(window) = index.windows(2).find(|w| w[1] <= w[0]) {
            return Err(RatesError::MalformedData(format!(
                "Date index must be strictly ascending ({} followed by {})",
                window[0], window[1]
            )));
        }

        let mut table = Self {
            index,
            columns: Vec::with_capacity(columns.len()),
            positions: HashMap::with_capacity(columns.len()),
        };
        for column in columns {
            if table.positions.contains_key(&column.name) {
                return Err(RatesError::Validation(format!(
                    "Duplicate column name: {}",
                    column.name
                )));
            }
            table.set_column(column.name, column.values)?;
        }
        Ok(table)
    }

    /// Outer-join series on their dates
    ///
    /// Columns appear in the order of `series`. Two series with the same
    /// name are rejected.
    pub fn concat(series: &[RateSeries]) -> Result<Self> {
        let index: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.dates())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = series
            .iter()
            .map(|s| Column {
                name: s.name().to_string(),
                values: index.iter().map(|date| s.get(*date)).collect(),
            })
            .collect();

        Self::from_parts(index, columns)
    }

    /// Insert a column, replacing any existing column with the same name
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(RatesError::Validation(
                "Column name has not been set".to_string(),
            ));
        }
        if values.len() != self.index.len() {
            return Err(RatesError::Validation(format!(
                "Column {} has {} values, index has {} dates",
                name,
                values.len(),
                self.index.len()
            )));
        }

        match self.positions.get(&name) {
            Some(&pos) => self.columns[pos].values = values,
            None => {
                self.positions.insert(name.clone(), self.columns.len());
                self.columns.push(Column { name, values });
            }
        }
        Ok(())
    }

    /// Project onto the requested columns that exist, keeping table order
    ///
    /// Names not present in the table are ignored.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Self {
        let wanted: BTreeSet<&str> = columns.iter().map(|c| c.as_ref()).collect();
        let kept: Vec<Column> = self
            .columns
            .iter()
            .filter(|c| wanted.contains(c.name.as_str()))
            .cloned()
            .collect();

        let positions = kept
            .iter()
            .enumerate()
            .map(|(pos, c)| (c.name.clone(), pos))
            .collect();

        Self {
            index: self.index.clone(),
            columns: kept,
            positions,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Values of a column, aligned with [`RateTable::dates`]
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.positions
            .get(name)
            .map(|&pos| self.columns[pos].values.as_slice())
    }

    /// Single cell lookup; `None` if the column, date or value is missing
    pub fn value(&self, name: &str, date: NaiveDate) -> Option<f64> {
        let row = self.index.binary_search(&date).ok()?;
        self.column(name)?[row]
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty() || self.columns.is_empty()
    }
}
