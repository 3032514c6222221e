//! Per-column summary statistics (mean, median, extremes with their dates)

use super::table::RateTable;
use chrono::NaiveDate;
use statrs::statistics::{Data, Distribution, Median};

/// Summary of the present values of one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// First date holding the minimum
    pub min: (NaiveDate, f64),
    /// First date holding the maximum
    pub max: (NaiveDate, f64),
}

impl ColumnStats {
    /// Summarize one column; `None` if absent or without any value
    pub fn compute(table: &RateTable, column: &str) -> Option<Self> {
        let present: Vec<(NaiveDate, f64)> = table
            .dates()
            .iter()
            .zip(table.column(column)?)
            .filter_map(|(date, value)| value.map(|v| (*date, v)))
            .collect();

        let first = *present.first()?;
        let (min, max) = present.iter().skip(1).fold((first, first), |(lo, hi), &p| {
            (
                if p.1 < lo.1 { p } else { lo },
                if p.1 > hi.1 { p } else { hi },
            )
        });

        let data = Data::new(present.iter().map(|(_, v)| *v).collect::<Vec<f64>>());

        Some(Self {
            column: column.to_string(),
            count: present.len(),
            mean: data.mean()?,
            median: data.median(),
            min,
            max,
        })
    }
}

impl RateTable {
    /// One summary per column that has at least one value, in column order
    pub fn describe(&self) -> Vec<ColumnStats> {
        self.column_names()
            .into_iter()
            .filter_map(|name| ColumnStats::compute(self, name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::RateSeries;
    use approx::assert_relative_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    #[test]
    fn test_column_stats() {
        let table = RateTable::concat(&[RateSeries::new(
            "USD/PLN",
            vec![(d(1), 4.0), (d(2), 4.3), (d(3), 3.9), (d(4), 4.3)],
        )
        .unwrap()])
        .unwrap();

        let stats = ColumnStats::compute(&table, "USD/PLN").unwrap();
        assert_eq!(stats.count, 4);
        assert_relative_eq!(stats.mean, 4.125, epsilon = 1e-12);
        assert_relative_eq!(stats.median, 4.15, epsilon = 1e-12);
        assert_eq!(stats.min, (d(3), 3.9));
        // First occurrence wins on ties
        assert_eq!(stats.max, (d(2), 4.3));
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let table = RateTable::concat(&[
            RateSeries::new("CHF/PLN", vec![(d(1), 4.5)]).unwrap(),
            RateSeries::new("USD/PLN", vec![(d(2), 4.0), (d(3), 4.2)]).unwrap(),
        ])
        .unwrap();

        let stats = table.describe();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[1].count, 2);
        assert_relative_eq!(stats[1].mean, 4.1, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_or_empty_column() {
        let table = RateTable::concat(&[RateSeries::new("USD/PLN", Vec::new()).unwrap()]).unwrap();
        assert!(ColumnStats::compute(&table, "USD/PLN").is_none());
        assert!(ColumnStats::compute(&table, "EUR/PLN").is_none());
        assert!(table.describe().is_empty());
    }
}
