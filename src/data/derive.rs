//! Cross-rate derivation
//!
//! A cross-rate is the ratio of two rates sharing a currency:
//! `EUR/USD = (EUR/PLN) / (USD/PLN)`.

use super::table::RateTable;
use crate::error::{RatesError, Result};
use serde::{Deserialize, Serialize};

/// A configured derivation: `output = numerator / denominator`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedRate {
    pub numerator: String,
    pub denominator: String,
    pub output: String,
}

impl DerivedRate {
    pub fn new(
        numerator: impl Into<String>,
        denominator: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            numerator: numerator.into(),
            denominator: denominator.into(),
            output: output.into(),
        }
    }
}

/// Divide two present rates; missing operands and zero denominators give `None`
fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => {
            let value = n / d;
            value.is_finite().then_some(value)
        }
        _ => None,
    }
}

/// Add `output = numerator / denominator` to `table`
///
/// Fails only when an input column is absent. An existing `output` column
/// is replaced.
pub fn derive_in_place(
    table: &mut RateTable,
    numerator: &str,
    denominator: &str,
    output: &str,
) -> Result<()> {
    let num = table
        .column(numerator)
        .ok_or_else(|| RatesError::ColumnNotFound(numerator.to_string()))?;
    let den = table
        .column(denominator)
        .ok_or_else(|| RatesError::ColumnNotFound(denominator.to_string()))?;

    let values: Vec<Option<f64>> = num
        .iter()
        .zip(den.iter())
        .map(|(n, d)| ratio(*n, *d))
        .collect();

    log::debug!("Derived {} = {} / {}", output, numerator, denominator);
    table.set_column(output, values)
}

/// Same as [`derive_in_place`] but leaves `table` untouched and returns a copy
pub fn derive(
    table: &RateTable,
    numerator: &str,
    denominator: &str,
    output: &str,
) -> Result<RateTable> {
    let mut derived = table.clone();
    derive_in_place(&mut derived, numerator, denominator, output)?;
    Ok(derived)
}

/// Apply every configured derivation in order
pub fn derive_all(table: &mut RateTable, rates: &[DerivedRate]) -> Result<()> {
    for rate in rates {
        derive_in_place(table, &rate.numerator, &rate.denominator, &rate.output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::RateSeries;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn table() -> RateTable {
        RateTable::concat(&[
            RateSeries::new("CHF/PLN", vec![(d(2), 4.0), (d(3), 4.1)]).unwrap(),
            RateSeries::new("USD/PLN", vec![(d(2), 4.2), (d(4), 4.3)]).unwrap(),
            RateSeries::new("EUR/PLN", vec![(d(2), 4.5), (d(3), 4.6), (d(4), 4.4)]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_derive_in_place() {
        let mut t = table();
        derive_in_place(&mut t, "EUR/PLN", "USD/PLN", "EUR/USD").unwrap();
        derive_in_place(&mut t, "CHF/PLN", "USD/PLN", "CHF/USD").unwrap();

        assert_relative_eq!(t.value("EUR/USD", d(2)).unwrap(), 4.5 / 4.2);
        assert_relative_eq!(t.value("CHF/USD", d(2)).unwrap(), 4.0 / 4.2, epsilon = 1e-12);
        assert_relative_eq!(t.value("EUR/USD", d(4)).unwrap(), 4.4 / 4.3);
        assert_eq!(
            t.column_names(),
            vec!["CHF/PLN", "USD/PLN", "EUR/PLN", "EUR/USD", "CHF/USD"]
        );
    }

    #[test]
    fn test_missing_operand_yields_none() {
        let mut t = table();
        derive_in_place(&mut t, "CHF/PLN", "USD/PLN", "CHF/USD").unwrap();
        // USD missing on the 3rd, CHF missing on the 4th
        assert_eq!(t.value("CHF/USD", d(3)), None);
        assert_eq!(t.value("CHF/USD", d(4)), None);
    }

    #[test]
    fn test_zero_denominator_yields_none() {
        assert_eq!(ratio(Some(1.0), Some(0.0)), None);
        assert_eq!(ratio(None, Some(2.0)), None);
        assert_eq!(ratio(Some(1.0), Some(2.0)), Some(0.5));
    }

    #[test]
    fn test_derive_copy_leaves_original() {
        let t = table();
        let derived = derive(&t, "EUR/PLN", "USD/PLN", "EUR/USD").unwrap();
        assert!(!t.has_column("EUR/USD"));
        assert!(derived.has_column("EUR/USD"));
        assert_eq!(derived.num_columns(), t.num_columns() + 1);
    }

    #[test]
    fn test_unknown_column() {
        let mut t = table();
        let err = derive_in_place(&mut t, "GBP/PLN", "USD/PLN", "GBP/USD").unwrap_err();
        assert!(matches!(err, RatesError::ColumnNotFound(ref c) if c == "GBP/PLN"));
        assert!(!t.has_column("GBP/USD"));
    }

    #[test]
    fn test_derive_all() {
        let mut t = table();
        derive_all(
            &mut t,
            &[
                DerivedRate::new("EUR/PLN", "USD/PLN", "EUR/USD"),
                DerivedRate::new("CHF/PLN", "USD/PLN", "CHF/USD"),
            ],
        )
        .unwrap();
        assert!(t.has_column("EUR/USD"));
        assert!(t.has_column("CHF/USD"));
    }
}
