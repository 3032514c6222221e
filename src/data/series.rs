//! Single-pair, date-indexed rate series

use crate::error::{RatesError, Result};
use chrono::NaiveDate;

/// Daily rates for exactly one instrument pair
///
/// Dates are strictly ascending and unique; every value is a positive,
/// finite rate. Both are checked on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSeries {
    name: String,
    points: Vec<(NaiveDate, f64)>,
}

impl RateSeries {
    /// Build a series, rejecting duplicate/unordered dates and invalid rates
    pub fn new(name: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(RatesError::Validation(
                "Series name has not been set".to_string(),
            ));
        }

        for window in points.windows(2) {
            let (prev, next) = (window[0].0, window[1].0);
            if next == prev {
                return Err(RatesError::MalformedData(format!(
                    "{}: duplicate date {}",
                    name, next
                )));
            }
            if next < prev {
                return Err(RatesError::MalformedData(format!(
                    "{}: dates not ascending ({} after {})",
                    name, next, prev
                )));
            }
        }

        if let Some((date, rate)) = points
            .iter()
            .find(|(_, rate)| !rate.is_finite() || *rate <= 0.0)
        {
            return Err(RatesError::MalformedData(format!(
                "{}: rate must be positive, got {} on {}",
                name, rate, date
            )));
        }

        Ok(Self { name, points })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the dates of this series, ascending
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|(date, _)| *date)
    }

    /// Rate on a given date (binary search, dates are sorted)
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |(d, _)| *d)
            .ok()
            .map(|idx| self.points[idx].1)
    }
}
