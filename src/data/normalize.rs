//! Reshape one raw quote-source response into a [`RateSeries`]

use super::series::RateSeries;
use super::sources::RawRateResponse;
use crate::currency::{CurrencyCode, CurrencyPair};
use crate::error::{RatesError, Result};
use chrono::NaiveDate;
use hashbrown::HashSet;
use serde::Deserialize;

/// Top-level fields every response must carry, no more and no less
pub const EXPECTED_FIELDS: [&str; 4] = ["table", "currency", "code", "rates"];

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct RatesPayload {
    code: String,
    rates: Vec<RateRecord>,
}

#[derive(Debug, Deserialize)]
struct RateRecord {
    #[serde(rename = "effectiveDate")]
    effective_date: String,
    mid: f64,
}

/// Check the response carries exactly [`EXPECTED_FIELDS`], in any order
pub fn check_fields(raw: &RawRateResponse) -> Result<()> {
    let actual: HashSet<&str> = raw.keys().map(String::as_str).collect();
    let expected: HashSet<&str> = EXPECTED_FIELDS.iter().copied().collect();

    if actual != expected {
        let mut expected: Vec<String> = EXPECTED_FIELDS.iter().map(|f| f.to_string()).collect();
        let mut actual: Vec<String> = raw.keys().cloned().collect();
        expected.sort();
        actual.sort();
        return Err(RatesError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Convert a raw response into a series named `<CODE>/<BASE>`
pub fn normalize(raw: &RawRateResponse, base: &CurrencyCode) -> Result<RateSeries> {
    check_fields(raw)?;

    let payload: RatesPayload = serde_json::from_value(serde_json::Value::Object(raw.clone()))
        .map_err(|e| RatesError::MalformedData(format!("Unexpected rate payload: {}", e)))?;

    let pair = CurrencyPair::new(CurrencyCode::new(&payload.code)?, base.clone());

    let points = payload
        .rates
        .into_iter()
        .map(|record| {
            let date = NaiveDate::parse_from_str(&record.effective_date, DATE_FORMAT).map_err(
                |e| {
                    RatesError::MalformedData(format!(
                        "{}: invalid effectiveDate '{}': {}",
                        pair, record.effective_date, e
                    ))
                },
            )?;
            Ok((date, record.mid))
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!("Normalized {} rates for {}", points.len(), pair);
    RateSeries::new(pair.column_name(), points)
}
