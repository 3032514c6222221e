//! Currency codes and instrument pairs

use crate::error::{RatesError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 4217 style currency code, stored upper-case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(pub(crate) String);

impl CurrencyCode {
    /// Parse a code, accepting any case ("usd", "USD")
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RatesError::Validation(format!(
                "Currency code must be 3 letters, got: '{}'",
                code
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Get ISO code (upper-case)
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Lower-case form, as used in quote source URLs
    pub fn lower(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl FromStr for CurrencyCode {
    type Err = RatesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = RatesError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Currency pair for exchange rates
///
/// `USD/PLN` means units of PLN per one USD.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
}

impl CurrencyPair {
    /// Create new currency pair
    pub fn new(base: CurrencyCode, quote: CurrencyCode) -> Self {
        Self { base, quote }
    }

    /// Column name used in rate tables, e.g. "EUR/USD"
    pub fn column_name(&self) -> String {
        self.to_string()
    }
}

impl FromStr for CurrencyPair {
    type Err = RatesError;

    /// Parse from "EUR/USD" or "EURUSD"
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((base, quote)) = s.split_once('/') {
            if quote.contains('/') {
                return Err(RatesError::Validation(format!(
                    "Invalid currency pair format: {}",
                    s
                )));
            }
            Ok(Self::new(CurrencyCode::new(base)?, CurrencyCode::new(quote)?))
        } else if s.len() == 6 && s.is_ascii() {
            Ok(Self::new(
                CurrencyCode::new(&s[0..3])?,
                CurrencyCode::new(&s[3..6])?,
            ))
        } else {
            Err(RatesError::Validation(format!(
                "Invalid currency pair format: {}",
                s
            )))
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code() {
        assert_eq!(CurrencyCode::new("usd").unwrap().code(), "USD");
        assert_eq!(CurrencyCode::new(" EUR ").unwrap().code(), "EUR");
        assert_eq!(CurrencyCode::new("CHF").unwrap().lower(), "chf");
    }

    #[test]
    fn test_invalid_currency_code() {
        assert!(CurrencyCode::new("").is_err());
        assert!(CurrencyCode::new("US").is_err());
        assert!(CurrencyCode::new("US1").is_err());
        assert!(CurrencyCode::new("EURO").is_err());
    }

    #[test]
    fn test_currency_pair_parse() {
        let pair: CurrencyPair = "eur/usd".parse().unwrap();
        assert_eq!(pair.base.code(), "EUR");
        assert_eq!(pair.quote.code(), "USD");
        assert_eq!(pair.to_string(), "EUR/USD");

        let compact: CurrencyPair = "CHFPLN".parse().unwrap();
        assert_eq!(compact.column_name(), "CHF/PLN");
    }

    #[test]
    fn test_currency_pair_invalid() {
        assert!("EUR/USD/PLN".parse::<CurrencyPair>().is_err());
        assert!("EURUS".parse::<CurrencyPair>().is_err());
        assert!("ZZZ".parse::<CurrencyPair>().is_err());
    }

    #[test]
    fn test_code_serde() {
        let code: CurrencyCode = serde_json::from_str("\"chf\"").unwrap();
        assert_eq!(code.code(), "CHF");
        assert!(serde_json::from_str::<CurrencyCode>("\"chfx\"").is_err());
    }
}
