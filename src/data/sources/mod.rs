//! Remote quote sources
//!
//! A [`RateSource`] returns the raw, undecoded-by-us JSON object the remote
//! service sends for one currency. Shape checks happen later, in
//! [`crate::data::normalize`].
//!
//! - NBP: National Bank of Poland exchange-rate API (table A mid rates)

pub mod nbp;

pub use nbp::NbpRateClient;

use crate::currency::CurrencyCode;
use crate::error::Result;
use std::future::Future;

/// Decoded top-level JSON object for one currency
pub type RawRateResponse = serde_json::Map<String, serde_json::Value>;

/// Trait for remote rate sources
pub trait RateSource: Send + Sync {
    /// Fetch the trailing `lookback_days` of quotes for one currency
    fn fetch(
        &self,
        code: &CurrencyCode,
        lookback_days: u32,
    ) -> impl Future<Output = Result<RawRateResponse>> + Send;

    /// Get the source name
    fn name(&self) -> &str;
}
