//! # rusty-rates
//!
//! Daily exchange rates from the National Bank of Poland, normalized into one
//! date-indexed table, extended with derived cross-rates and cached as a
//! delimited text file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rusty_rates::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let config = RatesConfig::load(None)?;
//! let client = NbpRateClient::new(&config.source)?;
//! let rates = ExchangeRates::new(client, config)?;
//!
//! let table = rates.get_selected(&["EUR/USD", "USD/PLN"]).await?;
//! for stats in table.describe() {
//!     println!("{}: mean {:.4}", stats.column, stats.mean);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod currency;
pub mod data;
pub mod error;
pub mod rates;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::config::RatesConfig;
    pub use crate::currency::{CurrencyCode, CurrencyPair};
    pub use crate::data::{
        ColumnStats, CsvFormat, DerivedRate, NbpRateClient, RateSeries, RateSource, RateStore,
        RateTable, RawRateResponse,
    };
    pub use crate::error::{RatesError, Result};
    pub use crate::rates::ExchangeRates;
}
