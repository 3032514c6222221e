//! Exchange-rate data handling
//!
//! Leaf-first: [`sources`] fetch raw responses, [`normalize`] turns each
//! into a [`RateSeries`], [`RateTable::concat`] joins them, [`derive`] adds
//! cross-rates and [`store`] persists the result.

pub mod derive;
pub mod normalize;
pub mod series;
pub mod sources;
pub mod stats;
pub mod store;
pub mod table;

pub use derive::{derive, derive_all, derive_in_place, DerivedRate};
pub use normalize::normalize;
pub use series::RateSeries;
pub use sources::{NbpRateClient, RateSource, RawRateResponse};
pub use stats::ColumnStats;
pub use store::{CsvFormat, RateStore};
pub use table::{Column, RateTable};
