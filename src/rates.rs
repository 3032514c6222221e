//! Refresh-and-cache orchestration
//!
//! [`ExchangeRates`] runs the whole pipeline on every call:
//!
//! 1. fetch every tracked currency from the [`RateSource`]
//! 2. normalize each response into a series
//! 3. outer-join the series into one [`RateTable`]
//! 4. add the configured cross-rates
//! 5. write the full table or a column selection through [`RateStore`]
//!
//! The `get_*` methods then read the file they just wrote, so the caller
//! always sees exactly what is cached on disk. Any failure before step 5
//! leaves existing files untouched.

use crate::config::RatesConfig;
use crate::data::derive::derive_all;
use crate::data::normalize::normalize;
use crate::data::sources::{RateSource, RawRateResponse};
use crate::data::store::{CsvFormat, RateStore};
use crate::data::table::RateTable;
use crate::error::{RatesError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Exchange-rate pipeline over a rate source and a file store
pub struct ExchangeRates<S: RateSource> {
    source: Arc<S>,
    store: RateStore,
    format: CsvFormat,
    config: RatesConfig,
}

impl<S: RateSource + 'static> ExchangeRates<S> {
    /// Create a pipeline; the configuration is validated here
    pub fn new(source: S, config: RatesConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source: Arc::new(source),
            store: RateStore::new(config.store.data_dir.clone()),
            format: config.store.format(),
            config,
        })
    }

    pub fn config(&self) -> &RatesConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &RateStore {
        &self.store
    }

    /// Columns a refresh produces, for offering a selection
    pub fn available_pairs(&self) -> Vec<String> {
        self.config.available_pairs()
    }

    /// Fetch, normalize, join and derive; nothing is persisted
    pub async fn refresh_table(&self) -> Result<RateTable> {
        let responses = self.fetch_all().await?;

        let series = responses
            .iter()
            .map(|raw| normalize(raw, &self.config.tracked.base))
            .collect::<Result<Vec<_>>>()?;

        let mut table = RateTable::concat(&series)?;
        derive_all(&mut table, &self.config.derived)?;

        log::info!(
            "Refreshed {} columns over {} dates from {}",
            table.num_columns(),
            table.num_rows(),
            self.source.name()
        );
        Ok(table)
    }

    /// Refresh and overwrite the full-table file
    pub async fn refresh_and_persist_all(&self) -> Result<PathBuf> {
        let table = self.refresh_table().await?;
        self.store
            .write_all(&self.config.store.all_file_name, &table, &self.format)
    }

    /// Refresh and overwrite the selection file with `columns`
    pub async fn refresh_and_persist_selected<C: AsRef<str>>(&self, columns: &[C]) -> Result<PathBuf> {
        if columns.is_empty() {
            return Err(RatesError::Validation(
                "No currency have been selected".to_string(),
            ));
        }

        let table = self.refresh_table().await?;
        self.store.write_selected(
            &self.config.store.selected_file_name,
            &table,
            columns,
            &self.format,
        )
    }

    /// Refresh, persist and return the full table as stored
    pub async fn get_all(&self) -> Result<RateTable> {
        self.refresh_and_persist_all().await?;
        self.cached_all()
    }

    /// Refresh, persist and return the selected columns as stored
    pub async fn get_selected<C: AsRef<str>>(&self, columns: &[C]) -> Result<RateTable> {
        self.refresh_and_persist_selected(columns).await?;
        self.cached_selected()
    }

    /// Read the last persisted full table without fetching
    pub fn cached_all(&self) -> Result<RateTable> {
        self.store
            .read_all(&self.config.store.all_file_name, &self.format)
    }

    /// Read the last persisted selection without fetching
    pub fn cached_selected(&self) -> Result<RateTable> {
        self.store
            .read_selected(&self.config.store.selected_file_name, &self.format)
    }

    /// Fetch every tracked currency, at most `max_concurrent_fetches` at once
    ///
    /// Results come back in configuration order. The first failure aborts
    /// the fetches still pending.
    async fn fetch_all(&self) -> Result<Vec<RawRateResponse>> {
        let tracked = &self.config.tracked;
        let permits = tracked
            .max_concurrent_fetches
            .min(tracked.currencies.len())
            .max(1);
        let semaphore = Arc::new(Semaphore::new(permits));

        let mut handles: Vec<_> = tracked
            .currencies
            .iter()
            .cloned()
            .map(|code| {
                let source = Arc::clone(&self.source);
                let semaphore = Arc::clone(&semaphore);
                let lookback_days = tracked.lookback_days;
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|e| {
                        RatesError::Transport {
                            url: code.to_string(),
                            message: format!("fetch slot unavailable: {}", e),
                        }
                    })?;
                    source.fetch(&code, lookback_days).await
                })
            })
            .collect();

        let mut responses = Vec::with_capacity(handles.len());
        for pos in 0..handles.len() {
            let outcome = match (&mut handles[pos]).await {
                Ok(result) => result,
                Err(e) => Err(RatesError::Transport {
                    url: tracked.currencies[pos].to_string(),
                    message: format!("fetch task failed: {}", e),
                }),
            };

            match outcome {
                Ok(raw) => responses.push(raw),
                Err(e) => {
                    for pending in &handles[pos + 1..] {
                        pending.abort();
                    }
                    return Err(e);
                }
            }
        }

        Ok(responses)
    }
}
