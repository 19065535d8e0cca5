//! Pacing and retry wrapper around the USURDB API client.
//!
//! The upstream service expects polite clients: every request is preceded by
//! a fixed cooldown relative to the previous one, and transient failures are
//! retried a bounded number of times with linear backoff. The cooldown is
//! applied here, above the raw client, so direct-name lookups observe the
//! same pacing as geographic sweeps.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use usurdb_api::types::RawRateItem;
use usurdb_api::{Client, GeoRateQuery, UtilityRateQuery};

use crate::error::UtilityRatesError;

/// Retry and pacing knobs. Constructed explicitly so tests can run with zero
/// delays instead of sleeping for real.
#[derive(Debug, Clone, Copy)]
pub struct PacingConfig {
    /// Attempts per logical query before giving up.
    pub max_attempts: u32,
    /// Linear backoff unit: the n-th failed attempt waits `n * backoff_base`.
    pub backoff_base: Duration,
    /// Minimum gap between consecutive HTTP requests.
    pub cooldown: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            cooldown: Duration::from_millis(300),
        }
    }
}

impl PacingConfig {
    /// All delays zeroed. For tests.
    pub fn immediate() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::ZERO,
            cooldown: Duration::ZERO,
        }
    }

    fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }
}

/// API client wrapper enforcing the sequential, rate-limited calling
/// discipline of the pipeline.
pub struct PacedClient {
    inner: Client,
    config: PacingConfig,
    /// Tracks when the last HTTP request was sent, for the cooldown.
    last_request: Mutex<Option<Instant>>,
}

impl PacedClient {
    /// Creates a paced client against the production API.
    pub fn new(api_key: &str, config: PacingConfig) -> Self {
        Self {
            inner: Client::new(api_key),
            config,
            last_request: Mutex::new(None),
        }
    }

    /// Creates a paced client with a custom base URL. Used for testing.
    pub fn with_base_url(base_url: &str, api_key: &str, config: PacingConfig) -> Self {
        Self {
            inner: Client::with_base_url(base_url, api_key),
            config,
            last_request: Mutex::new(None),
        }
    }

    async fn pace(&self) {
        let sleep_dur = {
            let last = self.last_request.lock().unwrap_or_else(|e| e.into_inner());
            last.and_then(|last_time| self.config.cooldown.checked_sub(last_time.elapsed()))
        };
        if let Some(dur) = sleep_dur {
            if !dur.is_zero() {
                tokio::time::sleep(dur).await;
            }
        }
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }

    async fn with_retry<T, F, Fut>(&self, label: &str, mut f: F) -> Result<T, UtilityRatesError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, usurdb_api::Error>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            self.pace().await;
            match f().await {
                Ok(val) => return Ok(val),
                Err(e) => {
                    if attempt >= self.config.max_attempts {
                        tracing::error!(
                            "{} failed after {} attempts: {}",
                            label,
                            attempt,
                            e
                        );
                        return Err(UtilityRatesError::Api(e));
                    }
                    let wait = self.config.backoff_for_attempt(attempt);
                    tracing::warn!(
                        "{} attempt {} failed: {}; retrying in {:?}",
                        label,
                        attempt,
                        e,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Fetches rate items around a geographic point, retrying transient
    /// failures. Callers treat a final error as zero items for that point.
    pub async fn geo_rates(
        &self,
        query: &GeoRateQuery,
    ) -> Result<Vec<RawRateItem>, UtilityRatesError> {
        self.with_retry("geographic rate query", || self.inner.get_rates(query))
            .await
            .map(|resp| resp.items)
    }

    /// Fetches rate items for one utility by name, newest first.
    pub async fn rates_for_utility(
        &self,
        query: &UtilityRateQuery,
    ) -> Result<Vec<RawRateItem>, UtilityRatesError> {
        self.with_retry("direct utility lookup", || {
            self.inner.get_rates_for_utility(query)
        })
        .await
        .map(|resp| resp.items)
    }
}
