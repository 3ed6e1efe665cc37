//! Resilience wrapper for downstream calls.
//!
//! [`Resilient`] layers a response cache, a shared [`CircuitBreaker`],
//! retry with exponential backoff and an overall deadline around a
//! fallible async call. It never returns an error: when the live path
//! can't produce a value the caller-supplied fallback is served instead.
//!
//! ```ignore
//! let breaker = Arc::new(CircuitBreaker::new("product-service", config.circuit.clone()));
//! let listings = Resilient::new(config.clone(), breaker, |v: &Vec<_>| !v.is_empty());
//!
//! let resolved = listings
//!     .resolve("featured:10", || client.list(ProductListing::Featured, 10), || fallback())
//!     .await;
//! ```

pub mod catalog;
pub mod circuit_breaker;
pub mod retry;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::time::Instant;

use crate::application::ports::product_catalog::{DownstreamError, Resolved, Source};

pub use circuit_breaker::{CallPermit, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use retry::RetryConfig;

#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    /// Deadline for the whole live path, retries and backoff included.
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub circuit: CircuitBreakerConfig,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
            circuit: CircuitBreakerConfig::default(),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1_000,
        }
    }
}

/// Why the fallback was served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    CircuitOpen,
    Timeout,
    RetriesExhausted(DownstreamError),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::CircuitOpen => write!(f, "circuit open"),
            FallbackReason::Timeout => write!(f, "timed out"),
            FallbackReason::RetriesExhausted(err) => write!(f, "retries exhausted: {err}"),
        }
    }
}

pub struct Resilient<T> {
    config: ResilienceConfig,
    breaker: Arc<CircuitBreaker>,
    cache: Cache<String, T>,
    cacheable: fn(&T) -> bool,
}

impl<T> Resilient<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// `cacheable` decides which live results are worth keeping; empty
    /// results should be rejected so the next call tries again.
    pub fn new(
        config: ResilienceConfig,
        breaker: Arc<CircuitBreaker>,
        cacheable: fn(&T) -> bool,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();
        Self {
            config,
            breaker,
            cache,
            cacheable,
        }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub async fn resolve<F, Fut, G>(&self, key: &str, mut call: F, fallback: G) -> Resolved<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DownstreamError>>,
        G: FnOnce() -> T,
    {
        if let Some(hit) = self.cache.get(key).await {
            return Resolved::new(hit, Source::Cached);
        }

        match self.call_live(&mut call).await {
            Ok(value) => {
                if (self.cacheable)(&value) {
                    self.cache.insert(key.to_string(), value.clone()).await;
                }
                Resolved::new(value, Source::Live)
            }
            Err(reason) => {
                tracing::warn!(
                    circuit = %self.breaker.name(),
                    key = %key,
                    reason = %reason,
                    "Downstream unavailable, serving fallback"
                );
                Resolved::new(fallback(), Source::Fallback)
            }
        }
    }

    async fn call_live<F, Fut>(&self, call: &mut F) -> Result<T, FallbackReason>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DownstreamError>>,
    {
        let deadline = Instant::now() + self.config.timeout;
        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut last_error = DownstreamError::Timeout;

        for attempt in 0..max_attempts {
            let Some(permit) = self.breaker.try_acquire() else {
                return Err(FallbackReason::CircuitOpen);
            };

            let outcome = match tokio::time::timeout_at(deadline, call()).await {
                Ok(result) => result,
                Err(_) => Err(DownstreamError::Timeout),
            };

            match outcome {
                Ok(value) => {
                    permit.record_success();
                    return Ok(value);
                }
                Err(err) => {
                    permit.record_failure();
                    tracing::debug!(
                        circuit = %self.breaker.name(),
                        attempt = attempt + 1,
                        error = %err,
                        "Downstream call failed"
                    );
                    if err == DownstreamError::Timeout && Instant::now() >= deadline {
                        return Err(FallbackReason::Timeout);
                    }
                    last_error = err;
                }
            }

            if attempt + 1 < max_attempts {
                let delay = self.config.retry.delay_for_retry(attempt);
                if Instant::now() + delay >= deadline {
                    return Err(FallbackReason::Timeout);
                }
                tokio::time::sleep(delay).await;
            }
        }

        Err(FallbackReason::RetriesExhausted(last_error))
    }
}
