use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls flow normally; outcomes feed the sliding window.
    Closed,
    /// Calls fail fast until the cool-down elapses.
    Open,
    /// A limited number of probe calls decide whether to close again.
    HalfOpen,
}

/// Configuration for the circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Failure ratio (0.0..=1.0) over the window that opens the circuit.
    pub failure_rate_threshold: f64,
    /// Number of most recent calls considered.
    pub sliding_window_size: usize,
    /// Calls required in the window before the rate is evaluated.
    pub minimum_calls: usize,
    /// How long the circuit stays open before allowing probes.
    pub open_duration: Duration,
    /// Successful probes required to close from half-open.
    pub half_open_calls: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 0.5,
            sliding_window_size: 10,
            minimum_calls: 5,
            open_duration: Duration::from_secs(30),
            half_open_calls: 3,
        }
    }
}

impl CircuitBreakerConfig {
    #[must_use]
    pub fn failure_rate_threshold(mut self, threshold: f64) -> Self {
        self.failure_rate_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn sliding_window_size(mut self, size: usize) -> Self {
        self.sliding_window_size = size.max(1);
        self
    }

    #[must_use]
    pub fn minimum_calls(mut self, calls: usize) -> Self {
        self.minimum_calls = calls.max(1);
        self
    }

    #[must_use]
    pub fn open_duration(mut self, duration: Duration) -> Self {
        self.open_duration = duration;
        self
    }

    #[must_use]
    pub fn half_open_calls(mut self, calls: u32) -> Self {
        self.half_open_calls = calls.max(1);
        self
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    /// Bumped on every state change; outcomes from an older generation are dropped.
    generation: u64,
    /// `true` marks a failed call.
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    half_open_in_flight: u32,
    half_open_successes: u32,
}

/// Count-based circuit breaker shared by every caller of one downstream.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

/// Permission for one downstream call.
///
/// Consume it with [`CallPermit::record_success`] or
/// [`CallPermit::record_failure`]. A permit dropped without an outcome (the
/// caller was cancelled) hands its half-open slot back.
#[derive(Debug)]
#[must_use]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    half_open: bool,
    settled: bool,
}

impl CallPermit<'_> {
    pub fn record_success(mut self) {
        self.settled = true;
        self.breaker.on_success(self.generation);
    }

    pub fn record_failure(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.generation);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.half_open {
            self.breaker.release(self.generation);
        }
    }
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                generation: 0,
                window: VecDeque::with_capacity(config.sliding_window_size),
                opened_at: None,
                half_open_in_flight: 0,
                half_open_successes: 0,
            }),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state, moving Open to HalfOpen once the cool-down is over.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        self.refresh_state(&mut inner);
        inner.state
    }

    /// Asks permission for one call. `None` while the circuit is open or
    /// every half-open probe slot is taken.
    pub fn try_acquire(&self) -> Option<CallPermit<'_>> {
        let mut inner = self.lock();
        self.refresh_state(&mut inner);
        let half_open = match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open => return None,
            CircuitState::HalfOpen => {
                let used = inner.half_open_in_flight + inner.half_open_successes;
                if used >= self.config.half_open_calls {
                    return None;
                }
                inner.half_open_in_flight += 1;
                true
            }
        };
        Some(CallPermit {
            breaker: self,
            generation: inner.generation,
            half_open,
            settled: false,
        })
    }

    fn on_success(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        match inner.state {
            CircuitState::Closed => self.push_outcome(&mut inner, false),
            CircuitState::HalfOpen => {
                inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.half_open_calls {
                    self.close(&mut inner);
                    tracing::info!(circuit = %self.name, "Circuit breaker closed");
                }
            }
            CircuitState::Open => {}
        }
    }

    fn on_failure(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        match inner.state {
            CircuitState::Closed => {
                self.push_outcome(&mut inner, true);
                if inner.window.len() >= self.config.minimum_calls {
                    let failures = inner.window.iter().filter(|failed| **failed).count();
                    let rate = failures as f64 / inner.window.len() as f64;
                    if rate >= self.config.failure_rate_threshold {
                        tracing::warn!(
                            circuit = %self.name,
                            failures,
                            calls = inner.window.len(),
                            threshold = self.config.failure_rate_threshold,
                            "Circuit breaker opened"
                        );
                        self.open(&mut inner);
                    }
                }
            }
            CircuitState::HalfOpen => {
                tracing::warn!(circuit = %self.name, "Probe failed, circuit breaker re-opened");
                self.open(&mut inner);
            }
            CircuitState::Open => {}
        }
    }

    fn release(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation == generation && inner.state == CircuitState::HalfOpen {
            inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
            tracing::debug!(circuit = %self.name, "Abandoned probe released");
        }
    }

    /// Failure ratio over the current window (0.0 when empty).
    pub fn failure_rate(&self) -> f64 {
        let inner = self.lock();
        if inner.window.is_empty() {
            return 0.0;
        }
        inner.window.iter().filter(|failed| **failed).count() as f64 / inner.window.len() as f64
    }

    pub fn reset(&self) {
        let mut inner = self.lock();
        self.close(&mut inner);
    }

    fn close(&self, inner: &mut BreakerInner) {
        inner.state = CircuitState::Closed;
        inner.generation += 1;
        inner.window.clear();
        inner.opened_at = None;
        inner.half_open_in_flight = 0;
        inner.half_open_successes = 0;
    }

    fn open(&self, inner: &mut BreakerInner) {
        inner.state = CircuitState::Open;
        inner.generation += 1;
        inner.opened_at = Some(Instant::now());
        inner.half_open_in_flight = 0;
        inner.half_open_successes = 0;
    }

    fn refresh_state(&self, inner: &mut BreakerInner) {
        if inner.state == CircuitState::Open
            && inner
                .opened_at
                .is_some_and(|at| at.elapsed() >= self.config.open_duration)
        {
            inner.state = CircuitState::HalfOpen;
            inner.generation += 1;
            inner.half_open_in_flight = 0;
            inner.half_open_successes = 0;
            tracing::info!(circuit = %self.name, "Circuit breaker half-open");
        }
    }

    fn push_outcome(&self, inner: &mut BreakerInner, failed: bool) {
        if inner.window.len() == self.config.sliding_window_size {
            inner.window.pop_front();
        }
        inner.window.push_back(failed);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        // A panic while holding the lock leaves plain counters behind; keep going.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
