//! Bounded, deadline-aware execution of blocking generation work.
//!
//! [`ConcurrencyGate`] caps how many generation calls run at once across the
//! whole process. Admitted work runs on tokio's blocking pool so the I/O
//! scheduler keeps serving other connections while a model is busy.
//!
//! # Timeouts
//!
//! When a deadline expires the caller gets [`GenerationError::Timeout`] and
//! the admission slot is released at once. The blocking call itself cannot be
//! interrupted: it keeps running detached and its result is dropped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::settings::InferenceSettings;

/// Per-call deadline selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deadline {
    /// Use the gate's configured default.
    #[default]
    Default,
    /// Fail after the given duration.
    After(Duration),
    /// Wait as long as the work takes.
    Unbounded,
}

impl Deadline {
    /// Build a deadline from a seconds value where `<= 0` means no limit.
    pub const fn from_secs(secs: i64) -> Self {
        if secs <= 0 {
            Self::Unbounded
        } else {
            Self::After(Duration::from_secs(secs.unsigned_abs()))
        }
    }

    /// Same as [`Deadline::from_secs`] for an optional, already-resolved limit.
    pub const fn from_limit(limit: Option<Duration>) -> Self {
        match limit {
            Some(limit) => Self::After(limit),
            None => Self::Unbounded,
        }
    }

    pub(crate) const fn resolve(self, default: Option<Duration>) -> Option<Duration> {
        match self {
            Self::Default => default,
            Self::After(limit) => Some(limit),
            Self::Unbounded => None,
        }
    }
}

/// Process-wide admission control for generation calls.
///
/// Cloning is cheap; clones share the same slots.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    default_timeout: Option<Duration>,
}

impl ConcurrencyGate {
    /// Create a gate admitting at most `capacity` calls at once.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize, default_timeout: Option<Duration>) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            default_timeout,
        }
    }

    pub fn from_settings(settings: &InferenceSettings) -> Self {
        Self::new(settings.max_concurrency, settings.request_timeout)
    }

    /// Run `work` once a slot is free, bounded by `deadline`.
    ///
    /// The slot is held by this future, not by the worker thread, so it is
    /// released exactly once on every exit path: success, error, timeout, a
    /// panicking worker, or the caller dropping the future.
    pub async fn run<F, T>(&self, deadline: Deadline, work: F) -> Result<T, GenerationError>
    where
        F: FnOnce() -> Result<T, GenerationError> + Send + 'static,
        T: Send + 'static,
    {
        let queued = Instant::now();
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| GenerationError::Worker("concurrency gate closed".to_string()))?;

        debug!(
            in_flight = self.in_flight(),
            capacity = self.capacity,
            waited_ms = queued.elapsed().as_millis(),
            "Generation admitted"
        );

        let started = Instant::now();
        let job = tokio::task::spawn_blocking(work);

        let joined = match deadline.resolve(self.default_timeout) {
            Some(limit) => match tokio::time::timeout(limit, job).await {
                Ok(joined) => joined,
                Err(_) => {
                    drop(permit);
                    warn!(
                        timeout_s = limit.as_secs_f64(),
                        "Generation timed out; worker detached"
                    );
                    return Err(GenerationError::Timeout(limit));
                }
            },
            None => job.await,
        };
        drop(permit);

        debug!(
            elapsed_ms = started.elapsed().as_millis(),
            "Generation slot released"
        );

        joined.map_err(|e| GenerationError::Worker(e.to_string()))?
    }

    /// Total number of slots.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots free right now.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Calls currently admitted.
    pub fn in_flight(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }
}
