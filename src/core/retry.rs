//! Retry Controller
//!
//! Wraps a `CallExecutor` with a bounded retry loop. Any non-success outcome
//! before the last attempt is followed by a pause from the `RetryPolicy` and
//! an identical request; the final attempt's outcome is returned as-is.
//!
//! The default policy is a constant delay. Exponential backoff with jitter is
//! available behind the same interface for endpoints that rate-limit hard
//! (`--backoff exponential` or `HOLDERSCOPE_RETRY_POLICY=exponential`).
//! Pauses and per-call timeouts are both cut short at the overall deadline.

use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::models::types::{Endpoint, RpcOutcome, RpcRequest, TransportErrorKind};
use crate::providers::rpc::CallExecutor;
use crate::utils::constants::{
    DEFAULT_RETRY_DELAY_SECS, EXPONENTIAL_JITTER_PERCENT, EXPONENTIAL_MAX_DELAY_SECS,
};

/// Pause between attempts of the same request
#[derive(Debug, Clone, PartialEq)]
pub enum RetryPolicy {
    /// Same pause after every failed attempt
    Fixed(Duration),
    /// base * 2^(retry-1), capped at `max`, +/- `jitter_percent`
    ExponentialJitter {
        base: Duration,
        max: Duration,
        jitter_percent: u64,
    },
}

impl RetryPolicy {
    /// Policy by name: `fixed` or `exponential`, both built around `base`
    pub fn from_name(name: &str, base: Duration) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fixed" => Some(RetryPolicy::Fixed(base)),
            "exponential" => Some(RetryPolicy::ExponentialJitter {
                base,
                max: Duration::from_secs(EXPONENTIAL_MAX_DELAY_SECS).max(base),
                jitter_percent: EXPONENTIAL_JITTER_PERCENT,
            }),
            _ => None,
        }
    }

    /// Pause before the first retry, ignoring jitter
    pub fn base_delay(&self) -> Duration {
        match self {
            RetryPolicy::Fixed(delay) => *delay,
            RetryPolicy::ExponentialJitter { base, .. } => *base,
        }
    }

    /// Delay before retry number `retry` (the first retry is 1)
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self {
            RetryPolicy::Fixed(delay) => *delay,
            RetryPolicy::ExponentialJitter {
                base,
                max,
                jitter_percent,
            } => {
                let base_ms = base.as_millis() as u64;
                let factor = 2_u64.saturating_pow(retry.saturating_sub(1));
                let capped = base_ms.saturating_mul(factor).min(max.as_millis() as u64);

                let jitter_range = (capped * jitter_percent) / 100;
                let jitter: i64 = if jitter_range > 0 {
                    rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64))
                } else {
                    0
                };
                Duration::from_millis((capped as i64 + jitter).max(0) as u64)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Fixed(Duration::from_secs(DEFAULT_RETRY_DELAY_SECS))
    }
}

/// Bounded retry loop with an optional overall deadline
#[derive(Debug, Clone)]
pub struct RetryController {
    max_attempts: u32,
    policy: RetryPolicy,
    deadline: Option<Instant>,
}

impl RetryController {
    /// `max_attempts` of zero is treated as one
    pub fn new(max_attempts: u32, policy: RetryPolicy) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            policy,
            deadline: None,
        }
    }

    /// Stop starting new attempts once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    /// Shorten a timeout or pause so it never runs past the deadline
    pub fn clamp_to_deadline(&self, duration: Duration) -> Duration {
        match self.deadline {
            Some(deadline) => duration.min(deadline.saturating_duration_since(Instant::now())),
            None => duration,
        }
    }

    /// Invoke the executor up to `max_attempts` times
    pub async fn call<E: CallExecutor + ?Sized>(
        &self,
        executor: &E,
        endpoint: &Endpoint,
        request: &RpcRequest,
        timeout: Duration,
    ) -> RpcOutcome {
        let mut last_outcome = None;

        for attempt in 1..=self.max_attempts {
            if self.deadline_exceeded() {
                warn!(
                    "⏰ Deadline reached before attempt {}/{} of {}",
                    attempt, self.max_attempts, request.method
                );
                break;
            }

            info!(
                "📡 Calling {} (attempt {}/{})",
                request.method, attempt, self.max_attempts
            );
            let outcome = executor
                .execute(endpoint, request, self.clamp_to_deadline(timeout))
                .await;
            debug!("   Response time: {:.2}s", outcome.elapsed_secs());

            if outcome.is_success() {
                return outcome;
            }

            if attempt < self.max_attempts {
                let delay = self.clamp_to_deadline(self.policy.delay_for(attempt));
                warn!(
                    "⚠️ {} (retrying in {:.1}s)",
                    outcome.describe(),
                    delay.as_secs_f64()
                );
                last_outcome = Some(outcome);
                tokio::time::sleep(delay).await;
            } else {
                warn!(
                    "❌ {} failed after {} attempts: {}",
                    request.method,
                    self.max_attempts,
                    outcome.describe()
                );
                last_outcome = Some(outcome);
            }
        }

        last_outcome.unwrap_or(RpcOutcome::TransportError {
            kind: TransportErrorKind::Timeout,
            elapsed: Duration::ZERO,
        })
    }
}
