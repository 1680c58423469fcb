//! Configuration module for holderscope
//!
//! Plain values consumed by the orchestrator. Defaults come from
//! utils/constants.rs, overridable through environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::retry::RetryPolicy;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::Endpoint;
use crate::utils::constants::{
    default_endpoints, DEFAULT_ENDPOINT_DELAY_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT_DIR,
    DEFAULT_PROBE_MAX_ATTEMPTS, DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_RETRY_DELAY_SECS,
    DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_TOP_N, DEFAULT_VARIANT_DELAY_SECS, MAX_LARGEST_ACCOUNTS,
};

/// Configuration for one analysis run
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Candidate endpoints, most preferred first
    pub endpoints: Vec<Endpoint>,
    /// Per-call timeout during full analysis
    pub default_timeout: Duration,
    /// Attempts per call during full analysis
    pub max_attempts: u32,
    /// Pause between attempts of the same request
    pub retry_policy: RetryPolicy,
    /// Pause between parameter variants
    pub variant_delay: Duration,
    /// Pause before moving on to the next endpoint
    pub endpoint_delay: Duration,
    /// Per-call timeout during the capability probe
    pub probe_timeout: Duration,
    /// Attempts per call during the capability probe
    pub probe_max_attempts: u32,
    /// Number of top holders to keep
    pub top_n: usize,
    /// Budget for the whole multi-endpoint run
    pub overall_deadline: Option<Duration>,
    /// Export directory
    pub output_dir: PathBuf,
}

/// Parse a raw setting into its target type; out-of-range or malformed values yield None
fn parse_setting<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|v| v.trim().parse().ok())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    let parsed = parse_setting(Some(raw.as_str()));
    if parsed.is_none() {
        warn!("⚠️ Ignoring invalid {}={:?}", key, raw);
    }
    parsed
}

fn env_retry_policy() -> RetryPolicy {
    let base = Duration::from_secs(
        env_parse("HOLDERSCOPE_RETRY_DELAY_SECS").unwrap_or(DEFAULT_RETRY_DELAY_SECS),
    );
    match std::env::var("HOLDERSCOPE_RETRY_POLICY") {
        Ok(name) => RetryPolicy::from_name(&name, base).unwrap_or_else(|| {
            warn!("⚠️ Unknown HOLDERSCOPE_RETRY_POLICY {:?}, using fixed", name);
            RetryPolicy::Fixed(base)
        }),
        Err(_) => RetryPolicy::Fixed(base),
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let mut endpoints = default_endpoints();
        if let Ok(url) = std::env::var("SOLANA_RPC_URL") {
            if !url.trim().is_empty() {
                info!("🔑 SOLANA_RPC_URL configured, trying it first");
                endpoints.insert(0, Endpoint::premium(url.trim(), "Configured RPC"));
            }
        }

        Self {
            endpoints,
            default_timeout: Duration::from_secs(
                env_parse("HOLDERSCOPE_TIMEOUT_SECS").unwrap_or(DEFAULT_RPC_TIMEOUT_SECS),
            ),
            max_attempts: env_parse::<u32>("HOLDERSCOPE_MAX_RETRIES").unwrap_or(DEFAULT_MAX_ATTEMPTS),
            retry_policy: env_retry_policy(),
            variant_delay: Duration::from_secs(DEFAULT_VARIANT_DELAY_SECS),
            endpoint_delay: Duration::from_secs(
                env_parse("HOLDERSCOPE_ENDPOINT_DELAY_SECS").unwrap_or(DEFAULT_ENDPOINT_DELAY_SECS),
            ),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            probe_max_attempts: DEFAULT_PROBE_MAX_ATTEMPTS,
            top_n: env_parse::<usize>("HOLDERSCOPE_TOP_N").unwrap_or(DEFAULT_TOP_N),
            overall_deadline: env_parse("HOLDERSCOPE_DEADLINE_SECS").map(Duration::from_secs),
            output_dir: std::env::var("HOLDERSCOPE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }
}

impl AnalyzerConfig {
    /// No pauses, one attempt per call. For tests and dry runs against local validators.
    pub fn immediate(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints,
            default_timeout: Duration::from_secs(5),
            max_attempts: 1,
            retry_policy: RetryPolicy::Fixed(Duration::ZERO),
            variant_delay: Duration::ZERO,
            endpoint_delay: Duration::ZERO,
            probe_timeout: Duration::from_secs(5),
            probe_max_attempts: 1,
            top_n: DEFAULT_TOP_N,
            overall_deadline: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.overall_deadline = deadline;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Reject values the orchestrator cannot work with
    pub fn validate(&self) -> AppResult<()> {
        if self.top_n == 0 {
            return Err(AppError::invalid_config("top_n must be at least 1"));
        }
        if self.top_n > MAX_LARGEST_ACCOUNTS {
            info!(
                "ℹ️ top_n {} exceeds the {} accounts getTokenLargestAccounts returns, scanning program accounts first",
                self.top_n, MAX_LARGEST_ACCOUNTS
            );
        }
        if self.max_attempts == 0 {
            return Err(AppError::invalid_config("max_attempts must be at least 1"));
        }
        if self.default_timeout.is_zero() || self.probe_timeout.is_zero() {
            return Err(AppError::invalid_config("timeouts must be greater than zero"));
        }
        if let Some(endpoint) = self.endpoints.iter().find(|e| {
            !(e.url.starts_with("http://") || e.url.starts_with("https://"))
        }) {
            return Err(AppError::invalid_config(format!(
                "endpoint '{}' is not an http(s) URL",
                endpoint.name
            )));
        }
        Ok(())
    }
}
