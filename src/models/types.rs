//! Type definitions for holderscope
//! All core data structures for endpoint selection, RPC outcomes and holder analysis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

use super::errors::AppError;

// ============================================
// ENDPOINTS
// ============================================

/// Endpoint tier, used for reporting only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointTier {
    Public,
    Premium,
}

impl EndpointTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointTier::Public => "Public",
            EndpointTier::Premium => "Premium",
        }
    }
}

/// A remote RPC service instance. Position in the configured list encodes preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub name: String,
    pub tier: EndpointTier,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, name: impl Into<String>, tier: EndpointTier) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            tier,
        }
    }

    pub fn public(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(url, name, EndpointTier::Public)
    }

    pub fn premium(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(url, name, EndpointTier::Premium)
    }

    /// URL with any embedded API key hidden (safe for logs)
    pub fn masked_url(&self) -> String {
        if let Some((base, _)) = self.url.split_once("/v2/") {
            return format!("{}/v2/***HIDDEN***", base);
        }
        if let Some((base, _)) = self.url.split_once("api-key=") {
            return format!("{}api-key=***HIDDEN***", base);
        }
        self.url.clone()
    }

    /// "Name (Tier)" label
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.tier.as_str())
    }
}

// ============================================
// RPC REQUEST / OUTCOME
// ============================================

/// A single JSON-RPC request. Built per call, never reused across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Request without parameters
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Vec::new())
    }

    /// JSON-RPC 2.0 envelope. An empty parameter list is left out entirely.
    pub fn to_payload(&self, id: u64) -> Value {
        let mut payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": self.method,
        });
        if !self.params.is_empty() {
            payload["params"] = Value::Array(self.params.clone());
        }
        payload
    }
}

/// Transport failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportErrorKind {
    Timeout,
    ConnectionFailed,
}

/// Result of one executor invocation. Elapsed time is always measured,
/// including on the failure path.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    Success {
        result: Value,
        elapsed: Duration,
    },
    RpcError {
        code: i64,
        message: String,
        elapsed: Duration,
    },
    TransportError {
        kind: TransportErrorKind,
        elapsed: Duration,
    },
}

impl RpcOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RpcOutcome::Success { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            RpcOutcome::Success { elapsed, .. }
            | RpcOutcome::RpcError { elapsed, .. }
            | RpcOutcome::TransportError { elapsed, .. } => *elapsed,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Short description for logs and diagnostics
    pub fn describe(&self) -> String {
        match self {
            RpcOutcome::Success { elapsed, .. } => {
                format!("success in {:.2}s", elapsed.as_secs_f64())
            }
            RpcOutcome::RpcError { code, message, .. } => {
                format!("RPC Error: {} (code: {})", message, code)
            }
            RpcOutcome::TransportError {
                kind: TransportErrorKind::Timeout,
                elapsed,
            } => format!("Timeout after {:.2} seconds", elapsed.as_secs_f64()),
            RpcOutcome::TransportError {
                kind: TransportErrorKind::ConnectionFailed,
                ..
            } => "Connection Error".to_string(),
        }
    }

    /// Split into the result value or a classified error
    pub fn into_result(self) -> Result<(Value, Duration), AppError> {
        match self {
            RpcOutcome::Success { result, elapsed } => Ok((result, elapsed)),
            RpcOutcome::RpcError { code, message, .. } => Err(AppError::rpc_error(code, message)),
            other @ RpcOutcome::TransportError {
                kind: TransportErrorKind::Timeout,
                ..
            } => Err(AppError::rpc_timeout(other.describe())),
            other @ RpcOutcome::TransportError { .. } => {
                Err(AppError::rpc_connection_failed(other.describe()))
            }
        }
    }
}

// ============================================
// CAPABILITY PROBE
// ============================================

/// Probe result for one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCapability {
    pub method: String,
    pub description: String,
    pub supported: bool,
    pub elapsed_secs: Option<f64>,
    pub data_size: Option<usize>,
    pub error_detail: Option<String>,
}

/// Per-endpoint capability map, built once before committing to full analysis.
/// Entries keep the probe battery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub endpoint: String,
    pub methods: Vec<MethodCapability>,
}

impl CapabilityReport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            methods: Vec::new(),
        }
    }

    pub fn record(&mut self, capability: MethodCapability) {
        self.methods.push(capability);
    }

    pub fn get(&self, method: &str) -> Option<&MethodCapability> {
        self.methods.iter().find(|m| m.method == method)
    }

    pub fn is_supported(&self, method: &str) -> bool {
        self.get(method).map(|m| m.supported).unwrap_or(false)
    }

    /// Methods from `required` that the probe did not confirm
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|m| !self.is_supported(m))
            .collect()
    }

    pub fn supported_count(&self) -> usize {
        self.methods.iter().filter(|m| m.supported).count()
    }
}

// ============================================
// TOKEN DATA
// ============================================

/// Token supply and mint details, fixed for the endpoint that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub mint_address: String,
    pub decimals: u8,
    pub raw_supply: u64,
    pub total_supply: f64,
    /// getTokenSupply response time
    pub query_elapsed_secs: f64,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub is_initialized: Option<bool>,
    pub token_program: Option<String>,
    /// getAccountInfo response time, set when the enrichment call answered
    pub account_query_elapsed_secs: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

impl TokenMetadata {
    /// Whether enrichment from the mint account succeeded
    pub fn is_enriched(&self) -> bool {
        self.is_initialized.is_some()
    }
}

/// An account holding a nonzero balance of the analyzed token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    pub address: String,
    pub raw_amount: u64,
    pub balance: f64,
}

impl Holder {
    /// Balance is always `raw_amount / 10^decimals`
    pub fn from_raw(address: impl Into<String>, raw_amount: u64, decimals: u8) -> Self {
        Self {
            address: address.into(),
            raw_amount,
            balance: raw_amount as f64 / 10f64.powi(decimals as i32),
        }
    }

    /// Share of total supply in percent, undefined when supply is not positive
    pub fn share_of(&self, total_supply: f64) -> Option<f64> {
        if total_supply > 0.0 {
            Some(self.balance / total_supply * 100.0)
        } else {
            None
        }
    }
}

/// Concentration metrics over the analyzed holder subset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HolderStatistics {
    pub total_holders_analyzed: usize,
    pub top_5_balance: f64,
    pub top_10_balance: f64,
    pub top_20_balance: f64,
    pub largest_holder_balance: f64,
    pub smallest_analyzed_balance: f64,
    pub average_balance: f64,
    pub median_balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_5_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_10_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_20_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_holder_percentage: Option<f64>,
}

impl HolderStatistics {
    /// Ordered (label, value) pairs, used by the CSV writer
    pub fn entries(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("total_holders_analyzed", Some(self.total_holders_analyzed as f64)),
            ("top_5_balance", Some(self.top_5_balance)),
            ("top_10_balance", Some(self.top_10_balance)),
            ("top_20_balance", Some(self.top_20_balance)),
            ("largest_holder_balance", Some(self.largest_holder_balance)),
            ("smallest_analyzed_balance", Some(self.smallest_analyzed_balance)),
            ("average_balance", Some(self.average_balance)),
            ("median_balance", Some(self.median_balance)),
            ("top_5_percentage", self.top_5_percentage),
            ("top_10_percentage", self.top_10_percentage),
            ("top_20_percentage", self.top_20_percentage),
            ("largest_holder_percentage", self.largest_holder_percentage),
        ]
    }
}

// ============================================
// REPORT
// ============================================

/// One abandoned endpoint and the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointAttempt {
    pub endpoint: String,
    pub code: String,
    pub message: String,
    pub elapsed_secs: f64,
}

/// Aggregate root of one run. Assembled once, then only exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TokenMetadata>,
    pub holders: Vec<Holder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<HolderStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_used: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_used: Option<String>,
    pub holders_query_elapsed_secs: f64,
    pub total_query_elapsed_secs: f64,
    pub attempt_log: Vec<EndpointAttempt>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Highest-ranked holders, at most `n`
    pub fn top_holders(&self, n: usize) -> &[Holder] {
        &self.holders[..n.min(self.holders.len())]
    }

    /// Total supply of the analyzed token, zero on failure
    pub fn total_supply(&self) -> f64 {
        self.metadata.as_ref().map(|m| m.total_supply).unwrap_or(0.0)
    }
}
