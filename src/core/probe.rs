//! Capability probe
//!
//! A fixed battery of cheap read-only calls run against an endpoint before the
//! expensive query sequence. Used only for the go / no-go gate; none of its
//! results end up in the holder data.

use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

use crate::core::retry::RetryController;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{CapabilityReport, Endpoint, MethodCapability, RpcOutcome, RpcRequest};
use crate::providers::rpc::CallExecutor;
use crate::providers::solana::{
    GET_HEALTH, GET_SLOT, GET_TOKEN_LARGEST_ACCOUNTS, GET_TOKEN_SUPPLY, GET_VERSION, REQUIRED_METHODS,
};

/// One probe call
#[derive(Debug, Clone)]
pub struct ProbeCall {
    pub method: &'static str,
    pub params: Vec<Value>,
    pub description: &'static str,
}

/// health, version, slot, token supply, largest accounts
pub fn probe_battery(mint: &str) -> Vec<ProbeCall> {
    vec![
        ProbeCall {
            method: GET_HEALTH,
            params: vec![],
            description: "Basic connection",
        },
        ProbeCall {
            method: GET_VERSION,
            params: vec![],
            description: "Version info",
        },
        ProbeCall {
            method: GET_SLOT,
            params: vec![],
            description: "Current slot",
        },
        ProbeCall {
            method: GET_TOKEN_SUPPLY,
            params: vec![json!(mint)],
            description: "Token supply",
        },
        ProbeCall {
            method: GET_TOKEN_LARGEST_ACCOUNTS,
            params: vec![json!(mint)],
            description: "Largest accounts",
        },
    ]
}

/// Run the battery sequentially and record what the endpoint can do
pub async fn probe_endpoint<E: CallExecutor + ?Sized>(
    executor: &E,
    retry: &RetryController,
    endpoint: &Endpoint,
    mint: &str,
    timeout: Duration,
) -> CapabilityReport {
    info!("🔍 RPC Capability Test: {}", endpoint.label());
    let mut report = CapabilityReport::new(endpoint.name.clone());

    for call in probe_battery(mint) {
        let request = RpcRequest::new(call.method, call.params.clone());
        let outcome = retry.call(executor, endpoint, &request, timeout).await;

        let capability = match &outcome {
            RpcOutcome::Success { result, elapsed } => {
                let data_size = if result.is_null() { 0 } else { result.to_string().len() };
                info!(
                    "   ✅ {} ({}) {:.2}s, {} bytes",
                    call.description,
                    call.method,
                    elapsed.as_secs_f64(),
                    data_size
                );
                MethodCapability {
                    method: call.method.to_string(),
                    description: call.description.to_string(),
                    supported: true,
                    elapsed_secs: Some(elapsed.as_secs_f64()),
                    data_size: Some(data_size),
                    error_detail: None,
                }
            }
            failed => {
                warn!("   ❌ {} ({}) failed: {}", call.description, call.method, failed.describe());
                MethodCapability {
                    method: call.method.to_string(),
                    description: call.description.to_string(),
                    supported: false,
                    elapsed_secs: match failed {
                        RpcOutcome::TransportError { .. } => None,
                        other => Some(other.elapsed_secs()),
                    },
                    data_size: None,
                    error_detail: Some(failed.describe()),
                }
            }
        };
        report.record(capability);
    }

    report
}

/// Full analysis only proceeds when both token methods answered
pub fn gate(report: &CapabilityReport) -> AppResult<()> {
    let missing = report.missing(&REQUIRED_METHODS);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::capability_unsupported(&missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::retry::RetryPolicy;
    use async_trait::async_trait;

    /// Supports everything except the listed methods
    struct PartialNode {
        unsupported: Vec<&'static str>,
    }

    #[async_trait]
    impl CallExecutor for PartialNode {
        async fn execute(&self, _: &Endpoint, request: &RpcRequest, _: Duration) -> RpcOutcome {
            if self.unsupported.contains(&request.method.as_str()) {
                RpcOutcome::RpcError {
                    code: -32601,
                    message: "Method not found".into(),
                    elapsed: Duration::from_millis(4),
                }
            } else {
                RpcOutcome::Success {
                    result: json!({ "value": "ok" }),
                    elapsed: Duration::from_millis(4),
                }
            }
        }
    }

    fn run(unsupported: Vec<&'static str>) -> CapabilityReport {
        let node = PartialNode { unsupported };
        let retry = RetryController::new(1, RetryPolicy::Fixed(Duration::ZERO));
        let endpoint = Endpoint::public("http://localhost:8899", "Local");
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(probe_endpoint(&node, &retry, &endpoint, "Mint111", Duration::from_secs(1)))
    }

    #[test]
    fn test_battery_order() {
        let methods: Vec<&str> = probe_battery("m").iter().map(|c| c.method).collect();
        assert_eq!(
            methods,
            vec![GET_HEALTH, GET_VERSION, GET_SLOT, GET_TOKEN_SUPPLY, GET_TOKEN_LARGEST_ACCOUNTS]
        );
    }

    #[test]
    fn test_full_support_passes_gate() {
        let report = run(vec![]);
        assert_eq!(report.methods.len(), 5);
        assert_eq!(report.supported_count(), 5);
        assert!(gate(&report).is_ok());

        let supply = report.get(GET_TOKEN_SUPPLY).unwrap();
        assert!(supply.data_size.unwrap() > 0);
        assert!(supply.error_detail.is_none());
    }

    #[test]
    fn test_optional_method_failure_still_passes_gate() {
        let report = run(vec![GET_HEALTH, GET_VERSION]);
        assert!(!report.is_supported(GET_HEALTH));
        assert!(gate(&report).is_ok());
    }

    #[test]
    fn test_missing_largest_accounts_fails_gate() {
        let report = run(vec![GET_TOKEN_LARGEST_ACCOUNTS]);
        let err = gate(&report).unwrap_err();
        assert_eq!(err.code_str(), "CAPABILITY_UNSUPPORTED");
        assert!(err.message.contains(GET_TOKEN_LARGEST_ACCOUNTS));

        let detail = report.get(GET_TOKEN_LARGEST_ACCOUNTS).unwrap();
        assert!(detail.error_detail.as_deref().unwrap().contains("Method not found"));
    }
}
