//! Method Fallback Strategy
//!
//! Different RPC implementations accept different optional parameters for the
//! same logical call, and some only answer it through another method. Variants
//! are tried in their configured order through the retry controller; the first
//! success wins. A fixed pause separates variants so a rate-limited endpoint
//! does not see closely spaced distinct request shapes.
//!
//! The holder lookup ends with a getProgramAccounts scan of every token account
//! of the mint. It goes first when more holders are wanted than
//! getTokenLargestAccounts can return.

use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::retry::RetryController;
use crate::models::errors::{AppError, ErrorCode};
use crate::models::types::{Endpoint, RpcOutcome, RpcRequest};
use crate::providers::rpc::CallExecutor;
use crate::providers::solana::{
    program_accounts_params, GET_PROGRAM_ACCOUNTS, GET_TOKEN_LARGEST_ACCOUNTS,
};
use crate::utils::constants::MAX_LARGEST_ACCOUNTS;

/// Name of the holder lookup in logs and exhaustion messages
pub const HOLDER_LOOKUP: &str = "holder lookup";

/// One method and parameter shape for a logical call
#[derive(Debug, Clone, PartialEq)]
pub struct MethodVariant {
    pub description: String,
    pub method: String,
    pub params: Vec<Value>,
}

impl MethodVariant {
    pub fn new(description: impl Into<String>, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            description: description.into(),
            method: method.into(),
            params,
        }
    }
}

/// getTokenLargestAccounts variants, most conservative first
pub fn largest_accounts_variants(mint: &str) -> Vec<MethodVariant> {
    vec![
        MethodVariant::new("Basic method", GET_TOKEN_LARGEST_ACCOUNTS, vec![json!(mint)]),
        MethodVariant::new(
            "Confirmed commitment",
            GET_TOKEN_LARGEST_ACCOUNTS,
            vec![json!(mint), json!({ "commitment": "confirmed" })],
        ),
        MethodVariant::new(
            "Finalized commitment + jsonParsed",
            GET_TOKEN_LARGEST_ACCOUNTS,
            vec![
                json!(mint),
                json!({ "commitment": "finalized", "encoding": "jsonParsed" }),
            ],
        ),
    ]
}

/// Full scan of the mint's token accounts
pub fn program_scan_variant(mint: &str) -> MethodVariant {
    MethodVariant::new(
        "Program accounts scan",
        GET_PROGRAM_ACCOUNTS,
        program_accounts_params(mint),
    )
}

/// Holder lookup order for `top_n` holders
pub fn holder_variants(mint: &str, top_n: usize) -> Vec<MethodVariant> {
    let mut variants = largest_accounts_variants(mint);
    if top_n > MAX_LARGEST_ACCOUNTS {
        variants.insert(0, program_scan_variant(mint));
    } else {
        variants.push(program_scan_variant(mint));
    }
    variants
}

/// First variant that succeeded
#[derive(Debug, Clone)]
pub struct VariantSuccess {
    pub result: Value,
    pub description: String,
    pub method: String,
    pub elapsed: Duration,
}

/// Why one variant failed
#[derive(Debug, Clone, PartialEq)]
pub struct VariantFailure {
    pub description: String,
    pub detail: String,
}

/// Every variant failed; keeps each variant's failure, not just the last
#[derive(Debug, Clone)]
pub struct VariantsExhausted {
    pub call: String,
    pub failures: Vec<VariantFailure>,
}

impl fmt::Display for VariantsExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "All {} variants failed", self.call)?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.description, failure.detail)?;
        }
        Ok(())
    }
}

impl From<VariantsExhausted> for AppError {
    fn from(err: VariantsExhausted) -> Self {
        AppError::new(ErrorCode::AllVariantsExhausted, err.to_string())
    }
}

/// Try `variants` of the logical `call` in order until one succeeds
pub async fn try_variants<E: CallExecutor + ?Sized>(
    executor: &E,
    retry: &RetryController,
    endpoint: &Endpoint,
    call: &str,
    variants: &[MethodVariant],
    timeout: Duration,
    variant_delay: Duration,
) -> Result<VariantSuccess, VariantsExhausted> {
    let mut failures = Vec::with_capacity(variants.len());

    for (index, variant) in variants.iter().enumerate() {
        if index > 0 && !retry.deadline_exceeded() {
            tokio::time::sleep(retry.clamp_to_deadline(variant_delay)).await;
        }
        if retry.deadline_exceeded() {
            warn!("⏰ Deadline reached, skipping remaining {} variants", call);
            break;
        }

        info!("🔀 Attempting: {} ({})", variant.description, variant.method);
        let request = RpcRequest::new(variant.method.as_str(), variant.params.clone());

        match retry.call(executor, endpoint, &request, timeout).await {
            RpcOutcome::Success { result, elapsed } => {
                info!(
                    "✅ {} succeeded in {:.2}s",
                    variant.description,
                    elapsed.as_secs_f64()
                );
                return Ok(VariantSuccess {
                    result,
                    description: variant.description.clone(),
                    method: variant.method.clone(),
                    elapsed,
                });
            }
            failed => {
                warn!("❌ {} failed: {}", variant.description, failed.describe());
                failures.push(VariantFailure {
                    description: variant.description.clone(),
                    detail: failed.describe(),
                });
            }
        }
    }

    Err(VariantsExhausted {
        call: call.to_string(),
        failures,
    })
}

/// Holder accounts through the default variant list for `top_n`
pub async fn fetch_holder_accounts<E: CallExecutor + ?Sized>(
    executor: &E,
    retry: &RetryController,
    endpoint: &Endpoint,
    mint: &str,
    top_n: usize,
    timeout: Duration,
    variant_delay: Duration,
) -> Result<VariantSuccess, VariantsExhausted> {
    try_variants(
        executor,
        retry,
        endpoint,
        HOLDER_LOOKUP,
        &holder_variants(mint, top_n),
        timeout,
        variant_delay,
    )
    .await
}
