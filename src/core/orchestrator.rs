//! Endpoint Fallback Orchestrator
//!
//! Drives one analysis run across an ordered endpoint list:
//! 1. Capability probe, gated on the two token methods
//! 2. Token metadata (supply + decimals, best-effort mint enrichment)
//! 3. Holder accounts through the method variants (largest accounts, then a
//!    program account scan)
//! 4. Holder balances with the same endpoint's decimals, then statistics
//!
//! The first endpoint that completes every step produces the report. Anything
//! gathered from an endpoint that later fails is dropped with it.

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::core::probe::{gate, probe_endpoint};
use crate::core::report::ReportAssembler;
use crate::core::retry::RetryController;
use crate::core::statistics::{aggregate, sort_descending};
use crate::core::variants::fetch_holder_accounts;
use crate::models::config::AnalyzerConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{AnalysisReport, Endpoint, EndpointAttempt, Holder, TokenMetadata};
use crate::providers::rpc::CallExecutor;
use crate::providers::solana::{
    mint_account_request, parse_holder_accounts, parse_mint_info, parse_token_supply,
    token_program_label, token_supply_request, LargestAccount,
};

/// Holder concentration analyzer over a fallback list of endpoints
pub struct HolderAnalyzer<E: CallExecutor> {
    executor: E,
    config: AnalyzerConfig,
}

impl<E: CallExecutor> HolderAnalyzer<E> {
    pub fn new(executor: E, config: AnalyzerConfig) -> Self {
        Self { executor, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Analyze `mint` with the configured endpoints and top-N
    pub async fn run(&self, mint: &str) -> AnalysisReport {
        self.analyze(&self.config.endpoints, mint, self.config.top_n)
            .await
    }

    /// Try `endpoints` in order until one produces a complete analysis.
    /// Never fails: exhaustion is reported through `success: false`.
    pub async fn analyze(&self, endpoints: &[Endpoint], mint: &str, top_n: usize) -> AnalysisReport {
        let started = Instant::now();
        info!(
            "🎯 Analyzing {} across {} endpoint(s), {} attempt(s) per call",
            mint,
            endpoints.len(),
            self.config.max_attempts.max(1)
        );

        if endpoints.is_empty() {
            warn!("⚠️ No endpoints configured");
            return AnalysisReport::failed(
                AppError::all_endpoints_exhausted().message,
                Vec::new(),
                started.elapsed(),
            );
        }

        let deadline = self.config.overall_deadline.map(|budget| started + budget);
        let retry = RetryController::new(self.config.max_attempts, self.config.retry_policy.clone())
            .with_deadline(deadline);
        let probe_retry =
            RetryController::new(self.config.probe_max_attempts, self.config.retry_policy.clone())
                .with_deadline(deadline);

        let mut attempt_log = Vec::new();

        for (index, endpoint) in endpoints.iter().enumerate() {
            if index > 0 && !retry.deadline_exceeded() {
                let pause = retry.clamp_to_deadline(self.config.endpoint_delay);
                debug!("⏳ Waiting {:.1}s before next endpoint", pause.as_secs_f64());
                tokio::time::sleep(pause).await;
            }
            if retry.deadline_exceeded() {
                break;
            }

            info!(
                "🌐 Endpoint {}/{}: {} [{}]",
                index + 1,
                endpoints.len(),
                endpoint.label(),
                endpoint.masked_url()
            );
            let attempt_started = Instant::now();

            match self
                .analyze_endpoint(endpoint, mint, top_n, &retry, &probe_retry)
                .await
            {
                Ok(assembler) => {
                    info!("✅ Analysis complete using {}", endpoint.label());
                    return assembler
                        .with_attempt_log(attempt_log)
                        .build(started.elapsed());
                }
                Err(err) => {
                    warn!("❌ {} failed: {}", endpoint.label(), err);
                    attempt_log.push(EndpointAttempt {
                        endpoint: endpoint.name.clone(),
                        code: err.code_str().to_string(),
                        message: err.message.clone(),
                        elapsed_secs: attempt_started.elapsed().as_secs_f64(),
                    });
                }
            }
        }

        let reason = if retry.deadline_exceeded() {
            AppError::deadline_exceeded()
        } else {
            AppError::all_endpoints_exhausted()
        };
        warn!("🛑 {} ({} endpoint(s) tried)", reason.message, attempt_log.len());
        AnalysisReport::failed(reason.message, attempt_log, started.elapsed())
    }

    /// Everything needed from a single endpoint, or the first error that disqualified it
    async fn analyze_endpoint(
        &self,
        endpoint: &Endpoint,
        mint: &str,
        top_n: usize,
        retry: &RetryController,
        probe_retry: &RetryController,
    ) -> AppResult<ReportAssembler> {
        let capabilities = probe_endpoint(
            &self.executor,
            probe_retry,
            endpoint,
            mint,
            self.config.probe_timeout,
        )
        .await;
        info!(
            "📋 {}/{} probe methods supported",
            capabilities.supported_count(),
            capabilities.methods.len()
        );
        for method in &capabilities.methods {
            debug!(
                "   {} {}: {}",
                method.method,
                if method.supported { "ok" } else { "failed" },
                method.error_detail.as_deref().unwrap_or("-")
            );
        }
        gate(&capabilities)?;

        let metadata = self.fetch_metadata(endpoint, mint, retry).await?;

        info!("👥 Fetching top {} holders", top_n);
        let variant = fetch_holder_accounts(
            &self.executor,
            retry,
            endpoint,
            mint,
            top_n,
            self.config.default_timeout,
            self.config.variant_delay,
        )
        .await?;

        let accounts = parse_holder_accounts(&variant.method, &variant.result)?;
        let holders = build_holders(accounts, metadata.decimals, top_n);
        info!("📊 {} holders with nonzero balance", holders.len());

        let statistics = aggregate(&holders, metadata.total_supply);

        Ok(ReportAssembler::new(metadata, holders, statistics)
            .with_provenance(endpoint.clone(), variant.description)
            .with_holders_elapsed(variant.elapsed))
    }

    async fn fetch_metadata(
        &self,
        endpoint: &Endpoint,
        mint: &str,
        retry: &RetryController,
    ) -> AppResult<TokenMetadata> {
        info!("🪙 Fetching token supply");
        let outcome = retry
            .call(
                &self.executor,
                endpoint,
                &token_supply_request(mint),
                self.config.default_timeout,
            )
            .await;

        let (result, elapsed) = outcome
            .into_result()
            .map_err(|e| AppError::metadata_unavailable(format!("getTokenSupply: {}", e.message)))?;
        let supply = parse_token_supply(&result)?;

        let mut metadata = TokenMetadata {
            mint_address: mint.to_string(),
            decimals: supply.decimals,
            raw_supply: supply.amount,
            total_supply: supply.ui_amount(),
            query_elapsed_secs: elapsed.as_secs_f64(),
            mint_authority: None,
            freeze_authority: None,
            is_initialized: None,
            token_program: None,
            account_query_elapsed_secs: None,
            observed_at: Utc::now(),
        };
        info!(
            "   Supply {} (decimals {})",
            metadata.total_supply, metadata.decimals
        );

        self.enrich_metadata(endpoint, mint, retry, &mut metadata).await;
        Ok(metadata)
    }

    /// Mint authorities from a jsonParsed account read; failure keeps the minimal metadata
    async fn enrich_metadata(
        &self,
        endpoint: &Endpoint,
        mint: &str,
        retry: &RetryController,
        metadata: &mut TokenMetadata,
    ) {
        let outcome = retry
            .call(
                &self.executor,
                endpoint,
                &mint_account_request(mint),
                self.config.default_timeout,
            )
            .await;

        let info = match outcome.into_result() {
            Ok((result, elapsed)) => {
                metadata.account_query_elapsed_secs = Some(elapsed.as_secs_f64());
                parse_mint_info(&result)
            }
            Err(e) => {
                debug!("Mint account unavailable: {}", e);
                None
            }
        };

        match info {
            Some(info) => {
                metadata.mint_authority = info.mint_authority;
                metadata.freeze_authority = info.freeze_authority;
                metadata.is_initialized = Some(info.is_initialized);
                metadata.token_program = info
                    .owner_program
                    .as_deref()
                    .map(|owner| token_program_label(owner).to_string());
            }
            None => warn!("⚠️ Mint details unavailable, continuing with basic metadata"),
        }
    }
}

/// Drop empty accounts, scale by `decimals`, sort descending, keep the first `top_n`
pub fn build_holders(accounts: Vec<LargestAccount>, decimals: u8, top_n: usize) -> Vec<Holder> {
    let mut holders: Vec<Holder> = accounts
        .into_iter()
        .filter(|account| account.amount > 0)
        .map(|account| Holder::from_raw(account.address, account.amount, decimals))
        .collect();
    sort_descending(&mut holders);
    holders.truncate(top_n);
    holders
}
