//! Report Assembler
//!
//! Structural combination of one endpoint's metadata, holders, statistics and
//! provenance into an `AnalysisReport`. No I/O happens here.

use chrono::Utc;
use std::time::Duration;
use uuid::Uuid;

use crate::models::types::{
    AnalysisReport, Endpoint, EndpointAttempt, Holder, HolderStatistics, TokenMetadata,
};

/// Builder for a successful report
pub struct ReportAssembler {
    metadata: TokenMetadata,
    holders: Vec<Holder>,
    statistics: HolderStatistics,
    endpoint: Option<Endpoint>,
    method_used: Option<String>,
    holders_elapsed: Duration,
    attempt_log: Vec<EndpointAttempt>,
}

impl ReportAssembler {
    pub fn new(metadata: TokenMetadata, holders: Vec<Holder>, statistics: HolderStatistics) -> Self {
        Self {
            metadata,
            holders,
            statistics,
            endpoint: None,
            method_used: None,
            holders_elapsed: Duration::ZERO,
            attempt_log: Vec::new(),
        }
    }

    /// Endpoint and method variant that produced the holder data
    pub fn with_provenance(mut self, endpoint: Endpoint, method_used: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint);
        self.method_used = Some(method_used.into());
        self
    }

    pub fn with_holders_elapsed(mut self, elapsed: Duration) -> Self {
        self.holders_elapsed = elapsed;
        self
    }

    /// Endpoints abandoned before this one succeeded
    pub fn with_attempt_log(mut self, attempt_log: Vec<EndpointAttempt>) -> Self {
        self.attempt_log = attempt_log;
        self
    }

    pub fn build(self, total_elapsed: Duration) -> AnalysisReport {
        AnalysisReport {
            run_id: Uuid::new_v4(),
            success: true,
            failure_reason: None,
            metadata: Some(self.metadata),
            holders: self.holders,
            statistics: Some(self.statistics),
            endpoint_used: self.endpoint,
            method_used: self.method_used,
            holders_query_elapsed_secs: self.holders_elapsed.as_secs_f64(),
            total_query_elapsed_secs: total_elapsed.as_secs_f64(),
            attempt_log: self.attempt_log,
            analyzed_at: Utc::now(),
        }
    }
}

impl AnalysisReport {
    /// Failure shape: no metadata, holders, statistics or provenance
    pub fn failed(
        reason: impl Into<String>,
        attempt_log: Vec<EndpointAttempt>,
        total_elapsed: Duration,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            success: false,
            failure_reason: Some(reason.into()),
            metadata: None,
            holders: Vec::new(),
            statistics: None,
            endpoint_used: None,
            method_used: None,
            holders_query_elapsed_secs: 0.0,
            total_query_elapsed_secs: total_elapsed.as_secs_f64(),
            attempt_log,
            analyzed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::statistics::aggregate;

    fn metadata() -> TokenMetadata {
        TokenMetadata {
            mint_address: "Mint111".into(),
            decimals: 6,
            raw_supply: 1_000_000_000_000,
            total_supply: 1_000_000.0,
            query_elapsed_secs: 0.2,
            mint_authority: None,
            freeze_authority: None,
            is_initialized: None,
            token_program: None,
            account_query_elapsed_secs: None,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_success_report() {
        let holders = vec![
            Holder::from_raw("addr1", 400_000_000_000, 6),
            Holder::from_raw("addr2", 300_000_000_000, 6),
        ];
        let stats = aggregate(&holders, 1_000_000.0);
        let endpoint = Endpoint::public("https://b.example", "B");

        let report = ReportAssembler::new(metadata(), holders, stats.clone())
            .with_provenance(endpoint.clone(), "Basic method")
            .with_holders_elapsed(Duration::from_millis(1500))
            .with_attempt_log(vec![EndpointAttempt {
                endpoint: "A".into(),
                code: "CAPABILITY_UNSUPPORTED".into(),
                message: "Required methods unsupported: getTokenSupply".into(),
                elapsed_secs: 0.4,
            }])
            .build(Duration::from_secs(3));

        assert!(report.success);
        assert!(report.failure_reason.is_none());
        assert_eq!(report.endpoint_used, Some(endpoint));
        assert_eq!(report.method_used.as_deref(), Some("Basic method"));
        assert_eq!(report.statistics, Some(stats));
        assert_eq!(report.holders_query_elapsed_secs, 1.5);
        assert_eq!(report.total_query_elapsed_secs, 3.0);
        assert_eq!(report.attempt_log.len(), 1);
        assert_eq!(report.top_holders(10).len(), 2);
        assert_eq!(report.total_supply(), 1_000_000.0);

        // Probe results gate the endpoint and stay out of the report
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("capability_report").is_none());
        assert_eq!(json["method_used"], "Basic method");
    }

    #[test]
    fn test_failed_report_is_empty() {
        let report = AnalysisReport::failed("all endpoints failed", vec![], Duration::from_secs(1));
        assert!(!report.success);
        assert_eq!(report.failure_reason.as_deref(), Some("all endpoints failed"));
        assert!(report.metadata.is_none());
        assert!(report.holders.is_empty());
        assert!(report.statistics.is_none());
        assert!(report.endpoint_used.is_none());
        assert_eq!(report.total_supply(), 0.0);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("statistics").is_none());
        assert_eq!(json["success"], false);
    }

    #[test]
    fn test_run_ids_are_unique() {
        let a = AnalysisReport::failed("x", vec![], Duration::ZERO);
        let b = AnalysisReport::failed("x", vec![], Duration::ZERO);
        assert_ne!(a.run_id, b.run_id);
    }
}
