//! Constants Module - Single Source of Truth
//!
//! Default endpoints, timing values and the default token live here.
//! Other modules take these through `AnalyzerConfig`, never directly.

use crate::models::types::Endpoint;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = concat!("holderscope/", env!("CARGO_PKG_VERSION"));

// ============================================
// TOKEN DEFAULTS
// ============================================

/// ROA CORE mint, analyzed when no mint is given
pub const ROACORE_TOKEN_MINT: &str = "5tB5D6DGJMxxHYmNkfJNG237x6pZGEwTzGpUUh62yQJ7";

/// Display symbol for the default mint
pub const ROACORE_SYMBOL: &str = "ROA";

// ============================================
// RPC CONSTANTS
// ============================================

/// Default per-call timeout (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 60;

/// Per-call timeout during the capability probe (seconds)
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

/// Attempts per call during the capability probe
pub const DEFAULT_PROBE_MAX_ATTEMPTS: u32 = 1;

/// Attempts per call during full analysis
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Fixed pause between attempts of the same request (seconds)
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 3;

/// Ceiling for exponential backoff between attempts (seconds)
pub const EXPONENTIAL_MAX_DELAY_SECS: u64 = 30;

/// Jitter applied to exponential backoff (percent of the delay)
pub const EXPONENTIAL_JITTER_PERCENT: u64 = 20;

/// Pause between parameter variants of the same method (seconds)
pub const DEFAULT_VARIANT_DELAY_SECS: u64 = 2;

/// Pause before moving on to the next endpoint (seconds)
pub const DEFAULT_ENDPOINT_DELAY_SECS: u64 = 3;

/// getTokenLargestAccounts never returns more than this many accounts
pub const MAX_LARGEST_ACCOUNTS: usize = 20;

/// Size of an SPL token account, used to filter program account scans
pub const TOKEN_ACCOUNT_SIZE: u64 = 165;

/// Default number of holders to analyze
pub const DEFAULT_TOP_N: usize = 20;

/// Holders shown in the terminal report
pub const DISPLAY_TOP_HOLDERS: usize = 10;

// ============================================
// OUTPUT
// ============================================

/// Default export directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Timestamp format used in export file names
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ============================================
// ENDPOINTS - Single Source of Truth
// ============================================

/// Solana Foundation public RPC
pub const SOLANA_OFFICIAL_RPC: &str = "https://api.mainnet-beta.solana.com";

/// Ankr public RPC
pub const ANKR_RPC: &str = "https://rpc.ankr.com/solana";

/// Public endpoints, most preferred first
pub fn default_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::public(SOLANA_OFFICIAL_RPC, "Solana Official RPC"),
        Endpoint::public(ANKR_RPC, "Ankr RPC"),
    ]
}
