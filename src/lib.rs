//! holderscope Library
//!
//! Resilient Solana token holder analysis:
//! - Timed JSON-RPC calls with bounded retries
//! - Fallback across parameter variants and across endpoints
//! - Capability probing before committing to an endpoint
//! - Concentration statistics over the largest holders
//! - CSV / JSON export and terminal rendering

pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{HolderAnalyzer, RetryController, RetryPolicy};
pub use crate::models::{
    AnalysisReport, AnalyzerConfig, AppError, AppResult, Endpoint, EndpointTier, ErrorCode,
    Holder, HolderStatistics, TokenMetadata,
};
pub use crate::providers::{CallExecutor, HttpExecutor};
