//! Core Module - Query Orchestration & Analysis
//!
//! Retry, method fallback, capability probe, endpoint fallback,
//! statistics and report assembly.

pub mod orchestrator;
pub mod probe;
pub mod report;
pub mod retry;
pub mod statistics;
pub mod variants;

pub use orchestrator::*;
pub use probe::*;
pub use report::*;
pub use retry::*;
pub use statistics::*;
pub use variants::*;
