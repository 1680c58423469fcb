//! Centralized Error Handling Module
//!
//! Every failure carries a unique code so the attempt log and the terminal
//! report can say exactly why an endpoint was abandoned.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - RPC_xxx: transport / remote errors (retryable)
//! - CAPABILITY_xxx, ALL_xxx: fallback decisions (never retried in place)
//! - CFG_xxx, EXPORT_xxx: configuration and output errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // RPC Errors
    // ============================================
    /// Connection could not be established or dropped before a response
    RpcConnectionFailed,
    /// Per-call timeout elapsed
    RpcTimeout,
    /// Remote returned an error envelope (or a non-2xx status)
    RpcError,
    /// Response decoded but a required field was missing or malformed
    RpcInvalidResponse,

    // ============================================
    // Fallback Errors
    // ============================================
    /// Capability probe showed a required method is unavailable
    CapabilityUnsupported,
    /// Token supply could not be fetched
    MetadataUnavailable,
    /// Every parameter variant of a method failed
    AllVariantsExhausted,
    /// Every endpoint failed (terminal)
    AllEndpointsExhausted,
    /// Overall run deadline elapsed (terminal)
    DeadlineExceeded,

    // ============================================
    // Configuration / Output Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// CSV or JSON export failed
    ExportFailed,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RpcConnectionFailed => "RPC_CONNECTION_FAILED",
            Self::RpcTimeout => "RPC_TIMEOUT",
            Self::RpcError => "RPC_ERROR",
            Self::RpcInvalidResponse => "RPC_INVALID_RESPONSE",

            Self::CapabilityUnsupported => "CAPABILITY_UNSUPPORTED",
            Self::MetadataUnavailable => "METADATA_UNAVAILABLE",
            Self::AllVariantsExhausted => "ALL_VARIANTS_EXHAUSTED",
            Self::AllEndpointsExhausted => "ALL_ENDPOINTS_EXHAUSTED",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ExportFailed => "EXPORT_FAILED",
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// RPC connection failed
    pub fn rpc_connection_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcConnectionFailed, msg)
    }

    /// RPC timeout
    pub fn rpc_timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcTimeout, msg)
    }

    /// Remote error envelope
    pub fn rpc_error(code: i64, msg: impl AsRef<str>) -> Self {
        Self::new(
            ErrorCode::RpcError,
            format!("{} (code: {})", msg.as_ref(), code),
        )
    }

    /// Malformed or incomplete response
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcInvalidResponse, msg)
    }

    /// Probe gate failed
    pub fn capability_unsupported(methods: &[&str]) -> Self {
        Self::new(
            ErrorCode::CapabilityUnsupported,
            format!("Required methods unsupported: {}", methods.join(", ")),
        )
    }

    /// Token supply query failed
    pub fn metadata_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::MetadataUnavailable, msg)
    }

    /// All endpoints failed
    pub fn all_endpoints_exhausted() -> Self {
        Self::new(ErrorCode::AllEndpointsExhausted, "all endpoints failed")
    }

    /// Overall deadline elapsed
    pub fn deadline_exceeded() -> Self {
        Self::new(ErrorCode::DeadlineExceeded, "overall deadline exceeded")
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Export failed
    pub fn export_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExportFailed, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::ExportFailed, "IO error", err)
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        Self::with_source(ErrorCode::ExportFailed, "CSV write error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::RpcInvalidResponse, "JSON error", err)
    }
}
