//! RPC Client Module - Timed Call Executor
//!
//! Sends one JSON-RPC request to one endpoint and classifies what came back:
//! 1. Decodable envelope with a `result` and no `error` -> `Success`
//! 2. Envelope with an `error` (or a non-2xx status) -> `RpcError`
//! 3. Nothing usable before the timeout -> `TransportError { Timeout }`
//! 4. Any other transport failure -> `TransportError { ConnectionFailed }`
//!
//! Wall-clock time is measured from send to completion on every path, and the
//! executor never returns an error of its own: the outcome is the error.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{Endpoint, RpcOutcome, RpcRequest, TransportErrorKind};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

/// Issues a single timed RPC call. Implementations must not retry.
#[async_trait]
pub trait CallExecutor: Send + Sync {
    async fn execute(&self, endpoint: &Endpoint, request: &RpcRequest, timeout: Duration) -> RpcOutcome;
}

/// JSON-RPC error structure
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Lenient extraction from an `error` member; some gateways send a bare string
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(message) => Self {
                code: -32000,
                message: message.clone(),
            },
            other => Self {
                code: other.get("code").and_then(Value::as_i64).unwrap_or(-32000),
                message: other
                    .get("message")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .unwrap_or_else(|| other.to_string()),
            },
        }
    }

    /// Check if this is a rate limit error (HTTP 429 or code -32005)
    pub fn is_rate_limit(&self) -> bool {
        self.code == 429 || self.code == -32005 || self.message.to_lowercase().contains("rate limit")
    }
}

/// Classify a raw response body. `status` is the HTTP status code.
pub fn classify_body(status: u16, body: &str, elapsed: Duration) -> RpcOutcome {
    let envelope: Option<Value> = serde_json::from_str(body).ok();

    if let Some(error) = envelope
        .as_ref()
        .and_then(|v| v.get("error"))
        .filter(|e| !e.is_null())
    {
        let error = RpcError::from_value(error);
        return RpcOutcome::RpcError {
            code: error.code,
            message: error.message,
            elapsed,
        };
    }

    if !(200..300).contains(&status) {
        return RpcOutcome::RpcError {
            code: status as i64,
            message: format!("HTTP Error {}", status),
            elapsed,
        };
    }

    match envelope {
        Some(Value::Object(mut map)) if map.contains_key("result") => RpcOutcome::Success {
            result: map.remove("result").unwrap_or(Value::Null),
            elapsed,
        },
        _ => RpcOutcome::RpcError {
            code: -32700,
            message: "invalid response: no result in JSON-RPC envelope".to_string(),
            elapsed,
        },
    }
}

/// reqwest-backed executor
pub struct HttpExecutor {
    /// HTTP client with custom headers (gzip enabled)
    client: reqwest::Client,
    /// JSON-RPC request id counter
    next_id: AtomicU64,
}

impl HttpExecutor {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            client: Self::build_client()?,
            next_id: AtomicU64::new(1),
        })
    }

    /// Build HTTP client with custom headers. Timeouts are set per request.
    fn build_client() -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| AppError::invalid_config(format!("Failed to build HTTP client: {}", e)))
    }

    fn classify_transport(err: &reqwest::Error, elapsed: Duration, timeout: Duration) -> TransportErrorKind {
        if err.is_timeout() || elapsed >= timeout {
            TransportErrorKind::Timeout
        } else {
            TransportErrorKind::ConnectionFailed
        }
    }
}

#[async_trait]
impl CallExecutor for HttpExecutor {
    async fn execute(&self, endpoint: &Endpoint, request: &RpcRequest, timeout: Duration) -> RpcOutcome {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = request.to_payload(id);
        let started = Instant::now();

        let response = self
            .client
            .post(&endpoint.url)
            .timeout(timeout)
            .json(&payload)
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(e) => {
                let elapsed = started.elapsed();
                let kind = Self::classify_transport(&e, elapsed, timeout);
                warn!(
                    "🔌 {} → {} transport failure ({:?}) after {:.2}s: {}",
                    request.method,
                    endpoint.masked_url(),
                    kind,
                    elapsed.as_secs_f64(),
                    e
                );
                return RpcOutcome::TransportError { kind, elapsed };
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let elapsed = started.elapsed();
                return RpcOutcome::TransportError {
                    kind: Self::classify_transport(&e, elapsed, timeout),
                    elapsed,
                };
            }
        };

        let elapsed = started.elapsed();
        debug!(
            "📩 {} → HTTP {} ({} bytes) in {:.2}s",
            request.method,
            status,
            body.len(),
            elapsed.as_secs_f64()
        );

        let outcome = classify_body(status, &body, elapsed);
        if let RpcOutcome::RpcError { code, ref message, .. } = outcome {
            let error = RpcError {
                code,
                message: message.clone(),
            };
            if error.is_rate_limit() {
                warn!("⏳ Rate limited by {} on {}", endpoint.name, request.method);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(10);

    #[test]
    fn test_success_envelope() {
        let outcome = classify_body(200, r#"{"jsonrpc":"2.0","result":"ok","id":1}"#, MS);
        assert_eq!(
            outcome,
            RpcOutcome::Success {
                result: serde_json::json!("ok"),
                elapsed: MS
            }
        );
    }

    #[test]
    fn test_null_result_is_success() {
        let outcome = classify_body(200, r#"{"jsonrpc":"2.0","result":null,"id":1}"#, MS);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":1}"#;
        match classify_body(200, body, MS) {
            RpcOutcome::RpcError { code, message, elapsed } => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
                assert_eq!(elapsed, MS);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_http_status_without_envelope() {
        match classify_body(429, "Too Many Requests", MS) {
            RpcOutcome::RpcError { code, message, .. } => {
                assert_eq!(code, 429);
                assert_eq!(message, "HTTP Error 429");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_envelope_on_http_error_status() {
        let body = r#"{"jsonrpc":"2.0","error":{"code":-32005,"message":"rate limit exceeded"},"id":1}"#;
        match classify_body(429, body, MS) {
            RpcOutcome::RpcError { code, .. } => assert_eq!(code, -32005),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_garbage_body() {
        match classify_body(200, "<html>gateway</html>", MS) {
            RpcOutcome::RpcError { code, .. } => assert_eq!(code, -32700),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rpc_error_classification() {
        let rate_limit = RpcError {
            code: -32005,
            message: "Rate limit exceeded".to_string(),
        };
        assert!(rate_limit.is_rate_limit());

        let method_not_found = RpcError::from_value(&serde_json::json!({
            "code": -32601,
            "message": "Method not found"
        }));
        assert_eq!(method_not_found.code, -32601);
        assert!(!method_not_found.is_rate_limit());

        let bare = RpcError::from_value(&serde_json::json!("upstream down"));
        assert_eq!(bare.message, "upstream down");
        assert_eq!(bare.code, -32000);
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_failed() {
        // Bind then drop to get a local port nobody listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let executor = HttpExecutor::new().expect("client");
        let endpoint = Endpoint::public(format!("http://127.0.0.1:{}", port), "Closed");
        let outcome = executor
            .execute(&endpoint, &RpcRequest::bare("getHealth"), Duration::from_secs(2))
            .await;

        assert!(matches!(
            outcome,
            RpcOutcome::TransportError {
                kind: TransportErrorKind::ConnectionFailed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        // Accept and hold the connection without ever answering
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let timeout = Duration::from_millis(300);
        let executor = HttpExecutor::new().expect("client");
        let endpoint = Endpoint::public(format!("http://{}", addr), "Silent");
        let outcome = executor
            .execute(&endpoint, &RpcRequest::bare("getHealth"), timeout)
            .await;
        server.abort();

        match outcome {
            RpcOutcome::TransportError { kind, elapsed } => {
                assert_eq!(kind, TransportErrorKind::Timeout);
                assert!(elapsed >= timeout, "returned after {:?}", elapsed);
                assert!(elapsed < Duration::from_secs(5));
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
    }
}
