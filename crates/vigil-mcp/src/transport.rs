//! JSON-RPC 2.0 transport: envelope types, SSE-or-JSON response framing, and
//! the retry/backoff loop (spec.md §4.6). Modeled on
//! `assay-registry::client::http::HttpBackend::request`/`request_once`: a
//! single place that owns status-code interpretation, with the retry loop
//! wrapping a non-retrying "once" call.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use rand::Rng;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vigil_common::VigilError;

const JSON_CONTENT_TYPE: &str = "application/json";
const ACCEPT_HEADER: &str = "application/json, text/event-stream";

/// Per-client retry and timeout policy (spec.md §4.6 "Transport").
#[derive(Debug, Clone)]
pub struct McpClientConfig {
    pub bearer_token: Option<String>,
    pub extra_headers: Vec<(String, String)>,
    pub max_retries: u32,
    pub timeout: Duration,
}

impl Default for McpClientConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            extra_headers: Vec::new(),
            max_retries: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: i64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// A JSON-RPC client bound to one MCP server endpoint.
pub struct McpClient {
    http: reqwest::Client,
    base_url: String,
    config: McpClientConfig,
    next_id: AtomicI64,
}

impl McpClient {
    pub fn new(base_url: impl Into<String>, config: McpClientConfig) -> Result<Self, VigilError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VigilError::McpNetworkError {
                detail: format!("failed to build http client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            config,
            next_id: AtomicI64::new(1),
        })
    }

    /// Call `method` with `params`, retrying network errors and 5xx up to
    /// `max_retries` times with exponential backoff and jitter. Never retries
    /// a JSON-RPC `-32601` (method not found) or any 4xx.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, VigilError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut retries = 0;

        loop {
            match self.call_once(method, &params, id).await {
                Ok(v) => return Ok(v),
                Err(e) if is_retryable(&e) && retries < self.config.max_retries => {
                    retries += 1;
                    let base = Duration::from_secs(1 << retries).min(Duration::from_secs(30));
                    let jitter_cap = (base.as_millis() as u64 * 3) / 10;
                    let jitter_ms = rand::thread_rng().gen_range(0..=jitter_cap);
                    let backoff = base + Duration::from_millis(jitter_ms);
                    tracing::warn!(
                        method,
                        error = %e,
                        retry = retries,
                        max_retries = self.config.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying MCP call"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn call_once(&self, method: &str, params: &Value, id: i64) -> Result<Value, VigilError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params: params.clone(),
        };

        let mut request = self
            .http
            .post(&self.base_url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(ACCEPT, ACCEPT_HEADER)
            .json(&body);

        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }
        for (k, v) in &self.config.extra_headers {
            request = request.header(k.as_str(), v.as_str());
        }

        let response = request.send().await.map_err(|e| VigilError::McpNetworkError {
            detail: format!("request failed: {e}"),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| VigilError::McpNetworkError {
            detail: format!("failed to read response body: {e}"),
        })?;

        if status.is_client_error() {
            return Err(VigilError::McpNetworkError {
                detail: format!("HTTP {}: {}", status.as_u16(), truncate(&text, 200)),
            });
        }
        if status.is_server_error() {
            return Err(VigilError::McpNetworkError {
                detail: format!("HTTP {}: {}", status.as_u16(), truncate(&text, 200)),
            });
        }

        let payload = extract_json_payload(&text)?;
        let envelope: RpcEnvelope =
            serde_json::from_value(payload).map_err(|e| VigilError::McpNetworkError {
                detail: format!("malformed JSON-RPC envelope: {e}"),
            })?;

        if let Some(err) = envelope.error {
            if err.code == -32601 {
                return Err(VigilError::McpMethodNotFound {
                    method: method.to_string(),
                });
            }
            return Err(VigilError::McpRpcError {
                code: err.code,
                message: err.message,
            });
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

/// Only network-layer failures (connection errors, timeouts, 5xx) are
/// transient; JSON-RPC level errors and 4xx are treated as final.
fn is_retryable(err: &VigilError) -> bool {
    matches!(err, VigilError::McpNetworkError { .. })
}

/// The response body may be a bare JSON document or a single SSE event whose
/// `data:` line carries the JSON payload. Either framing yields one value.
fn extract_json_payload(raw: &str) -> Result<Value, VigilError> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with("event:") || trimmed.starts_with("data:") {
        for line in trimmed.lines() {
            if let Some(data) = line.strip_prefix("data:") {
                return serde_json::from_str(data.trim()).map_err(|e| VigilError::McpNetworkError {
                    detail: format!("malformed SSE data payload: {e}"),
                });
            }
        }
        return Err(VigilError::McpNetworkError {
            detail: "SSE response carried no data: line".to_string(),
        });
    }
    serde_json::from_str(trimmed).map_err(|e| VigilError::McpNetworkError {
        detail: format!("malformed JSON response: {e}"),
    })
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
