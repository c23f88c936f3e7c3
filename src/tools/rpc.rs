//! JSON-RPC tool server client over HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use super::ToolServer;
use crate::config::ServerConfig;
use crate::error::{snippet, ChatError};
use crate::types::ToolDescriptor;

// --- Wire Types ---

#[derive(Serialize, Debug)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize, Debug, Default)]
struct RpcResponse {
    #[serde(default)]
    result: Option<RpcResult>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize, Debug, Default)]
struct RpcResult {
    #[serde(default)]
    tools: Vec<ToolDescriptor>,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Debug)]
struct RpcError {
    message: String,
}

// --- Client ---

pub struct HttpToolServer {
    rpc_url: String,
    list_timeout: Duration,
    call_timeout: Duration,
    next_id: AtomicU64,
    client: reqwest::Client,
}

impl HttpToolServer {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            rpc_url: config.rpc_url(),
            list_timeout: Duration::from_secs(config.list_timeout_secs),
            call_timeout: Duration::from_secs(config.call_timeout_secs),
            next_id: AtomicU64::new(1),
            client: reqwest::Client::new(),
        }
    }

    /// POST one request and return the decoded envelope plus the raw body.
    async fn send(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<(RpcResponse, String), ChatError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let started = Instant::now();

        let response = self
            .client
            .post(&self.rpc_url)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(ChatError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(ChatError::from_reqwest)?;
        debug!(
            id,
            method,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tool server responded"
        );

        if !status.is_success() {
            // Servers may pair an error status with a JSON-RPC error envelope.
            if let Ok(RpcResponse {
                error: Some(error), ..
            }) = serde_json::from_str::<RpcResponse>(&body)
            {
                return Err(ChatError::Tool {
                    message: error.message,
                });
            }
            return Err(ChatError::Http {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let envelope: RpcResponse = serde_json::from_str(&body).map_err(|e| {
            ChatError::Decode(format!("{} (body: {})", e, snippet(&body)))
        })?;

        if let Some(error) = envelope.error {
            return Err(ChatError::Tool {
                message: error.message,
            });
        }
        Ok((envelope, body))
    }
}

#[async_trait]
impl ToolServer for HttpToolServer {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ChatError> {
        let (envelope, _) = self.send("tools/list", json!({}), self.list_timeout).await?;
        Ok(envelope.result.unwrap_or_default().tools)
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<String, ChatError> {
        let params = json!({ "name": name, "arguments": arguments });
        let (envelope, body) = self.send("tools/call", params, self.call_timeout).await?;

        // A result without content blocks is passed through verbatim.
        match envelope
            .result
            .and_then(|r| r.content.into_iter().next())
        {
            Some(block) => Ok(block.text),
            None => Ok(body),
        }
    }
}
