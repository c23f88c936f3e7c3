//! Tool System module.
//!
//! Tools are not implemented locally: they live in a separate tool server
//! that speaks JSON-RPC. This module defines the `ToolServer` trait used to
//! reach that server, and the `ToolDirectory` that caches what it offers.
//!
//! - **ToolServer**: lists tools and executes one tool by name
//! - **ToolDirectory**: fetched once at startup, rendered into the system
//!   prompt so the model knows which tools exist and what they accept

pub mod rpc;

use anyhow::bail;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::ChatError;
use crate::types::ToolDescriptor;

/// Trait implemented by every tool server transport.
#[async_trait]
pub trait ToolServer: Send + Sync {
    /// Fetch the tools the server exposes (`tools/list`).
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ChatError>;

    /// Execute one tool and return its result as opaque text (`tools/call`).
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>)
        -> Result<String, ChatError>;
}

/// The tools available for this session, in server order.
#[derive(Debug, Clone)]
pub struct ToolDirectory {
    tools: Vec<ToolDescriptor>,
}

impl ToolDirectory {
    /// Fetch the directory once. An empty result is returned as-is; the
    /// caller decides whether that is fatal.
    pub async fn fetch(server: &dyn ToolServer) -> Result<Self, ChatError> {
        let tools = server.list_tools().await?;
        info!(count = tools.len(), "loaded tool directory");
        Ok(Self { tools })
    }

    #[cfg(test)]
    pub fn from_tools(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Pretty-printed JSON array of `{name, description, inputSchema}`.
    pub fn render(&self) -> String {
        serde_json::to_string_pretty(&self.tools).unwrap_or_else(|_| "[]".to_string())
    }

    /// Build the system prompt by substituting `{tools}` in `template`.
    pub fn system_prompt(&self, template: &str) -> String {
        template.replace("{tools}", &self.render())
    }
}

/// Load the directory for a session. No tools, or no answer at all,
/// means the session cannot start.
pub async fn load_directory(server: &dyn ToolServer, url: &str) -> anyhow::Result<ToolDirectory> {
    match ToolDirectory::fetch(server).await {
        Ok(directory) if !directory.is_empty() => Ok(directory),
        Ok(_) => bail!("Tool server at {} exposes no tools", url),
        Err(e) => {
            warn!(error = %e, "tool listing failed");
            bail!("Failed to connect to tool server at {}: {}", url, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StaticServer(Vec<ToolDescriptor>);

    #[async_trait]
    impl ToolServer for StaticServer {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ChatError> {
            Ok(self.0.clone())
        }

        async fn call_tool(
            &self,
            _name: &str,
            _arguments: Map<String, Value>,
        ) -> Result<String, ChatError> {
            Ok(String::new())
        }
    }

    struct DownServer;

    #[async_trait]
    impl ToolServer for DownServer {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ChatError> {
            Err(ChatError::Transport("connection refused".to_string()))
        }

        async fn call_tool(
            &self,
            _name: &str,
            _arguments: Map<String, Value>,
        ) -> Result<String, ChatError> {
            Ok(String::new())
        }
    }

    fn tool(name: &str) -> ToolDescriptor {
        ToolDescriptor {
            name: name.to_string(),
            description: format!("{name} description"),
            input_schema: json!({"type": "object"}),
        }
    }

    #[tokio::test]
    async fn test_fetch_preserves_server_order() {
        let server = StaticServer(vec![tool("listResources"), tool("getAPIResources")]);
        let directory = ToolDirectory::fetch(&server).await.unwrap();
        assert_eq!(directory.names(), vec!["listResources", "getAPIResources"]);
        assert_eq!(directory.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_empty_is_not_an_error() {
        let directory = ToolDirectory::fetch(&StaticServer(vec![])).await.unwrap();
        assert!(directory.is_empty());
    }

    #[tokio::test]
    async fn test_load_directory_accepts_tools() {
        let server = StaticServer(vec![tool("listResources")]);
        let directory = load_directory(&server, "http://localhost:8080").await.unwrap();
        assert_eq!(directory.names(), vec!["listResources"]);
    }

    #[tokio::test]
    async fn test_load_directory_rejects_empty_listing() {
        let err = load_directory(&StaticServer(vec![]), "http://localhost:8080")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exposes no tools"));
    }

    #[tokio::test]
    async fn test_load_directory_rejects_failed_listing() {
        let err = load_directory(&DownServer, "http://localhost:8080")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Failed to connect"));
        assert!(message.contains("connection refused"));
    }

    #[test]
    fn test_render_is_reduced_pretty_json() {
        let directory = ToolDirectory::from_tools(vec![tool("describeResource")]);
        let rendered = directory.render();

        assert!(rendered.starts_with("[\n  {"));
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            parsed,
            json!([{
                "name": "describeResource",
                "description": "describeResource description",
                "inputSchema": {"type": "object"}
            }])
        );
    }

    #[test]
    fn test_system_prompt_substitution() {
        let directory = ToolDirectory::from_tools(vec![tool("a")]);
        let prompt = directory.system_prompt("Tools:\n{tools}\nBye");
        assert!(prompt.starts_with("Tools:\n["));
        assert!(prompt.contains("\"name\": \"a\""));
        assert!(prompt.ends_with("]\nBye"));
    }
}
