//! Configuration management for k8s-chat.
//!
//! Values come from built-in defaults, then an optional TOML file, then a
//! few environment overrides. Nothing is ever written back to disk.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: "https://ellm.nrp-nautilus.io/v1".to_string(),
            model: "deepseek-r1".to_string(),
            temperature: 0.7,
            api_key: None,
            api_key_env: "LLM_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Where the tool server lives and how to start it when it is not running.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: String,
    pub rpc_path: String,
    pub command: String,
    pub args: Vec<String>,
    pub probe_timeout_secs: u64,
    pub list_timeout_secs: u64,
    pub call_timeout_secs: u64,
    /// Wait after launching the server before the first request.
    pub settle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let command = if cfg!(windows) {
            "k8s-mcp-server.exe"
        } else {
            "k8s-mcp-server"
        };
        Self {
            url: "http://localhost:8080".to_string(),
            rpc_path: "/mcp".to_string(),
            command: command.to_string(),
            args: ["--mode", "streamable-http", "--port", "8080"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            probe_timeout_secs: 1,
            list_timeout_secs: 10,
            call_timeout_secs: 30,
            settle_secs: 3,
        }
    }
}

impl ServerConfig {
    pub fn rpc_url(&self) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            self.rpc_path.trim_start_matches('/')
        )
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub prompt: String,
    /// Matched case-sensitively against the trimmed input line.
    pub exit_keywords: Vec<String>,
    /// Maximum characters of a tool result folded back into the conversation.
    pub context_result_chars: usize,
    /// Reject replies that repeat a `TOOL:` or `ARGS:` line instead of
    /// letting the last one win.
    pub strict_directives: bool,
    /// `{tools}` is replaced with the tool directory.
    pub system_prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt: "You: ".to_string(),
            exit_keywords: vec!["exit".to_string(), "quit".to_string(), "bye".to_string()],
            context_result_chars: 500,
            strict_directives: false,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an expert Kubernetes assistant with access to a real K8s cluster via MCP tools.

Available tools:
{tools}

When users ask about Kubernetes resources:
1. Determine which tool(s) to use based on their question
2. Respond in this EXACT format:
   TOOL: <tool_name>
   ARGS: {"param": "value"}

3. After tool execution, interpret the results naturally for the user

Common patterns:
- "list/show pods" → listResources with Kind="Pod"
- "get api resources" → getAPIResources
- "describe <resource>" → describeResource with Kind, name, namespace
- "what namespaces" → listResources with Kind="Namespace"

If no tool is needed (general questions), respond conversationally."#;

impl AppConfig {
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".k8s-chat").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                Self::from_file(path)?
            }
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(model) = var("K8S_CHAT_MODEL") {
            self.chat.model = model;
        }
        if let Some(api_base) = var("K8S_CHAT_API_BASE") {
            self.chat.api_base = api_base;
        }
        if let Some(url) = var("K8S_CHAT_SERVER_URL") {
            self.server.url = url;
        }
    }

    pub fn api_key(&self) -> Result<String> {
        if let Some(key) = &self.chat.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(&self.chat.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => bail!(
                "API key not found. Either:\n  \
                 1. Set chat.api_key in config file: {}\n  \
                 2. Set environment variable: export {}=your-key",
                Self::default_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                self.chat.api_key_env
            ),
        }
    }
}
