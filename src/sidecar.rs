//! Tool server process lifecycle.
//!
//! If nothing answers at the tool server address we start the server
//! ourselves, give it a moment to come up, and kill it again when the
//! session ends. The handle is owned by `main`; there is no global state.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("failed to start tool server `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Decides whether the tool server is already up.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_alive(&self) -> bool;
}

/// GETs the server's base address; any HTTP response counts as alive.
pub struct HttpProbe {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            url: config.url.clone(),
            timeout: config.probe_timeout(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn is_alive(&self) -> bool {
        match self.client.get(&self.url).timeout(self.timeout).send().await {
            Ok(response) => {
                debug!(url = %self.url, status = response.status().as_u16(), "probe answered");
                true
            }
            Err(e) => {
                debug!(url = %self.url, error = %e, "probe failed");
                false
            }
        }
    }
}

/// How to launch the server when the probe fails.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub command: String,
    pub args: Vec<String>,
    pub settle: Duration,
}

impl From<&ServerConfig> for LaunchSpec {
    fn from(config: &ServerConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            settle: config.settle(),
        }
    }
}

/// The server locates its kubeconfig through `HOME`, which Windows does
/// not set; point it at the user profile there.
fn home_override(windows: bool, userprofile: Option<String>) -> Option<String> {
    if windows {
        userprofile.filter(|p| !p.is_empty())
    } else {
        None
    }
}

/// Handle to the tool server process.
///
/// `child` is `None` when the server was already running and we do not
/// own it.
#[derive(Debug)]
pub struct Sidecar {
    child: Option<Child>,
}

impl Sidecar {
    /// Probe once; launch exactly once if needed and wait `spec.settle`.
    pub async fn ensure_running(
        probe: &dyn LivenessProbe,
        spec: &LaunchSpec,
    ) -> Result<Self, SidecarError> {
        if probe.is_alive().await {
            info!("tool server already running");
            return Ok(Self { child: None });
        }

        info!(command = %spec.command, args = ?spec.args, "starting tool server");
        let mut command = Command::new(&spec.command);
        if let Some(home) = home_override(cfg!(windows), std::env::var("USERPROFILE").ok()) {
            command.env("HOME", home);
        }
        let child = command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SidecarError::Spawn {
                command: spec.command.clone(),
                source,
            })?;

        debug!(settle_ms = spec.settle.as_millis() as u64, "waiting for tool server");
        tokio::time::sleep(spec.settle).await;
        Ok(Self { child: Some(child) })
    }

    /// True when this session started the server.
    pub fn is_managed(&self) -> bool {
        self.child.is_some()
    }

    /// Best-effort termination of a server we started.
    pub async fn shutdown(self) {
        let Some(mut child) = self.child else {
            return;
        };
        info!("stopping tool server");
        if let Err(e) = child.kill().await {
            warn!(error = %e, "failed to stop tool server");
        }
    }
}
