//! Tunnel Gate - optional VPN tunnel before task execution
//!
//! A run asks for a tunnel through `config.connection.vpnConnection`. When
//! that value is present the tunnel must be up before the handler starts; a
//! failure aborts the run and the handler is never invoked.
//!
//! - `CommandTunnel` - launches a VPN client process and waits for its ready line
//! - `NoTunnel` - refuses every request (no tunnel program configured)

use aries_foundation::{Error, Result, TunnelSection};
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Environment variable carrying the VPN connection JSON to the tunnel process
pub const VPN_CONNECTION_ENV: &str = "ARIES_VPN_CONNECTION";

/// The `config.connection.vpnConnection` value, if the run asks for a tunnel
///
/// Missing keys, non-object configs and falsy values (`null`, `false`, `0`,
/// `""`) all mean "no tunnel".
pub fn vpn_connection(config: &Value) -> Option<&Value> {
    let value = config.get("connection")?.get("vpnConnection")?;
    is_truthy(value).then_some(value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Open a tunnel when `config` requests one
pub async fn open_if_requested(
    connector: &dyn TunnelConnector,
    config: &Value,
) -> Result<Option<TunnelHandle>> {
    match vpn_connection(config) {
        Some(vpn) => {
            debug!("Opening tunnel via {}", connector.name());
            connector.open(vpn).await.map(Some)
        }
        None => Ok(None),
    }
}

// ============================================================================
// TunnelConnector
// ============================================================================

/// Tunnel backend
#[async_trait]
pub trait TunnelConnector: Send + Sync {
    /// Establish the tunnel; resolves once it is usable
    async fn open(&self, vpn_connection: &Value) -> Result<TunnelHandle>;

    /// Connector name
    fn name(&self) -> &'static str;
}

/// Keeps a tunnel alive; dropping it tears the tunnel down
#[derive(Debug, Default)]
pub struct TunnelHandle {
    child: Option<Child>,
    output: Option<JoinHandle<()>>,
}

impl TunnelHandle {
    /// Handle for a tunnel whose lifetime is managed elsewhere
    pub fn detached() -> Self {
        Self::default()
    }

    fn process(child: Child, output: JoinHandle<()>) -> Self {
        Self {
            child: Some(child),
            output: Some(output),
        }
    }

    /// OS process id of the tunnel process, if there is one
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Stop the tunnel process and wait for it to exit
    pub async fn close(mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            child.kill().await?;
        }
        if let Some(output) = self.output.take() {
            output.abort();
        }
        Ok(())
    }
}

impl Drop for TunnelHandle {
    fn drop(&mut self) {
        if let Some(output) = self.output.take() {
            output.abort();
        }
    }
}

// ============================================================================
// NoTunnel
// ============================================================================

/// Connector used when no tunnel program is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTunnel;

#[async_trait]
impl TunnelConnector for NoTunnel {
    async fn open(&self, _vpn_connection: &Value) -> Result<TunnelHandle> {
        Err(Error::Tunnel(
            "vpnConnection requested but no tunnel program is configured".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

// ============================================================================
// CommandTunnel
// ============================================================================

/// Runs a VPN client and waits for its ready marker on stdout
#[derive(Debug, Clone)]
pub struct CommandTunnel {
    program: String,
    args: Vec<String>,
    ready_marker: String,
    ready_timeout: Option<Duration>,
}

impl CommandTunnel {
    pub fn new(program: impl Into<String>, ready_marker: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            ready_marker: ready_marker.into(),
            ready_timeout: None,
        }
    }

    pub fn from_settings(section: &TunnelSection) -> Self {
        Self {
            program: section.program().to_string(),
            args: section.args.clone(),
            ready_marker: section.ready_marker().to_string(),
            ready_timeout: section.ready_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ready_timeout(mut self, limit: Duration) -> Self {
        self.ready_timeout = Some(limit);
        self
    }

    async fn wait_ready(&self, lines: &mut Lines<BufReader<ChildStdout>>) -> Result<bool> {
        let wait = async {
            while let Some(line) = lines.next_line().await? {
                debug!(target: "aries::tunnel", "{}", line);
                if line.contains(&self.ready_marker) {
                    return Ok(true);
                }
            }
            Ok::<bool, std::io::Error>(false)
        };

        let ready = match self.ready_timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                Error::Tunnel(format!(
                    "{} not ready after {}s",
                    self.program,
                    limit.as_secs_f64()
                ))
            })?,
            None => wait.await,
        };

        ready.map_err(|e| self.io_failure("read output of", e))
    }

    /// Process I/O failures surface as tunnel errors
    fn io_failure(&self, action: &str, err: std::io::Error) -> Error {
        Error::Tunnel(format!("Failed to {} {}: {}", action, self.program, err))
    }
}

#[async_trait]
impl TunnelConnector for CommandTunnel {
    async fn open(&self, vpn_connection: &Value) -> Result<TunnelHandle> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(VPN_CONNECTION_ENV, vpn_connection.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.io_failure("spawn", e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Tunnel("tunnel stdout was not captured".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        if !self.wait_ready(&mut lines).await? {
            let status = child
                .wait()
                .await
                .map_err(|e| self.io_failure("wait for", e))?;
            return Err(Error::Tunnel(format!(
                "{} exited before the tunnel was ready ({})",
                self.program, status
            )));
        }

        info!("Tunnel established via {}", self.program);

        // Keep draining stdout so the process never blocks on a full pipe.
        let output = tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target: "aries::tunnel", "{}", line);
            }
        });

        Ok(TunnelHandle::process(child, output))
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
