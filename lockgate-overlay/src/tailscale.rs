//! Tailscale overlay session.
//!
//! Drives the local `tailscale` CLI: `tailscale up --authkey <key>` joins
//! the tailnet, then `tailscale ip -4` reports the node's address.

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{AuthKey, OverlayError, OverlaySession, OverlayStatus};

/// Deadline for each `tailscale` CLI call.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Overlay session backed by the `tailscale` CLI and daemon.
#[derive(Debug, Clone)]
pub struct TailscaleSession {
    binary: PathBuf,
    auth_key: AuthKey,
    hostname: Option<String>,
    timeout: Duration,
}

impl TailscaleSession {
    /// Create a session that joins with `auth_key` using the given CLI binary.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, auth_key: AuthKey) -> Self {
        Self { binary: binary.into(), auth_key, hostname: None, timeout: DEFAULT_COMMAND_TIMEOUT }
    }

    /// Advertise this node under `hostname`.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Deadline for each CLI call. Defaults to 60 seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments for `tailscale up`. Contains the auth key; never log it.
    fn up_args(&self) -> Vec<String> {
        let mut args =
            vec!["up".to_owned(), "--authkey".to_owned(), self.auth_key.expose().to_owned()];
        if let Some(hostname) = &self.hostname {
            args.push("--hostname".to_owned());
            args.push(hostname.clone());
        }
        args
    }

    /// Run the CLI and return its stdout. `label` names the command in
    /// errors and must not contain secrets.
    async fn run(&self, label: &str, args: &[String]) -> Result<String, OverlayError> {
        let program = self.binary.display().to_string();
        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OverlayError::LaunchFailed { program, reason: e.to_string() })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| OverlayError::TimedOut {
                command: label.to_owned(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| OverlayError::CommandFailed {
                command: label.to_owned(),
                code: None,
                output: e.to_string(),
            })?;

        if !output.status.success() {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(OverlayError::CommandFailed {
                command: label.to_owned(),
                code: output.status.code(),
                output: text.trim().to_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl OverlaySession for TailscaleSession {
    async fn up(&self) -> Result<OverlayStatus, OverlayError> {
        tracing::info!(
            binary = %self.binary.display(),
            hostname = ?self.hostname,
            timeout_secs = self.timeout.as_secs(),
            "joining tailnet"
        );
        self.run("tailscale up", &self.up_args()).await?;

        let ip_out = self.run("tailscale ip -4", &["ip".to_owned(), "-4".to_owned()]).await?;
        let address = parse_overlay_address(&ip_out)?;

        tracing::info!(%address, "tailnet joined");
        Ok(OverlayStatus::new(address))
    }
}

/// Take the first address line printed by `tailscale ip`.
fn parse_overlay_address(output: &str) -> Result<IpAddr, OverlayError> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse().ok())
        .ok_or_else(|| OverlayError::NoAddress { output: output.to_owned() })
}
