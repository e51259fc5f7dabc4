//! Process-wide gateway configuration, read once at startup.

use std::path::PathBuf;
use std::time::Duration;

use lockgate_core::{CommandTemplate, DEFAULT_MODULE, DEFAULT_PROGRAM};
use lockgate_executor::{config::DEFAULT_MAX_CONCURRENT, RunnerConfig};
use lockgate_overlay::{AuthKey, TailscaleSession};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OVERLAY_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TAILSCALE_BIN: &str = "tailscale";

pub const ENV_HUB_IP: &str = "HUB_IP";
pub const ENV_PORT: &str = "PORT";
pub const ENV_AUTH_KEY: &str = "TAILSCALE_AUTHKEY";
pub const ENV_AUTH_KEY_FALLBACK: &str = "TS_AUTHKEY";
pub const ENV_PROGRAM: &str = "LOCKGATE_PROGRAM";
pub const ENV_MODULE: &str = "LOCKGATE_MODULE";
pub const ENV_TIMEOUT_SECS: &str = "LOCKGATE_COMMAND_TIMEOUT_SECS";
pub const ENV_MAX_CONCURRENT: &str = "LOCKGATE_MAX_CONCURRENT";
pub const ENV_TAILSCALE_BIN: &str = "LOCKGATE_TAILSCALE_BIN";
pub const ENV_HOSTNAME: &str = "LOCKGATE_HOSTNAME";
pub const ENV_OVERLAY_TIMEOUT_SECS: &str = "LOCKGATE_OVERLAY_TIMEOUT_SECS";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No overlay auth key was provided.
    #[error("TAILSCALE_AUTHKEY (or TS_AUTHKEY) must be set")]
    MissingAuthKey,

    /// A variable was set to a value that does not parse.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue { key: &'static str, value: String, reason: String },
}

/// Immutable gateway settings.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Hub address passed to the tool as `--hub-ip`. May be empty.
    pub hub_address: String,

    /// TCP port the listener binds on the overlay address.
    pub port: u16,

    /// Credential for joining the overlay network.
    pub auth_key: AuthKey,

    /// Executable that hosts the lock tool.
    pub program: String,

    /// Module selector passed after `-m`.
    pub module: String,

    /// Subprocess deadline and concurrency cap.
    pub runner: RunnerConfig,

    /// Path or name of the `tailscale` CLI.
    pub tailscale_bin: PathBuf,

    /// Overlay hostname to advertise, if any.
    pub hostname: Option<String>,

    /// Deadline for each `tailscale` CLI call during bootstrap.
    pub overlay_timeout: Duration,
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// See [`from_lookup`](Self::from_lookup).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingAuthKey`] if no auth key is set, or
    /// [`ConfigError::InvalidValue`] if a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let auth_key = get(ENV_AUTH_KEY)
            .or_else(|| get(ENV_AUTH_KEY_FALLBACK))
            .and_then(AuthKey::new)
            .ok_or(ConfigError::MissingAuthKey)?;

        let port = parse_or(get(ENV_PORT), ENV_PORT, DEFAULT_PORT)?;
        let timeout_secs = parse_or(get(ENV_TIMEOUT_SECS), ENV_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)?;
        let max_concurrent =
            parse_or(get(ENV_MAX_CONCURRENT), ENV_MAX_CONCURRENT, DEFAULT_MAX_CONCURRENT)?;
        let overlay_secs = parse_or(
            get(ENV_OVERLAY_TIMEOUT_SECS),
            ENV_OVERLAY_TIMEOUT_SECS,
            DEFAULT_OVERLAY_TIMEOUT_SECS,
        )?;

        Ok(Self {
            hub_address: get(ENV_HUB_IP).unwrap_or_default(),
            port,
            auth_key,
            program: get(ENV_PROGRAM).unwrap_or_else(|| DEFAULT_PROGRAM.to_owned()),
            module: get(ENV_MODULE).unwrap_or_else(|| DEFAULT_MODULE.to_owned()),
            runner: RunnerConfig::new(Duration::from_secs(timeout_secs), max_concurrent),
            tailscale_bin: get(ENV_TAILSCALE_BIN)
                .map_or_else(|| PathBuf::from(DEFAULT_TAILSCALE_BIN), PathBuf::from),
            hostname: get(ENV_HOSTNAME),
            overlay_timeout: Duration::from_secs(overlay_secs),
        })
    }

    /// The fixed prefix for every lock tool invocation.
    #[must_use]
    pub fn command_template(&self) -> CommandTemplate {
        CommandTemplate::new(&self.program, &self.module, &self.hub_address)
    }

    /// The production overlay session for this configuration.
    #[must_use]
    pub fn overlay_session(&self) -> TailscaleSession {
        let session = TailscaleSession::new(&self.tailscale_bin, self.auth_key.clone())
            .with_timeout(self.overlay_timeout);
        match &self.hostname {
            Some(hostname) => session.with_hostname(hostname),
            None => session,
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
