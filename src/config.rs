//! Relay configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

fn default_api_url() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    3000
}

fn default_max_sessions() -> usize {
    128
}

fn default_keep_alive_seconds() -> u64 {
    15
}

/// Relay configuration parsed from `config.toml` with CLI/env overrides.
///
/// The platform access token is loaded at runtime via the OS keychain or
/// an environment variable, never from the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RelayConfig {
    /// Base URL of the upstream platform management API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Host interface the HTTP/SSE transport binds to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Listening port for the HTTP/SSE transport.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Hide and reject tools that mutate platform state.
    #[serde(default)]
    pub read_only: bool,
    /// Maximum concurrently open sessions before new connects are refused.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Interval between SSE keep-alive comments, in seconds.
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: u64,
    /// Bearer token for the platform API (populated at runtime).
    #[serde(skip)]
    pub access_token: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            host: default_host(),
            port: default_port(),
            read_only: false,
            max_sessions: default_max_sessions(),
            keep_alive_seconds: default_keep_alive_seconds(),
            access_token: String::new(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from an optional TOML file path.
    ///
    /// When `path` is `None` the built-in defaults are used.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
                Self::from_toml_str(&raw)
            }
            None => {
                let mut config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MCP_RELAY_API_URL` and `MCP_RELAY_PORT` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if an override value fails validation.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(api_url) = env::var("MCP_RELAY_API_URL") {
            self.api_url = api_url;
        }
        if let Ok(port) = env::var("MCP_RELAY_PORT") {
            self.port = port
                .parse()
                .map_err(|err| AppError::Config(format!("invalid MCP_RELAY_PORT: {err}")))?;
        }
        self.validate()
    }

    /// Apply CLI flag overrides on top of file and environment values.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if an override value fails validation.
    pub fn apply_cli(
        &mut self,
        api_url: Option<String>,
        port: Option<u16>,
        read_only: bool,
    ) -> Result<()> {
        if let Some(api_url) = api_url {
            self.api_url = api_url;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if read_only {
            self.read_only = true;
        }
        self.validate()
    }

    /// Load the platform access token.
    ///
    /// Resolution order: explicit CLI value, then the `mcp-relay` keyring
    /// service, then the `MCP_RELAY_ACCESS_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no source provides a token.
    pub async fn load_access_token(&mut self, cli_token: Option<String>) -> Result<()> {
        if let Some(token) = cli_token.filter(|token| !token.is_empty()) {
            self.access_token = token;
            return Ok(());
        }
        self.access_token = load_credential("access_token", "MCP_RELAY_ACCESS_TOKEN").await?;
        Ok(())
    }

    /// Socket address the HTTP/SSE transport binds to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the configured host is not a valid
    /// IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let host: IpAddr = self
            .host
            .parse()
            .map_err(|err| AppError::Config(format!("invalid host '{}': {err}", self.host)))?;
        Ok(SocketAddr::new(host, self.port))
    }

    fn validate(&mut self) -> Result<()> {
        if self.max_sessions == 0 {
            return Err(AppError::Config(
                "max_sessions must be greater than zero".into(),
            ));
        }

        if self.api_url.is_empty() {
            return Err(AppError::Config("api_url must not be empty".into()));
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        while self.api_url.ends_with('/') {
            self.api_url.pop();
        }

        self.host
            .parse::<IpAddr>()
            .map_err(|err| AppError::Config(format!("invalid host '{}': {err}", self.host)))?;

        Ok(())
    }
}

/// Load a single credential from the OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // Try the OS keychain first via spawn_blocking (keyring is synchronous I/O).
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new("mcp-relay", &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    // Fallback to environment variable.
    env::var(env_key).map_err(|_| {
        AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))
    })
}
