#![forbid(unsafe_code)]

//! `mcp-relay` — MCP platform tool server binary.
//!
//! Bootstraps configuration and starts the MCP transport: HTTP/SSE for
//! browser and HTTP-only clients, or stdio for hosts that spawn the server
//! as a child process.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use mcp_relay::config::RelayConfig;
use mcp_relay::mcp::handler::AppState;
use mcp_relay::mcp::{sse, transport};
use mcp_relay::platform::client::PlatformClient;
use mcp_relay::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum TransportKind {
    Sse,
    Stdio,
}

#[derive(Debug, Parser)]
#[command(
    name = "mcp-relay",
    about = "MCP platform tool server over an HTTP/SSE session relay",
    version,
    long_about = None
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Platform API access token (overrides keychain and env lookup).
    #[arg(long)]
    access_token: Option<String>,

    /// Base URL of the platform management API.
    #[arg(long)]
    api_url: Option<String>,

    /// Expose only read-only tools.
    #[arg(long)]
    read_only: bool,

    /// Listening port for the HTTP/SSE transport.
    #[arg(long)]
    port: Option<u16>,

    /// Transport to serve.
    #[arg(long, value_enum, default_value_t = TransportKind::Sse)]
    transport: TransportKind,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("mcp-relay server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = RelayConfig::load(args.config.as_deref())?;
    config.apply_env()?;
    config.apply_cli(args.api_url, args.port, args.read_only)?;
    config.load_access_token(args.access_token).await?;

    let config = Arc::new(config);
    info!(
        api_url = %config.api_url,
        read_only = config.read_only,
        "configuration loaded"
    );

    // ── Build shared application state ──────────────────
    let platform = PlatformClient::new(config.api_url.clone(), config.access_token.clone());
    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        platform,
    });

    let ct = CancellationToken::new();

    // ── Start transport ─────────────────────────────────
    let serve_ct = ct.clone();
    let serve_state = Arc::clone(&state);
    let mut serve_handle = match args.transport {
        TransportKind::Sse => tokio::spawn(async move {
            if let Err(err) = sse::serve_sse(serve_state, serve_ct).await {
                error!(%err, "sse transport failed");
            }
        }),
        TransportKind::Stdio => tokio::spawn(async move {
            if let Err(err) = transport::serve_stdio(serve_state, serve_ct).await {
                error!(%err, "stdio transport failed");
            }
        }),
    };

    info!("MCP server ready");

    // ── Wait for shutdown signal or transport exit ──────
    tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received");
            ct.cancel();
            let _ = (&mut serve_handle).await;
        }
        _ = &mut serve_handle => {
            // Stdio transport ends on EOF; SSE only on a serve error.
            ct.cancel();
        }
    }

    info!("mcp-relay shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
