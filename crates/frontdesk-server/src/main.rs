//! HTTP server binary for the frontdesk support relay.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;
use tokio::net::TcpListener;

use frontdesk_config::FrontdeskConfig;
use frontdesk_core::spawn_sweeper;
use frontdesk_server::{AppState, build_router};

/// Command-line options for the relay server.
#[derive(Parser)]
#[command(name = "frontdesk-server", version)]
struct Cli {
    /// Optional path to a frontdesk.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen port override
    #[arg(long)]
    port: Option<u16>,
}

/// Entry point for the relay server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    info!(
        "starting server (config_set={}, port_override_set={})",
        cli.config.is_some(),
        cli.port.is_some()
    );

    let mut config = if let Some(path) = cli.config.as_ref() {
        FrontdeskConfig::load_from_path(path).context("failed to load config")?
    } else {
        FrontdeskConfig::default()
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let sweep_every = Duration::from_secs(config.sessions.sweep_interval_secs);
    let max_idle = chrono::Duration::seconds(config.sessions.max_idle_secs as i64);

    let state = AppState::from_config(config)?;
    let sweeper = spawn_sweeper(state.registry.clone(), sweep_every, max_idle);
    let router = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{}", addr);

    let server = axum::serve(listener, router);
    tokio::select! {
        result = server => result.context("server error")?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    sweeper.shutdown().await;
    Ok(())
}
