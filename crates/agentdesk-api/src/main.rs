//! agentdesk CLI and HTTP/SSE server entry point.
//!
//! Binary name: `agentdesk`
//!
//! Parses CLI arguments, loads `config.toml` from the data directory, then
//! either starts the server or prints the status report.

mod cli;
mod http;
mod state;

use std::path::PathBuf;

use clap::Parser;

use agentdesk_infra::config::{load_app_config, resolve_data_dir};
use agentdesk_infra::llm::openai_compat::credentials::ProcessEnv;
use agentdesk_observe::{TracingOptions, init_tracing, shutdown_tracing};
use agentdesk_types::config::AppConfig;

use cli::status::StatusReport;
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingOptions {
        default_filter: cli.log_filter().to_string(),
        json: cli.json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let data_dir = resolve_data_dir();
    let config = load_app_config(&data_dir).await;

    let result = match cli.command {
        Commands::Serve { host, port } => serve(data_dir, config, host, port, cli.quiet).await,
        Commands::Status => {
            let report = StatusReport::collect(&data_dir, &config, &ProcessEnv);
            cli::status::status(&report, cli.json)
        }
    };

    shutdown_tracing();
    result
}

async fn serve(
    data_dir: PathBuf,
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    quiet: bool,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::init(data_dir, config).await?;
    let upstream = state.relay.upstream_name().map(str::to_string);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, data_dir = %state.data_dir.display(), "server listening");

    if !quiet {
        println!(
            "  {} agentdesk listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!(
            "  {}",
            console::style(format!("Data dir: {}", state.data_dir.display())).dim()
        );
        match upstream {
            Some(name) => println!("  {}", console::style(format!("Upstream: {name}")).dim()),
            None => println!(
                "  {}",
                console::style("Upstream: not configured (simulated agents only)").yellow()
            ),
        }
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
