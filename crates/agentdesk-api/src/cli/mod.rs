//! CLI definitions for the `agentdesk` binary.

pub mod status;

use clap::{Parser, Subcommand};

/// Chat agents with live streamed replies.
#[derive(Parser)]
#[command(name = "agentdesk", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit logs as JSON lines (and `status` output as JSON).
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP/SSE server.
    Serve {
        /// Bind address (overrides `[server].host`).
        #[arg(long, env = "AGENTDESK_HOST")]
        host: Option<String>,

        /// Port (overrides `[server].port`).
        #[arg(short, long, env = "AGENTDESK_PORT")]
        port: Option<u16>,
    },

    /// Show where data lives and how the upstream client would be configured.
    Status,
}

impl Cli {
    /// Default log filter for the chosen verbosity; `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,agentdesk_core=debug,agentdesk_infra=debug,agentdesk_api=debug",
            _ => "trace",
        }
    }
}
