//! Observability setup for agentdesk: tracing subscriber and optional
//! OpenTelemetry export.

pub mod tracing_setup;

pub use tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
