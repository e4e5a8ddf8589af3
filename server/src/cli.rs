//! # CLI Interface
//!
//! Defines the command-line argument structure for `ordmint-server` using
//! `clap` derive. Supports three subcommands: `run`, `catalog`, and
//! `version`. Every `run` flag can also come from an `ORDMINT_*` environment
//! variable.

use clap::{Parser, Subcommand};

/// ordmint storefront API server.
///
/// Serves the mint storefront's JSON API over an in-memory store, simulates
/// transaction confirmation with timers, and exposes Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "ordmint-server",
    about = "ordmint storefront API server",
    version,
    propagate_version = true
)]
pub struct OrdmintCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server.
    Run(RunArgs),
    /// Print the seed catalog as JSON and exit.
    Catalog,
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Interface to bind the API and metrics listeners on.
    #[arg(long, env = "ORDMINT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the JSON API.
    #[arg(long, short = 'p', env = "ORDMINT_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "ORDMINT_METRICS_PORT", default_value_t = 5001)]
    pub metrics_port: u16,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "ORDMINT_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Milliseconds a new transaction stays `pending`.
    #[arg(long, env = "ORDMINT_PROCESSING_DELAY_MS", default_value_t = 2_000)]
    pub processing_delay_ms: u64,

    /// Milliseconds a transaction stays `processing` before it completes.
    #[arg(long, env = "ORDMINT_COMPLETION_DELAY_MS", default_value_t = 5_000)]
    pub completion_delay_ms: u64,

    /// Start with an empty store instead of the seed catalog.
    #[arg(long, env = "ORDMINT_EMPTY")]
    pub empty: bool,
}
