// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # ordmint Storefront Server
//!
//! Entry point for the `ordmint-server` binary. Parses CLI arguments,
//! initializes logging and metrics, builds the in-memory store and serves
//! the JSON API.
//!
//! The binary supports three subcommands:
//!
//! - `run`     — start the API and metrics servers
//! - `catalog` — print the seed catalog as JSON
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use ordmint_core::config::SimulatorConfig;
use ordmint_core::ownership::AcceptAllOracle;
use ordmint_core::{seed, EntityStore, TransactionSimulator};

use cli::{Commands, OrdmintCli};
use logging::LogFormat;
use metrics::StoreMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = OrdmintCli::parse();

    match cli.command {
        Commands::Run(args) => run_server(args).await,
        Commands::Catalog => print_catalog(),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the storefront: API server, metrics endpoint and the transaction
/// simulator.
async fn run_server(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(
        host = %args.host,
        port = args.port,
        metrics_port = args.metrics_port,
        "starting ordmint-server"
    );

    // --- Store ---
    let store = Arc::new(if args.empty {
        EntityStore::new()
    } else {
        EntityStore::seeded()
    });
    tracing::info!(
        collectibles = store.collectible_count(),
        seeded = !args.empty,
        "store ready"
    );

    // --- Simulator ---
    let sim_config =
        SimulatorConfig::from_millis(args.processing_delay_ms, args.completion_delay_ms);
    let simulator = TransactionSimulator::new(Arc::clone(&store), sim_config);
    tracing::info!(
        processing_delay_ms = args.processing_delay_ms,
        completion_delay_ms = args.completion_delay_ms,
        "transaction simulator configured"
    );

    // --- Metrics ---
    let store_metrics =
        Arc::new(StoreMetrics::new().context("failed to register Prometheus metrics")?);

    // --- Application state ---
    let app_state = api::AppState {
        store,
        simulator: simulator.clone(),
        oracle: Arc::new(AcceptAllOracle),
        metrics: Arc::clone(&store_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("{}:{}", args.host, args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&store_metrics));
    let metrics_addr = format!("{}:{}", args.host, args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    let pending = simulator.in_flight();
    simulator.shutdown();
    tracing::info!(abandoned_simulations = pending, "ordmint-server stopped");
    Ok(())
}

/// Prints the seed catalog to stdout as pretty JSON.
fn print_catalog() -> Result<()> {
    let json = serde_json::to_string_pretty(&seed::catalog())
        .context("failed to serialize seed catalog")?;
    println!("{}", json);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("ordmint-server {}", env!("CARGO_PKG_VERSION"));
    println!("rustc          {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. If a handler cannot be
/// installed the failure is logged and that signal is never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
