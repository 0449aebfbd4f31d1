#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use blobnav_server::handler::routes;
use blobnav_server::middleware::{RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt};
use blobnav_server::service::{ServiceConfig, ServiceState};

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "blobnav_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "blobnav_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "blobnav_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let state = create_service_state(&cli.service)?;
    spawn_session_purge(&state);
    let router = create_router(state, &cli.recovery);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Creates the service state from configuration.
fn create_service_state(config: &ServiceConfig) -> anyhow::Result<ServiceState> {
    ServiceState::from_config(config).context("failed to create service state")
}

/// Spawns the background sweep that drops idle credential sessions.
fn spawn_session_purge(state: &ServiceState) {
    let sessions = state.sessions().clone();
    let period = sessions.ttl();

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        period_secs = period.as_secs(),
        "starting session purge task"
    );

    tokio::spawn(sessions.purge_periodically(period));
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, recovery: &RecoveryConfig) -> Router {
    routes()
        .with_observability()
        .with_recovery(recovery)
        .with_state(state)
}
