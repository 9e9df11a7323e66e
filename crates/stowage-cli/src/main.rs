#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod output;
mod telemetry;

use std::process;

use anyhow::Context;
use stowage_loader::ContainerLoader;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "stowage_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "stowage_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "stowage_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
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

    telemetry::init_tracing(&cli.log_level)?;
    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting stowage"
    );
    cli.log();

    let config = cli.loader_config()?;
    let loader = ContainerLoader::new(config).with_provider(cli.credentials.client_provider());

    let documents = loader.load().await.context("failed to load container")?;
    output::write_documents(&documents, cli.output.as_deref())?;

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        documents = documents.len(),
        "documents written"
    );
    Ok(())
}
