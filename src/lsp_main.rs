//! Standalone MCS Language Server over stdio.
//!
//! Equivalent to `mcs-analyzer lsp` with the built-in schema.

use anyhow::Result;
use mcs_analyzer::{lsp, McsAnalyzer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting MCS Language Server via stdio...");

    lsp::start_stdio_server(McsAnalyzer::with_builtin_schema()?).await?;

    Ok(())
}
