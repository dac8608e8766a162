/*!
# Language Server Protocol (LSP) implementation

Real-time MCS diagnostics, outline and hover for editors.
*/

use crate::analyzer::McsAnalyzer;
use anyhow::Result;
use std::sync::Arc;
use tower_lsp::{LspService, Server};

mod diagnostics;
mod handlers;
mod server;

pub use diagnostics::{convert_findings, convert_to_lsp_diagnostic};
pub use handlers::{document_symbols, hover_at};
pub use server::McsLanguageServer;

/// Starts the language server in stdio mode.
pub async fn start_stdio_server(analyzer: McsAnalyzer) -> Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let analyzer = Arc::new(analyzer);
    let (service, socket) = LspService::new(move |client| McsLanguageServer::new(client, analyzer));

    tracing::info!("MCS LSP Server starting...");

    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
