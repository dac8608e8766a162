/*!
# MCS Language Server

Editor integration over `tower-lsp`.

## Features
- Full document sync with diagnostics published on open and change
- Per-document versions: a result computed for an outdated version is dropped
- Outline (`textDocument/documentSymbol`) of statements and operands
- Hover descriptions taken from the schema
*/

use super::diagnostics::convert_findings;
use super::handlers::{document_symbols, hover_at};
use crate::analyzer::{Analysis, McsAnalyzer};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result as RpcResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

pub struct McsLanguageServer {
    client: Client,
    analyzer: Arc<McsAnalyzer>,
    documents: Arc<RwLock<HashMap<Url, DocumentState>>>,
}

/// Latest known state of an open document.
#[derive(Debug, Clone)]
struct DocumentState {
    version: i32,
    text: String,
    /// Analysis of `text`, absent while it is being computed.
    analysis: Option<Arc<Analysis>>,
}

impl McsLanguageServer {
    pub fn new(client: Client, analyzer: Arc<McsAnalyzer>) -> Self {
        Self {
            client,
            analyzer,
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Records a new version of `uri`, analyses it and publishes the findings
    /// unless a newer version arrived in the meantime.
    async fn update_document(&self, uri: Url, version: i32, text: String) {
        {
            let mut documents = self.documents.write().await;
            if let Some(current) = documents.get(&uri) {
                if current.version > version {
                    tracing::debug!(
                        "Ignoring version {} of {}: version {} is already known",
                        version,
                        uri,
                        current.version
                    );
                    return;
                }
            }
            documents.insert(
                uri.clone(),
                DocumentState {
                    version,
                    text: text.clone(),
                    analysis: None,
                },
            );
        }

        let analyzer = Arc::clone(&self.analyzer);
        let analysis = match tokio::task::spawn_blocking(move || analyzer.analyze_text(&text)).await {
            Ok(analysis) => Arc::new(analysis),
            Err(e) => {
                tracing::error!("Analysis of {} failed: {}", uri, e);
                return;
            }
        };

        let diagnostics = {
            let mut documents = self.documents.write().await;
            match documents.get_mut(&uri) {
                Some(state) if state.version == version => {
                    let diagnostics = convert_findings(&analysis.diagnostics);
                    state.analysis = Some(analysis);
                    diagnostics
                }
                _ => {
                    tracing::debug!("Discarding stale analysis of {} (version {})", uri, version);
                    return;
                }
            }
        };

        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }

    /// Analysis of the current version, computed on demand when the
    /// background one has not finished yet.
    async fn current_analysis(&self, uri: &Url) -> Option<Arc<Analysis>> {
        let (version, text) = {
            let documents = self.documents.read().await;
            let state = documents.get(uri)?;
            if let Some(analysis) = &state.analysis {
                return Some(Arc::clone(analysis));
            }
            (state.version, state.text.clone())
        };

        let analyzer = Arc::clone(&self.analyzer);
        let analysis = match tokio::task::spawn_blocking(move || analyzer.analyze_text(&text)).await {
            Ok(analysis) => Arc::new(analysis),
            Err(e) => {
                tracing::error!("Analysis of {} failed: {}", uri, e);
                return None;
            }
        };

        let mut documents = self.documents.write().await;
        if let Some(state) = documents.get_mut(uri) {
            if state.version == version && state.analysis.is_none() {
                state.analysis = Some(Arc::clone(&analysis));
            }
        }
        Some(analysis)
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for McsLanguageServer {
    async fn initialize(&self, _params: InitializeParams) -> RpcResult<InitializeResult> {
        tracing::info!(
            "Initializing MCS Language Server ({} statements in schema)",
            self.analyzer.schema().len()
        );

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "mcs-analyzer".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "MCS Language Server ready")
            .await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        tracing::debug!("Document opened: {}", params.text_document.uri);
        let document = params.text_document;
        self.update_document(document.uri, document.version, document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // full sync: the last change carries the whole text
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        tracing::debug!("Document changed: {}", params.text_document.uri);
        self.update_document(
            params.text_document.uri,
            params.text_document.version,
            change.text,
        )
        .await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        tracing::debug!("Document closed: {}", params.text_document.uri);
        self.documents.write().await.remove(&params.text_document.uri);
        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> RpcResult<Option<DocumentSymbolResponse>> {
        let Some(analysis) = self.current_analysis(&params.text_document.uri).await else {
            return Ok(None);
        };
        Ok(Some(DocumentSymbolResponse::Nested(document_symbols(
            &analysis.document,
        ))))
    }

    async fn hover(&self, params: HoverParams) -> RpcResult<Option<Hover>> {
        let position = params.text_document_position_params;
        let Some(analysis) = self.current_analysis(&position.text_document.uri).await else {
            return Ok(None);
        };
        Ok(hover_at(&analysis.document, position.position))
    }

    async fn shutdown(&self) -> RpcResult<()> {
        tracing::info!("MCS Language Server shutting down");
        Ok(())
    }
}
