//! AppMap Language Server: diagnostics, completions, hover, document symbols.
//!
//! A `tower-lsp` based LSP server that wraps `am-core` for real-time editor
//! feedback on `.am` documents in any LSP-compatible editor.

mod completion;
mod diagnostics;
mod hover;
mod symbols;

use am_core::lint::{has_warnings, lint_document};
use am_core::model::Graph;
use am_core::parser::parse_document;
use std::collections::HashMap;
use std::io::Read;
use std::process::ExitCode;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

/// Cached parse state for a single document.
struct DocumentState {
    text: String,
    graph: Graph,
}

/// The AppMap language server backend.
struct AmLanguageServer {
    client: Client,
    /// Cached document state by URI.
    documents: Mutex<HashMap<Url, DocumentState>>,
}

impl AmLanguageServer {
    fn new(client: Client) -> Self {
        Self {
            client,
            documents: Mutex::new(HashMap::new()),
        }
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<Url, DocumentState>> {
        // A panicked handler leaves the map itself intact.
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reparse a document and publish diagnostics.
    async fn on_change(&self, uri: Url, text: String) {
        let diags = diagnostics::compute_diagnostics(&text);
        let graph = parse_document(&text);
        log::debug!(
            "{uri}: {} nodes, {} edges, {} diagnostics",
            graph.node_count(),
            graph.edges.len(),
            diags.len()
        );

        self.documents()
            .insert(uri.clone(), DocumentState { text, graph });

        self.client.publish_diagnostics(uri, diags, None).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for AmLanguageServer {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![" ".to_string()]),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "am-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "am-lsp initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        self.on_change(uri, text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(change) = params.content_changes.into_iter().next_back() {
            self.on_change(uri, change.text).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents().remove(&uri);
        // Clear stale diagnostics for the closed document.
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let pos = params.text_document_position.position;

        let docs = self.documents();
        let items = docs
            .get(uri)
            .map(|doc| completion::compute_completions(&doc.text, pos, &doc.graph))
            .unwrap_or_default();

        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let pos = params.text_document_position_params.position;

        let docs = self.documents();
        Ok(docs
            .get(uri)
            .and_then(|doc| hover::compute_hover(&doc.text, pos, &doc.graph)))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;

        let docs = self.documents();
        let syms = docs
            .get(uri)
            .map(|doc| symbols::compute_symbols(uri, &doc.text, &doc.graph))
            .unwrap_or_default();
        Ok(Some(DocumentSymbolResponse::Flat(syms)))
    }
}

fn read_stdin(mode: &str) -> Option<String> {
    let mut text = String::new();
    match std::io::stdin().read_to_string(&mut text) {
        Ok(_) => Some(text),
        Err(e) => {
            eprintln!("am-lsp {mode} error: failed to read stdin: {e}");
            None
        }
    }
}

/// `am-lsp --graph`: stdin text → graph JSON on stdout.
fn print_graph() -> ExitCode {
    let Some(text) = read_stdin("--graph") else {
        return ExitCode::FAILURE;
    };
    match serde_json::to_string_pretty(&parse_document(&text)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("am-lsp --graph error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `am-lsp --check`: stdin text → lint findings on stdout. Fails on warnings.
fn check() -> ExitCode {
    let Some(text) = read_stdin("--check") else {
        return ExitCode::FAILURE;
    };
    let diags = lint_document(&text);
    for diag in &diags {
        let severity = match diag.severity {
            am_core::LintSeverity::Warning => "warning",
            am_core::LintSeverity::Info => "info",
        };
        println!(
            "{}: {severity}[{}]: {}",
            diag.line + 1,
            diag.rule,
            diag.message
        );
    }
    if has_warnings(&diags) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries the protocol; logs go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    // ── `am-lsp --graph` / `am-lsp --check` modes ────────────────────────
    // Read AppMap text from stdin and exit without an LSP handshake. Used by
    // scripts and CI.
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("--graph") => return print_graph(),
        Some("--check") => return check(),
        Some(other) if other.starts_with("--") => {
            eprintln!("am-lsp error: unknown flag '{other}'");
            eprintln!("  valid flags: --graph, --check");
            return ExitCode::FAILURE;
        }
        _ => {}
    }

    // ── Standard LSP server mode ─────────────────────────────────────────
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(AmLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
    ExitCode::SUCCESS
}
