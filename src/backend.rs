//! LSP Backend implementation

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::analyzer::Analyzer;
use crate::config::{Config, CONFIG_FILE_NAMES};
use crate::diagnostics::DiagnosticCollector;
use crate::document::Document;
use crate::rules::default_rule_set;

/// The LSP backend that handles all language server requests
pub struct Backend {
    /// The LSP client for sending notifications
    client: Client,
    /// Map of document URIs to their state
    documents: Arc<RwLock<HashMap<Url, Document>>>,
    /// Workspace root, once known
    root: Arc<RwLock<Option<PathBuf>>>,
    /// Configuration loaded from the workspace root
    config: Arc<RwLock<Config>>,
}

impl Backend {
    /// Create a new backend instance
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(RwLock::new(HashMap::new())),
            root: Arc::new(RwLock::new(None)),
            config: Arc::new(RwLock::new(Config::default())),
        }
    }

    /// Reload the configuration from the workspace root
    async fn load_config(&self) {
        let Some(root) = self.root.read().await.clone() else {
            return;
        };
        match Config::discover(&root) {
            Ok(config) => {
                tracing::info!("Configuration loaded from {}", root.display());
                *self.config.write().await = config;
            }
            Err(err) => {
                tracing::warn!("Ignoring configuration: {}", err);
                self.client
                    .show_message(MessageType::WARNING, format!("ghlint: {err}"))
                    .await;
            }
        }
    }

    /// Validate a document and publish diagnostics
    async fn validate_document(&self, uri: &Url) {
        let Some((diagnostics, version)) = self.compute_diagnostics(uri).await else {
            return;
        };

        self.client
            .publish_diagnostics(uri.clone(), diagnostics, Some(version))
            .await;
    }

    /// Compute diagnostics for a stored document
    async fn compute_diagnostics(&self, uri: &Url) -> Option<(Vec<Diagnostic>, i32)> {
        let config = self.config.read().await;
        let docs = self.documents.read().await;
        let doc = docs.get(uri)?;

        let rule_set = config.rule_set().unwrap_or_else(|err| {
            tracing::warn!("Falling back to the default rules: {}", err);
            default_rule_set()
        });
        let mut findings = Analyzer::new().analyze(
            std::slice::from_ref(&doc.file),
            std::slice::from_ref(&rule_set),
        );
        config.retain_enabled(&mut findings);

        let mut collector = DiagnosticCollector::new();
        collector.extend(&findings);
        Some((collector.into_diagnostics(), doc.version))
    }

    async fn store_document(&self, uri: &Url, text: String, version: i32) {
        let mut docs = self.documents.write().await;
        docs.insert(uri.clone(), Document::new(display_path(uri), text, version));
    }
}

/// Whether a document is a workflow or an action definition
pub fn is_lintable(uri: &Url) -> bool {
    let path = uri.path();
    let Some(name) = path.rsplit('/').next() else {
        return false;
    };
    let is_yaml = name.ends_with(".yml") || name.ends_with(".yaml");
    let in_workflows = path
        .rsplit_once('/')
        .is_some_and(|(dir, _)| dir.ends_with("/.github/workflows"));
    (is_yaml && in_workflows) || name == "action.yml" || name == "action.yaml"
}

fn is_config_file(uri: &Url) -> bool {
    uri.path()
        .rsplit('/')
        .next()
        .is_some_and(|name| CONFIG_FILE_NAMES.contains(&name))
}

/// Path used in findings: the file path for `file:` URIs, the URI otherwise
fn display_path(uri: &Url) -> String {
    uri.to_file_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| uri.to_string())
}

#[allow(deprecated)]
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri)
        .or(params.root_uri.as_ref())
        .and_then(|uri| uri.to_file_path().ok())
        .or_else(|| params.root_path.as_ref().map(|path| Path::new(path).to_path_buf()))
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        *self.root.write().await = workspace_root(&params);
        self.load_config().await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                        ..Default::default()
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "ghlint".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("Server initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("Server shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        if !is_lintable(&uri) {
            tracing::debug!("Ignoring document: {}", uri);
            return;
        }

        tracing::debug!("Document opened: {}", uri);
        self.store_document(&uri, params.text_document.text, params.text_document.version)
            .await;
        self.validate_document(&uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if !is_lintable(&uri) {
            return;
        }
        let version = params.text_document.version;

        // Get the full text from the changes (we use FULL sync)
        if let Some(change) = params.content_changes.into_iter().next() {
            tracing::debug!("Document changed: {}", uri);
            self.store_document(&uri, change.text, version).await;
            self.validate_document(&uri).await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("Document saved: {}", uri);

        if is_config_file(&uri) {
            self.load_config().await;
            let uris: Vec<Url> = self.documents.read().await.keys().cloned().collect();
            for uri in uris {
                self.validate_document(&uri).await;
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("Document closed: {}", uri);

        // Remove document from our state
        let removed = self.documents.write().await.remove(&uri).is_some();

        // Clear diagnostics for this document
        if removed {
            self.client.publish_diagnostics(uri, vec![], None).await;
        }
    }
}
