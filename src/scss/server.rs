//! SCSS Language Server Implementation
//!
//! Provides Language Server Protocol features for SCSS files and the SCSS style blocks
//! of Vue, Svelte and Astro components using tower-lsp.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use crate::language::document::DocumentVersion;
use crate::language::workspace_files::{find_files, is_indexable};
use crate::scss::completion::ScssCompletionProvider;
use crate::scss::constants::{COMPLETION_TRIGGERS, DIAGNOSTICS_DELAY_MS, SIGNATURE_TRIGGERS};
use crate::scss::definition::ScssDefinitionProvider;
use crate::scss::diagnostics::ScssDiagnostics;
use crate::scss::hover::ScssHoverProvider;
use crate::scss::references::ScssReferencesProvider;
use crate::scss::scanner::ScanReport;
use crate::scss::settings::{InitializationOptions, ScssSettings};
use crate::scss::signature_help::ScssSignatureHelpProvider;
use crate::scss::workspace::{ScssWorkspace, uri_to_path};
use crate::scss::workspace_symbol::ScssWorkspaceSymbolProvider;

/// SCSS Language Server
pub struct ScssLanguageServer {
    client: Client,
    /// tower-lsp needs `Send + Sync` and handlers only get `&self`
    state: Arc<Mutex<ScssServerState>>,
}

/// Internal state for the SCSS language server
struct ScssServerState {
    workspace: ScssWorkspace,
    diagnostics: ScssDiagnostics,
    hover_provider: ScssHoverProvider,
    completion_provider: ScssCompletionProvider,
    definition_provider: ScssDefinitionProvider,
    references_provider: ScssReferencesProvider,
    symbol_provider: ScssWorkspaceSymbolProvider,
    signature_help_provider: ScssSignatureHelpProvider,
}

impl ScssServerState {
    fn new(workspace: ScssWorkspace) -> Self {
        Self {
            workspace,
            diagnostics: ScssDiagnostics::new(),
            hover_provider: ScssHoverProvider::new(),
            completion_provider: ScssCompletionProvider::new(),
            definition_provider: ScssDefinitionProvider::new(),
            references_provider: ScssReferencesProvider::new(),
            symbol_provider: ScssWorkspaceSymbolProvider::new(),
            signature_help_provider: ScssSignatureHelpProvider::new(),
        }
    }

    /// Whether `version` is still the latest text of an open document
    fn is_current(&self, uri: &Url, version: DocumentVersion) -> bool {
        self.workspace.documents.is_open(uri) && self.workspace.documents.version(uri) == Some(version)
    }

    /// Apply file watcher events
    ///
    /// Returns the open documents, whose diagnostics may have changed, and the scan report.
    fn apply_file_events(&mut self, events: &[FileEvent]) -> (Vec<Url>, ScanReport) {
        let mut deleted = Vec::new();
        let mut changed = Vec::new();
        for event in events {
            let Ok(path) = uri_to_path(&event.uri) else {
                log::debug!("Ignoring file event for {}", event.uri);
                continue;
            };
            match event.typ {
                FileChangeType::DELETED => deleted.push(path),
                _ if path.is_dir() => {
                    changed.extend(find_files(&path, &self.workspace.settings.find_files_options()))
                }
                _ if is_indexable(&path) => changed.push(path),
                _ => {}
            }
        }

        if !deleted.is_empty() {
            let removed = self.workspace.remove_paths(&deleted);
            log::debug!("{} documents changed after deletions", removed.len());
        }
        let report = if changed.is_empty() {
            ScanReport::default()
        } else {
            self.workspace.rescan_paths(&changed)
        };
        (self.open_documents(), report)
    }

    fn open_documents(&self) -> Vec<Url> {
        self.workspace
            .documents
            .uris()
            .filter(|uri| self.workspace.documents.is_open(uri))
            .cloned()
            .collect()
    }
}

impl ScssLanguageServer {
    /// Create a new SCSS language server
    pub fn new(client: Client) -> Self {
        let workspace = ScssWorkspace::new(None, ScssSettings::default());
        Self {
            client,
            state: Arc::new(Mutex::new(ScssServerState::new(workspace))),
        }
    }

    /// Show scan failures when the user asked for them
    async fn report_scan(&self, report: ScanReport) {
        let show_errors = match self.state.lock() {
            Ok(state) => state.workspace.settings.show_errors,
            Err(_) => false,
        };
        log::info!(
            "Indexed {} files, {} failures",
            report.indexed,
            report.failures.len()
        );
        if !show_errors {
            return;
        }
        for failure in report.failures {
            self.client
                .show_message(
                    MessageType::WARNING,
                    format!("{}: {}", failure.path.display(), failure.error),
                )
                .await;
        }
    }

    /// Publish diagnostics of an open document once its text has settled
    ///
    /// Nothing is published when the document changed again in the meantime.
    async fn publish_diagnostics(&self, uri: Url) {
        let version = match self.state.lock() {
            Ok(state) => state.workspace.documents.version(&uri),
            Err(_) => {
                log::error!("[publish_diagnostics] Failed to acquire state lock");
                return;
            }
        };
        let Some(version) = version else {
            return;
        };

        tokio::time::sleep(Duration::from_millis(DIAGNOSTICS_DELAY_MS)).await;

        let diagnostics = {
            let Ok(state) = self.state.lock() else {
                log::error!("[publish_diagnostics] Failed to acquire state lock");
                return;
            };
            if !state.is_current(&uri, version) {
                log::debug!("Dropping stale diagnostics for {} at {:?}", uri, version);
                return;
            }
            state.diagnostics.analyze(&state.workspace, &uri)
        };

        self.client
            .publish_diagnostics(uri, diagnostics, Some(version.minor))
            .await;
    }

    async fn publish_all(&self, uris: Vec<Url>) {
        for uri in uris {
            self.publish_diagnostics(uri).await;
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for ScssLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let options = match InitializationOptions::from_value(params.initialization_options.as_ref()) {
            Ok(options) => options,
            Err(e) => {
                log::warn!("Invalid initialization options: {}", e);
                InitializationOptions::default()
            }
        };
        let settings = match options.settings.as_ref().map(ScssSettings::from_value) {
            Some(Ok(settings)) => settings,
            Some(Err(e)) => {
                log::warn!("Invalid settings, using defaults: {}", e);
                ScssSettings::default()
            }
            None => ScssSettings::default(),
        };
        #[allow(deprecated)]
        let client_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| &folder.uri)
            .or(params.root_uri.as_ref())
            .and_then(|uri| uri_to_path(uri).ok());
        let root: Option<PathBuf> = options.root(client_root.as_deref());
        log::info!("Initializing SCSS language server at {:?}", root);

        let report = match self.state.lock() {
            Ok(mut state) => {
                state.workspace = ScssWorkspace::new(root, settings);
                state.workspace.scan_workspace()
            }
            Err(_) => {
                log::error!("[initialize] Failed to acquire state lock");
                ScanReport::default()
            }
        };
        self.report_scan(report).await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(COMPLETION_TRIGGERS.iter().map(|c| c.to_string()).collect()),
                    all_commit_characters: None,
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                    completion_item: None,
                }),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(SIGNATURE_TRIGGERS.iter().map(|c| c.to_string()).collect()),
                    retrigger_characters: None,
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "SCSS Language Server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        if let Ok(mut state) = self.state.lock() {
            state.workspace.clear();
        }
        log::info!("SCSS Language Server shut down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let content = params.text_document.text;
        let version = params.text_document.version;

        let opened = match self.state.lock() {
            Ok(mut state) => {
                let opened = state.workspace.documents.open(uri.clone(), content, version).is_some();
                if opened {
                    state.workspace.update(&uri);
                }
                opened
            }
            Err(_) => {
                log::error!("[did_open] Failed to acquire state lock");
                false
            }
        };
        if !opened {
            log::debug!("Ignoring unsupported document {}", uri);
            return;
        }

        log::info!("Opened SCSS document: {}", uri);
        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let changes = params.content_changes;

        let updated = match self.state.lock() {
            Ok(mut state) => {
                let updated = state.workspace.documents.update(&uri, changes, version).is_some();
                if updated {
                    state.workspace.update(&uri);
                }
                updated
            }
            Err(_) => {
                log::error!("[did_change] Failed to acquire state lock");
                false
            }
        };
        if updated {
            self.publish_diagnostics(uri).await;
        } else {
            log::warn!("Change for unknown document {}", uri);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        let touched = match self.state.lock() {
            Ok(mut state) => {
                state.workspace.close(&uri);
                state.open_documents()
            }
            Err(_) => {
                log::error!("[did_close] Failed to acquire state lock");
                return;
            }
        };

        self.client.publish_diagnostics(uri.clone(), Vec::new(), None).await;
        log::info!("Closed SCSS document: {}", uri);
        self.publish_all(touched).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let (touched, report) = match self.state.lock() {
            Ok(mut state) => state.apply_file_events(&params.changes),
            Err(_) => {
                log::error!("[did_change_watched_files] Failed to acquire state lock");
                return;
            }
        };
        self.report_scan(report).await;
        self.publish_all(touched).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let settings = match ScssSettings::from_value(&params.settings) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring invalid configuration: {}", e);
                return;
            }
        };

        let report = match self.state.lock() {
            Ok(mut state) => {
                let current = &state.workspace.settings;
                let rescan = current.scanner_depth != settings.scanner_depth
                    || current.scanner_exclude != settings.scanner_exclude
                    || current.scan_imported_files != settings.scan_imported_files;
                state.workspace.settings = settings;
                log::info!("Configuration changed, rescan: {}", rescan);
                rescan.then(|| state.workspace.scan_workspace())
            }
            Err(_) => {
                log::error!("[did_change_configuration] Failed to acquire state lock");
                return;
            }
        };
        if let Some(report) = report {
            self.report_scan(report).await;
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Ok(state) = self.state.lock() else {
            log::error!("[hover] Failed to acquire state lock");
            return Ok(None);
        };
        Ok(state.hover_provider.hover(&state.workspace, &uri, position))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        log::debug!(
            "Completion requested at {}:{} in {}",
            position.line,
            position.character,
            uri
        );

        let completions = {
            let Ok(state) = self.state.lock() else {
                log::error!("[completion] Failed to acquire state lock");
                return Ok(None);
            };
            state.completion_provider.complete(&state.workspace, &uri, position)
        };

        if completions.is_empty() {
            Ok(None)
        } else {
            log::debug!("Returning {} completions", completions.len());
            Ok(Some(CompletionResponse::Array(completions)))
        }
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Ok(state) = self.state.lock() else {
            log::error!("[signature_help] Failed to acquire state lock");
            return Ok(None);
        };
        Ok(state
            .signature_help_provider
            .signature_help(&state.workspace, &uri, position))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let mut locations = {
            let Ok(state) = self.state.lock() else {
                log::error!("[goto_definition] Failed to acquire state lock");
                return Ok(None);
            };
            state.definition_provider.definition(&state.workspace, &uri, position)
        };

        Ok(match locations.len() {
            0 => None,
            1 => locations.pop().map(GotoDefinitionResponse::Scalar),
            _ => Some(GotoDefinitionResponse::Array(locations)),
        })
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let include_declaration = params.context.include_declaration;

        let Ok(state) = self.state.lock() else {
            log::error!("[references] Failed to acquire state lock");
            return Ok(None);
        };
        let locations =
            state
                .references_provider
                .references(&state.workspace, &uri, position, include_declaration);
        Ok(Some(locations))
    }

    async fn symbol(&self, params: WorkspaceSymbolParams) -> Result<Option<Vec<SymbolInformation>>> {
        let Ok(state) = self.state.lock() else {
            log::error!("[symbol] Failed to acquire state lock");
            return Ok(None);
        };
        Ok(Some(state.symbol_provider.symbols(&state.workspace, &params.query)))
    }
}

/// Create and start the SCSS language server on stdin/stdout
pub async fn start_scss_language_server() -> Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(ScssLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
