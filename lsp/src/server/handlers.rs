use std::collections::HashMap;

use ropey::Rope;
use rfx_core::model::SuiteDocument;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::LanguageServer;
use tracing::{debug, info};

use crate::analyzer::{fixes_of, quick_assist_action, to_completion_item, LineMap};

use super::{
    state::{Document, RfxLanguageServer},
    text::{apply_change, position_to_byte},
    utils::compute_content_hash,
};

const INDEXED_EXTENSIONS: &[&str] = &[".resource", ".robot", ".txt", ".tsv", ".py", ".yaml", ".yml", ".json"];

fn workspace_root(params: &InitializeParams) -> Option<std::path::PathBuf> {
    if let Some(folder) = params.workspace_folders.as_ref().and_then(|f| f.first()) {
        return folder.uri.to_file_path().ok();
    }
    #[allow(deprecated)]
    params.root_uri.as_ref().and_then(|u| u.to_file_path().ok())
}

#[tower_lsp::async_trait]
impl LanguageServer for RfxLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = workspace_root(&params);
        info!(root = ?root, "Robot Framework language server initializing");
        self.set_root(root);

        let triggers = self
            .assist_context()
            .preferences()
            .auto_activation_chars
            .iter()
            .map(char::to_string)
            .collect();

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(triggers),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                document_symbol_provider: Some(OneOf::Left(true)),
                diagnostic_provider: Some(DiagnosticServerCapabilities::Options(DiagnosticOptions {
                    identifier: Some("rfx".to_string()),
                    inter_file_dependencies: false,
                    workspace_diagnostics: false,
                    work_done_progress_options: Default::default(),
                })),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "rfx-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("Robot Framework language server initialized");
        let _ = self
            .client
            .log_message(MessageType::INFO, "Robot Framework language server started")
            .await;
        self.load_config().await;
        self.rebuild_index().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Robot Framework language server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        self.load_config().await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let document = Document {
            content: Rope::from_str(&params.text_document.text),
            version,
            path: self.document_path(&uri),
            cached_analysis: None,
            debounce_seq: 0,
            content_hash: compute_content_hash(&params.text_document.text),
        };
        self.documents.insert(uri.clone(), document);
        self.schedule_diagnostics(uri, version, 0).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        {
            let mut entry = self.documents.entry(uri.clone()).or_default();
            entry.version = version;
            for change in &params.content_changes {
                apply_change(&mut entry.content, change);
            }
            let hash = compute_content_hash(&entry.content.to_string());
            if hash == entry.content_hash && entry.cached_analysis.is_some() {
                return;
            }
            entry.content_hash = hash;
            entry.cached_analysis = None;
            entry.debounce_seq = entry.debounce_seq.wrapping_add(1);
        }
        let delay = self.config_snapshot().debounce_ms;
        self.schedule_diagnostics(uri, version, delay).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let path = params.text_document.uri.path().to_ascii_lowercase();
        if INDEXED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            self.rebuild_index().await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.cycling.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let Some((content, path, offset)) = self.documents.get(uri).map(|doc| {
            let offset = position_to_byte(&doc.content, position);
            (doc.content.to_string(), doc.path.clone(), offset)
        }) else {
            return Ok(None);
        };

        let context = self.assist_context();
        let document = SuiteDocument::new(path, content);
        let invoked = params
            .context
            .as_ref()
            .map_or(true, |c| c.trigger_kind == CompletionTriggerKind::INVOKED);

        // Explicit invocations cycle through the provider groups; typing shows everything
        let (proposals, status) = if invoked {
            let mut cycling = self.cycling.entry(uri.clone()).or_default();
            let step = cycling.compute(&document, offset, &context);
            (step.proposals, step.status)
        } else {
            if let Some(mut cycling) = self.cycling.get_mut(uri) {
                cycling.reset();
            }
            (rfx_core::assist::compute_proposals(&document, offset, &context), String::new())
        };

        let Some(proposals) = proposals else {
            debug!(%uri, offset, "no provider applicable");
            return Ok(None);
        };
        if !status.is_empty() {
            let _ = self.client.log_message(MessageType::INFO, &status).await;
        }

        let map = LineMap::new(&document.text);
        let items = proposals
            .iter()
            .enumerate()
            .map(|(i, p)| to_completion_item(p, i, &document.text, &map))
            .collect();
        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: !status.is_empty(),
            items,
        })))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = &params.text_document.uri;
        let Some((content, path, offset)) = self.documents.get(uri).map(|doc| {
            let offset = position_to_byte(&doc.content, params.range.start);
            (doc.content.to_string(), doc.path.clone(), offset)
        }) else {
            return Ok(None);
        };

        let map = LineMap::new(&content);
        let mut actions: Vec<CodeActionOrCommand> = Vec::new();

        for diag in &params.context.diagnostics {
            for fix in fixes_of(diag) {
                let edit = TextEdit {
                    range: diag.range,
                    new_text: fix.clone(),
                };
                actions.push(CodeActionOrCommand::CodeAction(CodeAction {
                    title: format!("Replace with '{}'", fix),
                    kind: Some(CodeActionKind::QUICKFIX),
                    diagnostics: Some(vec![diag.clone()]),
                    edit: Some(WorkspaceEdit {
                        changes: Some(HashMap::from([(uri.clone(), vec![edit])])),
                        ..Default::default()
                    }),
                    is_preferred: Some(true),
                    ..Default::default()
                }));
            }
        }

        let analyzer = self.analyzer();
        for assist in analyzer.quick_assists(&path, &content, offset) {
            actions.push(CodeActionOrCommand::CodeAction(quick_assist_action(&assist, uri, &map)));
        }

        if actions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(actions))
        }
    }

    async fn diagnostic(&self, params: DocumentDiagnosticParams) -> Result<DocumentDiagnosticReportResult> {
        let uri = &params.text_document.uri;
        let diagnostics = self.validate_document(uri).await;

        Ok(DocumentDiagnosticReportResult::Report(DocumentDiagnosticReport::Full(
            RelatedFullDocumentDiagnosticReport {
                related_documents: None,
                full_document_diagnostic_report: FullDocumentDiagnosticReport {
                    result_id: None,
                    items: diagnostics,
                },
            },
        )))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;
        if let Some(analysis) = self.get_or_compute_analysis(uri).await {
            if !analysis.symbols.is_empty() {
                return Ok(Some(DocumentSymbolResponse::Nested(analysis.symbols.clone())));
            }
        }
        Ok(None)
    }
}
