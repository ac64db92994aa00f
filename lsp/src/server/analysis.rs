use std::sync::Arc;

use tokio::task;
use tokio::time::{sleep, Duration};
use tower_lsp::lsp_types::{request::WorkDoneProgressCreate, *};
use tracing::debug;

use super::state::RfxLanguageServer;
use crate::analyzer::AnalysisResult;

impl RfxLanguageServer {
    pub(crate) async fn validate_document(&self, uri: &Url) -> Vec<Diagnostic> {
        match self.get_or_compute_analysis(uri).await {
            Some(analysis) => analysis.diagnostics.clone(),
            None => Vec::new(),
        }
    }

    pub(crate) async fn get_or_compute_analysis(&self, uri: &Url) -> Option<Arc<AnalysisResult>> {
        if let Some(doc) = self.documents.get(uri) {
            if let Some(cached) = doc.cached_analysis.clone() {
                return Some(cached);
            }
        }

        let (content, path, version_snapshot, seq_snapshot) = {
            let doc = self.documents.get(uri)?;
            (doc.content.to_string(), doc.path.clone(), doc.version, doc.debounce_seq)
        };

        let analyzer = self.analyzer();
        let limiter = self.limiter();
        let _permit = limiter.acquire().await.ok();
        let computed = task::spawn_blocking(move || analyzer.analyze(&path, &content)).await.ok()?;
        let computed = Arc::new(computed);

        if let Some(mut doc) = self.documents.get_mut(uri) {
            if doc.version == version_snapshot && doc.debounce_seq == seq_snapshot {
                doc.cached_analysis = Some(computed.clone());
            }
        }
        Some(computed)
    }

    /// Publishes diagnostics after `delay_ms`, unless the document moved on meanwhile.
    pub(crate) async fn schedule_diagnostics(&self, uri: Url, scheduled_version: i32, delay_ms: u64) {
        let documents = self.documents.clone();
        let client = self.client.clone();
        let analyzer = self.analyzer();
        let limiter = self.limiter();
        tokio::spawn(async move {
            sleep(Duration::from_millis(delay_ms)).await;

            let Some((content, path, seq_snapshot, version_snapshot)) = documents
                .get(&uri)
                .map(|doc| (doc.content.to_string(), doc.path.clone(), doc.debounce_seq, doc.version))
            else {
                return;
            };
            if version_snapshot != scheduled_version {
                debug!(%uri, scheduled_version, version_snapshot, "stale diagnostics run skipped");
                return;
            }

            let token = NumberOrString::String(format!("rfx:diag:{}", uri));
            let _ = client
                .send_request::<WorkDoneProgressCreate>(WorkDoneProgressCreateParams { token: token.clone() })
                .await;
            let _ = client
                .send_notification::<notification::Progress>(ProgressParams {
                    token: token.clone(),
                    value: ProgressParamsValue::WorkDone(WorkDoneProgress::Begin(WorkDoneProgressBegin {
                        title: "Robot: Validating".to_string(),
                        cancellable: Some(false),
                        message: Some(uri.to_string()),
                        percentage: None,
                    })),
                })
                .await;

            let _permit = limiter.acquire().await.ok();
            let computed = task::spawn_blocking(move || analyzer.analyze(&path, &content)).await.ok();

            if let Some(computed) = computed {
                let diagnostics = computed.diagnostics.clone();
                if let Some(mut doc) = documents.get_mut(&uri) {
                    if doc.debounce_seq == seq_snapshot && doc.version == version_snapshot {
                        doc.cached_analysis = Some(Arc::new(computed));
                    }
                }
                let _ = client
                    .send_notification::<notification::PublishDiagnostics>(PublishDiagnosticsParams {
                        uri: uri.clone(),
                        version: Some(version_snapshot),
                        diagnostics,
                    })
                    .await;
            }

            let _ = client
                .send_notification::<notification::Progress>(ProgressParams {
                    token,
                    value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd {
                        message: Some("Validation complete".to_string()),
                    })),
                })
                .await;
        });
    }
}
