use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use ropey::Rope;
use rfx_core::assist::{AssistContext, CyclingAggregator, SharedPreferences, StaticProjectIndex};
use tokio::sync::Semaphore;
use tokio::task;
use tower_lsp::lsp_types::Url;
use tower_lsp::Client;
use tracing::info;

use super::config::ServerConfig;
use super::workspace::build_index;
use crate::analyzer::{AnalysisResult, RobotAnalyzer};

/// An open suite file and its cached analysis.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
    /// Project-relative path used by the document model.
    pub(crate) path: String,
    pub(crate) cached_analysis: Option<Arc<AnalysisResult>>,
    pub(crate) debounce_seq: u64,
    pub(crate) content_hash: u64,
}

/// Primary LSP server state shared across handlers.
pub(crate) struct RfxLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) preferences: Arc<SharedPreferences>,
    pub(crate) assist: Mutex<Arc<AssistContext>>,
    pub(crate) cycling: DashMap<Url, CyclingAggregator>,
    pub(crate) config: Mutex<ServerConfig>,
    pub(crate) compute_limiter: Mutex<Arc<Semaphore>>,
    pub(crate) root: Mutex<Option<PathBuf>>,
}

impl RfxLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        let preferences = Arc::new(SharedPreferences::default());
        let assist = AssistContext::new(preferences.clone(), Arc::new(StaticProjectIndex::default()));
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            preferences,
            assist: Mutex::new(Arc::new(assist)),
            cycling: DashMap::new(),
            config: Mutex::new(ServerConfig::default()),
            compute_limiter: Mutex::new(Arc::new(Semaphore::new(2))),
            root: Mutex::new(None),
        }
    }

    pub(crate) fn config_snapshot(&self) -> ServerConfig {
        self.config.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub(crate) fn root_dir(&self) -> Option<PathBuf> {
        self.root.lock().ok().and_then(|r| r.clone())
    }

    pub(crate) fn set_root(&self, root: Option<PathBuf>) {
        if let Ok(mut guard) = self.root.lock() {
            *guard = root;
        }
    }

    pub(crate) fn assist_context(&self) -> Arc<AssistContext> {
        match self.assist.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn limiter(&self) -> Arc<Semaphore> {
        match self.compute_limiter.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn analyzer(&self) -> RobotAnalyzer {
        RobotAnalyzer::with_context(self.config_snapshot().robot_version, self.assist_context())
    }

    pub(crate) fn document_path(&self, uri: &Url) -> String {
        super::utils::document_path(self.root_dir().as_deref(), uri)
    }

    /// Rescans the workspace and swaps in a fresh assist context over the new index.
    pub(crate) async fn rebuild_index(&self) {
        let root = self.root_dir();
        let library_docs = self.config_snapshot().library_docs;
        let built = task::spawn_blocking(move || build_index(root.as_deref(), &library_docs)).await;
        let Ok(index) = built else {
            return;
        };
        let context = Arc::new(AssistContext::new(self.preferences.clone(), Arc::new(index)));
        if let Ok(mut guard) = self.assist.lock() {
            *guard = context;
        }
        self.cycling.clear();
        for mut doc in self.documents.iter_mut() {
            doc.cached_analysis = None;
        }
        info!("project index rebuilt");
    }
}
