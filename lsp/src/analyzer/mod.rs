use std::sync::Arc;

use rfx_core::assist::{compute_proposals, compute_quick_assists, AssistContext, Proposal};
use rfx_core::model::SuiteDocument;
use rfx_core::validation::{validate_document, ReportedProblem};
use rfx_core::version::RobotVersion;
use tower_lsp::lsp_types::*;
use tracing::debug;

mod completions;
mod diagnostics;
mod symbols;
mod utils;

pub use completions::{quick_assist_action, to_completion_item};
pub use diagnostics::{fixes_of, problem_to_diagnostic};
pub use utils::LineMap;

// Cap diagnostics volume on large or badly broken files
const MAX_DIAGNOSTICS: usize = 200;

/// Result of analyzing one suite file
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: Vec<DocumentSymbol>,
    pub problems: Vec<ReportedProblem>,
}

/// Runs validation and assist computations against a fixed Robot Framework
/// version and assist context.
#[derive(Debug, Clone)]
pub struct RobotAnalyzer {
    version: RobotVersion,
    context: Arc<AssistContext>,
}

impl RobotAnalyzer {
    pub fn new(version: RobotVersion) -> Self {
        Self::with_context(version, Arc::new(AssistContext::standalone()))
    }

    pub fn with_context(version: RobotVersion, context: Arc<AssistContext>) -> Self {
        Self { version, context }
    }

    pub fn version(&self) -> RobotVersion {
        self.version
    }

    pub fn analyze(&self, path: &str, content: &str) -> AnalysisResult {
        let document = SuiteDocument::new(path, content);
        let map = LineMap::new(content);

        let mut problems = validate_document(&document, self.version);
        if problems.len() > MAX_DIAGNOSTICS {
            debug!(path, total = problems.len(), "diagnostics truncated");
            problems.truncate(MAX_DIAGNOSTICS);
        }
        let diagnostics = problems.iter().map(|p| problem_to_diagnostic(p, &map)).collect();
        let symbols = symbols::document_symbols(&document, &map);

        AnalysisResult {
            diagnostics,
            symbols,
            problems,
        }
    }

    /// Every proposal at `offset`; `None` when nothing applies there.
    pub fn complete(&self, path: &str, content: &str, offset: usize) -> Option<Vec<Proposal>> {
        let document = SuiteDocument::new(path, content);
        compute_proposals(&document, offset, &self.context)
    }

    pub fn quick_assists(&self, path: &str, content: &str, offset: usize) -> Vec<Proposal> {
        let document = SuiteDocument::new(path, content);
        compute_quick_assists(&document, offset, &self.context)
    }
}
