use rfx_core::validation::{ReportedProblem, Severity};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};

use super::LineMap;

pub const DIAGNOSTIC_SOURCE: &str = "rfx";

fn problem_code(problem: &ReportedProblem) -> Option<String> {
    serde_json::to_value(problem.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
}

/// Maps a reported problem onto the declaration token it was reported for.
/// Replacement texts travel in `data.fixes`.
pub fn problem_to_diagnostic(problem: &ReportedProblem, map: &LineMap<'_>) -> Diagnostic {
    let token = &problem.token;
    let severity = match problem.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    };
    let data = (!problem.fixes.is_empty()).then(|| serde_json::json!({ "fixes": problem.fixes }));
    Diagnostic {
        range: map.range(token.offset, token.end()),
        severity: Some(severity),
        code: problem_code(problem).map(NumberOrString::String),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: problem.message.clone(),
        data,
        ..Default::default()
    }
}

/// Replacement texts carried by a diagnostic this server published.
pub fn fixes_of(diagnostic: &Diagnostic) -> Vec<String> {
    if diagnostic.source.as_deref() != Some(DIAGNOSTIC_SOURCE) {
        return Vec::new();
    }
    diagnostic
        .data
        .as_ref()
        .and_then(|d| d.get("fixes"))
        .and_then(|f| serde_json::from_value(f.clone()).ok())
        .unwrap_or_default()
}
