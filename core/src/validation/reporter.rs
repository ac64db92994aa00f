use serde::Serialize;

use super::problem::{Problem, ProblemKind, Severity};
use crate::model::Token;
use crate::util::fast_map::FastHashMap;

/// Sink for diagnostics. Reporting never stops validation.
pub trait ProblemReporter {
    fn report(&mut self, problem: Problem, file: &str, token: &Token);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedProblem {
    pub kind: ProblemKind,
    pub severity: Severity,
    pub message: String,
    pub file: String,
    pub token: Token,
    pub fixes: Vec<String>,
    pub attributes: FastHashMap<&'static str, String>,
}

impl ReportedProblem {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Keeps every reported problem in report order.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    pub problems: Vec<ReportedProblem>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_kind(&self, kind: ProblemKind) -> impl Iterator<Item = &ReportedProblem> {
        self.problems.iter().filter(move |p| p.kind == kind)
    }

    pub fn into_problems(self) -> Vec<ReportedProblem> {
        self.problems
    }
}

impl ProblemReporter for CollectingReporter {
    fn report(&mut self, problem: Problem, file: &str, token: &Token) {
        self.problems.push(ReportedProblem {
            kind: problem.kind,
            severity: problem.kind.severity(),
            message: problem.message,
            file: file.to_string(),
            token: token.clone(),
            fixes: problem.fixes,
            attributes: problem.attributes,
        });
    }
}
