//! Diagnostics for suite files, with rules scoped to Robot Framework versions.

pub mod problem;
pub mod reporter;
pub mod rules;
pub mod tables;
pub mod versioned;

#[cfg(test)]
mod validation_test;

pub use problem::{Problem, ProblemKind, Severity};
pub use reporter::{CollectingReporter, ProblemReporter, ReportedProblem};
pub use rules::{ElementKind, ModelElement, ValidationRule};
pub use tables::{
    FileValidator, GeneralSettingsTableValidator, KeywordTableValidator, TestCaseTableValidator,
    VariablesTableValidator,
};
pub use versioned::VersionDependentValidators;

use crate::model::{SuiteDocument, SuiteModel};
use crate::version::RobotVersion;

/// What every rule gets besides the element it checks.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub file: &'a str,
    pub version: RobotVersion,
    pub model: &'a SuiteModel,
}

impl<'a> ValidationContext<'a> {
    pub fn new(document: &'a SuiteDocument, version: RobotVersion) -> Self {
        Self {
            file: &document.path,
            version,
            model: &document.model,
        }
    }
}

/// Every problem in `document` for the given Robot version, in report order.
pub fn validate_document(document: &SuiteDocument, version: RobotVersion) -> Vec<ReportedProblem> {
    let mut reporter = CollectingReporter::new();
    FileValidator::default().validate(&ValidationContext::new(document, version), &mut reporter);
    reporter.into_problems()
}
