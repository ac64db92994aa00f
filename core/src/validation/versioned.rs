use tracing::{debug, warn};

use super::ValidationContext;
use super::reporter::ProblemReporter;
use super::rules::*;
use crate::version::RobotVersion;

/// Every version-dependent rule, selected per element kind and active version.
pub struct VersionDependentValidators {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for VersionDependentValidators {
    fn default() -> Self {
        Self::new(vec![
            Box::new(SettingSynonymRule),
            Box::new(MetadataHeaderAliasRule),
            Box::new(LibraryAliasCaseRule),
            Box::new(DuplicatedSettingsRule),
            Box::new(DuplicatedSettingsOlderRule),
            Box::new(DictionaryVariableRule),
            Box::new(DuplicatedLocalSettingsRule {
                element: ElementKind::TestCase,
                every_occurrence: false,
            }),
            Box::new(DuplicatedLocalSettingsRule {
                element: ElementKind::TestCase,
                every_occurrence: true,
            }),
            Box::new(DuplicatedLocalSettingsRule {
                element: ElementKind::Keyword,
                every_occurrence: false,
            }),
            Box::new(DuplicatedLocalSettingsRule {
                element: ElementKind::Keyword,
                every_occurrence: true,
            }),
        ])
    }
}

impl std::fmt::Debug for VersionDependentValidators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("VersionDependentValidators").field("rules", &names).finish()
    }
}

impl VersionDependentValidators {
    pub fn new(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    pub fn rules_for<'a>(
        &'a self,
        element: ElementKind,
        version: &'a RobotVersion,
    ) -> impl Iterator<Item = &'a dyn ValidationRule> + 'a {
        self.rules
            .iter()
            .map(|r| r.as_ref())
            .filter(move |r| r.element_kind() == element && r.is_applicable_for(version))
    }

    /// Runs the applicable rules for `element`. A failing rule is logged and
    /// skipped; the others still run. Returns how many rules completed.
    pub fn validate(
        &self,
        context: &ValidationContext<'_>,
        element: &ModelElement<'_>,
        reporter: &mut dyn ProblemReporter,
    ) -> usize {
        let mut completed = 0;
        for rule in self.rules_for(element.kind(), &context.version) {
            match rule.validate(context, element, reporter) {
                Ok(()) => completed += 1,
                Err(error) => warn!(rule = rule.name(), file = context.file, "validation rule failed: {error:#}"),
            }
        }
        debug!(kind = ?element.kind(), version = %context.version, completed, "version dependent rules done");
        completed
    }
}
