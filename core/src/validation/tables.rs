//! Table-level validators: version-independent checks plus the version
//! dependent rules for each element of the table.

use super::ValidationContext;
use super::problem::{Problem, ProblemKind};
use super::reporter::ProblemReporter;
use super::rules::ModelElement;
use super::versioned::VersionDependentValidators;
use crate::model::{ImportKind, LocalSettingKind, SectionKind, SettingKind, Token, normalize};
use crate::util::fast_map::{FastHashMap, fast_hash_map_new, fast_hash_set_new};

/// Settings whose rows are all reported when none of them has a value.
const VALUE_REQUIRED: &[SettingKind] = &[
    SettingKind::SuiteSetup,
    SettingKind::SuiteTeardown,
    SettingKind::TestSetup,
    SettingKind::TestTeardown,
    SettingKind::TestTemplate,
    SettingKind::TestTimeout,
    SettingKind::Metadata,
];

/// Occurrence count of every normalized key.
fn occurrences(keys: impl Iterator<Item = String>) -> FastHashMap<String, usize> {
    let mut counts = fast_hash_map_new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn report(reporter: &mut dyn ProblemReporter, context: &ValidationContext<'_>, kind: ProblemKind, token: &Token) {
    let problem = Problem::caused_by(kind).format_with(&[token.text.trim()]);
    reporter.report(problem, context.file, token);
}

#[derive(Debug, Clone, Copy)]
pub struct GeneralSettingsTableValidator<'v> {
    validators: &'v VersionDependentValidators,
}

impl<'v> GeneralSettingsTableValidator<'v> {
    pub fn new(validators: &'v VersionDependentValidators) -> Self {
        Self { validators }
    }

    pub fn validate(&self, context: &ValidationContext<'_>, reporter: &mut dyn ProblemReporter) {
        let model = context.model;
        if !model.has_section(SectionKind::Settings) {
            return;
        }
        self.validators
            .validate(context, &ModelElement::GeneralSettings(model), reporter);

        for row in model.settings.iter().filter(|r| r.kind == SettingKind::Unknown) {
            report(reporter, context, ProblemKind::UnknownSetting, &row.declaration);
        }
        for import in model.imports.iter().filter(|i| i.name.is_none()) {
            let kind = match import.kind {
                ImportKind::Library => ProblemKind::MissingLibraryName,
                ImportKind::Resource => ProblemKind::MissingResourceName,
                ImportKind::Variables => ProblemKind::MissingVariablesName,
            };
            report(reporter, context, kind, &import.declaration);
        }
        for kind in VALUE_REQUIRED {
            let rows: Vec<_> = model.settings_of(*kind).collect();
            if rows.iter().all(|r| r.first_arg().is_none()) {
                for row in rows {
                    report(reporter, context, ProblemKind::EmptySetting, &row.declaration);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TestCaseTableValidator<'v> {
    validators: &'v VersionDependentValidators,
}

impl<'v> TestCaseTableValidator<'v> {
    pub fn new(validators: &'v VersionDependentValidators) -> Self {
        Self { validators }
    }

    pub fn validate(&self, context: &ValidationContext<'_>, reporter: &mut dyn ProblemReporter) {
        let tests = &context.model.test_cases;
        let counts = occurrences(tests.iter().map(|t| t.name.normalized()));
        for test in tests {
            if counts.get(&test.name.normalized()).is_some_and(|n| *n > 1) {
                let problem = Problem::caused_by(ProblemKind::DuplicatedTestCase)
                    .format_with(&[test.name.text.trim()])
                    .with_attribute("name", test.name.text.trim());
                reporter.report(problem, context.file, &test.name);
            }
            if test.rows.iter().all(|r| r.is_empty()) {
                report(reporter, context, ProblemKind::EmptyTestCase, &test.name);
            }
            for setting in &test.settings {
                let kind = match setting.kind {
                    LocalSettingKind::Unknown => ProblemKind::UnknownTestCaseSetting,
                    LocalSettingKind::Arguments => ProblemKind::KeywordSettingInTestCase,
                    LocalSettingKind::Return => ProblemKind::ReturnInTestCase,
                    _ => continue,
                };
                report(reporter, context, kind, &setting.declaration);
            }
            self.validators.validate(context, &ModelElement::TestCase(test), reporter);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordTableValidator<'v> {
    validators: &'v VersionDependentValidators,
}

impl<'v> KeywordTableValidator<'v> {
    pub fn new(validators: &'v VersionDependentValidators) -> Self {
        Self { validators }
    }

    pub fn validate(&self, context: &ValidationContext<'_>, reporter: &mut dyn ProblemReporter) {
        let keywords = &context.model.keywords;
        let counts = occurrences(keywords.iter().map(|k| k.name.normalized()));
        for keyword in keywords {
            if counts.get(&keyword.name.normalized()).is_some_and(|n| *n > 1) {
                let problem = Problem::caused_by(ProblemKind::DuplicatedKeyword)
                    .format_with(&[keyword.name.text.trim()])
                    .with_attribute("name", keyword.name.text.trim());
                reporter.report(problem, context.file, &keyword.name);
            }
            if keyword.rows.iter().all(|r| r.is_empty()) {
                report(reporter, context, ProblemKind::EmptyKeyword, &keyword.name);
            }
            let test_only = keyword.settings.iter().filter(|s| {
                matches!(
                    s.kind,
                    LocalSettingKind::Unknown
                        | LocalSettingKind::Template
                        | LocalSettingKind::Precondition
                        | LocalSettingKind::Postcondition
                )
            });
            for setting in test_only {
                report(reporter, context, ProblemKind::UnknownKeywordSetting, &setting.declaration);
            }
            self.validators.validate(context, &ModelElement::Keyword(keyword), reporter);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VariablesTableValidator<'v> {
    validators: &'v VersionDependentValidators,
}

/// Robot ignores case, spaces and underscores in variable names.
fn variable_key(name: &str) -> String {
    normalize(name).replace('_', "")
}

impl<'v> VariablesTableValidator<'v> {
    pub fn new(validators: &'v VersionDependentValidators) -> Self {
        Self { validators }
    }

    pub fn validate(&self, context: &ValidationContext<'_>, reporter: &mut dyn ProblemReporter) {
        let mut seen = fast_hash_set_new();
        for variable in &context.model.variables {
            let Some(name) = variable.name.as_deref().filter(|_| variable.kind.is_some()) else {
                report(reporter, context, ProblemKind::InvalidVariableName, &variable.declaration);
                continue;
            };
            // The first declaration wins; later ones are shadowed.
            if !seen.insert(variable_key(name)) {
                report(reporter, context, ProblemKind::DuplicatedVariable, &variable.declaration);
            }
            self.validators.validate(context, &ModelElement::Variable(variable), reporter);
        }
    }
}

/// Runs every table validator over one file.
#[derive(Debug, Default)]
pub struct FileValidator {
    validators: VersionDependentValidators,
}

impl FileValidator {
    pub fn new(validators: VersionDependentValidators) -> Self {
        Self { validators }
    }

    pub fn validate(&self, context: &ValidationContext<'_>, reporter: &mut dyn ProblemReporter) {
        GeneralSettingsTableValidator::new(&self.validators).validate(context, reporter);
        VariablesTableValidator::new(&self.validators).validate(context, reporter);
        TestCaseTableValidator::new(&self.validators).validate(context, reporter);
        KeywordTableValidator::new(&self.validators).validate(context, reporter);
    }
}
