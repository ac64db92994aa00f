//! Validation rules scoped to a range of Robot Framework versions.

use anyhow::{Result, bail};

use super::ValidationContext;
use super::problem::{Problem, ProblemKind};
use super::reporter::ProblemReporter;
use crate::model::{
    LocalSetting, LocalSettingKind, SectionKind, SettingKind, SettingRow, SuiteModel, TestCase, Token,
    UserKeyword, VariableDeclaration, VariableKind,
};
use crate::version::{RobotVersion, VersionRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    GeneralSettings,
    TestCase,
    Keyword,
    Variable,
}

/// The model element a rule looks at.
#[derive(Debug, Clone, Copy)]
pub enum ModelElement<'a> {
    GeneralSettings(&'a SuiteModel),
    TestCase(&'a TestCase),
    Keyword(&'a UserKeyword),
    Variable(&'a VariableDeclaration),
}

impl ModelElement<'_> {
    pub fn kind(&self) -> ElementKind {
        match self {
            ModelElement::GeneralSettings(_) => ElementKind::GeneralSettings,
            ModelElement::TestCase(_) => ElementKind::TestCase,
            ModelElement::Keyword(_) => ElementKind::Keyword,
            ModelElement::Variable(_) => ElementKind::Variable,
        }
    }
}

/// A stateless check. Finding nothing is not an error; `Err` means the rule
/// itself could not run.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn element_kind(&self) -> ElementKind;

    fn applicable_versions(&self) -> VersionRange;

    fn is_applicable_for(&self, version: &RobotVersion) -> bool {
        self.applicable_versions().contains(version)
    }

    fn validate(
        &self,
        context: &ValidationContext<'_>,
        element: &ModelElement<'_>,
        reporter: &mut dyn ProblemReporter,
    ) -> Result<()>;
}

const RF_2_9: RobotVersion = RobotVersion::new(2, 9);
const RF_3_0: RobotVersion = RobotVersion::new(3, 0);

fn general_settings<'a>(rule: &str, element: &ModelElement<'a>) -> Result<&'a SuiteModel> {
    match element {
        ModelElement::GeneralSettings(model) => Ok(model),
        other => bail!("{rule} expects the settings table, got {:?}", other.kind()),
    }
}

/// `Document`, `Suite Precondition` and the other pre-3.0 setting names.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettingSynonymRule;

impl ValidationRule for SettingSynonymRule {
    fn name(&self) -> &'static str {
        "setting-synonym"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::GeneralSettings
    }

    fn applicable_versions(&self) -> VersionRange {
        VersionRange::from(RF_3_0)
    }

    fn validate(&self, context: &ValidationContext<'_>, element: &ModelElement<'_>, reporter: &mut dyn ProblemReporter) -> Result<()> {
        let model = general_settings(self.name(), element)?;
        for row in &model.settings {
            if let Some((kind, replacement)) = ProblemKind::synonym_of(row.kind) {
                let problem = Problem::caused_by(kind)
                    .format_with(&[row.declaration.text.as_str()])
                    .with_fix(replacement.name());
                reporter.report(problem, context.file, &row.declaration);
            }
        }
        Ok(())
    }
}

/// `*** Metadata ***` used as the settings table header.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataHeaderAliasRule;

impl ValidationRule for MetadataHeaderAliasRule {
    fn name(&self) -> &'static str {
        "metadata-header-alias"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::GeneralSettings
    }

    fn applicable_versions(&self) -> VersionRange {
        VersionRange::from(RF_3_0)
    }

    fn validate(&self, context: &ValidationContext<'_>, element: &ModelElement<'_>, reporter: &mut dyn ProblemReporter) -> Result<()> {
        let model = general_settings(self.name(), element)?;
        let aliased = model
            .sections
            .iter()
            .filter(|s| s.kind == SectionKind::Settings && s.header.normalized().contains("metadata"));
        for section in aliased {
            let problem = Problem::caused_by(ProblemKind::MetadataTableHeaderSynonym)
                .format_with(&[section.header.text.as_str()])
                .with_fix(SectionKind::Settings.header().unwrap_or("*** Settings ***"));
            reporter.report(problem, context.file, &section.header);
        }
        Ok(())
    }
}

/// `with name` in any casing other than `WITH NAME`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryAliasCaseRule;

impl ValidationRule for LibraryAliasCaseRule {
    fn name(&self) -> &'static str {
        "library-alias-case"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::GeneralSettings
    }

    fn applicable_versions(&self) -> VersionRange {
        VersionRange::from(RF_3_0)
    }

    fn validate(&self, context: &ValidationContext<'_>, element: &ModelElement<'_>, reporter: &mut dyn ProblemReporter) -> Result<()> {
        let model = general_settings(self.name(), element)?;
        for with_name in model.imports.iter().filter_map(|i| i.with_name.as_ref()) {
            if with_name.text.trim() != "WITH NAME" {
                let problem = Problem::caused_by(ProblemKind::LibraryWithNameNotUpperCase)
                    .format_with(&[with_name.text.trim()])
                    .with_fix("WITH NAME");
                reporter.report(problem, context.file, with_name);
            }
        }
        Ok(())
    }
}

/// Settings that may appear once in a settings table.
const SINGLE_SETTINGS: &[SettingKind] = &[
    SettingKind::Documentation,
    SettingKind::SuiteSetup,
    SettingKind::SuiteTeardown,
    SettingKind::TestSetup,
    SettingKind::TestTeardown,
    SettingKind::TestTemplate,
    SettingKind::TestTimeout,
    SettingKind::ForceTags,
    SettingKind::DefaultTags,
];

fn duplicated_groups(model: &SuiteModel) -> impl Iterator<Item = (SettingKind, Vec<&SettingRow>)> {
    SINGLE_SETTINGS.iter().filter_map(|kind| {
        let rows: Vec<&SettingRow> = model.settings_of(*kind).collect();
        (rows.len() > 1).then_some((*kind, rows))
    })
}

fn values(args: &[Token]) -> Vec<&str> {
    args.iter().filter(|t| !t.is_empty()).map(|t| t.text.trim()).collect()
}

/// What Robot before 3.0 does with a repeated setting.
fn older_behaviour(kind: SettingKind, rows: &[&SettingRow]) -> String {
    let first = rows
        .iter()
        .find_map(|r| r.first_arg())
        .map(|t| t.text.trim())
        .unwrap_or("");
    let merged = || {
        let all: Vec<&str> = rows.iter().flat_map(|r| values(&r.args)).collect();
        format!("[{}]", all.join(", "))
    };
    match kind {
        SettingKind::SuiteSetup => format!("'{first}' keyword as suite setup"),
        SettingKind::SuiteTeardown => format!("'{first}' keyword as suite teardown"),
        SettingKind::TestSetup => format!("'{first}' keyword as test setup"),
        SettingKind::TestTeardown => format!("'{first}' keyword as test teardown"),
        SettingKind::TestTemplate => format!("'{first}' keyword as template"),
        SettingKind::TestTimeout => format!("'{first}' as test timeout"),
        SettingKind::ForceTags => format!("'{}' merged elements as force tags", merged()),
        SettingKind::DefaultTags => format!("'{}' merged elements as default tags", merged()),
        _ => "merged elements as documentation".to_string(),
    }
}

/// Every repeated single-valued setting after its first occurrence.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuplicatedSettingsRule;

impl ValidationRule for DuplicatedSettingsRule {
    fn name(&self) -> &'static str {
        "duplicated-settings"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::GeneralSettings
    }

    fn applicable_versions(&self) -> VersionRange {
        VersionRange::from(RF_3_0)
    }

    fn validate(&self, context: &ValidationContext<'_>, element: &ModelElement<'_>, reporter: &mut dyn ProblemReporter) -> Result<()> {
        let model = general_settings(self.name(), element)?;
        for (_, rows) in duplicated_groups(model) {
            for row in rows.iter().skip(1) {
                let problem = Problem::caused_by(ProblemKind::DuplicatedSetting).format_with(&[row.declaration.text.as_str()]);
                reporter.report(problem, context.file, &row.declaration);
            }
        }
        Ok(())
    }
}

/// Before 3.0 repeated settings were accepted, so every occurrence is
/// reported with what Robot actually uses.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuplicatedSettingsOlderRule;

impl ValidationRule for DuplicatedSettingsOlderRule {
    fn name(&self) -> &'static str {
        "duplicated-settings-older"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::GeneralSettings
    }

    fn applicable_versions(&self) -> VersionRange {
        VersionRange::before(RF_3_0)
    }

    fn validate(&self, context: &ValidationContext<'_>, element: &ModelElement<'_>, reporter: &mut dyn ProblemReporter) -> Result<()> {
        let model = general_settings(self.name(), element)?;
        for (kind, rows) in duplicated_groups(model) {
            let behaviour = older_behaviour(kind, &rows);
            for row in &rows {
                let problem = Problem::caused_by(ProblemKind::DuplicatedSettingOlder)
                    .format_with(&[row.declaration.text.as_str(), behaviour.as_str()]);
                reporter.report(problem, context.file, &row.declaration);
            }
        }
        Ok(())
    }
}

/// `&{dict}` declarations need Robot 2.9.
#[derive(Debug, Default, Clone, Copy)]
pub struct DictionaryVariableRule;

impl ValidationRule for DictionaryVariableRule {
    fn name(&self) -> &'static str {
        "dictionary-variable"
    }

    fn element_kind(&self) -> ElementKind {
        ElementKind::Variable
    }

    fn applicable_versions(&self) -> VersionRange {
        VersionRange::before(RF_2_9)
    }

    fn validate(&self, context: &ValidationContext<'_>, element: &ModelElement<'_>, reporter: &mut dyn ProblemReporter) -> Result<()> {
        let ModelElement::Variable(variable) = element else {
            bail!("{} expects a variable, got {:?}", self.name(), element.kind());
        };
        if variable.kind == Some(VariableKind::Dictionary) {
            let problem = Problem::caused_by(ProblemKind::DictionaryVariableUnsupported)
                .format_with(&[variable.declaration.text.trim()]);
            reporter.report(problem, context.file, &variable.declaration);
        }
        Ok(())
    }
}

/// Repeated `[Documentation]`, `[Tags]`, `[Setup]` and the like inside one
/// test case or keyword.
#[derive(Debug, Clone, Copy)]
pub struct DuplicatedLocalSettingsRule {
    pub element: ElementKind,
    /// Older Robot versions: report every occurrence instead of all but the first.
    pub every_occurrence: bool,
}

impl DuplicatedLocalSettingsRule {
    fn describe(kind: LocalSettingKind, settings: &[&LocalSetting]) -> String {
        let first = settings
            .iter()
            .find_map(|s| s.first_arg())
            .map(|t| t.text.trim())
            .unwrap_or("");
        match kind {
            LocalSettingKind::Setup => format!("'{first}' keyword as setup"),
            LocalSettingKind::Teardown => format!("'{first}' keyword as teardown"),
            LocalSettingKind::Template => format!("'{first}' keyword as template"),
            LocalSettingKind::Timeout => format!("'{first}' as timeout"),
            LocalSettingKind::Tags => {
                let merged: Vec<&str> = settings.iter().flat_map(|s| values(&s.args)).collect();
                format!("'[{}]' merged elements as tags", merged.join(", "))
            }
            LocalSettingKind::Documentation => "merged elements as documentation".to_string(),
            _ => format!("'{first}' from the first occurrence"),
        }
    }
}

impl ValidationRule for DuplicatedLocalSettingsRule {
    fn name(&self) -> &'static str {
        "duplicated-local-settings"
    }

    fn element_kind(&self) -> ElementKind {
        self.element
    }

    fn applicable_versions(&self) -> VersionRange {
        if self.every_occurrence {
            VersionRange::before(RF_3_0)
        } else {
            VersionRange::from(RF_3_0)
        }
    }

    fn validate(&self, context: &ValidationContext<'_>, element: &ModelElement<'_>, reporter: &mut dyn ProblemReporter) -> Result<()> {
        let settings = match element {
            ModelElement::TestCase(test) => &test.settings,
            ModelElement::Keyword(keyword) => &keyword.settings,
            other => bail!("{} expects a test case or keyword, got {:?}", self.name(), other.kind()),
        };
        let mut seen: Vec<LocalSettingKind> = Vec::new();
        for setting in settings.iter().filter(|s| s.kind != LocalSettingKind::Unknown) {
            if seen.contains(&setting.kind) {
                continue;
            }
            seen.push(setting.kind);
            let same: Vec<&LocalSetting> = settings.iter().filter(|s| s.kind == setting.kind).collect();
            if same.len() < 2 {
                continue;
            }
            if self.every_occurrence {
                let behaviour = Self::describe(setting.kind, &same);
                for duplicate in &same {
                    let problem = Problem::caused_by(ProblemKind::DuplicatedSettingOlder)
                        .format_with(&[duplicate.declaration.text.as_str(), behaviour.as_str()]);
                    reporter.report(problem, context.file, &duplicate.declaration);
                }
            } else {
                for duplicate in same.iter().skip(1) {
                    let problem =
                        Problem::caused_by(ProblemKind::DuplicatedSetting).format_with(&[duplicate.declaration.text.as_str()]);
                    reporter.report(problem, context.file, &duplicate.declaration);
                }
            }
        }
        Ok(())
    }
}
