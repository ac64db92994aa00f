use anyhow::bail;

use super::*;
use crate::model::SuiteDocument;
use crate::version::{RobotVersion, VersionRange};

fn problems(lines: &[&str], version: RobotVersion) -> Vec<ReportedProblem> {
    validate_document(&SuiteDocument::from_lines("suite.robot", lines), version)
}

fn kinds(problems: &[ReportedProblem]) -> Vec<ProblemKind> {
    problems.iter().map(|p| p.kind).collect()
}

const RF_2_8: RobotVersion = RobotVersion::new(2, 8);
const RF_2_9: RobotVersion = RobotVersion::new(2, 9);
const RF_3_1: RobotVersion = RobotVersion::new(3, 1);

const TWO_DOCS: &[&str] = &[
    "*** Settings ***",
    "Documentation  first",
    "Documentation  second",
    "*** Test Cases ***",
    "case",
    "  Log  1",
];

#[test]
fn test_duplicated_setting_reports_second_entry_only() {
    let found = problems(TWO_DOCS, RF_3_1);
    assert_eq!(kinds(&found), vec![ProblemKind::DuplicatedSetting]);
    assert_eq!(found[0].token.line, 2, "reported on the second declaration");
    assert_eq!(found[0].message, "The setting 'Documentation' is duplicated");
}

#[test]
fn test_duplicated_setting_older_reports_every_entry() {
    let found = problems(TWO_DOCS, RF_2_9);
    assert_eq!(kinds(&found), vec![ProblemKind::DuplicatedSettingOlder; 2]);
    assert_eq!(found.iter().map(|p| p.token.line).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(
        found[0].message,
        "Setting 'Documentation' is duplicated. Robot will try to use merged elements as documentation"
    );
}

#[test]
fn test_older_message_names_first_keyword() {
    let lines = [
        "*** Settings ***",
        "Suite Setup  Prepare",
        "Suite Setup  Other",
        "Force Tags  a  b",
        "Force Tags  c",
    ];
    let found = problems(&lines, RF_2_8);
    assert!(found.iter().any(|p| p.message.ends_with("'Prepare' keyword as suite setup")), "{found:?}");
    assert!(found.iter().any(|p| p.message.ends_with("'[a, b, c]' merged elements as force tags")), "{found:?}");
}

#[test]
fn test_rules_selected_by_version_range() {
    let validators = VersionDependentValidators::default();
    let names = |version: RobotVersion| -> Vec<&str> {
        validators
            .rules_for(ElementKind::GeneralSettings, &version)
            .map(|r| r.name())
            .collect()
    };
    assert!(names(RF_3_1).contains(&"duplicated-settings"));
    assert!(!names(RF_3_1).contains(&"duplicated-settings-older"));
    assert!(names(RF_2_9).contains(&"duplicated-settings-older"));
    assert!(!names(RF_2_9).contains(&"setting-synonym"));

    let dictionaries = |version: RobotVersion| validators.rules_for(ElementKind::Variable, &version).count();
    assert_eq!(dictionaries(RF_2_8), 1);
    assert_eq!(dictionaries(RF_2_9), 0);
}

#[test]
fn test_range_between_versions() {
    struct Scoped;
    impl ValidationRule for Scoped {
        fn name(&self) -> &'static str {
            "scoped"
        }
        fn element_kind(&self) -> ElementKind {
            ElementKind::GeneralSettings
        }
        fn applicable_versions(&self) -> VersionRange {
            VersionRange::between(RobotVersion::new(3, 0), RobotVersion::new(3, 1))
        }
        fn validate(&self, _: &ValidationContext<'_>, _: &ModelElement<'_>, _: &mut dyn ProblemReporter) -> anyhow::Result<()> {
            Ok(())
        }
    }
    assert!(Scoped.is_applicable_for(&RobotVersion::with_patch(3, 0, 5)));
    assert!(!Scoped.is_applicable_for(&RobotVersion::with_patch(3, 1, 0)));
    assert!(!Scoped.is_applicable_for(&RobotVersion::with_patch(2, 9, 9)));
}

#[test]
fn test_failing_rule_does_not_block_others() {
    struct Broken;
    impl ValidationRule for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn element_kind(&self) -> ElementKind {
            ElementKind::GeneralSettings
        }
        fn applicable_versions(&self) -> VersionRange {
            VersionRange::all()
        }
        fn validate(&self, _: &ValidationContext<'_>, _: &ModelElement<'_>, _: &mut dyn ProblemReporter) -> anyhow::Result<()> {
            bail!("index unavailable")
        }
    }

    let validators = VersionDependentValidators::new(vec![
        Box::new(Broken),
        Box::new(rules::DuplicatedSettingsRule),
    ]);
    let document = SuiteDocument::from_lines("suite.robot", TWO_DOCS);
    let context = ValidationContext::new(&document, RF_3_1);
    let mut reporter = CollectingReporter::new();
    let completed = validators.validate(&context, &ModelElement::GeneralSettings(&document.model), &mut reporter);
    assert_eq!(completed, 1);
    assert_eq!(reporter.of_kind(ProblemKind::DuplicatedSetting).count(), 1);
}

#[test]
fn test_rule_rejects_wrong_element() {
    let document = SuiteDocument::from_lines("suite.robot", &["*** Variables ***", "${a}  1"]);
    let context = ValidationContext::new(&document, RF_3_1);
    let mut reporter = CollectingReporter::new();
    let result = rules::DuplicatedSettingsRule.validate(
        &context,
        &ModelElement::Variable(&document.model.variables[0]),
        &mut reporter,
    );
    assert!(result.is_err());
}

#[test]
fn test_deprecated_syntax_from_3_0() {
    let lines = [
        "*** Metadata ***",
        "Document  text",
        "Suite Precondition  Prepare",
        "Library  Collections  with name  C",
        "*** Test Cases ***",
        "case",
        "  Log  1",
    ];
    let found = problems(&lines, RF_3_1);
    assert_eq!(
        kinds(&found),
        vec![
            ProblemKind::DocumentSynonym,
            ProblemKind::SuitePreconditionSynonym,
            ProblemKind::MetadataTableHeaderSynonym,
            ProblemKind::LibraryWithNameNotUpperCase,
        ]
    );
    assert_eq!(found[0].fixes, vec!["Documentation"]);
    assert_eq!(found[1].fixes, vec!["Suite Setup"]);
    assert_eq!(found[2].fixes, vec!["*** Settings ***"]);
    assert_eq!(found[3].fixes, vec!["WITH NAME"]);
    assert!(problems(&lines, RF_2_9).is_empty(), "accepted by older versions");
}

#[test]
fn test_general_settings_checks() {
    let lines = [
        "*** Settings ***",
        "Library",
        "Resource  ",
        "Variables",
        "Suite Setup",
        "Test Timeout",
        "Test Timeout  1 min",
        "Bogus  value",
    ];
    let found = problems(&lines, RF_3_1);
    let found_kinds = kinds(&found);
    for expected in [
        ProblemKind::UnknownSetting,
        ProblemKind::MissingLibraryName,
        ProblemKind::MissingResourceName,
        ProblemKind::MissingVariablesName,
        ProblemKind::EmptySetting,
    ] {
        assert!(found_kinds.contains(&expected), "missing {expected:?}: {found_kinds:?}");
    }
    let empty: Vec<_> = found.iter().filter(|p| p.kind == ProblemKind::EmptySetting).collect();
    assert_eq!(empty.len(), 1, "timeout has a value in its second row");
    assert_eq!(empty[0].message, "Empty setting 'Suite Setup'");
    assert!(found.iter().any(|p| p.message == "Unknown 'Bogus' setting"));
}

#[test]
fn test_test_case_and_keyword_tables() {
    let lines = [
        "*** Test Cases ***",
        "case",
        "  [Arguments]  ${a}",
        "  [Return]  x",
        "  [Whatever]  x",
        "  Log  1",
        "Case",
        "  [Documentation]  empty",
        "*** Keywords ***",
        "kw",
        "  [Template]  Log",
        "  [Tags]  a",
        "  [Tags]  b",
        "  No Operation",
        "kw",
        "  No Operation",
        "empty",
    ];
    let found = problems(&lines, RF_3_1);
    let count = |kind: ProblemKind| found.iter().filter(|p| p.kind == kind).count();
    assert_eq!(count(ProblemKind::KeywordSettingInTestCase), 1);
    assert_eq!(count(ProblemKind::ReturnInTestCase), 1);
    assert_eq!(count(ProblemKind::UnknownTestCaseSetting), 1);
    assert_eq!(count(ProblemKind::DuplicatedTestCase), 2, "names compare case-insensitively");
    assert_eq!(count(ProblemKind::EmptyTestCase), 1);
    assert_eq!(count(ProblemKind::UnknownKeywordSetting), 1);
    assert_eq!(count(ProblemKind::DuplicatedKeyword), 2);
    assert_eq!(count(ProblemKind::EmptyKeyword), 1);
    assert_eq!(count(ProblemKind::DuplicatedSetting), 1, "second [Tags]");

    let older = problems(&lines, RF_2_9);
    let tags: Vec<_> = older.iter().filter(|p| p.kind == ProblemKind::DuplicatedSettingOlder).collect();
    assert_eq!(tags.len(), 2);
    assert!(tags[0].message.ends_with("'[a, b]' merged elements as tags"), "{}", tags[0].message);
}

#[test]
fn test_variables_table() {
    let lines = [
        "*** Variables ***",
        "${name}  1",
        "${NA ME}  2",
        "&{dict}  a=1",
        "plain  3",
    ];
    let found = problems(&lines, RF_2_8);
    assert_eq!(
        kinds(&found),
        vec![
            ProblemKind::DuplicatedVariable,
            ProblemKind::DictionaryVariableUnsupported,
            ProblemKind::InvalidVariableName,
        ]
    );
    assert_eq!(found[0].token.line, 2);
    let current = problems(&lines, RF_3_1);
    assert!(!kinds(&current).contains(&ProblemKind::DictionaryVariableUnsupported));
}
