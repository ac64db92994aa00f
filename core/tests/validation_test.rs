use rfx_core::model::SuiteDocument;
use rfx_core::validation::*;
use rfx_core::version::{RobotVersion, VersionRange};

fn validate(lines: &[&str], version: &str) -> Vec<ReportedProblem> {
    let version = RobotVersion::parse(version).expect("valid version");
    validate_document(&SuiteDocument::from_lines("suite.robot", lines), version)
}

#[test]
fn test_version_range_bounds() {
    let range = VersionRange::between(RobotVersion::new(3, 0), RobotVersion::new(3, 1));
    assert!(range.contains(&RobotVersion::with_patch(3, 0, 5)));
    assert!(!range.contains(&RobotVersion::with_patch(3, 1, 0)));
    assert!(!range.contains(&RobotVersion::with_patch(2, 9, 9)));
    assert!(VersionRange::all().contains(&RobotVersion::new(7, 0)));
}

#[test]
fn test_duplicated_documentation_depends_on_version() {
    let lines = ["*** Settings ***", "Documentation  first", "Documentation  second"];

    let current = validate(&lines, "3.1");
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].kind, ProblemKind::DuplicatedSetting);
    assert_eq!(current[0].token.line, 2);
    assert!(!current[0].is_error());

    let older = validate(&lines, "2.9");
    assert_eq!(older.len(), 2, "older versions report both declarations");
    assert!(older.iter().all(|p| p.kind == ProblemKind::DuplicatedSettingOlder));
}

#[test]
fn test_clean_suite_has_no_problems() {
    let lines = [
        "*** Settings ***",
        "Library    Collections    WITH NAME    C",
        "Suite Setup    Log    start",
        "*** Variables ***",
        "${user}    admin",
        "*** Test Cases ***",
        "Login",
        "    [Tags]    smoke",
        "    Log    ${user}",
        "*** Keywords ***",
        "Open",
        "    [Arguments]    ${page}",
        "    Log    ${page}",
    ];
    let found = validate(&lines, "7.0");
    assert!(found.is_empty(), "{found:?}");
}

#[test]
fn test_problems_serialize_for_clients() {
    let found = validate(&["*** Settings ***", "Bogus  x"], "3.1");
    let json = serde_json::to_value(&found[0]).expect("serializable");
    assert_eq!(json["message"], "Unknown 'Bogus' setting");
    assert_eq!(json["token"]["line"], 1);
}
