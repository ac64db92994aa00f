use serde::Serialize;

use super::normalize;

/// Settings table row kinds, including the synonyms older Robot versions accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKind {
    Library,
    Resource,
    Variables,
    Documentation,
    Metadata,
    SuiteSetup,
    SuiteTeardown,
    TestSetup,
    TestTeardown,
    TestTemplate,
    TestTimeout,
    ForceTags,
    DefaultTags,
    Document,
    SuitePrecondition,
    SuitePostcondition,
    TestPrecondition,
    TestPostcondition,
    Unknown,
}

impl SettingKind {
    pub fn from_declaration(text: &str) -> Self {
        match normalize(text.trim_end_matches(':')).as_str() {
            "library" => SettingKind::Library,
            "resource" => SettingKind::Resource,
            "variables" => SettingKind::Variables,
            "documentation" => SettingKind::Documentation,
            "metadata" => SettingKind::Metadata,
            "suitesetup" => SettingKind::SuiteSetup,
            "suiteteardown" => SettingKind::SuiteTeardown,
            "testsetup" | "tasksetup" => SettingKind::TestSetup,
            "testteardown" | "taskteardown" => SettingKind::TestTeardown,
            "testtemplate" | "tasktemplate" => SettingKind::TestTemplate,
            "testtimeout" | "tasktimeout" => SettingKind::TestTimeout,
            "forcetags" => SettingKind::ForceTags,
            "defaulttags" => SettingKind::DefaultTags,
            "document" => SettingKind::Document,
            "suiteprecondition" => SettingKind::SuitePrecondition,
            "suitepostcondition" => SettingKind::SuitePostcondition,
            "testprecondition" => SettingKind::TestPrecondition,
            "testpostcondition" => SettingKind::TestPostcondition,
            _ => SettingKind::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SettingKind::Library => "Library",
            SettingKind::Resource => "Resource",
            SettingKind::Variables => "Variables",
            SettingKind::Documentation => "Documentation",
            SettingKind::Metadata => "Metadata",
            SettingKind::SuiteSetup => "Suite Setup",
            SettingKind::SuiteTeardown => "Suite Teardown",
            SettingKind::TestSetup => "Test Setup",
            SettingKind::TestTeardown => "Test Teardown",
            SettingKind::TestTemplate => "Test Template",
            SettingKind::TestTimeout => "Test Timeout",
            SettingKind::ForceTags => "Force Tags",
            SettingKind::DefaultTags => "Default Tags",
            SettingKind::Document => "Document",
            SettingKind::SuitePrecondition => "Suite Precondition",
            SettingKind::SuitePostcondition => "Suite Postcondition",
            SettingKind::TestPrecondition => "Test Precondition",
            SettingKind::TestPostcondition => "Test Postcondition",
            SettingKind::Unknown => "",
        }
    }

    /// Settings whose first argument is a keyword call.
    pub fn takes_keyword(self) -> bool {
        matches!(
            self,
            SettingKind::SuiteSetup
                | SettingKind::SuiteTeardown
                | SettingKind::TestSetup
                | SettingKind::TestTeardown
                | SettingKind::TestTemplate
                | SettingKind::SuitePrecondition
                | SettingKind::SuitePostcondition
                | SettingKind::TestPrecondition
                | SettingKind::TestPostcondition
        )
    }

    pub fn is_import(self) -> bool {
        matches!(self, SettingKind::Library | SettingKind::Resource | SettingKind::Variables)
    }

    /// Settings that may appear in a file of the given kind, in proposal order.
    pub fn proposable(tests_allowed: bool) -> &'static [SettingKind] {
        const SUITE: &[SettingKind] = &[
            SettingKind::Library,
            SettingKind::Resource,
            SettingKind::Variables,
            SettingKind::Documentation,
            SettingKind::Metadata,
            SettingKind::SuiteSetup,
            SettingKind::SuiteTeardown,
            SettingKind::TestSetup,
            SettingKind::TestTeardown,
            SettingKind::TestTemplate,
            SettingKind::TestTimeout,
            SettingKind::ForceTags,
            SettingKind::DefaultTags,
        ];
        const RESOURCE: &[SettingKind] = &[
            SettingKind::Library,
            SettingKind::Resource,
            SettingKind::Variables,
            SettingKind::Documentation,
        ];
        if tests_allowed { SUITE } else { RESOURCE }
    }
}

/// Bracketed settings inside a test case, task or keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LocalSettingKind {
    Documentation,
    Tags,
    Setup,
    Teardown,
    Template,
    Timeout,
    Arguments,
    Return,
    Precondition,
    Postcondition,
    Unknown,
}

impl LocalSettingKind {
    pub fn is_local_setting(text: &str) -> bool {
        let trimmed = text.trim();
        trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']')
    }

    pub fn from_declaration(text: &str) -> Self {
        let inner = text.trim().trim_start_matches('[').trim_end_matches(']');
        match normalize(inner).as_str() {
            "documentation" => LocalSettingKind::Documentation,
            "tags" => LocalSettingKind::Tags,
            "setup" => LocalSettingKind::Setup,
            "teardown" => LocalSettingKind::Teardown,
            "template" => LocalSettingKind::Template,
            "timeout" => LocalSettingKind::Timeout,
            "arguments" => LocalSettingKind::Arguments,
            "return" => LocalSettingKind::Return,
            "precondition" => LocalSettingKind::Precondition,
            "postcondition" => LocalSettingKind::Postcondition,
            _ => LocalSettingKind::Unknown,
        }
    }

    pub fn declaration(self) -> &'static str {
        match self {
            LocalSettingKind::Documentation => "[Documentation]",
            LocalSettingKind::Tags => "[Tags]",
            LocalSettingKind::Setup => "[Setup]",
            LocalSettingKind::Teardown => "[Teardown]",
            LocalSettingKind::Template => "[Template]",
            LocalSettingKind::Timeout => "[Timeout]",
            LocalSettingKind::Arguments => "[Arguments]",
            LocalSettingKind::Return => "[Return]",
            LocalSettingKind::Precondition => "[Precondition]",
            LocalSettingKind::Postcondition => "[Postcondition]",
            LocalSettingKind::Unknown => "",
        }
    }

    /// Settings accepted inside a test case or task.
    pub const TEST_CASE: [LocalSettingKind; 6] = [
        LocalSettingKind::Setup,
        LocalSettingKind::Documentation,
        LocalSettingKind::Template,
        LocalSettingKind::Tags,
        LocalSettingKind::Teardown,
        LocalSettingKind::Timeout,
    ];

    /// Settings accepted inside a user keyword.
    pub const KEYWORD: [LocalSettingKind; 6] = [
        LocalSettingKind::Arguments,
        LocalSettingKind::Documentation,
        LocalSettingKind::Return,
        LocalSettingKind::Tags,
        LocalSettingKind::Teardown,
        LocalSettingKind::Timeout,
    ];

    /// Settings whose next cell may hold `NONE`.
    pub fn accepts_none(self) -> bool {
        matches!(
            self,
            LocalSettingKind::Setup | LocalSettingKind::Teardown | LocalSettingKind::Template | LocalSettingKind::Timeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_recognition_ignores_spacing_and_case() {
        assert_eq!(SettingKind::from_declaration("Force Tags"), SettingKind::ForceTags);
        assert_eq!(SettingKind::from_declaration("ForceTags"), SettingKind::ForceTags);
        assert_eq!(SettingKind::from_declaration("suite  SETUP"), SettingKind::SuiteSetup);
        assert_eq!(SettingKind::from_declaration("Library:"), SettingKind::Library);
        assert_eq!(SettingKind::from_declaration("Task Setup"), SettingKind::TestSetup);
        assert_eq!(SettingKind::from_declaration("Document"), SettingKind::Document);
        assert_eq!(SettingKind::from_declaration("Something"), SettingKind::Unknown);
    }

    #[test]
    fn test_local_setting_recognition() {
        assert!(LocalSettingKind::is_local_setting("[Tags]"));
        assert!(!LocalSettingKind::is_local_setting("Tags"));
        assert_eq!(LocalSettingKind::from_declaration("[ Documentation ]"), LocalSettingKind::Documentation);
        assert_eq!(LocalSettingKind::from_declaration("[Precondition]"), LocalSettingKind::Precondition);
        assert_eq!(LocalSettingKind::from_declaration("[Whatever]"), LocalSettingKind::Unknown);
    }
}
