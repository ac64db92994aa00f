use serde::Serialize;

use crate::model::SettingKind;
use crate::util::fast_map::{FastHashMap, fast_hash_map_new};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProblemKind {
    UnknownSetting,
    EmptySetting,
    MissingLibraryName,
    MissingResourceName,
    MissingVariablesName,
    DuplicatedSetting,
    DuplicatedSettingOlder,
    DocumentSynonym,
    SuitePreconditionSynonym,
    SuitePostconditionSynonym,
    TestPreconditionSynonym,
    TestPostconditionSynonym,
    MetadataTableHeaderSynonym,
    LibraryWithNameNotUpperCase,
    DictionaryVariableUnsupported,
    DuplicatedVariable,
    InvalidVariableName,
    DuplicatedTestCase,
    DuplicatedKeyword,
    EmptyTestCase,
    EmptyKeyword,
    UnknownTestCaseSetting,
    UnknownKeywordSetting,
    KeywordSettingInTestCase,
    ReturnInTestCase,
}

impl ProblemKind {
    pub fn severity(self) -> Severity {
        match self {
            ProblemKind::UnknownSetting
            | ProblemKind::MissingLibraryName
            | ProblemKind::MissingResourceName
            | ProblemKind::MissingVariablesName
            | ProblemKind::DictionaryVariableUnsupported
            | ProblemKind::InvalidVariableName
            | ProblemKind::DuplicatedTestCase
            | ProblemKind::DuplicatedKeyword
            | ProblemKind::EmptyTestCase
            | ProblemKind::UnknownTestCaseSetting
            | ProblemKind::UnknownKeywordSetting
            | ProblemKind::KeywordSettingInTestCase
            | ProblemKind::ReturnInTestCase => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// Message with `%s` slots, filled in order by [`Problem::format_with`].
    pub fn template(self) -> &'static str {
        match self {
            ProblemKind::UnknownSetting => "Unknown '%s' setting",
            ProblemKind::EmptySetting => "Empty setting '%s'",
            ProblemKind::MissingLibraryName => "Empty setting '%s'. Specify name or path of library to import",
            ProblemKind::MissingResourceName => "Empty setting '%s'. Specify path of resource file to import",
            ProblemKind::MissingVariablesName => "Empty setting '%s'. Specify path of variable file to import",
            ProblemKind::DuplicatedSetting => "The setting '%s' is duplicated",
            ProblemKind::DuplicatedSettingOlder => "Setting '%s' is duplicated. Robot will try to use %s",
            ProblemKind::DocumentSynonym => {
                "Setting '%s' is deprecated from Robot Framework 3.0. Use Documentation syntax instead of current."
            }
            ProblemKind::SuitePreconditionSynonym => {
                "Setting '%s' is deprecated from Robot Framework 3.0. Use Suite Setup syntax instead of current."
            }
            ProblemKind::SuitePostconditionSynonym => {
                "Setting '%s' is deprecated from Robot Framework 3.0. Use Suite Teardown syntax instead of current."
            }
            ProblemKind::TestPreconditionSynonym => {
                "Setting '%s' is deprecated from Robot Framework 3.0. Use Test Setup syntax instead of current."
            }
            ProblemKind::TestPostconditionSynonym => {
                "Setting '%s' is deprecated from Robot Framework 3.0. Use Test Teardown syntax instead of current."
            }
            ProblemKind::MetadataTableHeaderSynonym => {
                "Table header '%s' is deprecated from Robot Framework 3.0. Use *** Settings *** syntax instead of current."
            }
            ProblemKind::LibraryWithNameNotUpperCase => {
                "Setting '%s' not in upper case is deprecated from Robot Framework 3.0.\nUse WITH NAME instead."
            }
            ProblemKind::DictionaryVariableUnsupported => {
                "Dictionary variable '%s' is not supported by Robot Framework older than 2.9"
            }
            ProblemKind::DuplicatedVariable => "Variable '%s' is declared more than once",
            ProblemKind::InvalidVariableName => "Invalid variable definition '%s'. Use ${name}, @{name} or &{name}",
            ProblemKind::DuplicatedTestCase => "Duplicated test case definition '%s'",
            ProblemKind::DuplicatedKeyword => "Duplicated keyword definition '%s'",
            ProblemKind::EmptyTestCase => "Test case '%s' contains no keywords to execute",
            ProblemKind::EmptyKeyword => "Keyword '%s' contains no keywords to execute",
            ProblemKind::UnknownTestCaseSetting => "Unknown test case setting '%s'",
            ProblemKind::UnknownKeywordSetting => "Unknown keyword setting '%s'",
            ProblemKind::KeywordSettingInTestCase => "Keyword setting '%s' is not applicable in test cases",
            ProblemKind::ReturnInTestCase => "Setting '%s' returns values from keywords only and has no effect in test cases",
        }
    }

    /// Synonym replaced by the setting a newer Robot expects, if any.
    pub fn synonym_of(kind: SettingKind) -> Option<(ProblemKind, SettingKind)> {
        match kind {
            SettingKind::Document => Some((ProblemKind::DocumentSynonym, SettingKind::Documentation)),
            SettingKind::SuitePrecondition => Some((ProblemKind::SuitePreconditionSynonym, SettingKind::SuiteSetup)),
            SettingKind::SuitePostcondition => {
                Some((ProblemKind::SuitePostconditionSynonym, SettingKind::SuiteTeardown))
            }
            SettingKind::TestPrecondition => Some((ProblemKind::TestPreconditionSynonym, SettingKind::TestSetup)),
            SettingKind::TestPostcondition => Some((ProblemKind::TestPostconditionSynonym, SettingKind::TestTeardown)),
            _ => None,
        }
    }
}

/// A diagnostic before it is attached to a file and token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub kind: ProblemKind,
    pub message: String,
    /// Replacement texts for the reported token.
    pub fixes: Vec<String>,
    pub attributes: FastHashMap<&'static str, String>,
}

impl Problem {
    pub fn caused_by(kind: ProblemKind) -> Self {
        Self {
            kind,
            message: kind.template().to_string(),
            fixes: Vec::new(),
            attributes: fast_hash_map_new(),
        }
    }

    pub fn format_with(mut self, args: &[&str]) -> Self {
        let mut message = String::with_capacity(self.message.len());
        let mut rest = self.message.as_str();
        let mut args = args.iter();
        while let Some(at) = rest.find("%s") {
            message.push_str(&rest[..at]);
            message.push_str(args.next().copied().unwrap_or(""));
            rest = &rest[at + 2..];
        }
        message.push_str(rest);
        self.message = message;
        self
    }

    pub fn with_fix(mut self, replacement: impl Into<String>) -> Self {
        self.fixes.push(replacement.into());
        self
    }

    pub fn with_attribute(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_slots_filled_in_order() {
        let problem = Problem::caused_by(ProblemKind::DuplicatedSettingOlder)
            .format_with(&["Suite Setup", "'Prepare' keyword as suite setup"]);
        assert_eq!(
            problem.message,
            "Setting 'Suite Setup' is duplicated. Robot will try to use 'Prepare' keyword as suite setup"
        );
        let missing = Problem::caused_by(ProblemKind::UnknownSetting).format_with(&[]);
        assert_eq!(missing.message, "Unknown '' setting");
    }

    #[test]
    fn test_severity_and_synonyms() {
        assert_eq!(ProblemKind::UnknownSetting.severity(), Severity::Error);
        assert_eq!(ProblemKind::DuplicatedSetting.severity(), Severity::Warning);
        assert_eq!(
            ProblemKind::synonym_of(SettingKind::Document),
            Some((ProblemKind::DocumentSynonym, SettingKind::Documentation))
        );
        assert_eq!(ProblemKind::synonym_of(SettingKind::Library), None);
    }
}
