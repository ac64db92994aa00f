use std::fmt;

use serde::{Deserialize, Serialize};

use super::normalize;

/// Table a line belongs to. Also used as the content type of an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Settings,
    Variables,
    TestCases,
    Tasks,
    Keywords,
    Comments,
    /// Before the first header
    #[default]
    None,
}

impl SectionKind {
    pub const ALL_TABLES: [SectionKind; 6] = [
        SectionKind::Settings,
        SectionKind::Variables,
        SectionKind::TestCases,
        SectionKind::Tasks,
        SectionKind::Keywords,
        SectionKind::Comments,
    ];

    /// Recognizes a header from the first cell of a line.
    pub fn from_header(cell: &str) -> Option<SectionKind> {
        if !cell.starts_with('*') {
            return None;
        }
        let name = normalize(cell.trim_matches(|c: char| c == '*' || c.is_whitespace()));
        match name.as_str() {
            "setting" | "settings" | "metadata" => Some(SectionKind::Settings),
            "variable" | "variables" => Some(SectionKind::Variables),
            "testcase" | "testcases" => Some(SectionKind::TestCases),
            "task" | "tasks" => Some(SectionKind::Tasks),
            "keyword" | "keywords" | "userkeyword" | "userkeywords" => Some(SectionKind::Keywords),
            "comment" | "comments" => Some(SectionKind::Comments),
            _ => None,
        }
    }

    /// Canonical header line for the table.
    pub fn header(self) -> Option<&'static str> {
        match self {
            SectionKind::Settings => Some("*** Settings ***"),
            SectionKind::Variables => Some("*** Variables ***"),
            SectionKind::TestCases => Some("*** Test Cases ***"),
            SectionKind::Tasks => Some("*** Tasks ***"),
            SectionKind::Keywords => Some("*** Keywords ***"),
            SectionKind::Comments => Some("*** Comments ***"),
            SectionKind::None => None,
        }
    }

    /// Tables whose rows are keyword calls.
    pub fn is_executable(self) -> bool {
        matches!(self, SectionKind::TestCases | SectionKind::Tasks | SectionKind::Keywords)
    }

    pub fn is_test_like(self) -> bool {
        matches!(self, SectionKind::TestCases | SectionKind::Tasks)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionKind::Settings => "Settings",
            SectionKind::Variables => "Variables",
            SectionKind::TestCases => "Test Cases",
            SectionKind::Tasks => "Tasks",
            SectionKind::Keywords => "Keywords",
            SectionKind::Comments => "Comments",
            SectionKind::None => "none",
        };
        f.write_str(name)
    }
}

/// What kind of file a suite document is, which restricts the tables it may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    Suite,
    Resource,
    Init,
}

impl FileKind {
    /// `__init__` files are init files, `.resource` files are resources, any
    /// other file is a suite only when it actually holds tests or tasks.
    pub fn detect(path: &str, has_tests: bool) -> Self {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path).to_ascii_lowercase();
        if file_name.starts_with("__init__.") {
            FileKind::Init
        } else if file_name.ends_with(".resource") {
            FileKind::Resource
        } else if has_tests {
            FileKind::Suite
        } else {
            FileKind::Resource
        }
    }

    pub fn allows_tests(self) -> bool {
        matches!(self, FileKind::Suite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_recognition() {
        assert_eq!(SectionKind::from_header("*** Settings ***"), Some(SectionKind::Settings));
        assert_eq!(SectionKind::from_header("*Setting"), Some(SectionKind::Settings));
        assert_eq!(SectionKind::from_header("*** Test Cases ***"), Some(SectionKind::TestCases));
        assert_eq!(SectionKind::from_header("***TestCase***"), Some(SectionKind::TestCases));
        assert_eq!(SectionKind::from_header("*** User Keywords ***"), Some(SectionKind::Keywords));
        assert_eq!(SectionKind::from_header("*** Metadata ***"), Some(SectionKind::Settings));
        assert_eq!(SectionKind::from_header("*** Unknown ***"), None);
        assert_eq!(SectionKind::from_header("Settings"), None);
    }

    #[test]
    fn test_file_kind_detection() {
        assert_eq!(FileKind::detect("dir/__init__.robot", false), FileKind::Init);
        assert_eq!(FileKind::detect("common.resource", true), FileKind::Resource);
        assert_eq!(FileKind::detect("suite.robot", true), FileKind::Suite);
        assert_eq!(FileKind::detect("keywords.robot", false), FileKind::Resource);
    }
}
