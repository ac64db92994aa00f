//! Minimal tokenized model of a suite file: tables, rows and cell tokens.
//!
//! Every token keeps its absolute offset so proposals and diagnostics can point
//! back into the source text. Cells come from [`crate::text::split_line`], the
//! same splitter the position locator uses.

use std::ops::Range;

use serde::Serialize;

mod builder;
mod document;
pub mod section;
pub mod setting;
pub mod variable;


pub use document::SuiteDocument;
pub use section::{FileKind, SectionKind};
pub use setting::{LocalSettingKind, SettingKind};
pub use variable::VariableKind;

/// Whitespace-free, lowercase form used for every setting and name comparison.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).flat_map(char::to_lowercase).collect()
}

/// A single cell of the source with its absolute position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, offset: usize, line: usize, column: usize) -> Self {
        Self {
            text: text.into(),
            offset,
            line,
            column,
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn normalized(&self) -> String {
        normalize(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub header: Token,
    /// Lines covered by the table, header included.
    pub lines: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingRow {
    pub kind: SettingKind,
    pub declaration: Token,
    pub args: Vec<Token>,
}

impl SettingRow {
    pub fn first_arg(&self) -> Option<&Token> {
        self.args.iter().find(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportKind {
    Library,
    Resource,
    Variables,
}

impl ImportKind {
    pub fn setting_name(self) -> &'static str {
        match self {
            ImportKind::Library => "Library",
            ImportKind::Resource => "Resource",
            ImportKind::Variables => "Variables",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub kind: ImportKind,
    pub declaration: Token,
    pub name: Option<Token>,
    pub args: Vec<Token>,
    pub with_name: Option<Token>,
    pub alias: Option<Token>,
}

impl Import {
    /// Name under which keywords of this import are qualified: the alias, the
    /// library name or the resource file name without extension.
    pub fn qualifier(&self) -> Option<String> {
        if let Some(alias) = self.alias.as_ref().filter(|a| !a.is_empty()) {
            return Some(alias.text.clone());
        }
        let name = self.name.as_ref()?;
        match self.kind {
            ImportKind::Library => Some(name.text.clone()),
            ImportKind::Resource | ImportKind::Variables => {
                let file = name.text.rsplit(['/', '\\']).next().unwrap_or(&name.text);
                Some(file.split('.').next().unwrap_or(file).to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDeclaration {
    pub declaration: Token,
    pub kind: Option<VariableKind>,
    pub name: Option<String>,
    pub values: Vec<Token>,
}

impl VariableDeclaration {
    /// Declared variable as it is referenced, e.g. `${name}`.
    pub fn reference(&self) -> Option<String> {
        Some(self.kind?.decorate(self.name.as_deref()?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalSetting {
    pub kind: LocalSettingKind,
    pub declaration: Token,
    pub args: Vec<Token>,
}

impl LocalSetting {
    pub fn first_arg(&self) -> Option<&Token> {
        self.args.iter().find(|t| !t.is_empty())
    }
}

/// A keyword call row inside a test case, task or keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutableRow {
    pub line: usize,
    /// Cells after the (empty) first column, comments excluded.
    pub cells: Vec<Token>,
    pub comment: Option<Token>,
}

impl ExecutableRow {
    /// Legacy `\` marker of an old-style loop body.
    pub fn loop_marker(&self) -> Option<&Token> {
        self.cells.first().filter(|t| t.text.trim() == "\\")
    }

    pub fn action_cells(&self) -> &[Token] {
        match self.loop_marker() {
            Some(_) => &self.cells[1..],
            None => &self.cells,
        }
    }

    pub fn assignments(&self) -> &[Token] {
        let cells = self.action_cells();
        let count = cells.iter().take_while(|t| variable::is_assignment(&t.text)).count();
        &cells[..count]
    }

    pub fn call(&self) -> Option<&Token> {
        let cells = self.action_cells();
        cells.get(self.assignments().len()).filter(|t| !t.is_empty())
    }

    pub fn is_for_header(&self) -> bool {
        self.action_cells().first().is_some_and(|t| is_for_marker(&t.text))
    }

    pub fn is_empty(&self) -> bool {
        self.action_cells().iter().all(Token::is_empty)
    }
}

/// `FOR` or the legacy `:FOR` (any case, spaces allowed).
pub fn is_for_marker(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed == "FOR" || normalize(trimmed) == ":for"
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub name: Token,
    pub is_task: bool,
    pub settings: Vec<LocalSetting>,
    pub rows: Vec<ExecutableRow>,
    pub lines: Range<usize>,
}

impl TestCase {
    pub fn settings_of(&self, kind: LocalSettingKind) -> impl Iterator<Item = &LocalSetting> {
        self.settings.iter().filter(move |s| s.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserKeyword {
    pub name: Token,
    pub settings: Vec<LocalSetting>,
    pub rows: Vec<ExecutableRow>,
    pub lines: Range<usize>,
}

impl UserKeyword {
    pub fn settings_of(&self, kind: LocalSettingKind) -> impl Iterator<Item = &LocalSetting> {
        self.settings.iter().filter(move |s| s.kind == kind)
    }

    /// Argument cells of every `[Arguments]` setting, defaults included.
    pub fn arguments(&self) -> Vec<&Token> {
        self.settings_of(LocalSettingKind::Arguments)
            .flat_map(|s| s.args.iter())
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn has_embedded_arguments(&self) -> bool {
        self.name.text.contains("${")
    }
}

/// Parsed suite, resource or init file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SuiteModel {
    pub file_kind: Option<FileKind>,
    pub sections: Vec<Section>,
    pub settings: Vec<SettingRow>,
    pub imports: Vec<Import>,
    pub variables: Vec<VariableDeclaration>,
    pub test_cases: Vec<TestCase>,
    pub keywords: Vec<UserKeyword>,
    /// Content type of every line; header lines belong to the table they open.
    pub line_sections: Vec<SectionKind>,
}

impl SuiteModel {
    pub fn kind(&self) -> FileKind {
        self.file_kind.unwrap_or(FileKind::Suite)
    }

    pub fn section_at_line(&self, line: usize) -> SectionKind {
        self.line_sections.get(line).copied().unwrap_or_default()
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.sections.iter().any(|s| s.kind == kind)
    }

    pub fn settings_of(&self, kind: SettingKind) -> impl Iterator<Item = &SettingRow> {
        self.settings.iter().filter(move |s| s.kind == kind)
    }

    pub fn test_case_at_line(&self, line: usize) -> Option<&TestCase> {
        self.test_cases.iter().find(|t| t.lines.contains(&line))
    }

    pub fn keyword_at_line(&self, line: usize) -> Option<&UserKeyword> {
        self.keywords.iter().find(|k| k.lines.contains(&line))
    }

    /// Template keyword in effect for a test: its own `[Template]` wins over the
    /// suite-level `Test Template`, and `NONE` switches templating off.
    pub fn template_of<'a>(&'a self, test: &'a TestCase) -> Option<&'a Token> {
        let template = match test.settings_of(LocalSettingKind::Template).next() {
            Some(local) => local.first_arg(),
            None => self.settings_of(SettingKind::TestTemplate).next().and_then(|s| s.first_arg()),
        }?;
        if template.text.trim().eq_ignore_ascii_case("none") {
            None
        } else {
            Some(template)
        }
    }
}
