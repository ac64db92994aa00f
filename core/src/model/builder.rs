use crate::text::{FileFormat, LineIndex, split_line};

use super::{
    ExecutableRow, FileKind, Import, ImportKind, LocalSetting, LocalSettingKind, Section, SectionKind, SettingKind,
    SettingRow, SuiteModel, TestCase, Token, UserKeyword, VariableDeclaration, normalize, variable,
};

const CONTINUATION: &str = "...";

/// Row most recently added, so `...` lines can extend it.
enum LastRow {
    None,
    Setting,
    Variable,
    Local,
    Executable,
}

enum Definition {
    Test(TestCase),
    Keyword(UserKeyword),
}

struct Builder {
    model: SuiteModel,
    current: SectionKind,
    /// False under an unrecognized header: rows there are not part of any table.
    in_table: bool,
    definition: Option<Definition>,
    last_row: LastRow,
}

pub(super) fn build(path: &str, text: &str, lines: &LineIndex, format: FileFormat) -> SuiteModel {
    let mut builder = Builder {
        model: SuiteModel::default(),
        current: SectionKind::None,
        in_table: false,
        definition: None,
        last_row: LastRow::None,
    };

    for (line_no, range) in lines.iter().enumerate() {
        let line = &text[range.clone()];
        builder.line(line_no, range.start, line, format);
    }
    builder.finish_definition();
    if let Some(section) = builder.model.sections.last_mut() {
        section.lines.end = lines.len();
    }

    let has_tests = !builder.model.test_cases.is_empty()
        || builder.model.has_section(SectionKind::TestCases)
        || builder.model.has_section(SectionKind::Tasks);
    builder.model.file_kind = Some(FileKind::detect(path, has_tests));
    builder.model.imports = builder.model.settings.iter().filter_map(import_of).collect();
    builder.model
}

impl Builder {
    fn line(&mut self, line_no: usize, line_start: usize, line: &str, format: FileFormat) {
        let cells = split_line(line, format);
        let mut tokens: Vec<Token> = (0..cells.model_len())
            .map(|i| {
                let range = &cells.cells[i];
                Token::new(&line[range.clone()], line_start + range.start, line_no, range.start)
            })
            .collect();

        let comment_at = tokens.iter().position(|t| t.text.starts_with('#'));
        let comment = comment_at.map(|i| {
            let column = tokens[i].column;
            Token::new(&line[column..], line_start + column, line_no, column)
        });
        if let Some(i) = comment_at {
            tokens.truncate(i);
        }

        if let Some(kind) = tokens.first().and_then(|t| SectionKind::from_header(&t.text)) {
            self.open_section(kind, line_no, line_start, line);
            self.model.line_sections.push(kind);
            return;
        }
        if tokens.first().is_some_and(|t| t.text.starts_with('*')) {
            self.finish_definition();
            self.in_table = false;
            self.model.line_sections.push(self.current);
            return;
        }
        self.model.line_sections.push(self.current);

        let starts_definition = self.current.is_executable() && tokens.first().is_some_and(|t| !t.is_empty());
        if !starts_definition {
            self.extend_definition(line_no);
        }

        if !self.in_table || tokens.iter().all(Token::is_empty) {
            if comment.is_some() && !tokens.is_empty() && tokens[0].is_empty() {
                self.executable(line_no, Vec::new(), comment);
            }
            return;
        }

        match self.current {
            SectionKind::Settings => self.setting(tokens),
            SectionKind::Variables => self.variable(tokens),
            SectionKind::TestCases | SectionKind::Tasks | SectionKind::Keywords => {
                self.definition_row(line_no, tokens, comment)
            }
            SectionKind::Comments | SectionKind::None => {}
        }
    }

    fn open_section(&mut self, kind: SectionKind, line_no: usize, line_start: usize, line: &str) {
        self.finish_definition();
        if let Some(previous) = self.model.sections.last_mut() {
            previous.lines.end = line_no;
        }
        let header_text = line.trim_end();
        self.model.sections.push(Section {
            kind,
            header: Token::new(header_text, line_start, line_no, 0),
            lines: line_no..line_no + 1,
        });
        self.current = kind;
        self.in_table = true;
        self.last_row = LastRow::None;
    }

    fn continuation(tokens: &[Token]) -> Option<Vec<Token>> {
        let first = tokens.iter().position(|t| !t.is_empty())?;
        if tokens[first].text.trim() == CONTINUATION {
            Some(tokens[first + 1..].to_vec())
        } else {
            None
        }
    }

    fn setting(&mut self, tokens: Vec<Token>) {
        if let Some(rest) = Self::continuation(&tokens) {
            if let (LastRow::Setting, Some(row)) = (&self.last_row, self.model.settings.last_mut()) {
                row.args.extend(rest);
            }
            return;
        }
        let mut iter = tokens.into_iter();
        let Some(declaration) = iter.next().filter(|t| !t.is_empty()) else {
            return;
        };
        self.model.settings.push(SettingRow {
            kind: SettingKind::from_declaration(&declaration.text),
            declaration,
            args: iter.collect(),
        });
        self.last_row = LastRow::Setting;
    }

    fn variable(&mut self, tokens: Vec<Token>) {
        if let Some(rest) = Self::continuation(&tokens) {
            if let (LastRow::Variable, Some(var)) = (&self.last_row, self.model.variables.last_mut()) {
                var.values.extend(rest);
            }
            return;
        }
        let mut iter = tokens.into_iter();
        let Some(declaration) = iter.next().filter(|t| !t.is_empty()) else {
            return;
        };
        let parsed = variable::parse_variable(&declaration.text);
        self.model.variables.push(VariableDeclaration {
            kind: parsed.map(|(kind, _)| kind),
            name: parsed.map(|(_, name)| name.to_string()),
            declaration,
            values: iter.collect(),
        });
        self.last_row = LastRow::Variable;
    }

    fn definition_row(&mut self, line_no: usize, tokens: Vec<Token>, comment: Option<Token>) {
        let mut iter = tokens.into_iter();
        let Some(first) = iter.next() else {
            return;
        };
        if !first.is_empty() {
            self.finish_definition();
            self.definition = Some(if self.current == SectionKind::Keywords {
                Definition::Keyword(UserKeyword {
                    name: first,
                    settings: Vec::new(),
                    rows: Vec::new(),
                    lines: line_no..line_no + 1,
                })
            } else {
                Definition::Test(TestCase {
                    name: first,
                    is_task: self.current == SectionKind::Tasks,
                    settings: Vec::new(),
                    rows: Vec::new(),
                    lines: line_no..line_no + 1,
                })
            });
            self.last_row = LastRow::None;
        }

        let content: Vec<Token> = iter.collect();
        if content.is_empty() {
            return;
        }
        if let Some(rest) = Self::continuation(&content) {
            self.extend_last(rest);
            return;
        }
        if LocalSettingKind::is_local_setting(&content[0].text) {
            let mut content = content.into_iter();
            if let Some(declaration) = content.next() {
                let setting = LocalSetting {
                    kind: LocalSettingKind::from_declaration(&declaration.text),
                    declaration,
                    args: content.collect(),
                };
                match &mut self.definition {
                    Some(Definition::Test(t)) => t.settings.push(setting),
                    Some(Definition::Keyword(k)) => k.settings.push(setting),
                    None => return,
                }
                self.last_row = LastRow::Local;
            }
            return;
        }
        self.executable(line_no, content, comment);
    }

    fn executable(&mut self, line_no: usize, cells: Vec<Token>, comment: Option<Token>) {
        let row = ExecutableRow {
            line: line_no,
            cells,
            comment,
        };
        match &mut self.definition {
            Some(Definition::Test(t)) => t.rows.push(row),
            Some(Definition::Keyword(k)) => k.rows.push(row),
            None => return,
        }
        self.last_row = LastRow::Executable;
    }

    fn extend_last(&mut self, rest: Vec<Token>) {
        let (settings, rows) = match &mut self.definition {
            Some(Definition::Test(t)) => (&mut t.settings, &mut t.rows),
            Some(Definition::Keyword(k)) => (&mut k.settings, &mut k.rows),
            None => return,
        };
        match self.last_row {
            LastRow::Local => {
                if let Some(setting) = settings.last_mut() {
                    setting.args.extend(rest);
                }
            }
            LastRow::Executable => {
                if let Some(row) = rows.last_mut() {
                    row.cells.extend(rest);
                }
            }
            _ => {}
        }
    }

    fn extend_definition(&mut self, line_no: usize) {
        match &mut self.definition {
            Some(Definition::Test(t)) => t.lines.end = line_no + 1,
            Some(Definition::Keyword(k)) => k.lines.end = line_no + 1,
            None => {}
        }
    }

    fn finish_definition(&mut self) {
        match self.definition.take() {
            Some(Definition::Test(t)) => self.model.test_cases.push(t),
            Some(Definition::Keyword(k)) => self.model.keywords.push(k),
            None => {}
        }
    }
}

fn import_of(row: &SettingRow) -> Option<Import> {
    let kind = match row.kind {
        SettingKind::Library => ImportKind::Library,
        SettingKind::Resource => ImportKind::Resource,
        SettingKind::Variables => ImportKind::Variables,
        _ => return None,
    };
    let mut args = row.args.iter().filter(|t| !t.is_empty()).cloned();
    let name = args.next();
    let rest: Vec<Token> = args.collect();

    if kind != ImportKind::Library {
        return Some(Import {
            kind,
            declaration: row.declaration.clone(),
            name,
            args: rest,
            with_name: None,
            alias: None,
        });
    }

    let with_name_at = rest.iter().position(|t| normalize(&t.text) == "withname");
    let (args, with_name, alias) = match with_name_at {
        Some(i) => (rest[..i].to_vec(), Some(rest[i].clone()), rest.get(i + 1).cloned()),
        None => (rest, None, None),
    };
    Some(Import {
        kind,
        declaration: row.declaration.clone(),
        name,
        args,
        with_name,
        alias,
    })
}
