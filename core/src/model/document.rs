use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::text::{FileFormat, LineIndex};

use super::{FileKind, SuiteModel, builder};

/// Source text of one open file together with its parsed model.
#[derive(Debug, Clone)]
pub struct SuiteDocument {
    pub path: String,
    pub text: String,
    pub format: FileFormat,
    pub lines: LineIndex,
    pub model: SuiteModel,
}

impl SuiteDocument {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();
        let format = FileFormat::from_path(&path);
        let lines = LineIndex::new(&text);
        let model = builder::build(&path, &text, &lines, format);
        Self {
            path,
            text,
            format,
            lines,
            model,
        }
    }

    /// Builds a document from lines joined with `\n`.
    pub fn from_lines(path: impl Into<String>, lines: &[&str]) -> Self {
        Self::new(path, lines.join("\n"))
    }

    pub fn kind(&self) -> FileKind {
        self.model.kind()
    }

    pub fn line_text(&self, line: usize) -> &str {
        self.lines.line_text(&self.text, line)
    }

    pub fn content_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.text.hash(&mut hasher);
        hasher.finish()
    }

    /// File name without directories.
    pub fn file_name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }
}
