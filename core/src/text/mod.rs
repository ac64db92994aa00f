//! Line and cell splitting shared by the document model and the position locator.
//!
//! Both sides must agree on where a cell starts and ends, so there is exactly one
//! splitter and everything else derives from it.

use std::ops::Range;

use serde::{Deserialize, Serialize};


/// Physical format of a suite file, which decides the separator convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Space or pipe separated (`.robot`, `.resource`, `.txt`)
    #[default]
    Robot,
    /// Tab separated (`.tsv`)
    Tsv,
}

impl FileFormat {
    pub fn from_path(path: &str) -> Self {
        if path.to_ascii_lowercase().ends_with(".tsv") {
            FileFormat::Tsv
        } else {
            FileFormat::Robot
        }
    }

    pub fn is_tsv(self) -> bool {
        matches!(self, FileFormat::Tsv)
    }
}

/// Cells of a single line, as column ranges relative to the line start.
///
/// `separators[i]` always lies between `cells[i]` and `cells[i + 1]`. Pipe
/// formatted lines additionally have a leading separator before the first cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineCells {
    pub cells: Vec<Range<usize>>,
    pub separators: Vec<Range<usize>>,
    pub leading: Option<Range<usize>>,
}

/// What sits under a column of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellLookup {
    Cell(usize),
    /// Strictly inside a separator; carries the index of the following cell.
    Separator(usize),
}

impl LineCells {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn text<'a>(&self, line: &'a str, index: usize) -> &'a str {
        match self.cells.get(index) {
            Some(range) => &line[range.clone()],
            None => "",
        }
    }

    /// Whether the line ends with a separator, i.e. the last cell is the implied
    /// empty cell after it.
    pub fn has_trailing_separator(&self) -> bool {
        match (self.separators.last(), self.cells.last()) {
            (Some(sep), Some(last)) => sep.end == last.start && last.is_empty(),
            _ => false,
        }
    }

    /// Number of cells the model sees: the implied empty cell after a trailing
    /// separator is not part of the row.
    pub fn model_len(&self) -> usize {
        if self.has_trailing_separator() {
            self.cells.len() - 1
        } else {
            self.cells.len()
        }
    }

    pub fn lookup(&self, column: usize) -> CellLookup {
        if let Some(lead) = &self.leading {
            if column < lead.end {
                return CellLookup::Separator(0);
            }
        }
        for (i, cell) in self.cells.iter().enumerate() {
            if column >= cell.start && column <= cell.end {
                return CellLookup::Cell(i);
            }
            if let Some(sep) = self.separators.get(i) {
                if column > sep.start && column < sep.end {
                    return CellLookup::Separator(i + 1);
                }
            }
        }
        CellLookup::Cell(self.cells.len().saturating_sub(1))
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\u{a0}'
}

fn is_pipe_line(line: &str) -> bool {
    line == "|" || line.starts_with("| ") || line.starts_with("|\t")
}

/// Splits a single line (without its terminator) into cells.
pub fn split_line(line: &str, format: FileFormat) -> LineCells {
    if format.is_tsv() {
        split_tabs(line)
    } else if is_pipe_line(line) {
        split_pipes(line)
    } else {
        split_spaces(line)
    }
}

fn split_tabs(line: &str) -> LineCells {
    let mut out = LineCells::default();
    let mut cell_start = 0;
    for (i, c) in line.char_indices() {
        if c == '\t' {
            out.cells.push(cell_start..i);
            out.separators.push(i..i + 1);
            cell_start = i + 1;
        }
    }
    out.cells.push(cell_start..line.len());
    out
}

fn split_spaces(line: &str) -> LineCells {
    let mut out = LineCells::default();
    let mut cell_start = 0;
    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_blank(c) {
            continue;
        }
        let mut end = i + c.len_utf8();
        let mut count = 1;
        let mut has_tab = c == '\t';
        while let Some(&(j, next)) = chars.peek() {
            if !is_blank(next) {
                break;
            }
            has_tab |= next == '\t';
            count += 1;
            end = j + next.len_utf8();
            chars.next();
        }
        if has_tab || count >= 2 {
            out.cells.push(cell_start..i);
            out.separators.push(i..end);
            cell_start = end;
        }
    }
    out.cells.push(cell_start..line.len());
    out
}

fn split_pipes(line: &str) -> LineCells {
    let mut out = LineCells::default();
    let lead_end = 1 + line[1..].chars().take_while(|c| is_blank(*c)).map(char::len_utf8).sum::<usize>();
    out.leading = Some(0..lead_end);

    let bytes = line.as_bytes();
    let mut cell_start = lead_end;
    let mut i = lead_end;
    while i < bytes.len() {
        if bytes[i] == b'|' && i > cell_start {
            let before = &line[cell_start..i];
            let ws_before = before.len() - before.trim_end_matches(is_blank).len();
            let after = &line[i + 1..];
            let ws_after = after.len() - after.trim_start_matches(is_blank).len();
            let at_end = ws_after == after.len();
            if ws_before > 0 && (ws_after > 0 || at_end) {
                let sep_start = i - ws_before;
                let sep_end = i + 1 + ws_after;
                out.cells.push(cell_start..sep_start);
                out.separators.push(sep_start..sep_end);
                cell_start = sep_end;
                i = sep_end;
                continue;
            }
        }
        i += 1;
    }
    out.cells.push(cell_start..line.len());
    out
}

/// Byte ranges of every line in a text, terminators excluded.
///
/// A text ending with a newline has a final empty line, and an empty text has
/// one empty line, so every offset in `0..=text.len()` belongs to some line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    lines: Vec<Range<usize>>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                let end = if i > start && text.as_bytes()[i - 1] == b'\r' { i - 1 } else { i };
                lines.push(start..end);
                start = i + 1;
            }
        }
        lines.push(start..text.len());
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn range(&self, line: usize) -> Range<usize> {
        self.lines.get(line).cloned().unwrap_or(0..0)
    }

    pub fn line_text<'a>(&self, text: &'a str, line: usize) -> &'a str {
        &text[self.range(line)]
    }

    /// Index of the line holding `offset`. Offsets on a terminator belong to the
    /// line it ends.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.lines.binary_search_by(|r| r.start.cmp(&offset)) {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) => i - 1,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Range<usize>> {
        self.lines.iter()
    }
}

/// Largest char boundary not greater than `offset`, clamped to the text.
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut at = offset.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}
