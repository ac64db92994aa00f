use std::ops::Range;

use serde::Serialize;

use crate::model::{SectionKind, SuiteDocument};
use crate::text::{CellLookup, floor_char_boundary, split_line};

/// One cell of the located line, in absolute offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedCell {
    pub range: Range<usize>,
    pub text: String,
}

/// Structural position of an offset: table, line and cell under the cursor.
///
/// Always computed fresh from the document; never kept across edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistPosition {
    pub offset: usize,
    /// Virtual content type at the offset.
    pub section: SectionKind,
    pub line: usize,
    pub line_range: Range<usize>,
    /// Index of the cell under the cursor, or of the next cell when the cursor
    /// sits inside a separator.
    pub cell_index: usize,
    pub in_separator: bool,
    /// Every cell of the line, including the implied empty cell after a
    /// trailing separator.
    pub cells: Vec<LocatedCell>,
    pub prefix: String,
    pub offset_in_cell: usize,
    pub is_at_cell_end: bool,
    pub is_at_line_start: bool,
    pub is_header: bool,
}

impl AssistPosition {
    /// Cell under the cursor; `None` inside a separator.
    pub fn cell(&self) -> Option<&LocatedCell> {
        if self.in_separator {
            None
        } else {
            self.cells.get(self.cell_index)
        }
    }

    pub fn cell_text(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(|c| c.text.as_str())
    }

    /// Text of the current cell, empty inside a separator.
    pub fn current_text(&self) -> &str {
        self.cell().map(|c| c.text.as_str()).unwrap_or("")
    }

    /// Whether nothing but whitespace follows the current cell on the line.
    pub fn is_last_cell(&self) -> bool {
        self.cells.iter().skip(self.cell_index + 1).all(|c| c.text.trim().is_empty())
    }

    pub fn is_at_line_end(&self) -> bool {
        self.offset == self.line_range.end
    }

    /// First column is empty, so the line is a row inside a definition.
    pub fn is_indented(&self) -> bool {
        self.cells.first().is_some_and(|c| c.text.is_empty()) && self.cells.len() > 1
    }
}

/// Maps raw offsets to [`AssistPosition`]s using the same cell splitter as the model.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionLocator;

impl PositionLocator {
    /// Content type of the line holding `offset`.
    pub fn content_type_at(document: &SuiteDocument, offset: usize) -> SectionKind {
        let line = document.lines.line_of(offset.min(document.text.len()));
        document.model.section_at_line(line)
    }

    /// Content type at `offset`, except that right at a boundary the preceding,
    /// non-default region wins so completion works right after it.
    pub fn virtual_content_type(document: &SuiteDocument, offset: usize) -> SectionKind {
        let offset = offset.min(document.text.len());
        let here = Self::content_type_at(document, offset);
        if offset == 0 {
            return here;
        }
        let before = Self::content_type_at(document, offset - 1);
        if before != here && before != SectionKind::None {
            before
        } else {
            here
        }
    }

    pub fn locate(document: &SuiteDocument, offset: usize) -> AssistPosition {
        let offset = floor_char_boundary(&document.text, offset);
        let line = document.lines.line_of(offset);
        let line_range = document.lines.range(line);
        let line_text = &document.text[line_range.clone()];
        let column = offset.saturating_sub(line_range.start).min(line_text.len());
        let offset = line_range.start + column;

        let split = split_line(line_text, document.format);
        let cells: Vec<LocatedCell> = split
            .cells
            .iter()
            .map(|r| LocatedCell {
                range: line_range.start + r.start..line_range.start + r.end,
                text: line_text[r.clone()].to_string(),
            })
            .collect();

        let (cell_index, in_separator) = match split.lookup(column) {
            CellLookup::Cell(i) => (i, false),
            CellLookup::Separator(i) => (i, true),
        };
        let (prefix, offset_in_cell, is_at_cell_end) = match cells.get(cell_index).filter(|_| !in_separator) {
            Some(cell) => {
                let within = offset - cell.range.start;
                (cell.text[..within].to_string(), within, offset == cell.range.end)
            }
            None => (String::new(), 0, false),
        };
        let is_header = SectionKind::from_header(split.text(line_text, 0)).is_some();

        AssistPosition {
            offset,
            section: Self::virtual_content_type(document, offset),
            line,
            line_range,
            cell_index,
            in_separator,
            cells,
            prefix,
            offset_in_cell,
            is_at_cell_end,
            is_at_line_start: column == 0,
            is_header,
        }
    }
}
