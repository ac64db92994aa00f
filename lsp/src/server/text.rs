use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};

/// Char index of an LSP (UTF-16) position, clamped to the end of its line.
pub(crate) fn position_to_char_idx(text: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start = text.line_to_char(line_idx);
    let line = text.line(line_idx);
    let target = pos.character as usize;

    let mut units = 0usize;
    let mut chars = 0usize;
    for ch in line.chars() {
        if ch == '\n' || ch == '\r' {
            break;
        }
        let width = ch.len_utf16();
        if units + width > target {
            break;
        }
        units += width;
        chars += 1;
    }
    line_start + chars
}

/// Applies one full or ranged change to the buffer.
pub(crate) fn apply_change(text: &mut Rope, change: &TextDocumentContentChangeEvent) {
    let Some(range) = &change.range else {
        *text = Rope::from_str(&change.text);
        return;
    };
    let a = position_to_char_idx(text, range.start);
    let b = position_to_char_idx(text, range.end);
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    if start != end {
        text.remove(start..end);
    }
    if !change.text.is_empty() {
        text.insert(start, &change.text);
    }
}

/// Byte offset of an LSP position in the buffer.
pub(crate) fn position_to_byte(text: &Rope, pos: Position) -> usize {
    text.char_to_byte(position_to_char_idx(text, pos))
}
