use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableKind {
    Scalar,
    List,
    Dictionary,
}

impl VariableKind {
    pub fn from_sigil(sigil: char) -> Option<Self> {
        match sigil {
            '$' => Some(VariableKind::Scalar),
            '@' => Some(VariableKind::List),
            '&' => Some(VariableKind::Dictionary),
            _ => None,
        }
    }

    pub fn sigil(self) -> char {
        match self {
            VariableKind::Scalar => '$',
            VariableKind::List => '@',
            VariableKind::Dictionary => '&',
        }
    }

    pub fn decorate(self, name: &str) -> String {
        format!("{}{{{}}}", self.sigil(), name)
    }
}

/// Parses a whole cell as a single variable (`${name}`, `@{name}`, `&{name}`).
/// A trailing `=` is accepted, as written in assignments and the variables table.
pub fn parse_variable(text: &str) -> Option<(VariableKind, &str)> {
    let text = text.trim().trim_end_matches('=').trim_end();
    let mut chars = text.chars();
    let kind = VariableKind::from_sigil(chars.next()?)?;
    if chars.next() != Some('{') || !text.ends_with('}') || text.len() < 3 {
        return None;
    }
    let inner = &text[2..text.len() - 1];
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    Some((kind, inner))
}

/// Whether a cell assigns to a variable (`${x}=`, `${x} =` or a bare `${x}` before the call).
pub fn is_assignment(text: &str) -> bool {
    parse_variable(text).is_some()
}

/// Offset of the last variable opening (`${`, `@{`, `&{`, `%{`) before `end` that is
/// not closed yet, used as the start of a variable prefix.
pub fn open_variable_start(text: &str, end: usize) -> Option<usize> {
    let head = &text[..end];
    let bytes = head.as_bytes();
    let mut i = bytes.len();
    while i >= 2 {
        i -= 1;
        if bytes[i] == b'}' {
            return None;
        }
        if bytes[i] == b'{' && matches!(bytes[i - 1], b'$' | b'@' | b'&' | b'%') {
            return Some(i - 1);
        }
    }
    None
}
