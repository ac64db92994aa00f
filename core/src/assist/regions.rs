//! Tab-stop regions placed over argument placeholders after a keyword is inserted.

use super::proposal::Region;

/// Contiguous, non-overlapping regions: each starts right after the previous one
/// plus one separator.
pub fn linked_regions(start: usize, separator_len: usize, lengths: &[usize]) -> Vec<Region> {
    let mut offset = start;
    lengths
        .iter()
        .map(|&length| {
            let region = Region::new(offset, length);
            offset += length + separator_len;
            region
        })
        .collect()
}

/// Regions over the arguments written after a keyword name.
pub fn argument_regions(insert_at: usize, name: &str, separator: &str, args: &[String]) -> Vec<Region> {
    let lengths: Vec<usize> = args.iter().map(String::len).collect();
    linked_regions(insert_at + name.len() + separator.len(), separator.len(), &lengths)
}

/// Regions over every `${..}` inside a keyword name with embedded arguments.
pub fn embedded_regions(insert_at: usize, name: &str) -> Vec<Region> {
    let bytes = name.as_bytes();
    let mut regions = Vec::new();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'$' && bytes[i + 1] == b'{' {
            let mut depth = 0;
            let mut end = None;
            for (j, b) in bytes.iter().enumerate().skip(i + 1) {
                match b {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            end = Some(j + 1);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            match end {
                Some(end) => {
                    regions.push(Region::new(insert_at + i, end - i));
                    i = end;
                    continue;
                }
                None => break,
            }
        }
        i += 1;
    }
    regions
}

/// Text of a keyword call followed by its argument placeholders.
pub fn call_text(name: &str, separator: &str, args: &[String]) -> String {
    let mut text = name.to_string();
    for arg in args {
        text.push_str(separator);
        text.push_str(arg);
    }
    text
}
