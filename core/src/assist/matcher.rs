use std::cmp::Ordering;
use std::ops::Range;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    /// Case-insensitive prefix
    Prefix,
    /// Case-insensitive substring anywhere else
    Substring,
}

/// A candidate that matched, with the span to highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedCandidate {
    pub index: usize,
    pub candidate: String,
    pub kind: MatchKind,
    pub span: Range<usize>,
}

/// Prefix/substring matching and ranking of candidate labels.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProposalMatcher;

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Byte length in `haystack` of a case-insensitive match of `needle` at `start`.
fn match_at(haystack: &str, start: usize, needle: &str) -> Option<usize> {
    let mut hay = haystack[start..].char_indices();
    for n in needle.chars() {
        let (_, h) = hay.next()?;
        if !chars_eq_ignore_case(h, n) {
            return None;
        }
    }
    Some(hay.next().map(|(i, _)| i).unwrap_or(haystack.len() - start))
}

/// Case-insensitive label order with a case-sensitive tie-break, so the result
/// never depends on input order.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

impl ProposalMatcher {
    /// Matches a single candidate. An empty prefix matches everything.
    pub fn matches(candidate: &str, prefix: &str) -> Option<(MatchKind, Range<usize>)> {
        if prefix.is_empty() {
            return Some((MatchKind::Prefix, 0..0));
        }
        if let Some(len) = match_at(candidate, 0, prefix) {
            return Some((MatchKind::Prefix, 0..len));
        }
        candidate
            .char_indices()
            .skip(1)
            .find_map(|(i, _)| match_at(candidate, i, prefix).map(|len| (MatchKind::Substring, i..i + len)))
    }

    /// Prefix matches first, then substring matches, each group by label.
    pub fn rank<S: AsRef<str>>(candidates: &[S], prefix: &str) -> Vec<MatchedCandidate> {
        let mut matched: Vec<MatchedCandidate> = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let candidate = candidate.as_ref();
                Self::matches(candidate, prefix).map(|(kind, span)| MatchedCandidate {
                    index,
                    candidate: candidate.to_string(),
                    kind,
                    span,
                })
            })
            .collect();
        matched.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| compare_labels(&a.candidate, &b.candidate)));
        matched
    }

    /// Keeps the input order, dropping what does not match.
    pub fn filter<S: AsRef<str>>(candidates: &[S], prefix: &str) -> Vec<MatchedCandidate> {
        candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let candidate = candidate.as_ref();
                Self::matches(candidate, prefix).map(|(kind, span)| MatchedCandidate {
                    index,
                    candidate: candidate.to_string(),
                    kind,
                    span,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(matched: &[MatchedCandidate]) -> Vec<&str> {
        matched.iter().map(|m| m.candidate.as_str()).collect()
    }

    #[test]
    fn test_rank_is_independent_of_input_order() {
        let a = ["Test Setup", "Test Teardown", "Test Timeout", "Test Template"];
        let b = ["Test Template", "Test Timeout", "Test Setup", "Test Teardown"];
        let ranked_a = ProposalMatcher::rank(&a, "Te");
        let ranked_b = ProposalMatcher::rank(&b, "Te");
        assert_eq!(labels(&ranked_a), vec!["Test Setup", "Test Teardown", "Test Template", "Test Timeout"]);
        assert_eq!(labels(&ranked_a), labels(&ranked_b));
        assert!(ranked_a.iter().all(|m| m.kind == MatchKind::Prefix && m.span == (0..2)));
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        let ranked = ProposalMatcher::rank(&["b", "a", "C"], "");
        assert_eq!(labels(&ranked), vec!["a", "b", "C"]);
    }

    #[test]
    fn test_prefix_ranks_above_substring() {
        let ranked = ProposalMatcher::rank(&["Set Variable", "Variable Should Exist", "Get Variable Value"], "var");
        assert_eq!(
            labels(&ranked),
            vec!["Variable Should Exist", "Get Variable Value", "Set Variable"]
        );
        assert_eq!(ranked[0].kind, MatchKind::Prefix);
        assert_eq!(ranked[1].kind, MatchKind::Substring);
        assert_eq!(ranked[1].span, 4..7);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(ProposalMatcher::rank(&["abc"], "x").is_empty());
        assert_eq!(ProposalMatcher::matches("NONE", "Some"), None);
    }

    #[test]
    fn test_filter_keeps_order() {
        let filtered = ProposalMatcher::filter(&["Given", "When", "Then", "And", "But"], "");
        assert_eq!(labels(&filtered), vec!["Given", "When", "Then", "And", "But"]);
        let filtered = ProposalMatcher::filter(&["Given", "When", "Then"], "giv");
        assert_eq!(labels(&filtered), vec!["Given"]);
    }
}
