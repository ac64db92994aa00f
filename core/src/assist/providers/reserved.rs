use super::{AssistRequest, EXECUTABLE, ProposalProvider, SETTINGS, ranked_proposals};
use crate::assist::matcher::{MatchKind, ProposalMatcher};
use crate::assist::proposal::{Proposal, ProposalKind};
use crate::model::{LocalSettingKind, SectionKind, SettingKind, is_for_marker};

const LOOP_WORDS: &[&str] = &[":FOR", "END", "FOR"];
const GHERKIN_WORDS: &[&str] = &["Given", "When", "Then", "And", "But"];
const LOOP_KINDS: &[&str] = &["IN", "IN RANGE", "IN ENUMERATE", "IN ZIP"];
const NONE: &str = "NONE";

/// Loop markers, Gherkin prefixes, loop kinds and `NONE` in executable rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeReservedWordsProvider;

/// `NONE` as the value of suite-level setup, teardown, template and timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReservedWordsInSettingsProvider;

fn none_proposal(request: &AssistRequest<'_>) -> Vec<Proposal> {
    ranked_proposals(
        &[NONE],
        &request.position.prefix,
        request.cell_replacement(),
        ProposalKind::ReservedWord,
        str::to_string,
    )
}

impl ProposalProvider for CodeReservedWordsProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        EXECUTABLE
    }

    fn title(&self) -> &'static str {
        "Settings"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        let position = &request.position;
        if !request.in_cell() || position.cell_index == 0 {
            return None;
        }
        let first = request.first_action_cell();
        let head = request.cell(first);
        let prefix = position.prefix.as_str();
        let separator = request.separator_at_line_end();

        // A loop header may also start in the name column.
        let loop_at = if is_for_marker(request.cell(0)) {
            Some(0)
        } else if is_for_marker(head) {
            Some(first)
        } else {
            None
        };
        if let Some(at) = loop_at.filter(|at| position.cell_index > *at) {
            let has_kind = (at + 1..position.cell_index).any(|i| request.cell(i).starts_with("IN"));
            if position.cell_index < at + 2 || has_kind {
                return Some(Vec::new());
            }
            return Some(ranked_proposals(
                LOOP_KINDS,
                prefix,
                request.cell_replacement(),
                ProposalKind::ReservedWord,
                |word| format!("{word}{separator}"),
            ));
        }

        if position.cell_index == first {
            let mut proposals = ranked_proposals(
                LOOP_WORDS,
                prefix,
                request.cell_replacement(),
                ProposalKind::ReservedWord,
                |word| format!("{word}{separator}"),
            );
            // Gherkin prefixes keep their fixed order and are followed by the keyword name.
            let replacement = request.cell_replacement();
            let space = if position.is_last_cell() { " " } else { "" };
            proposals.extend(ProposalMatcher::filter(GHERKIN_WORDS, prefix).into_iter().filter_map(|m| {
                Proposal::builder()
                    .text(format!("{}{space}", m.candidate))
                    .label(m.candidate.clone())
                    .replace(replacement)
                    .matched_prefix(prefix.len())
                    .decorate_prefix(m.kind == MatchKind::Prefix)
                    .kind(ProposalKind::ReservedWord)
                    .build()
                    .ok()
            }));
            return Some(proposals);
        }

        if position.cell_index == first + 1
            && LocalSettingKind::is_local_setting(head)
            && LocalSettingKind::from_declaration(head).accepts_none()
        {
            return Some(none_proposal(request));
        }
        Some(Vec::new())
    }
}

impl ProposalProvider for ReservedWordsInSettingsProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        SETTINGS
    }

    fn title(&self) -> &'static str {
        "Settings"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        if !request.in_cell() || request.position.cell_index != 1 {
            return None;
        }
        let kind = SettingKind::from_declaration(request.cell(0));
        if !(kind.takes_keyword() || kind == SettingKind::TestTimeout) {
            return None;
        }
        Some(none_proposal(request))
    }
}
