use super::{AssistRequest, ProposalProvider};
use crate::assist::matcher::ProposalMatcher;
use crate::assist::proposal::{Proposal, ProposalKind};
use crate::model::{FileKind, SectionKind};

const ANYWHERE: &[SectionKind] = &[
    SectionKind::None,
    SectionKind::Settings,
    SectionKind::Variables,
    SectionKind::TestCases,
    SectionKind::Tasks,
    SectionKind::Keywords,
    SectionKind::Comments,
];

/// Table headers at the start of a line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionsProvider;

fn header_name(text: &str) -> &str {
    text.trim_matches(|c: char| c == '*' || c.is_whitespace())
}

impl ProposalProvider for SectionsProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        ANYWHERE
    }

    fn title(&self) -> &'static str {
        "Sections"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        let position = &request.position;
        if position.in_separator || position.cell_index != 0 {
            return None;
        }
        let line_is_empty = position.cells.iter().all(|c| c.text.trim().is_empty());
        if !line_is_empty && !position.prefix.starts_with('*') {
            return None;
        }

        // Only the path tells a resource from a suite that has no tests yet.
        let tests_allowed = FileKind::detect(&request.document.path, true).allows_tests();
        let headers: Vec<&'static str> = SectionKind::ALL_TABLES
            .iter()
            .filter(|kind| tests_allowed || !kind.is_test_like())
            .filter_map(|kind| kind.header())
            .collect();
        let names: Vec<&str> = headers.iter().map(|h| header_name(h)).collect();
        let query = header_name(&position.prefix);
        let replacement = request.cell_replacement();

        let proposals = ProposalMatcher::filter(&names, query)
            .into_iter()
            .filter_map(|m| {
                Proposal::builder()
                    .text(headers[m.index])
                    .label(headers[m.index])
                    .replace(replacement)
                    .matched_prefix(position.prefix.len())
                    .decorate_prefix(false)
                    .kind(ProposalKind::Section)
                    .build()
                    .ok()
            })
            .collect();
        Some(proposals)
    }
}
