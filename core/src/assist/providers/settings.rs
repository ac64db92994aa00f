use super::{AssistRequest, EXECUTABLE, ProposalProvider, SETTINGS, ranked_proposals};
use crate::assist::proposal::{Proposal, ProposalKind};
use crate::model::{FileKind, LocalSettingKind, SectionKind, SettingKind};

/// Setting names in the first column of the settings table.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeneralSettingsProvider;

impl ProposalProvider for GeneralSettingsProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        SETTINGS
    }

    fn title(&self) -> &'static str {
        "Settings"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        if !request.in_cell() || request.position.cell_index != 0 {
            return None;
        }
        let tests_allowed = request.document.kind() != FileKind::Resource;
        let names: Vec<&str> = SettingKind::proposable(tests_allowed).iter().map(|k| k.name()).collect();
        let separator = request.separator_at_line_end();
        Some(ranked_proposals(
            &names,
            &request.position.prefix,
            request.cell_replacement(),
            ProposalKind::Setting,
            |name| format!("{name}{separator}"),
        ))
    }
}

/// Bracketed settings as the first cell of a test, task or keyword row.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordSettingsProvider;

impl ProposalProvider for KeywordSettingsProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        EXECUTABLE
    }

    fn title(&self) -> &'static str {
        "Keyword settings"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        if !request.in_cell() || request.position.cell_index != 1 {
            return None;
        }
        let kinds: &[LocalSettingKind] = if request.position.section == SectionKind::Keywords {
            &LocalSettingKind::KEYWORD
        } else {
            &LocalSettingKind::TEST_CASE
        };
        let names: Vec<&str> = kinds.iter().map(|k| k.declaration()).collect();
        let separator = request.separator_at_line_end();
        Some(ranked_proposals(
            &names,
            &request.position.prefix,
            request.cell_replacement(),
            ProposalKind::Setting,
            |name| format!("{name}{separator}"),
        ))
    }
}
