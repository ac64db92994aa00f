//! Context-sensitive proposal providers, one per language construct.
//!
//! `compute` returning `None` means the provider does not apply at the position
//! (wrong table, row, cell, or the cursor sits in a separator); `Some(vec![])`
//! means it applies but nothing matched. Callers rely on the difference.

use std::sync::Arc;

use super::context::{AcceptanceMode, AssistContext, AssistPreferences};
use super::index::ProjectIndex;
use super::locator::{AssistPosition, PositionLocator};
use super::matcher::{MatchKind, MatchedCandidate, ProposalMatcher};
use super::proposal::{Proposal, ProposalKind, Region};
use crate::model::{SectionKind, SuiteDocument};

mod imports;
mod keywords;
mod reserved;
mod sections;
mod settings;
mod templates;
mod variables;

pub use imports::{
    ImportsInCodeProvider, ImportsInSettingsProvider, LibrariesImportProvider, ResourcesImportProvider,
    VariablesImportProvider, WithNameProvider,
};
pub use keywords::{KeywordCallsInSettingsProvider, KeywordCallsProvider};
pub use reserved::{CodeReservedWordsProvider, ReservedWordsInSettingsProvider};
pub use sections::SectionsProvider;
pub use settings::{GeneralSettingsProvider, KeywordSettingsProvider};
pub use templates::TemplateArgumentsProvider;
pub use variables::VariablesProvider;

/// Everything a provider looks at for one request.
pub struct AssistRequest<'a> {
    pub document: &'a SuiteDocument,
    pub position: AssistPosition,
    pub preferences: Arc<AssistPreferences>,
    pub index: &'a dyn ProjectIndex,
}

impl<'a> AssistRequest<'a> {
    pub fn new(document: &'a SuiteDocument, offset: usize, context: &'a AssistContext) -> Self {
        Self {
            document,
            position: PositionLocator::locate(document, offset),
            preferences: context.preferences(),
            index: context.index().as_ref(),
        }
    }

    pub fn separator(&self) -> &str {
        self.preferences.separator(self.document.format.is_tsv())
    }

    /// Separator to append after an inserted cell, only when nothing follows it.
    pub fn separator_at_line_end(&self) -> &str {
        if self.position.is_last_cell() { self.separator() } else { "" }
    }

    /// Region a proposal for the current cell replaces.
    pub fn cell_replacement(&self) -> Region {
        match self.position.cell() {
            None => Region::new(self.position.offset, 0),
            Some(cell) => match self.preferences.acceptance_mode {
                AcceptanceMode::Substitute => Region::from_range(cell.range.clone()),
                AcceptanceMode::Insert => Region::new(cell.range.start, self.position.offset_in_cell),
            },
        }
    }

    /// Like [`Self::cell_replacement`] but starting `skip` bytes into the cell.
    pub fn cell_replacement_from(&self, skip: usize) -> Region {
        let region = self.cell_replacement();
        let skip = skip.min(region.length);
        Region::new(region.offset + skip, region.length - skip)
    }

    /// Text of cell `index` on the current line, trimmed.
    pub fn cell(&self, index: usize) -> &str {
        self.position.cell_text(index).map(str::trim).unwrap_or("")
    }

    /// Cursor in a non-header line, inside a cell.
    pub fn in_cell(&self) -> bool {
        !self.position.in_separator && !self.position.is_header
    }

    /// Index of the first cell that holds row content: 1 on indented rows and on
    /// the line defining a test or keyword, shifted past a `\` loop marker.
    pub fn first_action_cell(&self) -> usize {
        if self.cell(1) == "\\" { 2 } else { 1 }
    }
}

pub trait ProposalProvider: Send + Sync {
    fn applicable_content_types(&self) -> &'static [SectionKind];

    fn title(&self) -> &'static str;

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>>;

    fn is_applicable(&self, section: SectionKind) -> bool {
        self.applicable_content_types().contains(&section)
    }
}

pub(crate) const EXECUTABLE: &[SectionKind] = &[SectionKind::Keywords, SectionKind::TestCases, SectionKind::Tasks];
pub(crate) const SETTINGS: &[SectionKind] = &[SectionKind::Settings];

/// Built-in providers plus room for embedder-defined ones.
pub enum AssistProvider {
    Sections(SectionsProvider),
    GeneralSettings(GeneralSettingsProvider),
    KeywordSettings(KeywordSettingsProvider),
    KeywordCalls(KeywordCallsProvider),
    KeywordCallsInSettings(KeywordCallsInSettingsProvider),
    ImportsInCode(ImportsInCodeProvider),
    ImportsInSettings(ImportsInSettingsProvider),
    LibrariesImport(LibrariesImportProvider),
    ResourcesImport(ResourcesImportProvider),
    VariablesImport(VariablesImportProvider),
    WithName(WithNameProvider),
    Variables(VariablesProvider),
    CodeReservedWords(CodeReservedWordsProvider),
    ReservedWordsInSettings(ReservedWordsInSettingsProvider),
    TemplateArguments(TemplateArgumentsProvider),
    Custom(Box<dyn ProposalProvider>),
}

impl AssistProvider {
    fn inner(&self) -> &dyn ProposalProvider {
        match self {
            AssistProvider::Sections(p) => p,
            AssistProvider::GeneralSettings(p) => p,
            AssistProvider::KeywordSettings(p) => p,
            AssistProvider::KeywordCalls(p) => p,
            AssistProvider::KeywordCallsInSettings(p) => p,
            AssistProvider::ImportsInCode(p) => p,
            AssistProvider::ImportsInSettings(p) => p,
            AssistProvider::LibrariesImport(p) => p,
            AssistProvider::ResourcesImport(p) => p,
            AssistProvider::VariablesImport(p) => p,
            AssistProvider::WithName(p) => p,
            AssistProvider::Variables(p) => p,
            AssistProvider::CodeReservedWords(p) => p,
            AssistProvider::ReservedWordsInSettings(p) => p,
            AssistProvider::TemplateArguments(p) => p,
            AssistProvider::Custom(p) => p.as_ref(),
        }
    }
}

impl ProposalProvider for AssistProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        self.inner().applicable_content_types()
    }

    fn title(&self) -> &'static str {
        self.inner().title()
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        self.inner().compute(request)
    }
}

impl std::fmt::Debug for AssistProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AssistProvider").field(&self.title()).finish()
    }
}

/// Ranks `candidates` by `prefix` and turns each match into a proposal over
/// `replacement`, inserting `text_of(candidate)`.
pub(crate) fn ranked_proposals<S: AsRef<str>>(
    candidates: &[S],
    prefix: &str,
    replacement: Region,
    kind: ProposalKind,
    text_of: impl Fn(&str) -> String,
) -> Vec<Proposal> {
    ProposalMatcher::rank(candidates, prefix)
        .into_iter()
        .filter_map(|m| simple_proposal(&m, prefix, replacement, kind, text_of(&m.candidate)))
        .collect()
}

pub(crate) fn simple_proposal(
    matched: &MatchedCandidate,
    prefix: &str,
    replacement: Region,
    kind: ProposalKind,
    text: String,
) -> Option<Proposal> {
    Proposal::builder()
        .text(text)
        .label(matched.candidate.clone())
        .replace(replacement)
        .matched_prefix(prefix.len())
        .decorate_prefix(matched.kind == MatchKind::Prefix)
        .kind(kind)
        .build()
        .ok()
}
