//! Combining providers into one proposal list, and cycling through provider
//! groups on repeated invocation.

use tracing::debug;

use super::context::AssistContext;
use super::proposal::Proposal;
use super::providers::*;
use crate::model::{SectionKind, SuiteDocument};

/// Providers shown together under one title while cycling.
#[derive(Debug)]
pub struct ProviderGroup {
    pub title: String,
    pub providers: Vec<AssistProvider>,
}

impl ProviderGroup {
    pub fn new(title: impl Into<String>, providers: Vec<AssistProvider>) -> Self {
        Self {
            title: title.into(),
            providers,
        }
    }

    pub fn is_applicable(&self, section: SectionKind) -> bool {
        self.providers.iter().any(|p| p.is_applicable(section))
    }

    /// `None` when no applicable provider returned a list.
    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        let section = request.position.section;
        let mut applied = false;
        let mut proposals = Vec::new();
        for provider in &self.providers {
            if !provider.is_applicable(section) {
                continue;
            }
            if let Some(found) = provider.compute(request) {
                applied = true;
                proposals.extend(found);
            }
        }
        applied.then_some(proposals)
    }
}

/// Runs every registered provider applicable to the content type under the cursor.
#[derive(Debug)]
pub struct ProposalAggregator {
    groups: Vec<ProviderGroup>,
}

impl Default for ProposalAggregator {
    fn default() -> Self {
        Self::new(Self::default_groups())
    }
}

impl ProposalAggregator {
    pub fn new(groups: Vec<ProviderGroup>) -> Self {
        Self { groups }
    }

    pub fn default_groups() -> Vec<ProviderGroup> {
        vec![
            ProviderGroup::new(
                "Keywords",
                vec![
                    AssistProvider::KeywordCalls(KeywordCallsProvider),
                    AssistProvider::KeywordCallsInSettings(KeywordCallsInSettingsProvider),
                    AssistProvider::ImportsInCode(ImportsInCodeProvider),
                    AssistProvider::ImportsInSettings(ImportsInSettingsProvider),
                ],
            ),
            ProviderGroup::new("Variables", vec![AssistProvider::Variables(VariablesProvider)]),
            ProviderGroup::new(
                "Settings",
                vec![
                    AssistProvider::Sections(SectionsProvider),
                    AssistProvider::GeneralSettings(GeneralSettingsProvider),
                    AssistProvider::KeywordSettings(KeywordSettingsProvider),
                    AssistProvider::LibrariesImport(LibrariesImportProvider),
                    AssistProvider::ResourcesImport(ResourcesImportProvider),
                    AssistProvider::VariablesImport(VariablesImportProvider),
                    AssistProvider::WithName(WithNameProvider),
                    AssistProvider::CodeReservedWords(CodeReservedWordsProvider),
                    AssistProvider::ReservedWordsInSettings(ReservedWordsInSettingsProvider),
                    AssistProvider::TemplateArguments(TemplateArgumentsProvider),
                ],
            ),
        ]
    }

    pub fn groups(&self) -> &[ProviderGroup] {
        &self.groups
    }

    /// Concatenated results of all groups in registration order, or `None`
    /// when every applicable provider declined.
    pub fn compute(&self, document: &SuiteDocument, offset: usize, context: &AssistContext) -> Option<Vec<Proposal>> {
        let request = AssistRequest::new(document, offset, context);
        let mut result: Option<Vec<Proposal>> = None;
        for group in &self.groups {
            if let Some(found) = group.compute(&request) {
                result.get_or_insert_with(Vec::new).extend(found);
            }
        }
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CycleState {
    offset: usize,
    content_hash: u64,
    next: usize,
}

/// Proposals of one cycling step.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleStep {
    pub proposals: Option<Vec<Proposal>>,
    /// Title of the group that produced `proposals`; empty when none applies.
    pub title: String,
    /// Hint naming the group shown on the next invocation; empty when only one
    /// group applies.
    pub status: String,
}

/// Shows one provider group per invocation, advancing while the offset and
/// the document content stay the same.
#[derive(Debug)]
pub struct CyclingAggregator {
    aggregator: ProposalAggregator,
    state: Option<CycleState>,
}

impl Default for CyclingAggregator {
    fn default() -> Self {
        Self::new(ProposalAggregator::default())
    }
}

impl CyclingAggregator {
    pub fn new(aggregator: ProposalAggregator) -> Self {
        Self { aggregator, state: None }
    }

    pub fn aggregator(&self) -> &ProposalAggregator {
        &self.aggregator
    }

    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn compute(&mut self, document: &SuiteDocument, offset: usize, context: &AssistContext) -> CycleStep {
        let request = AssistRequest::new(document, offset, context);
        let section = request.position.section;
        let applicable: Vec<&ProviderGroup> = self
            .aggregator
            .groups
            .iter()
            .filter(|g| g.is_applicable(section))
            .collect();
        if applicable.is_empty() {
            self.state = None;
            return CycleStep {
                proposals: None,
                title: String::new(),
                status: String::new(),
            };
        }

        let content_hash = document.content_hash();
        let current = match self.state {
            Some(state) if state.offset == offset && state.content_hash == content_hash => state.next % applicable.len(),
            Some(_) => {
                debug!(offset, "proposal cycling reset");
                0
            }
            None => 0,
        };
        let next = (current + 1) % applicable.len();
        self.state = Some(CycleState {
            offset,
            content_hash,
            next,
        });

        let key = context.preferences().cycling_key.clone();
        let status = if applicable.len() > 1 {
            format!("Press {} to show {} proposals", key, applicable[next].title)
        } else {
            String::new()
        };
        let group = applicable[current];
        CycleStep {
            proposals: group.compute(&request),
            title: group.title.clone(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::proposal::Region;
    use crate::assist::providers::test_support::*;

    struct Fixed {
        label: &'static str,
        types: &'static [SectionKind],
    }

    impl ProposalProvider for Fixed {
        fn applicable_content_types(&self) -> &'static [SectionKind] {
            self.types
        }

        fn title(&self) -> &'static str {
            self.label
        }

        fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
            Proposal::builder()
                .text(self.label)
                .replace(Region::new(request.position.offset, 0))
                .build()
                .ok()
                .map(|p| vec![p])
        }
    }

    struct Declining;

    impl ProposalProvider for Declining {
        fn applicable_content_types(&self) -> &'static [SectionKind] {
            &[SectionKind::Keywords]
        }

        fn title(&self) -> &'static str {
            "declining"
        }

        fn compute(&self, _: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
            None
        }
    }

    fn fixed(label: &'static str, types: &'static [SectionKind]) -> ProviderGroup {
        ProviderGroup::new(label, vec![AssistProvider::Custom(Box::new(Fixed { label, types }))])
    }

    const KEYWORDS: &[SectionKind] = &[SectionKind::Keywords];
    const VARIABLES: &[SectionKind] = &[SectionKind::Variables];

    fn cycling() -> CyclingAggregator {
        CyclingAggregator::new(ProposalAggregator::new(vec![
            fixed("A", KEYWORDS),
            fixed("skipped", VARIABLES),
            fixed("B", KEYWORDS),
            fixed("C", KEYWORDS),
        ]))
    }

    #[test]
    fn test_cycling_wraps_over_applicable_groups() {
        let document = SuiteDocument::from_lines("suite.robot", &["*** Keywords ***", "kw", "  "]);
        let context = context_with(Default::default(), true);
        let at = offset(&document, 2, 2);
        let mut aggregator = cycling();

        let mut seen = Vec::new();
        for _ in 0..4 {
            let step = aggregator.compute(&document, at, &context);
            seen.push(texts(&step.proposals.unwrap()).join(""));
        }
        assert_eq!(seen, vec!["A", "B", "C", "A"]);
    }

    #[test]
    fn test_cycling_resets_on_move_or_edit() {
        let document = SuiteDocument::from_lines("suite.robot", &["*** Keywords ***", "kw", "  x"]);
        let context = context_with(Default::default(), true);
        let mut aggregator = cycling();

        let first = aggregator.compute(&document, offset(&document, 2, 2), &context);
        assert_eq!(first.title, "A");
        assert_eq!(first.status, "Press Ctrl+Space to show B proposals");
        let moved = aggregator.compute(&document, offset(&document, 2, 3), &context);
        assert_eq!(moved.title, "A", "new offset starts over");
        assert_eq!(aggregator.compute(&document, offset(&document, 2, 3), &context).title, "B");

        let edited = SuiteDocument::from_lines("suite.robot", &["*** Keywords ***", "kw", "  y"]);
        assert_eq!(aggregator.compute(&edited, offset(&edited, 2, 3), &context).title, "A");
    }

    #[test]
    fn test_single_group_has_no_status() {
        let document = SuiteDocument::from_lines("suite.robot", &["*** Variables ***", "${a}  "]);
        let context = context_with(Default::default(), true);
        let step = cycling().compute(&document, offset(&document, 1, 6), &context);
        assert_eq!(step.title, "skipped");
        assert_eq!(step.status, "");
    }

    #[test]
    fn test_none_only_when_every_provider_declines() {
        let document = SuiteDocument::from_lines("suite.robot", &["*** Keywords ***", "kw", "  "]);
        let context = context_with(Default::default(), true);
        let at = offset(&document, 2, 2);

        let declining = ProposalAggregator::new(vec![ProviderGroup::new(
            "declining",
            vec![AssistProvider::Custom(Box::new(Declining))],
        )]);
        assert_eq!(declining.compute(&document, at, &context), None);

        let mixed = ProposalAggregator::new(vec![
            ProviderGroup::new("declining", vec![AssistProvider::Custom(Box::new(Declining))]),
            fixed("variables only", VARIABLES),
            fixed("A", KEYWORDS),
        ]);
        let proposals = mixed.compute(&document, at, &context).unwrap();
        assert_eq!(texts(&proposals), vec!["A"]);
    }

    #[test]
    fn test_default_groups_on_empty_keyword_row() {
        let document = SuiteDocument::from_lines("suite.robot", &["*** Keywords ***", "keyword", "  "]);
        let context = context_with(Default::default(), true);
        let proposals = ProposalAggregator::default()
            .compute(&document, offset(&document, 2, 2), &context)
            .unwrap();
        let labels = labels(&proposals);
        for expected in ["keyword", "[Arguments]", "[Timeout]", "FOR", "Given"] {
            assert!(labels.contains(&expected), "missing {expected}: {labels:?}");
        }
    }

    #[test]
    fn test_nothing_on_definition_name() {
        let document = SuiteDocument::from_lines("suite.robot", &["*** Keywords ***", "keyword", "  Log  1"]);
        let context = context_with(Default::default(), true);
        assert_eq!(
            ProposalAggregator::default().compute(&document, offset(&document, 1, 3), &context),
            None
        );
    }
}
