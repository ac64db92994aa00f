use super::{AssistRequest, EXECUTABLE, ProposalProvider, SETTINGS};
use crate::assist::index::{KeywordEntity, KeywordScope, visible_keywords};
use crate::assist::matcher::{MatchKind, ProposalMatcher};
use crate::assist::proposal::{PostAcceptOperation, Proposal, ProposalKind};
use crate::assist::regions::{argument_regions, call_text, embedded_regions};
use crate::model::{ImportKind, LocalSettingKind, SectionKind, SettingKind, is_for_marker, normalize};
use crate::util::fast_map::{FastHashMap, FastHashSet, fast_hash_map_new, fast_hash_set_new};

/// Keyword calls in test, task and keyword bodies.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordCallsProvider;

/// Keyword names in setup, teardown and template settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordCallsInSettingsProvider;

/// Whether the current cell of an executable row can hold a keyword name.
pub(crate) fn is_call_position(request: &AssistRequest<'_>) -> bool {
    let position = &request.position;
    if !request.in_cell() || position.cell_index == 0 || position.prefix.starts_with('#') {
        return false;
    }
    let first = request.first_action_cell();
    if position.cell_index < first {
        return false;
    }
    let head = request.cell(first);
    if LocalSettingKind::is_local_setting(head) {
        let kind = LocalSettingKind::from_declaration(head);
        return matches!(
            kind,
            LocalSettingKind::Setup | LocalSettingKind::Teardown | LocalSettingKind::Template
        ) && position.cell_index == first + 1;
    }
    !(position.cell_index > first && is_for_marker(head))
}

/// Whether the current cell is the keyword cell of a keyword-taking setting.
pub(crate) fn is_setting_keyword_position(request: &AssistRequest<'_>) -> bool {
    request.in_cell()
        && request.position.cell_index == 1
        && SettingKind::from_declaration(request.cell(0)).takes_keyword()
}

fn proposal_kind(scope: KeywordScope) -> ProposalKind {
    match scope {
        KeywordScope::Local => ProposalKind::LocalKeyword,
        KeywordScope::Resource => ProposalKind::ResourceKeyword,
        KeywordScope::Library | KeywordScope::NotImportedLibrary => ProposalKind::LibraryKeyword,
    }
}

fn secondary_info(keyword: &KeywordEntity) -> String {
    let mut info = format!("Source: {}\nArguments: [{}]", keyword.source, keyword.signature());
    if let Some(doc) = keyword.documentation.as_deref().filter(|d| !d.is_empty()) {
        info.push_str("\n\n");
        info.push_str(doc);
    }
    info
}

/// Length of a leading Gherkin word plus the blank after it, 0 without one.
pub(crate) fn gherkin_prefix_len(prefix: &str) -> usize {
    for word in ["given", "when", "then", "and", "but"] {
        let Some(head) = prefix.get(..word.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(word) {
            continue;
        }
        let rest = &prefix[word.len()..];
        let blanks = rest.len() - rest.trim_start_matches(' ').len();
        if blanks > 0 {
            return word.len() + blanks;
        }
    }
    0
}

/// Splits `Source.name` when `Source` is the source of a visible keyword.
fn split_qualifier<'p>(prefix: &'p str, keywords: &[KeywordEntity]) -> (Option<&'p str>, &'p str) {
    if let Some(dot) = prefix.rfind('.') {
        let qualifier = &prefix[..dot];
        if keywords.iter().any(|k| k.source.eq_ignore_ascii_case(qualifier)) {
            return (Some(qualifier), &prefix[dot + 1..]);
        }
    }
    (None, prefix)
}

pub(crate) fn keyword_proposals(request: &AssistRequest<'_>) -> Vec<Proposal> {
    let preferences = &request.preferences;
    let keywords = visible_keywords(request.document, request.index, preferences.include_not_imported_libraries);
    let prefix = request.position.prefix.as_str();
    let gherkin = gherkin_prefix_len(prefix);
    let (qualifier, name_prefix) = split_qualifier(&prefix[gherkin..], &keywords);
    let candidates: Vec<&KeywordEntity> = keywords
        .iter()
        .filter(|k| qualifier.is_none_or(|q| k.source.eq_ignore_ascii_case(q)))
        .collect();

    let mut sources_per_name: FastHashMap<String, FastHashSet<&str>> = fast_hash_map_new();
    for keyword in &candidates {
        sources_per_name
            .entry(normalize(&keyword.name))
            .or_default()
            .insert(keyword.source.as_str());
    }

    let separator = request.separator();
    let with_arguments = request.position.is_last_cell();
    let replacement = match qualifier {
        Some(q) => request.cell_replacement_from(gherkin + q.len() + 1),
        None => request.cell_replacement_from(gherkin),
    };
    let names: Vec<&str> = candidates.iter().map(|k| k.name.as_str()).collect();

    let mut proposals = Vec::new();
    let mut seen: FastHashSet<(&str, &str)> = fast_hash_set_new();
    for matched in ProposalMatcher::rank(&names, name_prefix) {
        let keyword = candidates[matched.index];
        if !seen.insert((keyword.name.as_str(), keyword.source.as_str())) {
            continue;
        }

        let conflicting = sources_per_name.get(&normalize(&keyword.name)).is_some_and(|s| s.len() > 1);
        let qualify = qualifier.is_none()
            && (preferences.keyword_prefix_auto_addition
                || conflicting
                || keyword.scope == KeywordScope::NotImportedLibrary);
        let name = if qualify {
            format!("{}.{}", keyword.source, keyword.name)
        } else {
            keyword.name.clone()
        };

        let (text, regions) = if keyword.has_embedded_arguments() {
            let name_start = replacement.offset + name.len() - keyword.name.len();
            (name.clone(), embedded_regions(name_start, &keyword.name))
        } else if with_arguments {
            let args = keyword.required_arguments();
            (call_text(&name, separator, &args), argument_regions(replacement.offset, &name, separator, &args))
        } else {
            (name.clone(), Vec::new())
        };
        let (cursor, selection) = match regions.first() {
            Some(first) => (first.offset - replacement.offset, first.length),
            None => (text.len(), 0),
        };

        let mut builder = Proposal::builder()
            .text(text)
            .label(keyword.name.clone())
            .replace(replacement)
            .matched_prefix(name_prefix.len())
            .decorate_prefix(matched.kind == MatchKind::Prefix)
            .cursor(cursor)
            .select(selection)
            .kind(proposal_kind(keyword.scope))
            .secondary_info(Some(secondary_info(keyword)))
            .linked_regions(regions);
        if keyword.scope == KeywordScope::NotImportedLibrary {
            builder = builder.post_accept(PostAcceptOperation::AddImport {
                kind: ImportKind::Library,
                name: keyword.source.clone(),
                separator: separator.to_string(),
            });
        }
        if let Ok(proposal) = builder.build() {
            proposals.push(proposal);
        }
    }
    proposals
}

impl ProposalProvider for KeywordCallsProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        EXECUTABLE
    }

    fn title(&self) -> &'static str {
        "Keywords"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        if !is_call_position(request) {
            return None;
        }
        Some(keyword_proposals(request))
    }
}

impl ProposalProvider for KeywordCallsInSettingsProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        SETTINGS
    }

    fn title(&self) -> &'static str {
        "Keywords"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        if !is_setting_keyword_position(request) {
            return None;
        }
        Some(keyword_proposals(request))
    }
}
