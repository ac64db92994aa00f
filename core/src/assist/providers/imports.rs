use super::keywords::{is_call_position, is_setting_keyword_position};
use super::{AssistRequest, EXECUTABLE, ProposalProvider, SETTINGS, ranked_proposals};
use crate::assist::index::{BUILTIN_LIBRARY, normalize_path, relative_path};
use crate::assist::matcher::{MatchKind, ProposalMatcher};
use crate::assist::proposal::{Proposal, ProposalKind, Region};
use crate::model::{ImportKind, SectionKind, SettingKind, normalize};

const RESOURCE_EXTENSIONS: &[&str] = &["robot", "resource", "txt", "tsv"];
const VARIABLE_FILE_EXTENSIONS: &[&str] = &["py", "yaml", "yml", "json"];

/// `Library.` and `resource.` qualifiers in keyword positions; accepting one
/// reopens the list so keywords of that source show up next.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportsInCodeProvider;

/// Same qualifiers in keyword-taking settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportsInSettingsProvider;

#[derive(Debug, Default, Clone, Copy)]
pub struct LibrariesImportProvider;

#[derive(Debug, Default, Clone, Copy)]
pub struct ResourcesImportProvider;

#[derive(Debug, Default, Clone, Copy)]
pub struct VariablesImportProvider;

/// `WITH NAME  alias` after the arguments of a library import.
#[derive(Debug, Default, Clone, Copy)]
pub struct WithNameProvider;

fn qualifier_proposals(request: &AssistRequest<'_>) -> Vec<Proposal> {
    let mut qualifiers: Vec<(String, ProposalKind)> = Vec::new();
    let mut push = |name: String, kind: ProposalKind| {
        if !qualifiers.iter().any(|(q, _)| normalize(q) == normalize(&name)) {
            qualifiers.push((name, kind));
        }
    };
    for import in &request.document.model.imports {
        let kind = match import.kind {
            ImportKind::Library => ProposalKind::Library,
            ImportKind::Resource => ProposalKind::Resource,
            ImportKind::Variables => continue,
        };
        if let Some(qualifier) = import.qualifier() {
            push(qualifier, kind);
        }
    }
    push(BUILTIN_LIBRARY.to_string(), ProposalKind::Library);

    let labels: Vec<String> = qualifiers.iter().map(|(q, _)| format!("{q}.")).collect();
    let prefix = &request.position.prefix;
    let replacement = request.cell_replacement();
    ProposalMatcher::rank(&labels, prefix)
        .into_iter()
        .filter_map(|m| {
            Proposal::builder()
                .text(m.candidate.clone())
                .label(m.candidate.clone())
                .replace(replacement)
                .matched_prefix(prefix.len())
                .decorate_prefix(m.kind == MatchKind::Prefix)
                .kind(qualifiers[m.index].1)
                .reopens_proposals(true)
                .build()
                .ok()
        })
        .collect()
}

impl ProposalProvider for ImportsInCodeProvider {
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
        Some(qualifier_proposals(request))
    }
}

impl ProposalProvider for ImportsInSettingsProvider {
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
        Some(qualifier_proposals(request))
    }
}

/// Whether the cursor is in the name cell of an import row of `kind`.
fn at_import_name(request: &AssistRequest<'_>, kind: SettingKind) -> bool {
    request.in_cell() && request.position.cell_index == 1 && SettingKind::from_declaration(request.cell(0)) == kind
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn file_proposals(request: &AssistRequest<'_>, paths: Vec<String>, extensions: &[&str], kind: ProposalKind) -> Vec<Proposal> {
    let own = normalize_path(&request.document.path);
    let relative: Vec<String> = paths
        .into_iter()
        .filter(|p| *p != own && has_extension(p, extensions))
        .map(|p| relative_path(&request.document.path, &p))
        .collect();
    ranked_proposals(&relative, &request.position.prefix, request.cell_replacement(), kind, str::to_string)
}

impl ProposalProvider for LibrariesImportProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        SETTINGS
    }

    fn title(&self) -> &'static str {
        "Libraries"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        if !at_import_name(request, SettingKind::Library) {
            return None;
        }
        let names = request.index.library_names();
        Some(ranked_proposals(
            &names,
            &request.position.prefix,
            request.cell_replacement(),
            ProposalKind::Library,
            str::to_string,
        ))
    }
}

impl ProposalProvider for ResourcesImportProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        SETTINGS
    }

    fn title(&self) -> &'static str {
        "Resources"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        if !at_import_name(request, SettingKind::Resource) {
            return None;
        }
        let paths = request.index.resource_paths();
        Some(file_proposals(request, paths, RESOURCE_EXTENSIONS, ProposalKind::Resource))
    }
}

impl ProposalProvider for VariablesImportProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        SETTINGS
    }

    fn title(&self) -> &'static str {
        "Variable files"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        if !at_import_name(request, SettingKind::Variables) {
            return None;
        }
        let paths = request.index.variable_file_paths();
        Some(file_proposals(request, paths, VARIABLE_FILE_EXTENSIONS, ProposalKind::VariablesFile))
    }
}

const WITH_NAME: &str = "WITH NAME";
const ALIAS_PLACEHOLDER: &str = "alias";

impl ProposalProvider for WithNameProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        SETTINGS
    }

    fn title(&self) -> &'static str {
        "Settings"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        let position = &request.position;
        if !request.in_cell() || position.cell_index < 2 {
            return None;
        }
        if SettingKind::from_declaration(request.cell(0)) != SettingKind::Library || request.cell(1).is_empty() {
            return None;
        }
        if (2..position.cell_index).any(|i| normalize(request.cell(i)) == "withname") {
            return None;
        }

        let separator = request.separator();
        let replacement = request.cell_replacement();
        let alias_start = WITH_NAME.len() + separator.len();
        let proposals = ProposalMatcher::rank(&[WITH_NAME], &position.prefix)
            .into_iter()
            .filter_map(|m| {
                Proposal::builder()
                    .text(format!("{WITH_NAME}{separator}{ALIAS_PLACEHOLDER}"))
                    .label(WITH_NAME)
                    .replace(replacement)
                    .matched_prefix(position.prefix.len())
                    .decorate_prefix(m.kind == MatchKind::Prefix)
                    .cursor(alias_start)
                    .select(ALIAS_PLACEHOLDER.len())
                    .linked_regions(vec![Region::new(replacement.offset + alias_start, ALIAS_PLACEHOLDER.len())])
                    .kind(ProposalKind::ReservedWord)
                    .build()
                    .ok()
            })
            .collect();
        Some(proposals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::index::StaticProjectIndex;
    use crate::assist::providers::test_support::*;
    use crate::model::SuiteDocument;

    fn document(body: &[&str]) -> SuiteDocument {
        let mut lines = vec![
            "*** Settings ***",
            "Library  Collections",
            "Library  OperatingSystem  WITH NAME  OS",
            "Resource  res/common.robot",
            "*** Test Cases ***",
            "case",
        ];
        lines.extend_from_slice(body);
        SuiteDocument::from_lines("suite.robot", &lines)
    }

    #[test]
    fn test_qualifiers_in_code_reopen_the_list() {
        let document = document(&["  co"]);
        let context = context_with(StaticProjectIndex::default(), true);
        let proposals = compute_at(&ImportsInCodeProvider, &document, &context, 6, 4).unwrap();
        assert_eq!(labels(&proposals), vec!["Collections.", "common."]);
        assert!(proposals.iter().all(|p| p.reopens_proposals));
        assert_eq!(proposals[0].kind, ProposalKind::Library);
        assert_eq!(proposals[1].kind, ProposalKind::Resource);
        assert_eq!(proposals[0].replacement.length, 2);
    }

    #[test]
    fn test_qualifiers_use_alias() {
        let document = document(&["  "]);
        let context = context_with(StaticProjectIndex::default(), true);
        let proposals = compute_at(&ImportsInCodeProvider, &document, &context, 6, 2).unwrap();
        assert_eq!(labels(&proposals), vec!["BuiltIn.", "Collections.", "common.", "OS."]);
        assert!(compute_at(&ImportsInCodeProvider, &document, &context, 5, 2).is_none());
    }

    #[test]
    fn test_qualifiers_in_settings() {
        let lines = ["*** Settings ***", "Library  Collections", "Test Setup  C"];
        let document = SuiteDocument::from_lines("suite.robot", &lines);
        let context = context_with(StaticProjectIndex::default(), true);
        let proposals = compute_at(&ImportsInSettingsProvider, &document, &context, 2, 13).unwrap();
        assert_eq!(labels(&proposals), vec!["Collections."]);
        assert!(compute_at(&ImportsInSettingsProvider, &document, &context, 1, 13).is_none());
    }

    #[test]
    fn test_library_names() {
        let index = StaticProjectIndex::default()
            .with_library("Collections", vec![])
            .with_library("String", vec![])
            .with_library("Process", vec![]);
        let document = SuiteDocument::from_lines("suite.robot", &["*** Settings ***", "Library  s", "Library  x  y"]);
        let context = context_with(index, true);
        let proposals = compute_at(&LibrariesImportProvider, &document, &context, 1, 10).unwrap();
        assert_eq!(labels(&proposals), vec!["String", "Collections", "Process"]);
        assert!(compute_at(&LibrariesImportProvider, &document, &context, 2, 13).is_none());
        assert!(compute_at(&LibrariesImportProvider, &document, &context, 1, 3).is_none());
    }

    #[test]
    fn test_resource_paths_are_relative_and_filtered() {
        let index = StaticProjectIndex::default()
            .with_resource("res/common.robot", vec![], vec![])
            .with_resource("res/notes.md", vec![], vec![])
            .with_resource("suites/suite.robot", vec![], vec![])
            .with_variable_file("vars/env.py", vec![]);
        let document =
            SuiteDocument::from_lines("suites/suite.robot", &["*** Settings ***", "Resource  ", "Variables  "]);
        let context = context_with(index, true);
        let resources = compute_at(&ResourcesImportProvider, &document, &context, 1, 10).unwrap();
        assert_eq!(labels(&resources), vec!["../res/common.robot"]);
        let variables = compute_at(&VariablesImportProvider, &document, &context, 2, 11).unwrap();
        assert_eq!(labels(&variables), vec!["../vars/env.py"]);
        assert_eq!(variables[0].kind, ProposalKind::VariablesFile);
    }

    #[test]
    fn test_with_name_after_library_arguments() {
        let document = SuiteDocument::from_lines("suite.robot", &["*** Settings ***", "Library  FooBar  "]);
        let context = context_with(StaticProjectIndex::default(), true);
        let proposals = compute_at(&WithNameProvider, &document, &context, 1, usize::MAX).unwrap();
        assert_eq!(proposals.len(), 1);
        let with_name = &proposals[0];
        let insert_at = offset(&document, 1, 17);
        assert_eq!(with_name.text, "WITH NAME  alias");
        assert_eq!(with_name.replacement, Region::new(insert_at, 0));
        assert_eq!(with_name.linked_regions, vec![Region::new(insert_at + 11, 5)]);
        assert_eq!(with_name.selection(), Region::new(insert_at + 11, 5));
    }

    #[test]
    fn test_with_name_not_applicable() {
        let lines = [
            "*** Settings ***",
            "Library  FooBar  WITH NAME  x  ",
            "Resource  file.robot  ",
            "Library  ",
        ];
        let document = SuiteDocument::from_lines("suite.robot", &lines);
        let context = context_with(StaticProjectIndex::default(), true);
        assert!(compute_at(&WithNameProvider, &document, &context, 1, usize::MAX).is_none());
        assert!(compute_at(&WithNameProvider, &document, &context, 2, usize::MAX).is_none());
        assert!(compute_at(&WithNameProvider, &document, &context, 3, usize::MAX).is_none());
        let typed = SuiteDocument::from_lines("suite.robot", &["*** Settings ***", "Library  Foo  arg  zz"]);
        let none_matching = compute_at(&WithNameProvider, &typed, &context, 1, usize::MAX).unwrap();
        assert!(none_matching.is_empty());
    }
}
