use std::sync::Arc;

use rfx_core::assist::index::{KeywordEntity, KeywordScope};
use rfx_core::assist::providers::{
    CodeReservedWordsProvider, GeneralSettingsProvider, KeywordSettingsProvider, WithNameProvider,
};
use rfx_core::assist::regions::linked_regions;
use rfx_core::assist::*;
use rfx_core::model::{SectionKind, SuiteDocument};
use rfx_core::text::split_line;

fn context(index: StaticProjectIndex) -> AssistContext {
    let preferences = AssistPreferences {
        separator: "  ".to_string(),
        ..AssistPreferences::default()
    };
    AssistContext::new(Arc::new(SharedPreferences::new(preferences)), Arc::new(index))
}

fn end_of_line(document: &SuiteDocument, line: usize) -> usize {
    document.lines.range(line).end
}

fn labels(proposals: &[Proposal]) -> Vec<&str> {
    proposals.iter().map(Proposal::display_string).collect()
}

#[test]
fn test_scenario_with_name_after_library() {
    let document = SuiteDocument::from_lines("suite.robot", &["*** Settings ***", "Library  FooBar  "]);
    let context = context(StaticProjectIndex::default());
    let request = AssistRequest::new(&document, end_of_line(&document, 1), &context);
    let proposals = WithNameProvider.compute(&request).expect("applicable after the library name");
    assert_eq!(proposals.len(), 1);

    let mut text = document.text.clone();
    proposals[0].apply(&mut text).unwrap();
    assert_eq!(text, "*** Settings ***\nLibrary  FooBar  WITH NAME  alias");
}

#[test]
fn test_scenario_keyword_settings_in_empty_row() {
    let document = SuiteDocument::from_lines("suite.robot", &["*** Keywords ***", "keyword", "  "]);
    let context = context(StaticProjectIndex::default());
    let request = AssistRequest::new(&document, end_of_line(&document, 2), &context);
    assert_eq!(request.position.section, SectionKind::Keywords);
    let proposals = KeywordSettingsProvider.compute(&request).unwrap();
    assert_eq!(
        labels(&proposals),
        vec!["[Arguments]", "[Documentation]", "[Return]", "[Tags]", "[Teardown]", "[Timeout]"]
    );
}

#[test]
fn test_scenario_loop_kinds() {
    let document = SuiteDocument::from_lines("suite.robot", &["*** Test Cases ***", "case", ":FOR  ${x}  "]);
    let context = context(StaticProjectIndex::default());
    let request = AssistRequest::new(&document, end_of_line(&document, 2), &context);
    let proposals = CodeReservedWordsProvider.compute(&request).unwrap();
    assert_eq!(proposals.len(), 4);
    assert_eq!(labels(&proposals), vec!["IN", "IN ENUMERATE", "IN RANGE", "IN ZIP"]);
}

#[test]
fn test_locator_agrees_with_cell_splitter() {
    let document = SuiteDocument::from_lines(
        "suite.robot",
        &[
            "*** Settings ***",
            "Library    Collections    WITH NAME    C",
            "| Resource | common.robot |",
            "*** Test Cases ***",
            "case  [Tags]  a",
            "    ${x}=    Get Length    ${items}  # note",
        ],
    );
    for offset in 0..=document.text.len() {
        let position = PositionLocator::locate(&document, offset);
        let line_text = document.line_text(position.line);
        let split = split_line(line_text, document.format);
        assert_eq!(position.cells.len(), split.len(), "offset {offset}");
        for (located, range) in position.cells.iter().zip(&split.cells) {
            assert_eq!(located.range, position.line_range.start + range.start..position.line_range.start + range.end);
        }
    }
    for row in &document.model.settings {
        for token in std::iter::once(&row.declaration).chain(&row.args) {
            let position = PositionLocator::locate(&document, token.offset);
            assert_eq!(position.cell().map(|c| c.text.as_str()), Some(token.text.as_str()));
        }
    }
}

#[test]
fn test_not_applicable_differs_from_no_match() {
    let document = SuiteDocument::from_lines("suite.robot", &["*** Settings ***", "Zzz", "*** Keywords ***", "kw"]);
    let context = context(StaticProjectIndex::default());

    assert!(!GeneralSettingsProvider.is_applicable(SectionKind::Keywords));
    let request = AssistRequest::new(&document, end_of_line(&document, 1), &context);
    assert_eq!(GeneralSettingsProvider.compute(&request), Some(Vec::new()));

    let on_keyword_name = compute_proposals(&document, end_of_line(&document, 3), &context);
    assert_eq!(on_keyword_name, None);
}

#[test]
fn test_ranking_is_deterministic() {
    let candidates = ["Test Setup", "Test Teardown", "Test Timeout", "Test Template"];
    let mut reversed = candidates;
    reversed.reverse();
    let ranked: Vec<String> = ProposalMatcher::rank(&candidates, "Te").into_iter().map(|m| m.candidate).collect();
    let ranked_reversed: Vec<String> = ProposalMatcher::rank(&reversed, "Te").into_iter().map(|m| m.candidate).collect();
    assert_eq!(ranked.len(), 4);
    assert_eq!(ranked, ranked_reversed);
    assert_eq!(ProposalMatcher::rank(&candidates, "").len(), candidates.len());
}

#[test]
fn test_linked_regions_are_contiguous() {
    let regions = linked_regions(100, 2, &[1, 2, 3]);
    assert_eq!(regions, vec![Region::new(100, 1), Region::new(103, 2), Region::new(107, 3)]);
}

#[test]
fn test_keyword_call_with_arguments_end_to_end() {
    let index = StaticProjectIndex::default().with_library(
        "Collections",
        vec![KeywordEntity::new("Append To List", "", KeywordScope::Library).with_arguments(&["list_", "*values"])],
    );
    let document = SuiteDocument::from_lines(
        "suite.robot",
        &["*** Settings ***", "Library  Collections", "*** Test Cases ***", "case", "  appe"],
    );
    let context = context(index);
    let proposals = compute_proposals(&document, end_of_line(&document, 4), &context).unwrap();
    let append = proposals
        .iter()
        .find(|p| p.display_string() == "Append To List")
        .expect("library keyword is offered");

    let mut text = document.text.clone();
    let mut handler = AcceptanceHandler::new();
    let outcome = handler.accept(append, &mut text).unwrap();
    assert!(text.ends_with("  Append To List  list_"), "{text}");
    assert_eq!(&text[outcome.selection.offset..outcome.selection.end()], "list_");
    assert_eq!(handler.active_session().map(|s| s.regions.len()), Some(1));
}

#[test]
fn test_quick_assists_offered_on_call_rows() {
    let document = SuiteDocument::from_lines("suite.robot", &["*** Keywords ***", "kw", "  Get Length  ${x}"]);
    let context = context(StaticProjectIndex::default());
    let assists = compute_quick_assists(&document, document.lines.range(2).start + 4, &context);
    assert_eq!(labels(&assists), vec!["Assign to local scalar", "Assign to local list", "Assign to local dictionary"]);
}

#[test]
fn test_cycling_through_default_groups() {
    let document = SuiteDocument::from_lines("suite.robot", &["*** Keywords ***", "kw", "  "]);
    let context = context(StaticProjectIndex::default());
    let at = end_of_line(&document, 2);
    let mut cycling = CyclingAggregator::default();
    let titles: Vec<String> = (0..4).map(|_| cycling.compute(&document, at, &context).title).collect();
    assert_eq!(titles, vec!["Keywords", "Variables", "Settings", "Keywords"]);
}
