use super::{AssistRequest, ProposalProvider};
use crate::assist::index::imported_variables;
use crate::assist::matcher::{MatchKind, ProposalMatcher};
use crate::assist::proposal::{Proposal, ProposalKind, Region};
use crate::model::variable::{open_variable_start, parse_variable};
use crate::model::{ExecutableRow, SectionKind, VariableKind, is_for_marker};
use crate::util::fast_map::fast_hash_set_new;

const APPLICABLE: &[SectionKind] = &[
    SectionKind::Keywords,
    SectionKind::TestCases,
    SectionKind::Tasks,
    SectionKind::Settings,
    SectionKind::Variables,
];

const BUILT_IN_VARIABLES: &[&str] = &[
    "${CURDIR}",
    "${EMPTY}",
    "${EXECDIR}",
    "${False}",
    "${None}",
    "${OUTPUT_DIR}",
    "${SPACE}",
    "${SUITE_NAME}",
    "${TEMPDIR}",
    "${TEST_NAME}",
    "${True}",
    "@{EMPTY}",
    "&{EMPTY}",
];

/// Variable references visible at the cursor.
#[derive(Debug, Default, Clone, Copy)]
pub struct VariablesProvider;

fn row_variables(rows: &[ExecutableRow], before_line: usize, out: &mut Vec<String>) {
    for row in rows.iter().filter(|r| r.line < before_line) {
        for token in row.assignments() {
            if let Some((kind, name)) = parse_variable(&token.text) {
                out.push(kind.decorate(name));
            }
        }
        if row.is_for_header() {
            let loop_vars = row.action_cells().iter().skip(1).take_while(|t| !t.text.trim().starts_with("IN"));
            for token in loop_vars {
                if let Some((kind, name)) = parse_variable(&token.text) {
                    out.push(kind.decorate(name));
                }
            }
        }
    }
}

/// Every variable visible at the request position, deduplicated in discovery order.
fn visible_variables(request: &AssistRequest<'_>) -> Vec<String> {
    let model = &request.document.model;
    let line = request.position.line;
    let mut variables: Vec<String> = model.variables.iter().filter_map(|v| v.reference()).collect();
    variables.extend(imported_variables(request.document, request.index));

    if let Some(keyword) = model.keyword_at_line(line) {
        for token in keyword.arguments() {
            if let Some((kind, name)) = parse_variable(token.text.split('=').next().unwrap_or(&token.text)) {
                variables.push(kind.decorate(name));
            }
        }
        row_variables(&keyword.rows, line, &mut variables);
    }
    if let Some(test) = model.test_case_at_line(line) {
        row_variables(&test.rows, line, &mut variables);
    }
    variables.extend(BUILT_IN_VARIABLES.iter().map(|v| v.to_string()));

    let mut seen = fast_hash_set_new();
    variables.retain(|v| seen.insert(v.to_lowercase()));
    variables
}

fn kind_of(reference: &str) -> ProposalKind {
    match reference.chars().next().and_then(VariableKind::from_sigil) {
        Some(VariableKind::List) => ProposalKind::ListVariable,
        Some(VariableKind::Dictionary) => ProposalKind::DictionaryVariable,
        _ => ProposalKind::ScalarVariable,
    }
}

impl ProposalProvider for VariablesProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        APPLICABLE
    }

    fn title(&self) -> &'static str {
        "Variables"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        let position = &request.position;
        if !request.in_cell() || position.cell_index == 0 {
            return None;
        }
        let cell = position.cell()?;
        // Loop variables are being declared, not referenced.
        if is_for_marker(request.cell(position.cell_index - 1)) {
            return Some(Vec::new());
        }

        let variables = visible_variables(request);
        let (query, replacement) = match open_variable_start(&cell.text, position.offset_in_cell) {
            Some(start) => (
                &cell.text[start..position.offset_in_cell],
                Region::new(cell.range.start + start, position.offset_in_cell - start),
            ),
            None => (position.prefix.as_str(), request.cell_replacement()),
        };
        let by_sigil = query.starts_with(['$', '@', '&', '%']);
        let keys: Vec<&str> = variables
            .iter()
            .map(|v| {
                if by_sigil {
                    v.as_str()
                } else {
                    parse_variable(v).map(|(_, name)| name).unwrap_or(v)
                }
            })
            .collect();

        let proposals = ProposalMatcher::rank(&keys, query)
            .into_iter()
            .filter_map(|m| {
                let reference = &variables[m.index];
                Proposal::builder()
                    .text(reference.clone())
                    .label(reference.clone())
                    .replace(replacement)
                    .matched_prefix(query.len())
                    .decorate_prefix(by_sigil && m.kind == MatchKind::Prefix)
                    .kind(kind_of(reference))
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
    use crate::assist::providers::test_support::*;
    use crate::model::SuiteDocument;

    const LINES: &[&str] = &[
        "*** Variables ***",
        "${a}  1",
        "${b}  2",
        "@{items}  x  y",
        "*** Keywords ***",
        "kw",
        "  [Arguments]  ${arg}  ${opt}=1",
        "  ${local}=  Set Variable  1",
        "  FOR  ${i}  IN  @{items}",
        "  \\  Log  ${i}",
        "  END",
        "  Log  a",
        "  Log  d${bcdef",
    ];

    #[test]
    fn test_whole_cell_is_replaced_by_name_match() {
        let proposals = run(&VariablesProvider, LINES, 11, 8).unwrap();
        assert_eq!(labels(&proposals)[0], "${a}");
        assert!(labels(&proposals).contains(&"${arg}"), "name starts with the prefix");
        assert_eq!(proposals[0].replacement.length, 1);
        assert_eq!(proposals[0].prefix_highlight(), None);
    }

    #[test]
    fn test_open_variable_prefix_is_replaced_alone() {
        let mut document = SuiteDocument::from_lines("suite.robot", LINES);
        let context = context_with(Default::default(), true);
        let proposals = compute_at(&VariablesProvider, &document, &context, 12, 11).unwrap();
        assert_eq!(labels(&proposals), vec!["${b}"]);

        let cell_start = offset(&document, 12, 7);
        assert_eq!(proposals[0].replacement, Region::new(cell_start + 1, 3));
        proposals[0].apply(&mut document.text).unwrap();
        assert!(document.text.ends_with("  Log  d${b}cdef"), "{}", document.text);
    }

    #[test]
    fn test_first_spelling_of_a_variable_is_kept() {
        let lines = ["*** Variables ***", "${Host}  a", "${HOST}  b", "*** Keywords ***", "kw", "  Log  ${h"];
        let proposals = run(&VariablesProvider, &lines, 5, usize::MAX).unwrap();
        assert_eq!(labels(&proposals), vec!["${Host}"]);
    }

    #[test]
    fn test_visible_variables_in_keyword() {
        let proposals = run(&VariablesProvider, LINES, 11, 7).unwrap();
        let labels = labels(&proposals);
        for expected in ["${a}", "@{items}", "${arg}", "${opt}", "${local}", "${i}", "${EMPTY}"] {
            assert!(labels.contains(&expected), "missing {expected}: {labels:?}");
        }
    }

    #[test]
    fn test_sigil_prefix_matches_whole_reference() {
        let list_only = run(&VariablesProvider, &["*** Keywords ***", "kw", "  Log  @{"], 2, 9).unwrap();
        assert!(!list_only.is_empty());
        assert!(labels(&list_only).iter().all(|l| l.starts_with('@')), "{:?}", labels(&list_only));
        assert_eq!(list_only[0].kind, ProposalKind::ListVariable);
        assert_eq!(list_only[0].prefix_highlight(), Some(0..2));
    }

    #[test]
    fn test_loop_variable_declaration_offers_nothing() {
        let proposals = run(&VariablesProvider, LINES, 8, 8).unwrap();
        assert!(proposals.is_empty());
    }

    #[test]
    fn test_not_applicable_in_first_cell() {
        assert!(run(&VariablesProvider, LINES, 1, 2).is_none());
        assert!(run(&VariablesProvider, LINES, 5, 1).is_none());
    }
}
