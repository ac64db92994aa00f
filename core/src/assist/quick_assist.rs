//! Code changes offered for the row under the cursor rather than for a typed prefix.

use super::context::AssistContext;
use super::locator::PositionLocator;
use super::proposal::{Proposal, ProposalKind, Region};
use crate::model::{ExecutableRow, SuiteDocument, VariableKind};

pub trait QuickAssistProvider: Send + Sync {
    fn compute(&self, document: &SuiteDocument, offset: usize, context: &AssistContext) -> Vec<Proposal>;
}

/// Assigns the result of a keyword call to a new local variable.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalAssignQuickAssist;

const VARIABLE_NAME: &str = "var";

fn row_at(document: &SuiteDocument, line: usize) -> Option<&ExecutableRow> {
    let model = &document.model;
    let rows = match model.test_case_at_line(line) {
        Some(test) => &test.rows,
        None => &model.keyword_at_line(line)?.rows,
    };
    rows.iter().find(|r| r.line == line)
}

impl QuickAssistProvider for LocalAssignQuickAssist {
    fn compute(&self, document: &SuiteDocument, offset: usize, context: &AssistContext) -> Vec<Proposal> {
        let position = PositionLocator::locate(document, offset);
        if !position.section.is_executable() {
            return Vec::new();
        }
        let Some(row) = row_at(document, position.line) else {
            return Vec::new();
        };
        if row.is_empty() || row.is_for_header() || row.call().is_none() {
            return Vec::new();
        }
        let Some(target) = row.action_cells().first() else {
            return Vec::new();
        };
        if target.text.trim() == "END" {
            return Vec::new();
        }

        let preferences = context.preferences();
        let separator = preferences.separator(document.format.is_tsv());
        [
            (VariableKind::Scalar, "Assign to local scalar"),
            (VariableKind::List, "Assign to local list"),
            (VariableKind::Dictionary, "Assign to local dictionary"),
        ]
        .into_iter()
        .filter_map(|(kind, label)| {
            let variable = kind.decorate(VARIABLE_NAME);
            Proposal::builder()
                .text(format!("{variable}{separator}"))
                .label(label)
                .replace(Region::new(target.offset, 0))
                .cursor(2)
                .select(VARIABLE_NAME.len())
                .linked_regions(vec![Region::new(target.offset + 2, VARIABLE_NAME.len())])
                .decorate_prefix(false)
                .kind(ProposalKind::QuickAssist)
                .build()
                .ok()
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assist(lines: &[&str], line: usize, column: usize) -> (SuiteDocument, Vec<Proposal>) {
        let document = SuiteDocument::from_lines("suite.robot", lines);
        let offset = document.lines.range(line).start + column;
        let proposals = LocalAssignQuickAssist.compute(&document, offset, &AssistContext::standalone());
        (document, proposals)
    }

    fn applied(document: &SuiteDocument, proposals: &[Proposal]) -> Vec<String> {
        proposals
            .iter()
            .map(|p| {
                let mut text = document.text.clone();
                p.apply(&mut text).unwrap();
                text
            })
            .collect()
    }

    #[test]
    fn test_assign_ordinary_call() {
        let (document, proposals) = assist(&["*** Test Cases ***", "test", "  keyword  1  2  3"], 2, 2);
        let labels: Vec<&str> = proposals.iter().map(Proposal::display_string).collect();
        assert_eq!(labels, vec!["Assign to local scalar", "Assign to local list", "Assign to local dictionary"]);
        assert_eq!(
            applied(&document, &proposals),
            vec![
                "*** Test Cases ***\ntest\n  ${var}    keyword  1  2  3",
                "*** Test Cases ***\ntest\n  @{var}    keyword  1  2  3",
                "*** Test Cases ***\ntest\n  &{var}    keyword  1  2  3",
            ]
        );
        let start = document.lines.range(2).start + 2;
        assert_eq!(proposals[0].selection(), Region::new(start + 2, 3));
    }

    #[test]
    fn test_assign_before_existing_assignment() {
        let (document, proposals) = assist(&["*** Test Cases ***", "test", "  ${x}=  keyword  1"], 2, 9);
        assert_eq!(applied(&document, &proposals)[0], "*** Test Cases ***\ntest\n  ${var}    ${x}=  keyword  1");
    }

    #[test]
    fn test_assign_inside_loops() {
        let old_style = ["*** Test Cases ***", "test", "  :FOR  ${i}  IN RANGE  10", "  \\  keyword  1"];
        let (document, proposals) = assist(&old_style, 3, 5);
        assert_eq!(
            applied(&document, &proposals)[1],
            "*** Test Cases ***\ntest\n  :FOR  ${i}  IN RANGE  10\n  \\  @{var}    keyword  1"
        );

        let new_style = ["*** Test Cases ***", "test", "  FOR  ${i}  IN RANGE  10", "    keyword  1", "  END"];
        let (document, proposals) = assist(&new_style, 3, 4);
        assert_eq!(
            applied(&document, &proposals)[2],
            "*** Test Cases ***\ntest\n  FOR  ${i}  IN RANGE  10\n    &{var}    keyword  1\n  END"
        );
    }

    #[test]
    fn test_nothing_outside_calls() {
        let (_, on_name) = assist(&["*** Test Cases ***", "test", "  keyword  1  2  3"], 1, 1);
        assert!(on_name.is_empty());
        let (_, loop_header) = assist(&["*** Test Cases ***", "test", "  FOR  ${i}  IN RANGE  10", "    kw", "  END"], 2, 7);
        assert!(loop_header.is_empty());
        let (_, comment_row) = assist(&["*** Test Cases ***", "test", "  \\  # comment"], 2, 2);
        assert!(comment_row.is_empty());
        let (_, setting) = assist(&["*** Test Cases ***", "test", "  [Setup]  Log  1"], 2, 11);
        assert!(setting.is_empty());
        let (_, settings_table) = assist(&["*** Settings ***", "Library  Collections"], 1, 9);
        assert!(settings_table.is_empty());
    }
}
