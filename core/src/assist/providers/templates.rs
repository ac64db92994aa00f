use super::{AssistRequest, ProposalProvider};
use crate::assist::index::visible_keywords;
use crate::assist::matcher::{MatchKind, ProposalMatcher};
use crate::assist::proposal::{Proposal, ProposalKind};
use crate::assist::regions::{embedded_regions, linked_regions};
use crate::model::{SectionKind, normalize};

const TEST_LIKE: &[SectionKind] = &[SectionKind::TestCases, SectionKind::Tasks];

/// Argument placeholders for a data row of a templated test.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateArgumentsProvider;

fn embedded_names(name: &str) -> Vec<String> {
    embedded_regions(0, name)
        .into_iter()
        .map(|r| name[r.offset + 2..r.end() - 1].to_string())
        .collect()
}

impl TemplateArgumentsProvider {
    fn template_arguments(request: &AssistRequest<'_>, template: &str) -> Vec<String> {
        if template.contains("${") {
            return embedded_names(template);
        }
        let wanted = normalize(template);
        visible_keywords(request.document, request.index, false)
            .into_iter()
            .find(|k| normalize(&k.name) == wanted || normalize(&format!("{}.{}", k.source, k.name)) == wanted)
            .map(|k| k.required_arguments())
            .unwrap_or_default()
    }
}

impl ProposalProvider for TemplateArgumentsProvider {
    fn applicable_content_types(&self) -> &'static [SectionKind] {
        TEST_LIKE
    }

    fn title(&self) -> &'static str {
        "Settings"
    }

    fn compute(&self, request: &AssistRequest<'_>) -> Option<Vec<Proposal>> {
        let position = &request.position;
        if !request.in_cell() || position.cell_index != 1 || !request.cell(0).is_empty() {
            return None;
        }
        let others_empty = position
            .cells
            .iter()
            .enumerate()
            .all(|(i, c)| i == position.cell_index || c.text.trim().is_empty());
        if !others_empty {
            return None;
        }
        let model = &request.document.model;
        let test = model.test_case_at_line(position.line)?;
        let template = model.template_of(test)?;

        let args = Self::template_arguments(request, template.text.trim());
        if args.is_empty() {
            return Some(Vec::new());
        }
        let separator = request.separator();
        let text = args.join(separator);
        let replacement = request.cell_replacement();
        let lengths: Vec<usize> = args.iter().map(String::len).collect();
        let regions = linked_regions(replacement.offset, separator.len(), &lengths);

        let proposals = ProposalMatcher::rank(&[text.as_str()], &position.prefix)
            .into_iter()
            .filter_map(|m| {
                Proposal::builder()
                    .text(text.clone())
                    .label(text.clone())
                    .replace(replacement)
                    .matched_prefix(position.prefix.len())
                    .decorate_prefix(m.kind == MatchKind::Prefix)
                    .cursor(0)
                    .select(lengths[0])
                    .linked_regions(regions.clone())
                    .secondary_info(Some(format!("Template: {}", template.text.trim())))
                    .kind(ProposalKind::TemplateArguments)
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
    use crate::assist::proposal::Region;
    use crate::assist::providers::test_support::*;
    use crate::model::SuiteDocument;

    const LINES: &[&str] = &[
        "*** Settings ***",
        "Test Template  Check Values",
        "*** Test Cases ***",
        "templated",
        "  1  2",
        "  ",
        "embedded",
        "  [Template]  The sum of ${a} and ${b}",
        "  ",
        "untemplated",
        "  [Template]  NONE",
        "  ",
        "*** Keywords ***",
        "Check Values",
        "  [Arguments]  ${first}  ${second}",
        "  Should Be Equal  ${first}  ${second}",
    ];

    #[test]
    fn test_placeholders_from_keyword_arguments() {
        let document = SuiteDocument::from_lines("suite.robot", LINES);
        let context = context_with(Default::default(), true);
        let proposals = compute_at(&TemplateArgumentsProvider, &document, &context, 5, 2).unwrap();
        assert_eq!(texts(&proposals), vec!["first  second"]);
        let start = offset(&document, 5, 2);
        assert_eq!(proposals[0].linked_regions, vec![Region::new(start, 5), Region::new(start + 7, 6)]);
        assert_eq!(proposals[0].selection(), Region::new(start, 5));
    }

    #[test]
    fn test_placeholders_from_embedded_template() {
        let proposals = run(&TemplateArgumentsProvider, LINES, 8, 2).unwrap();
        assert_eq!(texts(&proposals), vec!["a  b"]);
    }

    #[test]
    fn test_not_applicable_without_template_or_on_filled_rows() {
        assert!(run(&TemplateArgumentsProvider, LINES, 11, 2).is_none(), "NONE disables the template");
        assert!(run(&TemplateArgumentsProvider, LINES, 4, 3).is_none(), "row already has data");
        assert!(run(&TemplateArgumentsProvider, LINES, 15, 2).is_none(), "keywords table");
    }
}
