use std::ops::Range as LineRange;

use rfx_core::model::{SectionKind, SuiteDocument, Token};
use tower_lsp::lsp_types::{DocumentSymbol, Range, SymbolKind};

use super::LineMap;

fn lines_range(document: &SuiteDocument, lines: &LineRange<usize>, map: &LineMap<'_>) -> Range {
    let start = document.lines.range(lines.start).start;
    let end = match lines.end.checked_sub(1) {
        Some(last) if last >= lines.start => document.lines.range(last).end,
        _ => start,
    };
    map.range(start, end)
}

fn token_range(token: &Token, map: &LineMap<'_>) -> Range {
    map.range(token.offset, token.end())
}

fn symbol(name: &str, detail: Option<&str>, kind: SymbolKind, range: Range, selection: Range) -> DocumentSymbol {
    DocumentSymbol {
        name: name.to_string(),
        detail: detail.map(str::to_string),
        kind,
        tags: None,
        #[allow(deprecated)]
        deprecated: None,
        range,
        selection_range: selection,
        children: None,
    }
}

/// One symbol per table, with its tests, tasks, keywords, variables or imports nested.
pub fn document_symbols(document: &SuiteDocument, map: &LineMap<'_>) -> Vec<DocumentSymbol> {
    let model = &document.model;
    let within = |lines: &LineRange<usize>, line: usize| lines.contains(&line);

    model
        .sections
        .iter()
        .filter(|s| s.kind != SectionKind::None)
        .map(|section| {
            let children: Vec<DocumentSymbol> = match section.kind {
                SectionKind::Settings => model
                    .imports
                    .iter()
                    .filter(|i| within(&section.lines, i.declaration.line))
                    .filter_map(|i| {
                        let name = i.name.as_ref()?;
                        Some(symbol(
                            name.text.trim(),
                            Some(i.kind.setting_name()),
                            SymbolKind::MODULE,
                            token_range(&i.declaration, map),
                            token_range(name, map),
                        ))
                    })
                    .collect(),
                SectionKind::Variables => model
                    .variables
                    .iter()
                    .filter(|v| within(&section.lines, v.declaration.line))
                    .map(|v| {
                        let range = token_range(&v.declaration, map);
                        symbol(v.declaration.text.trim(), None, SymbolKind::VARIABLE, range, range)
                    })
                    .collect(),
                SectionKind::TestCases | SectionKind::Tasks => model
                    .test_cases
                    .iter()
                    .filter(|t| within(&section.lines, t.name.line))
                    .map(|t| {
                        let detail = if t.is_task { "task" } else { "test case" };
                        symbol(
                            t.name.text.trim(),
                            Some(detail),
                            SymbolKind::METHOD,
                            lines_range(document, &t.lines, map),
                            token_range(&t.name, map),
                        )
                    })
                    .collect(),
                SectionKind::Keywords => model
                    .keywords
                    .iter()
                    .filter(|k| within(&section.lines, k.name.line))
                    .map(|k| {
                        let args: Vec<&str> = k.arguments().iter().map(|a| a.text.as_str()).collect();
                        let detail = (!args.is_empty()).then(|| args.join(", "));
                        symbol(
                            k.name.text.trim(),
                            detail.as_deref(),
                            SymbolKind::FUNCTION,
                            lines_range(document, &k.lines, map),
                            token_range(&k.name, map),
                        )
                    })
                    .collect(),
                _ => Vec::new(),
            };
            let mut table = symbol(
                section.header.text.trim(),
                None,
                SymbolKind::NAMESPACE,
                lines_range(document, &section.lines, map),
                token_range(&section.header, map),
            );
            table.children = (!children.is_empty()).then_some(children);
            table
        })
        .collect()
}
