use std::collections::HashMap;

use rfx_core::assist::{Proposal, ProposalKind};
use tower_lsp::lsp_types::*;

use super::LineMap;

/// Client command that reopens the completion popup after an acceptance.
pub const REOPEN_COMMAND: &str = "editor.action.triggerSuggest";

fn item_kind(kind: ProposalKind) -> CompletionItemKind {
    match kind {
        ProposalKind::Section => CompletionItemKind::MODULE,
        ProposalKind::Setting => CompletionItemKind::PROPERTY,
        ProposalKind::LocalKeyword | ProposalKind::ResourceKeyword | ProposalKind::LibraryKeyword => {
            CompletionItemKind::FUNCTION
        }
        ProposalKind::Library | ProposalKind::Resource | ProposalKind::VariablesFile => CompletionItemKind::FILE,
        ProposalKind::ScalarVariable | ProposalKind::ListVariable | ProposalKind::DictionaryVariable => {
            CompletionItemKind::VARIABLE
        }
        ProposalKind::ReservedWord => CompletionItemKind::KEYWORD,
        ProposalKind::TemplateArguments => CompletionItemKind::SNIPPET,
        ProposalKind::QuickAssist => CompletionItemKind::TEXT,
    }
}

fn escape_snippet(text: &str, out: &mut String) {
    for c in text.chars() {
        if matches!(c, '$' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Snippet form of the inserted text: linked regions become numbered
/// placeholders, otherwise the cursor position becomes `$0`. `None` when the
/// plain text already leaves the cursor at its end.
pub fn snippet_text(proposal: &Proposal) -> Option<String> {
    let base = proposal.replacement.offset;
    let text = &proposal.text;
    let mut regions: Vec<(usize, usize)> = proposal
        .linked_regions
        .iter()
        .filter_map(|r| {
            let start = r.offset.checked_sub(base)?;
            let end = start + r.length;
            (end <= text.len() && text.is_char_boundary(start) && text.is_char_boundary(end)).then_some((start, end))
        })
        .collect();
    regions.sort_unstable();

    let mut out = String::with_capacity(text.len() + 8);
    if regions.is_empty() {
        let cursor = proposal.cursor_position;
        if cursor >= text.len() || !text.is_char_boundary(cursor) {
            return None;
        }
        escape_snippet(&text[..cursor], &mut out);
        out.push_str("$0");
        escape_snippet(&text[cursor..], &mut out);
        return Some(out);
    }

    let mut at = 0;
    for (n, (start, end)) in regions.into_iter().enumerate() {
        if start < at {
            continue;
        }
        escape_snippet(&text[at..start], &mut out);
        out.push_str(&format!("${{{}:", n + 1));
        escape_snippet(&text[start..end], &mut out);
        out.push('}');
        at = end;
    }
    escape_snippet(&text[at..], &mut out);
    Some(out)
}

/// LSP item for a proposal. `order` keeps the aggregator's ordering in the client.
pub fn to_completion_item(proposal: &Proposal, order: usize, document: &str, map: &LineMap<'_>) -> CompletionItem {
    let replacement = proposal.replacement;
    let (new_text, format) = match snippet_text(proposal) {
        Some(snippet) => (snippet, InsertTextFormat::SNIPPET),
        None => (proposal.text.clone(), InsertTextFormat::PLAIN_TEXT),
    };
    let additional: Vec<TextEdit> = proposal
        .post_accept
        .iter()
        .filter_map(|op| op.edit(document))
        .map(|edit| {
            let at = map.position(edit.offset);
            TextEdit {
                range: Range::new(at, at),
                new_text: edit.text,
            }
        })
        .collect();
    let command = proposal.reopens_proposals.then(|| Command {
        title: "Show proposals".to_string(),
        command: REOPEN_COMMAND.to_string(),
        arguments: None,
    });

    CompletionItem {
        label: proposal.display_string().to_string(),
        kind: Some(item_kind(proposal.kind)),
        detail: proposal.secondary_info.as_ref().and_then(|i| i.lines().next()).map(str::to_string),
        documentation: proposal.secondary_info.clone().map(|info| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::PlainText,
                value: info,
            })
        }),
        sort_text: Some(format!("{order:05}")),
        filter_text: Some(proposal.display_string().to_string()),
        insert_text_format: Some(format),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range: map.range(replacement.offset, replacement.end()),
            new_text,
        })),
        additional_text_edits: (!additional.is_empty()).then_some(additional),
        command,
        ..Default::default()
    }
}

/// Code action applying a quick assist proposal as a workspace edit.
pub fn quick_assist_action(proposal: &Proposal, uri: &Url, map: &LineMap<'_>) -> CodeAction {
    let edit = TextEdit {
        range: map.range(proposal.replacement.offset, proposal.replacement.end()),
        new_text: proposal.text.clone(),
    };
    CodeAction {
        title: proposal.display_string().to_string(),
        kind: Some(CodeActionKind::REFACTOR_REWRITE),
        edit: Some(WorkspaceEdit {
            changes: Some(HashMap::from([(uri.clone(), vec![edit])])),
            ..Default::default()
        }),
        ..Default::default()
    }
}
