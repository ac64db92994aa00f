//! Applying an accepted proposal: main edit, post-accept edits, linked editing
//! and the queued request to reopen the proposal list.

use serde::Serialize;
use tracing::debug;

use super::proposal::{PostAcceptOperation, Proposal, ProposalError, Region};
use crate::model::{SectionKind, SuiteDocument, normalize};

/// Plain insertion produced by a post-accept operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertEdit {
    pub offset: usize,
    pub text: String,
}

impl PostAcceptOperation {
    /// Edit to run against `document`, or `None` when there is nothing to do
    /// (e.g. the import is already there).
    pub fn edit(&self, document: &str) -> Option<InsertEdit> {
        match self {
            PostAcceptOperation::AddImport { kind, name, separator } => {
                let parsed = SuiteDocument::new("", document);
                let wanted = normalize(name);
                let present = parsed
                    .model
                    .imports
                    .iter()
                    .any(|i| i.kind == *kind && i.name.as_ref().is_some_and(|n| normalize(&n.text) == wanted));
                if present {
                    return None;
                }
                let row = format!("{}{}{}", kind.setting_name(), separator, name);
                let header = parsed.model.sections.iter().find(|s| s.kind == SectionKind::Settings);
                Some(match header {
                    Some(section) => {
                        let line_end = parsed.lines.range(section.header.line).end;
                        if line_end >= document.len() {
                            InsertEdit {
                                offset: document.len(),
                                text: format!("\n{row}"),
                            }
                        } else {
                            let after_terminator = document[line_end..]
                                .find('\n')
                                .map(|i| line_end + i + 1)
                                .unwrap_or(document.len());
                            InsertEdit {
                                offset: after_terminator,
                                text: format!("{row}\n"),
                            }
                        }
                    }
                    None => InsertEdit {
                        offset: 0,
                        text: format!("{}\n{row}\n\n", SectionKind::Settings.header().unwrap_or("*** Settings ***")),
                    },
                })
            }
        }
    }
}

/// Regions edited together after acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedEditSession {
    pub regions: Vec<Region>,
    /// Where the cursor goes when the session ends.
    pub exit_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptOutcome {
    pub selection: Region,
    pub linked_regions: Vec<Region>,
    pub reopen_proposals: bool,
}

/// Applies proposals and tracks the single active linked-edit session.
#[derive(Debug, Default)]
pub struct AcceptanceHandler {
    session: Option<LinkedEditSession>,
    reopen_requested: bool,
}

fn shift(region: Region, at: usize, by: usize) -> Region {
    if region.offset >= at { region.shifted(by) } else { region }
}

impl AcceptanceHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the main edit, then every post-accept operation in order. A prior
    /// linked-edit session is replaced; a reopen request is queued, never run inline.
    pub fn accept(&mut self, proposal: &Proposal, document: &mut String) -> Result<AcceptOutcome, ProposalError> {
        let mut selection = proposal.apply(document)?;
        let mut regions = proposal.linked_regions.clone();
        let mut exit_offset = proposal.replacement.offset + proposal.text.len();

        for operation in &proposal.post_accept {
            let Some(edit) = operation.edit(document) else {
                continue;
            };
            document.insert_str(edit.offset, &edit.text);
            let by = edit.text.len();
            selection = shift(selection, edit.offset, by);
            regions = regions.into_iter().map(|r| shift(r, edit.offset, by)).collect();
            if exit_offset >= edit.offset {
                exit_offset += by;
            }
        }

        if self.session.take().is_some() {
            debug!("linked edit session replaced");
        }
        if !regions.is_empty() {
            self.session = Some(LinkedEditSession {
                regions: regions.clone(),
                exit_offset,
            });
        }
        if proposal.reopens_proposals {
            self.reopen_requested = true;
        }
        Ok(AcceptOutcome {
            selection,
            linked_regions: regions,
            reopen_proposals: proposal.reopens_proposals,
        })
    }

    pub fn active_session(&self) -> Option<&LinkedEditSession> {
        self.session.as_ref()
    }

    pub fn cancel_session(&mut self) {
        self.session = None;
    }

    /// Returns and clears the queued reopen request.
    pub fn take_reopen_request(&mut self) -> bool {
        std::mem::take(&mut self.reopen_requested)
    }
}
