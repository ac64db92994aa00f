use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::model::ImportKind;

/// `(offset, length)` span of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Region {
    pub offset: usize,
    pub length: usize,
}

impl Region {
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn from_range(range: Range<usize>) -> Self {
        Self {
            offset: range.start,
            length: range.end.saturating_sub(range.start),
        }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn shifted(self, by: usize) -> Self {
        Self {
            offset: self.offset + by,
            length: self.length,
        }
    }
}

/// Category shown next to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProposalKind {
    Section,
    Setting,
    LocalKeyword,
    ResourceKeyword,
    LibraryKeyword,
    Library,
    Resource,
    VariablesFile,
    ScalarVariable,
    ListVariable,
    DictionaryVariable,
    ReservedWord,
    TemplateArguments,
    QuickAssist,
}

/// Edit that runs after the proposal text has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PostAcceptOperation {
    /// Adds `<Library|Resource>  name` to the settings table.
    AddImport {
        kind: ImportKind,
        name: String,
        separator: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    MissingText,
    RegionOutOfBounds { region: Region, document_len: usize },
}

impl fmt::Display for ProposalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalError::MissingText => write!(f, "Proposal requires the text to insert"),
            ProposalError::RegionOutOfBounds { region, document_len } => write!(
                f,
                "Replacement region {}..{} does not fit a document of length {}",
                region.offset,
                region.end(),
                document_len
            ),
        }
    }
}

impl std::error::Error for ProposalError {}

/// A candidate document edit. Immutable once built; building one never touches
/// the document, only [`Proposal::apply`] does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub text: String,
    pub replacement: Region,
    pub matched_prefix_length: usize,
    /// Cursor after acceptance, relative to the replacement offset.
    pub cursor_position: usize,
    pub selection_length: usize,
    pub label: Option<String>,
    pub kind: ProposalKind,
    pub secondary_info: Option<String>,
    pub decorate_prefix: bool,
    pub linked_regions: Vec<Region>,
    pub post_accept: Vec<PostAcceptOperation>,
    pub reopens_proposals: bool,
}

impl Proposal {
    pub fn builder() -> ProposalBuilder {
        ProposalBuilder::default()
    }

    /// Label, falling back to the inserted text.
    pub fn display_string(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.text)
    }

    /// Selection after acceptance, in absolute offsets.
    pub fn selection(&self) -> Region {
        Region::new(self.replacement.offset + self.cursor_position, self.selection_length)
    }

    /// Span of the label to highlight as the typed prefix.
    pub fn prefix_highlight(&self) -> Option<Range<usize>> {
        if self.decorate_prefix {
            Some(0..self.matched_prefix_length)
        } else {
            None
        }
    }

    /// Replaces the region with the text. Post-accept operations are not run here.
    pub fn apply(&self, document: &mut String) -> Result<Region, ProposalError> {
        let region = self.replacement;
        if region.end() > document.len()
            || !document.is_char_boundary(region.offset)
            || !document.is_char_boundary(region.end())
        {
            return Err(ProposalError::RegionOutOfBounds {
                region,
                document_len: document.len(),
            });
        }
        document.replace_range(region.offset..region.end(), &self.text);
        Ok(self.selection())
    }
}

impl PartialOrd for Proposal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Proposal {
    fn cmp(&self, other: &Self) -> Ordering {
        super::matcher::compare_labels(self.display_string(), other.display_string())
            .then_with(|| self.replacement.offset.cmp(&other.replacement.offset))
            .then_with(|| self.text.cmp(&other.text))
    }
}

#[derive(Debug, Clone)]
pub struct ProposalBuilder {
    text: Option<String>,
    replacement: Region,
    matched_prefix_length: usize,
    cursor_position: Option<usize>,
    selection_length: usize,
    label: Option<String>,
    kind: ProposalKind,
    secondary_info: Option<String>,
    decorate_prefix: bool,
    linked_regions: Vec<Region>,
    post_accept: Vec<PostAcceptOperation>,
    reopens_proposals: bool,
}

impl Default for ProposalBuilder {
    fn default() -> Self {
        Self {
            text: None,
            replacement: Region::default(),
            matched_prefix_length: 0,
            cursor_position: None,
            selection_length: 0,
            label: None,
            kind: ProposalKind::Setting,
            secondary_info: None,
            decorate_prefix: true,
            linked_regions: Vec::new(),
            post_accept: Vec::new(),
            reopens_proposals: false,
        }
    }
}

impl ProposalBuilder {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn replace(mut self, region: Region) -> Self {
        self.replacement = region;
        self
    }

    pub fn matched_prefix(mut self, length: usize) -> Self {
        self.matched_prefix_length = length;
        self
    }

    /// Cursor relative to the replacement offset; defaults to the end of the text.
    pub fn cursor(mut self, position: usize) -> Self {
        self.cursor_position = Some(position);
        self
    }

    pub fn select(mut self, length: usize) -> Self {
        self.selection_length = length;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn kind(mut self, kind: ProposalKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn secondary_info(mut self, info: Option<String>) -> Self {
        self.secondary_info = info;
        self
    }

    pub fn decorate_prefix(mut self, decorate: bool) -> Self {
        self.decorate_prefix = decorate;
        self
    }

    pub fn linked_regions(mut self, regions: Vec<Region>) -> Self {
        self.linked_regions = regions;
        self
    }

    pub fn post_accept(mut self, operation: PostAcceptOperation) -> Self {
        self.post_accept.push(operation);
        self
    }

    pub fn reopens_proposals(mut self, reopen: bool) -> Self {
        self.reopens_proposals = reopen;
        self
    }

    pub fn build(self) -> Result<Proposal, ProposalError> {
        let text = self.text.ok_or(ProposalError::MissingText)?;
        let cursor_position = self.cursor_position.unwrap_or(text.len());
        Ok(Proposal {
            cursor_position,
            text,
            replacement: self.replacement,
            matched_prefix_length: self.matched_prefix_length,
            selection_length: self.selection_length,
            label: self.label,
            kind: self.kind,
            secondary_info: self.secondary_info,
            decorate_prefix: self.decorate_prefix,
            linked_regions: self.linked_regions,
            post_accept: self.post_accept,
            reopens_proposals: self.reopens_proposals,
        })
    }
}
