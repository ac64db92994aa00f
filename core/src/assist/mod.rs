//! Content assist: locating the cursor, computing proposals, applying them and
//! offering quick assists.

pub mod accept;
pub mod aggregator;
pub mod context;
pub mod index;
pub mod locator;
pub mod matcher;
pub mod proposal;
pub mod providers;
pub mod quick_assist;
pub mod regions;


pub use accept::{AcceptOutcome, AcceptanceHandler, InsertEdit, LinkedEditSession};
pub use aggregator::{CycleStep, CyclingAggregator, ProposalAggregator, ProviderGroup};
pub use context::{AcceptanceMode, AssistContext, AssistPreferences, PreferencesSource, SharedPreferences};
pub use index::{ProjectIndex, StaticProjectIndex};
pub use locator::{AssistPosition, PositionLocator};
pub use matcher::ProposalMatcher;
pub use proposal::{PostAcceptOperation, Proposal, ProposalError, ProposalKind, Region};
pub use providers::{AssistProvider, AssistRequest, ProposalProvider};
pub use quick_assist::{LocalAssignQuickAssist, QuickAssistProvider};

use crate::model::SuiteDocument;

/// Proposals of every built-in provider at `offset`; `None` when nothing applies.
pub fn compute_proposals(document: &SuiteDocument, offset: usize, context: &AssistContext) -> Option<Vec<Proposal>> {
    ProposalAggregator::default().compute(document, offset, context)
}

/// Quick assists available at `offset`.
pub fn compute_quick_assists(document: &SuiteDocument, offset: usize, context: &AssistContext) -> Vec<Proposal> {
    let providers: [&dyn QuickAssistProvider; 1] = [&LocalAssignQuickAssist];
    providers
        .iter()
        .flat_map(|p| p.compute(document, offset, context))
        .collect()
}
