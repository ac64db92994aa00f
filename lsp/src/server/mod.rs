mod analysis;
mod cli;
mod config;
mod entry;
mod handlers;
mod state;
mod text;
mod utils;
mod workspace;

pub use entry::run;

/// Delay before diagnostics are recomputed after an edit.
pub(crate) const DEFAULT_DEBOUNCE_MS: u64 = 250;
