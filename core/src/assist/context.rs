use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::index::{ProjectIndex, StaticProjectIndex};

/// How an accepted proposal treats the text of the current cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AcceptanceMode {
    /// Insert over the typed prefix only
    Insert,
    /// Replace the whole cell around the cursor
    #[default]
    Substitute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistPreferences {
    pub separator: String,
    pub tsv_separator: String,
    pub auto_activation_chars: Vec<char>,
    pub keyword_prefix_auto_addition: bool,
    pub acceptance_mode: AcceptanceMode,
    pub include_not_imported_libraries: bool,
    pub cycling_key: String,
}

impl Default for AssistPreferences {
    fn default() -> Self {
        Self {
            separator: "    ".to_string(),
            tsv_separator: "\t".to_string(),
            auto_activation_chars: vec!['$', '@', '&', '.'],
            keyword_prefix_auto_addition: false,
            acceptance_mode: AcceptanceMode::Substitute,
            include_not_imported_libraries: false,
            cycling_key: "Ctrl+Space".to_string(),
        }
    }
}

impl AssistPreferences {
    pub fn separator(&self, is_tsv: bool) -> &str {
        if is_tsv { &self.tsv_separator } else { &self.separator }
    }
}

/// Where preferences are read from. Reads may be costly and may change between calls.
pub trait PreferencesSource: Send + Sync {
    fn load(&self) -> AssistPreferences;
}

/// Mutable in-memory source, used by the server and by tests.
#[derive(Debug, Default)]
pub struct SharedPreferences {
    current: Mutex<AssistPreferences>,
}

impl SharedPreferences {
    pub fn new(preferences: AssistPreferences) -> Self {
        Self {
            current: Mutex::new(preferences),
        }
    }

    pub fn set(&self, preferences: AssistPreferences) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = preferences;
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut AssistPreferences)) {
        if let Ok(mut guard) = self.current.lock() {
            f(&mut guard);
        }
    }
}

impl PreferencesSource for SharedPreferences {
    fn load(&self) -> AssistPreferences {
        self.current.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

/// Shared state of assist requests: cached preferences and the project index.
///
/// Preferences are read once and kept until [`AssistContext::refresh_preferences`]
/// is called; a change in the source alone is not picked up.
pub struct AssistContext {
    source: Arc<dyn PreferencesSource>,
    cached: Mutex<Option<Arc<AssistPreferences>>>,
    index: Arc<dyn ProjectIndex>,
}

impl AssistContext {
    pub fn new(source: Arc<dyn PreferencesSource>, index: Arc<dyn ProjectIndex>) -> Self {
        Self {
            source,
            cached: Mutex::new(None),
            index,
        }
    }

    /// Default preferences and an empty index.
    pub fn standalone() -> Self {
        Self::new(
            Arc::new(SharedPreferences::default()),
            Arc::new(StaticProjectIndex::default()),
        )
    }

    pub fn preferences(&self) -> Arc<AssistPreferences> {
        let Ok(mut guard) = self.cached.lock() else {
            return Arc::new(self.source.load());
        };
        guard.get_or_insert_with(|| Arc::new(self.source.load())).clone()
    }

    pub fn refresh_preferences(&self) {
        if let Ok(mut guard) = self.cached.lock() {
            debug!("assist preferences refreshed");
            *guard = None;
        }
    }

    pub fn index(&self) -> &Arc<dyn ProjectIndex> {
        &self.index
    }

    pub fn set_index(&mut self, index: Arc<dyn ProjectIndex>) {
        self.index = index;
    }
}

impl std::fmt::Debug for AssistContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistContext").finish_non_exhaustive()
    }
}
