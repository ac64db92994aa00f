use std::path::PathBuf;
use std::sync::Arc;

use rfx_core::assist::AssistPreferences;
use rfx_core::version::RobotVersion;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tower_lsp::lsp_types::ConfigurationItem;
use tracing::warn;

use super::state::RfxLanguageServer;
use super::DEFAULT_DEBOUNCE_MS;

pub(crate) const CONFIG_SECTION: &str = "rfx.lsp";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ServerConfig {
    /// Version the version-dependent validation rules are selected for.
    pub(crate) robot_version: RobotVersion,
    pub(crate) debounce_ms: u64,
    pub(crate) max_concurrent: usize,
    pub(crate) library_docs: Vec<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            robot_version: RobotVersion::new(7, 0),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_concurrent: 2,
            library_docs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RfxLspConfigSection {
    #[serde(default)]
    robot_version: Option<String>,
    #[serde(default)]
    assist: Option<AssistPreferences>,
    #[serde(default)]
    library_docs: Option<Vec<PathBuf>>,
    #[serde(default)]
    performance: PerformanceConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PerformanceConfig {
    #[serde(default)]
    max_concurrent: Option<usize>,
    #[serde(default)]
    debounce_ms: Option<u64>,
}

impl ServerConfig {
    /// Merges a client section; returns whether the project index must be rebuilt.
    pub(crate) fn apply(&mut self, section: &RfxLspConfigSection) -> bool {
        if let Some(text) = &section.robot_version {
            match RobotVersion::parse(text) {
                Ok(version) => self.robot_version = version,
                Err(e) => warn!("{e}; keeping {}", self.robot_version),
            }
        }
        if let Some(v) = section.performance.max_concurrent.filter(|v| *v > 0) {
            self.max_concurrent = v;
        }
        if let Some(v) = section.performance.debounce_ms {
            self.debounce_ms = v;
        }
        match &section.library_docs {
            Some(docs) if *docs != self.library_docs => {
                self.library_docs = docs.clone();
                true
            }
            _ => false,
        }
    }
}

impl RfxLanguageServer {
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(CONFIG_SECTION.to_string()),
        }];

        let Ok(values) = self.client.configuration(items).await else {
            return;
        };
        let Some(section) = values
            .into_iter()
            .next()
            .and_then(|v| serde_json::from_value::<RfxLspConfigSection>(v).ok())
        else {
            return;
        };

        let (rebuild, permits) = match self.config.lock() {
            Ok(mut guard) => {
                let rebuild = guard.apply(&section);
                (rebuild, guard.max_concurrent.max(1))
            }
            Err(_) => return,
        };
        if let Ok(mut limiter) = self.compute_limiter.lock() {
            *limiter = Arc::new(Semaphore::new(permits));
        }

        if let Some(preferences) = section.assist {
            self.preferences.set(preferences);
        }
        // The assist context keeps its cached copy until told otherwise
        self.assist_context().refresh_preferences();
        self.cycling.clear();
        for mut doc in self.documents.iter_mut() {
            doc.cached_analysis = None;
        }

        if rebuild {
            self.rebuild_index().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(value: serde_json::Value) -> RfxLspConfigSection {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_apply_client_section() {
        let mut config = ServerConfig::default();
        let rebuild = config.apply(&section(serde_json::json!({
            "robotVersion": "3.1.2",
            "performance": { "maxConcurrent": 4, "debounceMs": 100 },
            "assist": { "separator": "  ", "acceptanceMode": "insert" }
        })));
        assert!(!rebuild, "library docs unchanged");
        assert_eq!(config.robot_version, RobotVersion::with_patch(3, 1, 2));
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.debounce_ms, 100);
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let mut config = ServerConfig::default();
        config.apply(&section(serde_json::json!({
            "robotVersion": "seven",
            "performance": { "maxConcurrent": 0 }
        })));
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_library_docs_change_requests_rebuild() {
        let mut config = ServerConfig::default();
        let docs = serde_json::json!({ "libraryDocs": ["libs/Collections.json"] });
        assert!(config.apply(&section(docs.clone())));
        assert!(!config.apply(&section(docs)), "same list twice");
    }

    #[test]
    fn test_assist_preferences_deserialize_partially() {
        let parsed = section(serde_json::json!({ "assist": { "separator": "\t" } }));
        let preferences = parsed.assist.unwrap();
        assert_eq!(preferences.separator, "\t");
        assert_eq!(preferences.cycling_key, AssistPreferences::default().cycling_key);
    }
}
