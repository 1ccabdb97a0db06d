//! Explicit configuration objects. Components receive these at
//! construction and are rebuilt on reload; nothing reads ambient
//! globals.

use serde::{Deserialize, Serialize};

/// Controls for the capture surfaces.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Master enable flag; when off, both surfaces drop everything.
    pub logging_enabled: bool,
    /// Case-insensitive substring filter on the request URL. Empty means
    /// no filtering.
    pub domain_filter: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            logging_enabled: false,
            domain_filter: String::new(),
        }
    }
}

impl CaptureConfig {
    /// Whether a URL passes the enable flag and domain filter.
    pub fn accepts(&self, url: &str) -> bool {
        if !self.logging_enabled {
            return false;
        }
        let filter = self.domain_filter.trim().to_lowercase();
        filter.is_empty() || url.to_lowercase().contains(&filter)
    }
}

/// Naming and enablement for the step-collection side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UiConfig {
    /// Whether DOM interactions are collected at all.
    pub capture_enabled: bool,
    /// Optional menu/group name inserted after the verb in every step.
    pub menu_name: String,
    /// Class name referenced by generated accessor methods.
    pub element_class: String,
    /// Class name for the generated page object.
    pub page_class: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            capture_enabled: false,
            menu_name: String::new(),
            element_class: "ElementClass".to_string(),
            page_class: "PageClass".to_string(),
        }
    }
}

/// Settings for the replay executor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Base URL prefixed onto relative captured URLs.
    pub base_url: String,
    /// Comma-separated status codes counted as passing.
    pub allowed_status: String,
    pub timeout_ms: u64,
    /// Bearer token attached to every replayed request when non-empty.
    pub auth_token: String,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        RunnerSettings {
            base_url: String::new(),
            allowed_status: "200,201,202,204".to_string(),
            timeout_ms: 2000,
            auth_token: String::new(),
        }
    }
}

impl RunnerSettings {
    /// Parse the allowed-status list; non-numeric entries are ignored.
    pub fn allowed_codes(&self) -> Vec<u16> {
        self.allowed_status
            .split(',')
            .filter_map(|part| part.trim().parse::<u16>().ok())
            .collect()
    }
}

/// Control-plane messages from collaborating surfaces.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Turn interaction collection on or off.
    Toggle(bool),
    SetElementClass(String),
    SetPageClass(String),
    SetMenuName(String),
    /// Clear all collected state (settings survive).
    Reset,
    /// Persisted state changed elsewhere; reload.
    StorageChanged,
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
