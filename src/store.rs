//! Persisted state: captured requests with their derived action index,
//! collected steps, parameter values, and configuration. One JSON
//! document, written atomically so a failed write never corrupts
//! existing state.
//!
//! Concurrent writers are not coordinated; the last write wins. That is
//! a documented consistency gap, not a guarantee.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{CaptureConfig, ControlMessage, RunnerSettings, UiConfig};
use crate::types::{CapturedRequest, Payload, StepRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("unable to determine home directory")]
    NoHome,
    #[error("no captured request at index {0}")]
    BadIndex(usize),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    requests: Vec<CapturedRequest>,
    #[serde(default)]
    actions: Vec<String>,
    #[serde(default)]
    steps: Vec<StepRecord>,
    #[serde(default)]
    param_values: BTreeMap<String, String>,
    #[serde(default)]
    settings: RunnerSettings,
    #[serde(default)]
    capture: CaptureConfig,
    #[serde(default)]
    ui: UiConfig,
}

pub struct Store {
    path: PathBuf,
    doc: StoreDocument,
}

impl Store {
    /// Default location: `~/.qaforge/store.json`.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::NoHome)?;
        Ok(home.join(".qaforge").join("store.json"))
    }

    /// Open a store at the given path, starting empty if the file does
    /// not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let doc = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => return Err(e.into()),
        };
        debug!("Opened store at {}", path.display());
        Ok(Store { path, doc })
    }

    pub async fn open_default() -> Result<Self, StoreError> {
        Self::open(Self::default_path()?).await
    }

    /// Re-read the document from disk, discarding in-memory state. Used
    /// on storage-change notifications.
    pub async fn reload(&mut self) -> Result<(), StoreError> {
        let fresh = Self::open(&self.path).await?;
        self.doc = fresh.doc;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole document atomically: temp file, then rename.
    async fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.doc)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub fn requests(&self) -> &[CapturedRequest] {
        &self.doc.requests
    }

    pub fn actions(&self) -> &[String] {
        &self.doc.actions
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.doc.steps
    }

    pub fn param_values(&self) -> &BTreeMap<String, String> {
        &self.doc.param_values
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.doc.settings
    }

    pub fn capture_config(&self) -> &CaptureConfig {
        &self.doc.capture
    }

    pub fn ui_config(&self) -> &UiConfig {
        &self.doc.ui
    }

    pub async fn update_settings(&mut self, settings: RunnerSettings) -> Result<(), StoreError> {
        self.doc.settings = settings;
        self.persist().await
    }

    pub async fn update_capture_config(
        &mut self,
        config: CaptureConfig,
    ) -> Result<(), StoreError> {
        self.doc.capture = config;
        self.persist().await
    }

    pub async fn update_ui_config(&mut self, config: UiConfig) -> Result<(), StoreError> {
        self.doc.ui = config;
        self.persist().await
    }

    /// Append a captured request unless an entry with the same
    /// (url, method) already exists. Keeps the action index consistent.
    pub async fn append_request(&mut self, record: CapturedRequest) -> Result<bool, StoreError> {
        let exists = self
            .doc
            .requests
            .iter()
            .any(|r| r.url == record.url && r.method == record.method);
        if exists {
            debug!("Skipping duplicate {} {}", record.method, record.url);
            return Ok(false);
        }
        self.doc.requests.push(record);
        self.rebuild_actions();
        self.persist().await?;
        Ok(true)
    }

    /// Append with the patched-surface dedup: same (url, method) within
    /// `window_ms` milliseconds counts as a duplicate.
    pub async fn append_request_windowed(
        &mut self,
        record: CapturedRequest,
        window_ms: i64,
    ) -> Result<bool, StoreError> {
        let exists = self.doc.requests.iter().any(|r| {
            r.url == record.url
                && r.method == record.method
                && (record.time - r.time).num_milliseconds().abs() < window_ms
        });
        if exists {
            debug!("Skipping near-duplicate {} {}", record.method, record.url);
            return Ok(false);
        }
        self.doc.requests.push(record);
        self.rebuild_actions();
        self.persist().await?;
        Ok(true)
    }

    /// Rebuild the derived action index from the requests, first-seen
    /// order, so every request's action is always present.
    fn rebuild_actions(&mut self) {
        let mut actions: Vec<String> = Vec::new();
        for request in &self.doc.requests {
            if !actions.contains(&request.action) {
                actions.push(request.action.clone());
            }
        }
        self.doc.actions = actions;
    }

    /// Record a user edit of a request's URL.
    pub async fn set_edited_url(
        &mut self,
        index: usize,
        url: Option<String>,
    ) -> Result<(), StoreError> {
        let request = self
            .doc
            .requests
            .get_mut(index)
            .ok_or(StoreError::BadIndex(index))?;
        request.edited_url = url;
        self.persist().await
    }

    /// Record a user edit of a request's body. `Some(None)` clears the
    /// body explicitly; `None` reverts to the captured payload.
    pub async fn set_edited_payload(
        &mut self,
        index: usize,
        payload: Option<Option<Payload>>,
    ) -> Result<(), StoreError> {
        let request = self
            .doc
            .requests
            .get_mut(index)
            .ok_or(StoreError::BadIndex(index))?;
        request.edited_payload = payload;
        self.persist().await
    }

    /// Append a step record. When an existing step's identifier
    /// collides, the new record replaces it (last-wins): re-collecting a
    /// control after the page changed should keep the fresher locator.
    pub async fn append_step(&mut self, step: StepRecord) -> Result<(), StoreError> {
        match self
            .doc
            .steps
            .iter_mut()
            .find(|existing| existing.locator.ident == step.locator.ident)
        {
            Some(existing) => *existing = step,
            None => self.doc.steps.push(step),
        }
        self.persist().await
    }

    /// Merge freshly extracted parameter values over the stored map.
    pub async fn merge_params(
        &mut self,
        values: BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        self.doc.param_values.extend(values);
        self.persist().await
    }

    /// Clear all collected data. Settings and configuration survive.
    pub async fn reset(&mut self) -> Result<(), StoreError> {
        self.doc.requests.clear();
        self.doc.actions.clear();
        self.doc.steps.clear();
        self.doc.param_values.clear();
        self.persist().await?;
        info!("Cleared all collected data");
        Ok(())
    }

    /// Apply a control-plane message.
    pub async fn handle(&mut self, message: ControlMessage) -> Result<(), StoreError> {
        match message {
            ControlMessage::Toggle(enabled) => {
                self.doc.ui.capture_enabled = enabled;
                self.persist().await
            }
            ControlMessage::SetElementClass(name) => {
                self.doc.ui.element_class = name;
                self.persist().await
            }
            ControlMessage::SetPageClass(name) => {
                self.doc.ui.page_class = name;
                self.persist().await
            }
            ControlMessage::SetMenuName(name) => {
                self.doc.ui.menu_name = name;
                self.persist().await
            }
            ControlMessage::Reset => self.reset().await,
            ControlMessage::StorageChanged => self.reload().await,
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
