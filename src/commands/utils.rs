//! Shared helpers for command handlers: store access and collector
//! export parsing.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::dom::{ElementSpec, NodeId, PageSnapshot};
use crate::resolver;
use crate::store::Store;

/// Open the store at an explicit path or the default location.
pub async fn open_store(path: Option<PathBuf>) -> Result<Store> {
    let store = match path {
        Some(path) => Store::open(path).await?,
        None => Store::open_default().await?,
    };
    Ok(store)
}

/// A collector session export: the DOM snapshot plus the interaction
/// events observed on it.
#[derive(Debug, Deserialize)]
pub struct SessionExport {
    pub dom: ElementSpec,
    #[serde(default)]
    pub events: Vec<EventSpec>,
}

#[derive(Debug, Deserialize)]
pub struct EventSpec {
    pub target: EventTarget,
}

/// How an event names its target element.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTarget {
    /// Element id attribute.
    Id(String),
    /// Resolver token matched against form controls.
    Field(String),
    /// Label direct text (normalized comparison).
    Label(String),
}

pub fn load_session(path: &Path) -> Result<SessionExport> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read snapshot file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("snapshot file {} is not a valid session export", path.display()))
}

/// Resolve an event target to a node in the snapshot.
pub fn resolve_target(snapshot: &PageSnapshot, target: &EventTarget) -> Option<NodeId> {
    match target {
        EventTarget::Id(id) => snapshot.by_id(id),
        EventTarget::Field(token) => resolver::resolve(snapshot, token),
        EventTarget::Label(text) => {
            let wanted = resolver::normalize(text);
            snapshot
                .labels()
                .into_iter()
                .find(|&label| resolver::normalize(&snapshot.direct_text(label)) == wanted)
        }
    }
}
