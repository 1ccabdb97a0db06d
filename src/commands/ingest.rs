use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

use crate::capture::{CallRecorder, OutboundCall};
use crate::types::HttpMethod;

use super::utils::open_store;

/// One entry in an exported call log.
#[derive(Debug, Deserialize)]
struct CallEntry {
    url: String,
    method: String,
    #[serde(default)]
    body: Option<serde_json::Value>,
}

impl CallEntry {
    fn into_call(self) -> Result<OutboundCall> {
        let method = HttpMethod::parse(&self.method)?;
        let body = self.body.map(|value| match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        Ok(OutboundCall::Request {
            url: self.url,
            method,
            body,
        })
    }
}

/// Import an exported call log through the interception surface,
/// applying the session dedup and capture filters.
pub async fn handle_ingest(input: PathBuf, store_path: Option<PathBuf>) -> Result<()> {
    let mut store = open_store(store_path).await?;
    let config = store.capture_config().clone();

    let contents = std::fs::read_to_string(&input)
        .with_context(|| format!("cannot read call log {}", input.display()))?;
    let entries: Vec<CallEntry> = serde_json::from_str(&contents)
        .with_context(|| format!("call log {} is not a valid JSON array", input.display()))?;

    let recorder = CallRecorder::new();
    let total = entries.len();
    let mut appended = 0usize;
    for entry in entries {
        let call = entry.into_call()?;
        if recorder.observe(&call, &config, &mut store).await? {
            appended += 1;
        }
    }

    info!("Ingested {} of {} calls", appended, total);
    println!(
        "Ingested {} new requests ({} seen, {} stored total)",
        appended,
        total,
        store.requests().len()
    );
    Ok(())
}
