use anyhow::Result;
use std::path::PathBuf;
use tracing::warn;

use crate::capture::classify_edited;

use super::utils::open_store;

/// Record user edits on a captured request. Edits only mask the
/// captured values; `--revert` drops them again.
pub async fn handle_edit(
    store_path: Option<PathBuf>,
    index: usize,
    url: Option<String>,
    body: Option<String>,
    clear_body: bool,
    revert: bool,
) -> Result<()> {
    let mut store = open_store(store_path).await?;

    let request = store
        .requests()
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("no captured request at index {}", index))?;
    let method = request.method;

    if revert {
        store.set_edited_url(index, None).await?;
        store.set_edited_payload(index, None).await?;
        println!("Reverted edits on request {}", index);
        return Ok(());
    }

    if let Some(url) = url {
        store.set_edited_url(index, Some(url)).await?;
        println!("Updated URL for request {}", index);
    }

    if clear_body {
        store.set_edited_payload(index, Some(None)).await?;
        println!("Cleared body for request {}", index);
        return Ok(());
    }

    if let Some(body) = body {
        if !method.allows_body() {
            anyhow::bail!("{} requests do not carry a body", method);
        }
        let (payload, warning) = classify_edited(&body);
        if let Some(warning) = warning {
            // Accepted anyway; the runner will send it as plain text.
            warn!("{}", warning);
            eprintln!("Warning: {}", warning);
        }
        store.set_edited_payload(index, Some(payload)).await?;
        println!("Updated body for request {}", index);
    }

    Ok(())
}
