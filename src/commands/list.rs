use anyhow::Result;
use std::path::PathBuf;

use crate::types::{CapturedRequest, OutputFormat};

use super::utils::open_store;

/// Whether a request matches the action filter and free-text search.
/// Search covers the URL, method, and payload text, case-insensitively.
fn matches(request: &CapturedRequest, action: Option<&str>, search: Option<&str>) -> bool {
    if let Some(action) = action
        && request.action != action
    {
        return false;
    }
    if let Some(search) = search {
        let needle = search.to_lowercase();
        let payload_text = request
            .payload
            .as_ref()
            .map(|p| p.body_text().to_lowercase())
            .unwrap_or_default();
        return request.url.to_lowercase().contains(&needle)
            || request.method.as_str().to_lowercase().contains(&needle)
            || payload_text.contains(&needle);
    }
    true
}

pub async fn handle_list(
    store_path: Option<PathBuf>,
    action: Option<String>,
    search: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let store = open_store(store_path).await?;

    let filtered: Vec<(usize, &CapturedRequest)> = store
        .requests()
        .iter()
        .enumerate()
        .filter(|(_, r)| matches(r, action.as_deref(), search.as_deref()))
        .collect();

    match format {
        OutputFormat::Json => {
            let entries: Vec<&CapturedRequest> = filtered.iter().map(|(_, r)| *r).collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Simple => {
            if filtered.is_empty() {
                println!("No requests found matching current filters.");
                return Ok(());
            }
            for (index, request) in &filtered {
                let payload = request
                    .payload
                    .as_ref()
                    .map(|p| p.summary(50))
                    .unwrap_or_else(|| "No payload".to_string());
                println!(
                    "[{}] {} {} ({}) {} {}",
                    index,
                    request.method,
                    request.url,
                    request.action,
                    request.time.format("%H:%M:%S"),
                    payload
                );
            }
            println!("Actions: {}", store.actions().join(", "));
        }
    }

    Ok(())
}
