use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::runner::TestRunner;
use crate::types::{CapturedRequest, OutputFormat};

use super::utils::open_store;

/// Replay captured requests, one at a time in selection order.
pub async fn handle_run(
    store_path: Option<PathBuf>,
    all: bool,
    indexes: Vec<usize>,
    action: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let store = open_store(store_path).await?;

    let selected: Vec<CapturedRequest> = if all {
        store
            .requests()
            .iter()
            .filter(|r| action.as_deref().is_none_or(|a| r.action == a))
            .cloned()
            .collect()
    } else {
        let mut picked = Vec::with_capacity(indexes.len());
        for index in &indexes {
            let request = store
                .requests()
                .get(*index)
                .ok_or_else(|| anyhow::anyhow!("no captured request at index {}", index))?;
            picked.push(request.clone());
        }
        picked
    };

    if selected.is_empty() {
        anyhow::bail!("no requests selected; use --all or --index");
    }

    info!("Running {} tests", selected.len());
    let runner = TestRunner::new(store.settings().clone())?;

    let simple = matches!(format, OutputFormat::Simple);
    let results = runner
        .run_batch(&selected, |result, summary| {
            // Incremental rendering: each result appears before the next
            // request is issued.
            if simple {
                let verdict = if result.passed { "PASS" } else { "FAIL" };
                println!(
                    "{} {} {} {} ({}ms) {}",
                    verdict, result.method, result.url, result.status, result.elapsed_ms,
                    result.note
                );
                println!(
                    "  passed: {} failed: {} total: {}",
                    summary.passed,
                    summary.failed,
                    summary.total()
                );
            }
        })
        .await;

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}
