use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::export;

use super::utils::open_store;

/// Write a JMeter plan embedding every captured request.
pub async fn handle_export_jmx(store_path: Option<PathBuf>, output: PathBuf) -> Result<()> {
    let store = open_store(store_path).await?;
    if store.requests().is_empty() {
        anyhow::bail!("no captured requests to export");
    }

    // Assert on the first configured passing status.
    let assertion_code = store
        .settings()
        .allowed_codes()
        .first()
        .copied()
        .unwrap_or(200);

    let plan = export::test_plan(store.requests(), assertion_code);
    tokio::fs::write(&output, plan)
        .await
        .with_context(|| format!("cannot write {}", output.display()))?;

    info!("Exported {} samplers", store.requests().len());
    println!(
        "Wrote {} with {} requests",
        output.display(),
        store.requests().len()
    );
    Ok(())
}

/// Write the parameter/value sheet.
pub async fn handle_export_params(store_path: Option<PathBuf>, output: PathBuf) -> Result<()> {
    let store = open_store(store_path).await?;
    let sheet = export::params_csv(store.param_values());
    tokio::fs::write(&output, sheet)
        .await
        .with_context(|| format!("cannot write {}", output.display()))?;

    println!(
        "Wrote {} with {} parameters",
        output.display(),
        store.param_values().len()
    );
    Ok(())
}
