use anyhow::Result;
use std::path::PathBuf;

use crate::config::ControlMessage;

use super::utils::open_store;

/// Clear all collected requests, steps, and parameter values. Settings
/// and configuration survive.
pub async fn handle_reset(store_path: Option<PathBuf>) -> Result<()> {
    let mut store = open_store(store_path).await?;
    store.handle(ControlMessage::Reset).await?;
    println!("Cleared all captured requests and collected steps");
    Ok(())
}
