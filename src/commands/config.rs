use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use crate::config::ControlMessage;
use crate::types::OutputFormat;

use super::utils::open_store;

pub async fn handle_config_show(store_path: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let store = open_store(store_path).await?;

    match format {
        OutputFormat::Json => {
            let output = json!({
                "settings": store.settings(),
                "capture": store.capture_config(),
                "ui": store.ui_config(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Simple => {
            let settings = store.settings();
            let capture = store.capture_config();
            let ui = store.ui_config();
            println!("base-url:        {}", settings.base_url);
            println!("allowed-status:  {}", settings.allowed_status);
            println!("timeout-ms:      {}", settings.timeout_ms);
            println!(
                "auth-token:      {}",
                if settings.auth_token.is_empty() { "(none)" } else { "(set)" }
            );
            println!("logging-enabled: {}", capture.logging_enabled);
            println!("domain-filter:   {}", capture.domain_filter);
            println!("enabled:         {}", ui.capture_enabled);
            println!("menu-name:       {}", ui.menu_name);
            println!("element-class:   {}", ui.element_class);
            println!("page-class:      {}", ui.page_class);
        }
    }

    Ok(())
}

/// Apply a single configuration change. Naming changes go through the
/// control-plane messages; replay settings are written directly.
pub async fn handle_config_set(
    store_path: Option<PathBuf>,
    key: String,
    value: String,
) -> Result<()> {
    let mut store = open_store(store_path).await?;

    match key.as_str() {
        "enabled" => {
            let enabled: bool = value.parse()?;
            store.handle(ControlMessage::Toggle(enabled)).await?;
        }
        "menu-name" => store.handle(ControlMessage::SetMenuName(value.clone())).await?,
        "element-class" => {
            store
                .handle(ControlMessage::SetElementClass(value.clone()))
                .await?
        }
        "page-class" => {
            store
                .handle(ControlMessage::SetPageClass(value.clone()))
                .await?
        }
        "base-url" => {
            let mut settings = store.settings().clone();
            settings.base_url = value.clone();
            store.update_settings(settings).await?;
        }
        "allowed-status" => {
            let mut settings = store.settings().clone();
            settings.allowed_status = value.clone();
            store.update_settings(settings).await?;
        }
        "timeout-ms" => {
            let mut settings = store.settings().clone();
            settings.timeout_ms = value.parse()?;
            store.update_settings(settings).await?;
        }
        "auth-token" => {
            let mut settings = store.settings().clone();
            settings.auth_token = value.clone();
            store.update_settings(settings).await?;
        }
        "logging-enabled" => {
            let mut capture = store.capture_config().clone();
            capture.logging_enabled = value.parse()?;
            store.update_capture_config(capture).await?;
        }
        "domain-filter" => {
            let mut capture = store.capture_config().clone();
            capture.domain_filter = value.clone();
            store.update_capture_config(capture).await?;
        }
        other => anyhow::bail!(
            "unknown setting '{}'; expected one of enabled, menu-name, element-class, \
             page-class, base-url, allowed-status, timeout-ms, auth-token, \
             logging-enabled, domain-filter",
            other
        ),
    }

    println!("Set {} = {}", key, value);
    Ok(())
}
