use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::dom::PageSnapshot;
use crate::emitter;
use crate::gherkin::StepSynthesizer;
use crate::resolver;
use crate::types::OutputFormat;

use super::utils::{self, load_session, open_store};

pub async fn handle_steps(
    input: PathBuf,
    store_path: Option<PathBuf>,
    menu_name: Option<String>,
    element_class: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let mut store = open_store(store_path).await?;

    let mut ui = store.ui_config().clone();
    if let Some(menu) = menu_name {
        ui.menu_name = menu;
    }
    if let Some(class) = element_class {
        ui.element_class = class;
    }
    if !ui.capture_enabled {
        anyhow::bail!(
            "step collection is disabled; run `qaforge config set enabled true` first"
        );
    }

    let session = load_session(&input)?;
    let snapshot = PageSnapshot::from_spec(&session.dom);
    let synthesizer = StepSynthesizer::new(&ui);

    let mut collected = Vec::new();
    for event in &session.events {
        let Some(target) = utils::resolve_target(&snapshot, &event.target) else {
            warn!("Event target {:?} matched no element; skipping", event.target);
            continue;
        };
        let Some(step) = synthesizer.on_click(&snapshot, target) else {
            continue;
        };

        let params = resolver::collect_parameter_values(&snapshot, &step.gherkin_text);
        store.merge_params(params).await?;
        store.append_step(step.clone()).await?;
        info!("Collected: {}", step.gherkin_text);
        collected.push(step);
    }

    match format {
        OutputFormat::Json => {
            let rendered: Vec<_> = collected
                .iter()
                .map(|step| {
                    let (gherkin, locator, method) = emitter::render_step(step);
                    json!({
                        "gherkin": gherkin,
                        "locator": locator,
                        "method": method,
                        "input_type": step.input_type,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
        OutputFormat::Simple => {
            for step in &collected {
                let (gherkin, locator, method) = emitter::render_step(step);
                println!("{}", gherkin);
                println!("  {}", locator);
                println!("  {}", method);
            }
            println!(
                "Collected {} steps from {} events",
                collected.len(),
                session.events.len()
            );
        }
    }

    Ok(())
}
