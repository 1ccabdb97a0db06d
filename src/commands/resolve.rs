use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use crate::dom::PageSnapshot;
use crate::resolver;
use crate::types::OutputFormat;

use super::utils::load_session;

/// Debug a parameter token: which control it resolves to and what value
/// it currently holds. A miss is reported, not an error.
pub async fn handle_resolve(input: PathBuf, token: String, format: OutputFormat) -> Result<()> {
    let session = load_session(&input)?;
    let snapshot = PageSnapshot::from_spec(&session.dom);

    match resolver::resolve(&snapshot, &token) {
        Some(node) => {
            let value = resolver::extract_value(&snapshot, node);
            match format {
                OutputFormat::Json => {
                    let output = json!({
                        "token": token,
                        "matched": true,
                        "tag": snapshot.tag(node),
                        "id": snapshot.attr(node, "id"),
                        "name": snapshot.attr(node, "name"),
                        "value": value,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Simple => {
                    println!(
                        "'{}' -> <{}> id={:?} name={:?} value={:?}",
                        token,
                        snapshot.tag(node),
                        snapshot.attr(node, "id").unwrap_or(""),
                        snapshot.attr(node, "name").unwrap_or(""),
                        value
                    );
                }
            }
        }
        None => match format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "token": token,
                        "matched": false,
                    }))?
                );
            }
            OutputFormat::Simple => {
                println!("'{}' matched no control (empty value)", token);
            }
        },
    }

    Ok(())
}
