//! Field resolution: map a parameter token to the best-matching form
//! control in a page snapshot, then pull its current value.
//!
//! A miss is not an error. Steps generated from a page the user has not
//! filled in simply get empty parameter values.

use std::collections::BTreeMap;
use tracing::debug;

use crate::dom::{NodeId, PageSnapshot};

/// Lowercase a token and strip whitespace, underscores, and hyphens so
/// `"date_from"`, `"Date From"`, and `"dateFrom"` all compare equal.
pub fn normalize(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Resolve a token to a form control, trying tiers in order and taking
/// the first non-empty match:
///
/// 1. exact id equality
/// 2. exact name-attribute equality (first in document order)
/// 3. exact normalized id/name match across all form fields
/// 4. normalized id/name substring match
/// 5. normalized placeholder / aria-label substring match
/// 6. label text match (exact then substring), via the label's `for`
pub fn resolve(snapshot: &PageSnapshot, token: &str) -> Option<NodeId> {
    if let Some(node) = snapshot.by_id(token) {
        return Some(node);
    }
    if let Some(node) = snapshot.by_name(token) {
        return Some(node);
    }

    let wanted = normalize(token);
    if wanted.is_empty() {
        return None;
    }
    let fields = snapshot.form_fields();

    let norm_attr = |node: NodeId, attr: &str| {
        snapshot
            .attr_nonempty(node, attr)
            .map(normalize)
            .unwrap_or_default()
    };

    if let Some(&node) = fields
        .iter()
        .find(|&&n| norm_attr(n, "id") == wanted || norm_attr(n, "name") == wanted)
    {
        return Some(node);
    }
    if let Some(&node) = fields.iter().find(|&&n| {
        norm_attr(n, "id").contains(&wanted) || norm_attr(n, "name").contains(&wanted)
    }) {
        return Some(node);
    }
    if let Some(&node) = fields.iter().find(|&&n| {
        let placeholder = norm_attr(n, "placeholder");
        let aria = norm_attr(n, "aria-label");
        (!placeholder.is_empty() && placeholder.contains(&wanted))
            || (!aria.is_empty() && aria.contains(&wanted))
    }) {
        return Some(node);
    }

    // Label text, exact before substring, resolved through `for`.
    let labels = snapshot.labels();
    let label_match = labels
        .iter()
        .find(|&&l| normalize(&snapshot.inner_text(l)) == wanted)
        .or_else(|| {
            labels.iter().find(|&&l| {
                let text = normalize(&snapshot.inner_text(l));
                !text.is_empty() && text.contains(&wanted)
            })
        });
    if let Some(&label) = label_match
        && let Some(for_id) = snapshot.attr_nonempty(label, "for")
        && let Some(target) = snapshot.by_id(for_id)
    {
        return Some(target);
    }

    debug!("No field matched token '{}'", token);
    None
}

/// Current value of a resolved control.
///
/// Multi-selects join the text of every selected option; single selects
/// report the selected option's text; checkboxes and radios report their
/// value (or "Checked") when checked and "Unchecked" otherwise.
pub fn extract_value(snapshot: &PageSnapshot, node: NodeId) -> String {
    if snapshot.tag(node) == "select" {
        let selected: Vec<String> = snapshot
            .options(node)
            .into_iter()
            .filter(|(_, selected)| *selected)
            .map(|(text, _)| text)
            .collect();
        return if snapshot.is_multiple(node) {
            selected.join(", ")
        } else {
            selected.into_iter().next().unwrap_or_default()
        };
    }

    let input_type = snapshot.attr(node, "type").unwrap_or("");
    if matches!(input_type, "checkbox" | "radio") {
        return if snapshot.is_checked(node) {
            snapshot
                .attr_nonempty(node, "value")
                .unwrap_or("Checked")
                .to_string()
        } else {
            "Unchecked".to_string()
        };
    }

    snapshot.attr(node, "value").unwrap_or_default().to_string()
}

/// Resolve a token and pull its value; a miss yields an empty string.
pub fn field_value(snapshot: &PageSnapshot, token: &str) -> String {
    resolve(snapshot, token)
        .map(|node| extract_value(snapshot, node))
        .unwrap_or_default()
}

/// Collect current values for every `<param>` placeholder in a Gherkin
/// sentence, plus the current selection of every multi-select on the
/// page keyed by its id or name.
pub fn collect_parameter_values(
    snapshot: &PageSnapshot,
    gherkin_text: &str,
) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();

    for param in placeholders(gherkin_text) {
        let value = field_value(snapshot, &param);
        values.insert(param, value);
    }

    for node in snapshot.iter() {
        if snapshot.tag(node) != "select" || !snapshot.is_multiple(node) {
            continue;
        }
        let key = snapshot
            .attr_nonempty(node, "id")
            .or_else(|| snapshot.attr_nonempty(node, "name"));
        if let Some(key) = key
            && !values.contains_key(key)
        {
            values.insert(key.to_string(), extract_value(snapshot, node));
        }
    }

    values
}

/// `<param>` placeholder names in order of appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('>') else { break };
        if end > 0 {
            params.push(after[..end].to_string());
        }
        rest = &after[end + 1..];
    }
    params
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;
