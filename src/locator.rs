//! Locator synthesis: turn a resolved DOM element into a stable,
//! structured selector expression. Rendering to XPath text is kept
//! separate from the selector data itself.

use serde::{Deserialize, Serialize};

use crate::dom::{NodeId, PageSnapshot};

/// Attribute anchoring a composite multiselect's hidden `<select>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeAnchor {
    Id(String),
    Name(String),
    /// First class token of the hidden select.
    Class(String),
}

/// Selector expression, in decreasing specificity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// Visible trigger of a multiselect-over-hidden-select widget,
    /// anchored on the hidden select.
    Composite { anchor: CompositeAnchor },
    ById { tag: String, id: String },
    ByName { tag: String, name: String },
    ByPlaceholder { tag: String, placeholder: String },
    /// Bare tag, last resort.
    ByTag { tag: String },
}

impl Selector {
    pub fn is_composite(&self) -> bool {
        matches!(self, Selector::Composite { .. })
    }

    /// Render to an XPath expression.
    pub fn to_xpath(&self) -> String {
        match self {
            Selector::Composite { anchor } => {
                let select = match anchor {
                    CompositeAnchor::Id(id) => format!("//select[@id='{}']", id),
                    CompositeAnchor::Name(name) => format!("//select[@name='{}']", name),
                    CompositeAnchor::Class(class) => format!("//select[@class='{}']", class),
                };
                format!("{}/following-sibling::div//button", select)
            }
            Selector::ById { tag, id } => format!("//{}[@id='{}']", tag, id),
            Selector::ByName { tag, name } => format!("//{}[@name='{}']", tag, name),
            Selector::ByPlaceholder { tag, placeholder } => {
                format!("//{}[@placeholder='{}']", tag, placeholder)
            }
            Selector::ByTag { tag } => format!("//{}", tag),
        }
    }
}

/// Synthesize a selector for an element.
///
/// The composite-multiselect check runs before the plain id path:
/// composite widgets often expose an id on the wrong node, so a proven
/// trigger must never fall through to the attribute tiers.
pub fn synthesize(snapshot: &PageSnapshot, element: NodeId) -> Selector {
    if let Some(anchor) = composite_anchor(snapshot, element) {
        return Selector::Composite { anchor };
    }

    let tag = snapshot.tag(element).to_string();
    if let Some(id) = snapshot.attr_nonempty(element, "id") {
        return Selector::ById {
            tag,
            id: id.to_string(),
        };
    }
    if let Some(name) = snapshot.attr_nonempty(element, "name") {
        return Selector::ByName {
            tag,
            name: name.to_string(),
        };
    }
    if let Some(placeholder) = snapshot.attr_nonempty(element, "placeholder") {
        return Selector::ByPlaceholder {
            tag,
            placeholder: placeholder.replace('"', ""),
        };
    }
    Selector::ByTag { tag }
}

/// Detect the multiselect-over-hidden-select pattern: a span ancestor
/// holding a `<select>` whose trailing sibling subtree contains the
/// visible trigger button. Stops at the document body and at the first
/// qualifying ancestor.
fn composite_anchor(snapshot: &PageSnapshot, element: NodeId) -> Option<CompositeAnchor> {
    for ancestor in snapshot.ancestors(element) {
        if snapshot.tag(ancestor) == "body" {
            break;
        }
        if snapshot.tag(ancestor) != "span" {
            continue;
        }
        let Some(select) = snapshot.descendant_with_tag(ancestor, "select") else {
            continue;
        };
        if !has_trailing_trigger(snapshot, select) {
            continue;
        }
        // First qualifying ancestor wins. A select with no anchoring
        // attribute at all cannot qualify.
        if let Some(anchor) = anchor_for_select(snapshot, select) {
            return Some(anchor);
        }
    }
    None
}

/// A trigger is a button inside a div that follows the select among its
/// siblings.
fn has_trailing_trigger(snapshot: &PageSnapshot, select: NodeId) -> bool {
    snapshot
        .following_siblings(select)
        .into_iter()
        .filter(|&sib| snapshot.tag(sib) == "div")
        .any(|div| snapshot.descendant_with_tag(div, "button").is_some())
}

fn anchor_for_select(snapshot: &PageSnapshot, select: NodeId) -> Option<CompositeAnchor> {
    if let Some(id) = snapshot.attr_nonempty(select, "id") {
        return Some(CompositeAnchor::Id(id.to_string()));
    }
    if let Some(name) = snapshot.attr_nonempty(select, "name") {
        return Some(CompositeAnchor::Name(name.to_string()));
    }
    snapshot
        .attr_nonempty(select, "class")
        .and_then(|c| c.split_whitespace().next())
        .map(|first| CompositeAnchor::Class(first.to_string()))
}

#[cfg(test)]
#[path = "locator_test.rs"]
mod locator_test;
