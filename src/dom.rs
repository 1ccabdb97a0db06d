//! Arena-backed snapshot of a page's DOM, as exported by the in-page
//! collector. Only the structure the scaffolding pipeline needs is kept:
//! tags, attributes, direct text, and parent/child links.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of a node inside its [`PageSnapshot`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug)]
pub struct DomNode {
    pub tag: String,
    pub attrs: HashMap<String, String>,
    /// Direct text chunks (text-node children only, in order).
    pub text: Vec<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Nested element shape accepted from the collector's JSON export.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        ElementSpec {
            tag: tag.into(),
            attrs: HashMap::new(),
            text: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, chunk: impl Into<String>) -> Self {
        self.text.push(chunk.into());
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Flattened DOM tree with document-order traversal and the query
/// helpers the resolver and synthesizers need.
#[derive(Clone, Debug, Default)]
pub struct PageSnapshot {
    nodes: Vec<DomNode>,
}

impl PageSnapshot {
    /// Build a snapshot from the collector's nested export. The root is
    /// treated as the document body.
    pub fn from_spec(spec: &ElementSpec) -> Self {
        let mut snapshot = PageSnapshot { nodes: Vec::new() };
        snapshot.insert(spec, None);
        snapshot
    }

    fn insert(&mut self, spec: &ElementSpec, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DomNode {
            tag: spec.tag.to_lowercase(),
            attrs: spec.attrs.clone(),
            text: spec.text.clone(),
            parent,
            children: Vec::new(),
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        for child in &spec.children {
            self.insert(child, Some(id));
        }
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.0]
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0].attrs.get(name).map(|s| s.as_str())
    }

    /// Attribute value, treating an empty string as absent. Mirrors the
    /// truthiness checks the collector relied on.
    pub fn attr_nonempty(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attr(id, name).filter(|v| !v.is_empty())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// All nodes in document order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// First element with the given id attribute.
    pub fn by_id(&self, id_value: &str) -> Option<NodeId> {
        self.iter().find(|&n| self.attr(n, "id") == Some(id_value))
    }

    /// First element with the given name attribute, in document order.
    pub fn by_name(&self, name_value: &str) -> Option<NodeId> {
        self.iter()
            .find(|&n| self.attr(n, "name") == Some(name_value))
    }

    /// Form controls (input, select, textarea) in document order.
    pub fn form_fields(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|&n| matches!(self.tag(n), "input" | "select" | "textarea"))
            .collect()
    }

    pub fn labels(&self) -> Vec<NodeId> {
        self.iter().filter(|&n| self.tag(n) == "label").collect()
    }

    /// Direct (non-nested) text of an element, chunks trimmed and joined
    /// with single spaces.
    pub fn direct_text(&self, id: NodeId) -> String {
        self.nodes[id.0]
            .text
            .iter()
            .map(|chunk| chunk.trim())
            .filter(|chunk| !chunk.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Full text of an element's subtree, direct text first.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut parts = vec![self.direct_text(id)];
        for &child in self.children(id) {
            let text = self.inner_text(child);
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }

    /// Ancestors from the node's parent up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Preceding siblings, nearest first.
    pub fn preceding_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&n| n == id).unwrap_or(0);
        siblings[..pos].iter().rev().copied().collect()
    }

    /// Siblings after the node, in document order.
    pub fn following_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&n| n == id) {
            Some(pos) => siblings[pos + 1..].to_vec(),
            None => Vec::new(),
        }
    }

    /// First descendant with the given tag, document order.
    pub fn descendant_with_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        for &child in self.children(id) {
            if self.tag(child) == tag {
                return Some(child);
            }
            if let Some(found) = self.descendant_with_tag(child, tag) {
                return Some(found);
            }
        }
        None
    }

    /// Whether `descendant` sits anywhere under `ancestor`.
    pub fn is_descendant(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|n| n == ancestor)
    }

    /// `<option>` children of a select: (text, selected).
    pub fn options(&self, select: NodeId) -> Vec<(String, bool)> {
        self.children(select)
            .iter()
            .filter(|&&c| self.tag(c) == "option")
            .map(|&c| {
                (
                    self.direct_text(c),
                    self.nodes[c.0].attrs.contains_key("selected"),
                )
            })
            .collect()
    }

    /// Whether a select carries the `multiple` attribute.
    pub fn is_multiple(&self, select: NodeId) -> bool {
        self.nodes[select.0].attrs.contains_key("multiple")
    }

    /// Whether a checkbox/radio carries the `checked` attribute.
    pub fn is_checked(&self, id: NodeId) -> bool {
        self.nodes[id.0].attrs.contains_key("checked")
    }
}

#[cfg(test)]
#[path = "dom_test.rs"]
mod dom_test;
