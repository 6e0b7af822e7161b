//! Serialized page description handed over by the renderer.
//!
//! ```json
//! {
//!   "tag": "body",
//!   "children": [
//!     { "classes": ["tool-call"], "attrs": { "data-debug-id": "tool-1" } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Document, Element, NodeId};

/// Errors while loading a page description.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid page description: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_tag() -> String {
    "div".to_string()
}

/// One element of a serialized page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default = "default_tag")]
    pub tag: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    fn to_element(&self) -> Element {
        let mut element = Element::new(self.tag.clone());
        for class in &self.classes {
            // Renderers sometimes emit "a b" as one entry.
            for part in class.split_whitespace() {
                Document::push_class_raw(&mut element, part);
            }
        }
        for (k, v) in &self.attrs {
            Document::insert_attr_raw(&mut element, k.clone(), v.clone());
        }
        for (k, v) in &self.style {
            Document::insert_style_raw(&mut element, k.clone(), v.clone());
        }
        Document::set_text_raw(&mut element, self.text.clone());
        element
    }
}

impl Document {
    /// Build a document whose root is `spec`.
    pub fn from_spec(spec: &NodeSpec) -> Self {
        let mut doc = Document {
            nodes: vec![spec.to_element()],
            root: NodeId(0),
            max_walk_depth: super::DEFAULT_MAX_WALK_DEPTH,
        };
        let mut pending: Vec<(NodeId, &NodeSpec)> =
            spec.children.iter().rev().map(|c| (doc.root, c)).collect();
        while let Some((parent, child)) = pending.pop() {
            let id = doc.append(parent, child.to_element());
            pending.extend(child.children.iter().rev().map(|c| (id, c)));
        }
        doc
    }

    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        let spec: NodeSpec = serde_json::from_str(json)?;
        Ok(Self::from_spec(&spec))
    }

    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Snapshot the current state of the tree.
    pub fn to_spec(&self) -> NodeSpec {
        self.spec_of(self.root)
    }

    fn spec_of(&self, id: NodeId) -> NodeSpec {
        let Some(element) = self.get(id) else {
            return NodeSpec::new(default_tag());
        };
        NodeSpec {
            tag: element.tag.clone(),
            classes: element.classes().to_vec(),
            attrs: element.attrs().clone(),
            style: element.styles().clone(),
            text: element.text().to_string(),
            children: element
                .children()
                .iter()
                .map(|&c| self.spec_of(c))
                .collect(),
        }
    }
}
