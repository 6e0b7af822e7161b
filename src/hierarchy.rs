//! Ownership hierarchy of a page.
//!
//! Tool calls can hold task entries which hold further tool calls, to any
//! depth. These helpers answer "where does this node sit" for diagnostics and
//! for telling top-level tool calls apart from nested ones.

use std::fmt;

use serde::Serialize;

use crate::document::{markers, DisclosureKind, Document, NodeId};

/// Separator between identifiers in a rendered path.
pub const PATH_SEPARATOR: &str = " > ";

/// Debug identifiers from the outermost ancestor down to the node itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HierarchyPath(Vec<String>);

impl HierarchyPath {
    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(PATH_SEPARATOR))
    }
}

/// Inclusive ancestors of `node` carrying a debug id, outermost first.
pub fn debug_ancestors(doc: &Document, node: NodeId) -> Vec<NodeId> {
    let mut chain: Vec<NodeId> = doc
        .ancestors(node)
        .filter(|&a| doc.node(a).and_then(|n| n.debug_id()).is_some())
        .collect();
    chain.reverse();
    chain
}

/// Hierarchy path for `node`. Empty when nothing on the chain has an id.
pub fn debug_path(doc: &Document, node: NodeId) -> HierarchyPath {
    HierarchyPath(
        debug_ancestors(doc, node)
            .into_iter()
            .filter_map(|a| doc.node(a)?.debug_id().map(str::to_string))
            .collect(),
    )
}

/// Nearest inclusive ancestor that is a task entry.
pub fn enclosing_task_entry(doc: &Document, node: NodeId) -> Option<NodeId> {
    doc.closest(node, |e| DisclosureKind::of(e) == DisclosureKind::TaskEntry)
}

/// Task entries anywhere below `node`.
pub fn nested_task_entry_count(doc: &Document, node: NodeId) -> usize {
    doc.query_within(node, |e| e.has_class(markers::TASK_ENTRY))
        .len()
}

/// Tool calls that sit inside some task entry, in document order.
pub fn nested_tool_calls(doc: &Document) -> Vec<NodeId> {
    doc.query_class(markers::TOOL_CALL)
        .into_iter()
        .filter(|&tc| {
            doc.parent(tc)
                .and_then(|p| enclosing_task_entry(doc, p))
                .is_some()
        })
        .collect()
}

/// How many task entries separate `node` from the top level.
pub fn task_depth(doc: &Document, node: NodeId) -> usize {
    doc.ancestors(node)
        .filter(|&a| doc.has_class(a, markers::TASK_ENTRY))
        .count()
}
