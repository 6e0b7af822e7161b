//! Arena-backed model of a rendered log page.
//!
//! The renderer hands us a finished element tree. The controller never adds
//! or removes elements; it only reads structure and rewrites classes, inline
//! style and indicator text. Parent links are kept alongside child lists so
//! ancestor walks are O(depth).

pub mod build;
pub mod markers;
mod node;
mod spec;

use std::collections::{BTreeMap, HashSet};

pub use node::{DisclosureKind, DisclosureNode};
pub use spec::{NodeSpec, SpecError};

/// Upper bound on any ancestor walk.
///
/// Trees built through [`Document::from_spec`] are acyclic, but walks stay
/// bounded regardless of how the arena was assembled.
pub const DEFAULT_MAX_WALK_DEPTH: usize = 256;

/// Smallest walk bound accepted. Routing a click from an icon inside a
/// header needs a few levels even on a shallow page.
pub const MIN_WALK_DEPTH: usize = 16;

/// Index of an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single element of the page.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn styles(&self) -> &BTreeMap<String, String> {
        &self.style
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Space-joined class list, like `className` on a DOM element.
    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }
}

/// The page tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    max_walk_depth: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only an empty `body` root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
            root: NodeId(0),
            max_walk_depth: DEFAULT_MAX_WALK_DEPTH,
        }
    }

    /// Set the ancestor walk bound, raised to [`MIN_WALK_DEPTH`] if lower.
    pub fn with_max_walk_depth(mut self, depth: usize) -> Self {
        if depth < MIN_WALK_DEPTH {
            tracing::warn!(depth, min = MIN_WALK_DEPTH, "walk depth too small, clamping");
        }
        self.max_walk_depth = depth.max(MIN_WALK_DEPTH);
        self
    }

    pub fn max_walk_depth(&self) -> usize {
        self.max_walk_depth
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Look up an element. Unknown ids yield `None`.
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0)
    }

    /// Append a new element under `parent`. Used while assembling a page;
    /// the controller itself never calls this.
    pub fn append(&mut self, parent: NodeId, mut element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        element.parent = Some(parent);
        element.children.clear();
        self.nodes.push(element);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Read-only disclosure view of an element.
    pub fn node(&self, id: NodeId) -> Option<DisclosureNode<'_>> {
        self.get(id).map(|element| DisclosureNode::new(id, element))
    }

    // ---------------------------------------------------------------------
    // Tree queries
    // ---------------------------------------------------------------------

    /// Inclusive ancestors of `id`, innermost first, bounded by the walk depth.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.contains(id).then_some(id),
            seen: HashSet::new(),
            remaining: self.max_walk_depth,
        }
    }

    /// Nearest inclusive ancestor satisfying `pred`.
    pub fn closest<F>(&self, id: NodeId, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(&Element) -> bool,
    {
        self.ancestors(id)
            .find(|&a| self.get(a).map(&mut pred).unwrap_or(false))
    }

    /// Nearest inclusive ancestor carrying `class`.
    pub fn closest_class(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.closest(id, |e| e.has_class(class))
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        let mut seen = HashSet::new();
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Every element in the document matching `pred`, in document order.
    pub fn query_all<F>(&self, pred: F) -> Vec<NodeId>
    where
        F: FnMut(&Element) -> bool,
    {
        let mut all = vec![self.root];
        all.extend(self.descendants(self.root));
        self.filter_ids(all, pred)
    }

    /// Descendants of `id` matching `pred`, in document order.
    pub fn query_within<F>(&self, id: NodeId, pred: F) -> Vec<NodeId>
    where
        F: FnMut(&Element) -> bool,
    {
        self.filter_ids(self.descendants(id), pred)
    }

    /// First descendant of `id` matching `pred`.
    pub fn query_first_within<F>(&self, id: NodeId, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(&Element) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .find(|&n| self.get(n).map(&mut pred).unwrap_or(false))
    }

    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        self.query_all(|e| e.has_class(class))
    }

    pub fn first_with_class(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.query_first_within(id, |e| e.has_class(class))
    }

    fn filter_ids<F>(&self, ids: Vec<NodeId>, mut pred: F) -> Vec<NodeId>
    where
        F: FnMut(&Element) -> bool,
    {
        ids.into_iter()
            .filter(|&n| self.get(n).map(&mut pred).unwrap_or(false))
            .collect()
    }

    /// The element following `id` under the same parent.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&s| s == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Find the element whose `data-debug-id` equals `debug_id`.
    pub fn find_by_debug_id(&self, debug_id: &str) -> Option<NodeId> {
        self.query_all(|e| e.attr(markers::ATTR_DEBUG_ID) == Some(debug_id))
            .into_iter()
            .next()
    }

    // ---------------------------------------------------------------------
    // Mutation of markers
    // ---------------------------------------------------------------------

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id).map(|e| e.has_class(class)).unwrap_or(false)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(e) = self.get_mut(id) {
            if !e.has_class(class) {
                e.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(e) = self.get_mut(id) {
            e.classes.retain(|c| c != class);
        }
    }

    /// Flip `class` on `id`, returning whether it is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class);
            self.has_class(id, class)
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|e| e.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(e) = self.get_mut(id) {
            e.attrs.insert(name.to_string(), value.into());
        }
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.get(id).and_then(|e| e.style(property))
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: impl Into<String>) {
        if let Some(e) = self.get_mut(id) {
            e.style.insert(property.to_string(), value.into());
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|e| e.text.as_str())
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(e) = self.get_mut(id) {
            e.text = text.into();
        }
    }

    pub(crate) fn push_class_raw(element: &mut Element, class: impl Into<String>) {
        let class = class.into();
        if !class.is_empty() && !element.has_class(&class) {
            element.classes.push(class);
        }
    }

    pub(crate) fn insert_attr_raw(element: &mut Element, name: String, value: String) {
        element.attrs.insert(name, value);
    }

    pub(crate) fn insert_style_raw(element: &mut Element, property: String, value: String) {
        element.style.insert(property, value);
    }

    pub(crate) fn set_text_raw(element: &mut Element, text: String) {
        element.text = text;
    }

    /// Point `child`'s parent link somewhere else without touching child
    /// lists. Only used to build malformed trees in tests.
    #[cfg(test)]
    pub(crate) fn force_parent(&mut self, child: NodeId, parent: NodeId) {
        if let Some(e) = self.get_mut(child) {
            e.parent = Some(parent);
        }
    }
}

/// Iterator over inclusive ancestors, innermost first.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
    seen: HashSet<NodeId>,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        if self.remaining == 0 || !self.seen.insert(current) {
            tracing::warn!(node = current.index(), "ancestor walk stopped early");
            self.next = None;
            return None;
        }
        self.remaining -= 1;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div(classes: &[&str]) -> Element {
        let mut e = Element::new("div");
        for c in classes {
            Document::push_class_raw(&mut e, *c);
        }
        e
    }

    #[test]
    fn test_append_links_parent_and_children() {
        let mut doc = Document::new();
        let a = doc.append(doc.root(), div(&["a"]));
        let b = doc.append(a, div(&["b"]));

        assert_eq!(doc.parent(b), Some(a));
        assert_eq!(doc.children(a), &[b]);
        assert_eq!(doc.parent(doc.root()), None);
    }

    #[test]
    fn test_closest_is_inclusive() {
        let mut doc = Document::new();
        let a = doc.append(doc.root(), div(&["outer"]));
        let b = doc.append(a, div(&["inner"]));

        assert_eq!(doc.closest_class(b, "inner"), Some(b));
        assert_eq!(doc.closest_class(b, "outer"), Some(a));
        assert_eq!(doc.closest_class(b, "missing"), None);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let mut doc = Document::new();
        let a = doc.append(doc.root(), div(&["x"]));
        let a1 = doc.append(a, div(&["x"]));
        let b = doc.append(doc.root(), div(&["x"]));

        assert_eq!(doc.descendants(doc.root()), vec![a, a1, b]);
        assert_eq!(doc.query_class("x"), vec![a, a1, b]);
        assert_eq!(doc.query_within(a, |e| e.has_class("x")), vec![a1]);
    }

    #[test]
    fn test_next_element_sibling() {
        let mut doc = Document::new();
        let a = doc.append(doc.root(), div(&[]));
        let b = doc.append(doc.root(), div(&[]));

        assert_eq!(doc.next_element_sibling(a), Some(b));
        assert_eq!(doc.next_element_sibling(b), None);
        assert_eq!(doc.next_element_sibling(doc.root()), None);
    }

    #[test]
    fn test_toggle_class_round_trip() {
        let mut doc = Document::new();
        let a = doc.append(doc.root(), div(&["tool-call"]));

        assert!(doc.toggle_class(a, "expanded"));
        assert_eq!(doc.get(a).map(Element::class_name).as_deref(), Some("tool-call expanded"));
        assert!(!doc.toggle_class(a, "expanded"));
        assert_eq!(doc.get(a).map(Element::class_name).as_deref(), Some("tool-call"));
    }

    #[test]
    fn test_ancestor_walk_terminates_on_cycle() {
        let mut doc = Document::new();
        let a = doc.append(doc.root(), div(&[]));
        let b = doc.append(a, div(&[]));
        doc.force_parent(a, b);

        let walked: Vec<_> = doc.ancestors(b).collect();
        assert_eq!(walked, vec![b, a]);
        assert_eq!(doc.closest_class(b, "never"), None);
    }

    #[test]
    fn test_ancestor_walk_respects_depth_bound() {
        let mut doc = Document::new().with_max_walk_depth(MIN_WALK_DEPTH);
        let top = doc.append(doc.root(), div(&["top"]));
        let mut deepest = top;
        for _ in 0..MIN_WALK_DEPTH + 3 {
            deepest = doc.append(deepest, div(&[]));
        }

        assert_eq!(doc.ancestors(deepest).count(), MIN_WALK_DEPTH);
        assert_eq!(doc.closest_class(deepest, "top"), None);
    }

    #[test]
    fn test_small_walk_depth_is_clamped() {
        assert_eq!(Document::new().with_max_walk_depth(1).max_walk_depth(), MIN_WALK_DEPTH);
        assert_eq!(Document::new().with_max_walk_depth(0).max_walk_depth(), MIN_WALK_DEPTH);
        assert_eq!(Document::new().with_max_walk_depth(64).max_walk_depth(), 64);
    }

    #[test]
    fn test_unknown_ids_are_harmless() {
        let mut doc = Document::new();
        let bogus = NodeId(99);

        assert!(doc.get(bogus).is_none());
        assert!(doc.children(bogus).is_empty());
        assert_eq!(doc.ancestors(bogus).count(), 0);
        doc.add_class(bogus, "x");
        doc.set_style(bogus, "display", "none");
        assert!(!doc.has_class(bogus, "x"));
    }
}
