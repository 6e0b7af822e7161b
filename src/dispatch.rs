//! Click routing for a page.
//!
//! One handler sees every click. It walks up from the clicked element and
//! checks the route table in order; the first kind with a matching ancestor
//! handles the click and nothing else does. Clicks that match no route are
//! left alone.

use serde::Serialize;
use thiserror::Error;

use crate::document::{markers, Document, NodeId, DEFAULT_MAX_WALK_DEPTH};
use crate::style::StyleSheets;
use crate::toggle::{self, PanelKind, PanelState};
use crate::tokens::TokenDetails;
use crate::trace::{AfterToggleReport, DebugSink, PageAudit, ToolCallReport, Tracer};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("No element with debug id '{0}'")]
    UnknownDebugId(String),

    #[error("Element '{0}' has no clickable header")]
    NoHeader(String),
}

/// What a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    ToolHeader,
    ResultHeader,
    CaveatHeader,
    TokenToggle,
}

impl TargetKind {
    pub fn marker(self) -> &'static str {
        match self {
            TargetKind::ToolHeader => markers::TOOL_HEADER,
            TargetKind::ResultHeader => markers::RESULT_HEADER,
            TargetKind::CaveatHeader => markers::CAVEAT_HEADER,
            TargetKind::TokenToggle => markers::TOKEN_TOGGLE,
        }
    }
}

/// Route table, highest priority first.
pub const ROUTES: [TargetKind; 4] = [
    TargetKind::ToolHeader,
    TargetKind::ResultHeader,
    TargetKind::CaveatHeader,
    TargetKind::TokenToggle,
];

/// First route whose marker sits on `origin` or one of its ancestors.
pub fn route(doc: &Document, origin: NodeId) -> Option<(TargetKind, NodeId)> {
    ROUTES
        .iter()
        .find_map(|&kind| doc.closest_class(origin, kind.marker()).map(|hit| (kind, hit)))
}

/// The state change a handled click produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    ToolCall {
        tool: Option<NodeId>,
        expanded: Option<bool>,
        before: Option<ToolCallReport>,
        after: Option<AfterToggleReport>,
    },
    Panel {
        kind: PanelKind,
        state: Option<PanelState>,
    },
    TokenDetails {
        expanded: bool,
    },
}

/// Result of delivering one click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Interaction {
    /// A route matched. The click does not propagate any further.
    Handled {
        kind: TargetKind,
        target: NodeId,
        effect: Effect,
    },
    Ignored,
}

impl Interaction {
    pub fn is_handled(&self) -> bool {
        matches!(self, Interaction::Handled { .. })
    }

    pub fn kind(&self) -> Option<TargetKind> {
        match self {
            Interaction::Handled { kind, .. } => Some(*kind),
            Interaction::Ignored => None,
        }
    }
}

/// Builder for [`Controller`].
#[derive(Debug, Default)]
pub struct ControllerBuilder {
    tracer: Option<Tracer>,
    styles: Option<StyleSheets>,
    max_walk_depth: Option<usize>,
}

impl ControllerBuilder {
    pub fn sink(mut self, sink: std::sync::Arc<dyn DebugSink>) -> Self {
        self.tracer = Some(Tracer::new(sink));
        self
    }

    pub fn styles(mut self, styles: StyleSheets) -> Self {
        self.styles = Some(styles);
        self
    }

    pub fn max_walk_depth(mut self, depth: usize) -> Self {
        self.max_walk_depth = Some(depth);
        self
    }

    pub fn build(self, document: Document) -> Controller {
        let depth = self.max_walk_depth.unwrap_or(DEFAULT_MAX_WALK_DEPTH);
        Controller {
            document: document.with_max_walk_depth(depth),
            tokens: TokenDetails::new(),
            styles: self.styles.unwrap_or_else(StyleSheets::viewer_default),
            tracer: self.tracer.unwrap_or_default(),
            ready: false,
        }
    }
}

/// Disclosure controller for one loaded page.
///
/// Owns the page's token-details flag, so a controller lives exactly as long
/// as the page it drives.
#[derive(Debug)]
pub struct Controller {
    document: Document,
    tokens: TokenDetails,
    styles: StyleSheets,
    tracer: Tracer,
    ready: bool,
}

impl Controller {
    pub fn new(document: Document) -> Self {
        Self::builder().build(document)
    }

    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn styles(&self) -> &StyleSheets {
        &self.styles
    }

    pub fn tokens_expanded(&self) -> bool {
        self.tokens.is_expanded()
    }

    /// Run the page-ready pass: normalise token groups and audit the page.
    ///
    /// Only the first call does anything.
    pub fn page_ready(&mut self) -> Option<PageAudit> {
        if self.ready {
            return None;
        }
        self.ready = true;
        let groups = self.tokens.sync(&mut self.document);
        tracing::debug!(groups, "page ready");
        self.tracer.page_ready(&self.document, &self.styles)
    }

    /// Deliver a click on `origin`.
    pub fn click(&mut self, origin: NodeId) -> Result<Interaction, DispatchError> {
        if !self.document.contains(origin) {
            return Err(DispatchError::UnknownNode(origin));
        }
        let Some((kind, target)) = route(&self.document, origin) else {
            tracing::trace!(origin = origin.index(), "click ignored");
            return Ok(Interaction::Ignored);
        };
        tracing::debug!(origin = origin.index(), target = target.index(), ?kind, "click routed");

        let effect = match kind {
            TargetKind::ToolHeader => self.on_tool_header(target),
            TargetKind::ResultHeader => self.on_panel(target, PanelKind::Result),
            TargetKind::CaveatHeader => self.on_panel(target, PanelKind::Caveat),
            TargetKind::TokenToggle => Effect::TokenDetails {
                expanded: self.tokens.toggle(&mut self.document),
            },
        };
        Ok(Interaction::Handled {
            kind,
            target,
            effect,
        })
    }

    /// Click the header of the element with `debug_id`.
    ///
    /// Tool calls are clicked on their tool header; any other element is
    /// clicked directly.
    pub fn click_debug_id(&mut self, debug_id: &str) -> Result<Interaction, DispatchError> {
        let node = self
            .document
            .find_by_debug_id(debug_id)
            .ok_or_else(|| DispatchError::UnknownDebugId(debug_id.to_string()))?;
        let origin = if self.document.has_class(node, markers::TOOL_CALL) {
            self.document
                .children(node)
                .iter()
                .copied()
                .find(|&c| self.document.has_class(c, markers::TOOL_HEADER))
                .ok_or_else(|| DispatchError::NoHeader(debug_id.to_string()))?
        } else {
            node
        };
        self.click(origin)
    }

    fn on_tool_header(&mut self, header: NodeId) -> Effect {
        let tool = toggle::tool_call_for_header(&self.document, header);
        let before = tool.and_then(|t| self.tracer.before_toggle(&self.document, t, &self.styles));
        let expanded = toggle::toggle_tool_call(&mut self.document, header);
        let after = tool.and_then(|t| self.tracer.after_toggle(&self.document, t, &self.styles));
        Effect::ToolCall {
            tool,
            expanded,
            before,
            after,
        }
    }

    fn on_panel(&mut self, header: NodeId, kind: PanelKind) -> Effect {
        Effect::Panel {
            kind,
            state: toggle::toggle_panel(&mut self.document, header, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::document::build::{PageBuilder, Role};
    use crate::document::Element;
    use crate::tokens::group_state;
    use crate::trace::MemorySink;

    struct Page {
        doc: Document,
        tools: Vec<NodeId>,
        nested: NodeId,
        result: NodeId,
        caveat: NodeId,
        groups: Vec<NodeId>,
    }

    fn page() -> Page {
        let mut page = PageBuilder::new();
        let root = page.root();
        let entry = page.entry(root, "aaaaaaaa-0000", Role::Assistant);
        let g1 = page.token_toggle(entry, "10 input");
        let first = page.tool_call(entry, "t1", "Read");
        let second = page.tool_call(entry, "t2", "Task");
        let task = page.task_entry(second, "bbbbbbbb-1111");
        let inner_entry = page.entry(task, "bbbbbbbb-1111", Role::Assistant);
        let g2 = page.token_toggle(inner_entry, "5 input");
        let nested = page.tool_call(inner_entry, "t2a", "Grep");
        let result = page.result(nested, "2 matches");
        let third = page.tool_call(entry, "t3", "Edit");
        let user = page.entry(root, "cccccccc", Role::User);
        let caveat = page.caveat(user, "Caveat: local command output");
        Page {
            doc: page.finish(),
            tools: vec![first, second, third],
            nested,
            result,
            caveat,
            groups: vec![g1, g2],
        }
    }

    fn header(doc: &Document, parent: NodeId) -> NodeId {
        doc.children(parent)[0]
    }

    // ==========================================================================
    // Routing
    // ==========================================================================

    #[test]
    fn test_route_priority_order() {
        assert_eq!(
            ROUTES,
            [
                TargetKind::ToolHeader,
                TargetKind::ResultHeader,
                TargetKind::CaveatHeader,
                TargetKind::TokenToggle,
            ]
        );
    }

    #[test]
    fn test_click_on_header_child_routes_to_tool() {
        let p = page();
        let icon = p.doc.first_with_class(p.tools[0], markers::EXPAND_ICON).unwrap();
        let mut ctl = Controller::new(p.doc);

        let interaction = ctl.click(icon).unwrap();
        assert_eq!(interaction.kind(), Some(TargetKind::ToolHeader));
        assert!(ctl.document().has_class(p.tools[0], markers::EXPANDED));
    }

    #[test]
    fn test_tiny_walk_depth_still_routes_icon_clicks() {
        let p = page();
        let icon = p.doc.first_with_class(p.tools[0], markers::EXPAND_ICON).unwrap();
        let mut ctl = Controller::builder().max_walk_depth(1).build(p.doc);

        let interaction = ctl.click(icon).unwrap();
        assert_eq!(interaction.kind(), Some(TargetKind::ToolHeader));
        assert!(ctl.document().has_class(p.tools[0], markers::EXPANDED));
    }

    #[test]
    fn test_click_outside_any_route_is_ignored() {
        let p = page();
        let root = p.doc.root();
        let before = p.doc.to_spec();
        let mut ctl = Controller::new(p.doc);

        assert_eq!(ctl.click(root).unwrap(), Interaction::Ignored);
        assert_eq!(ctl.document().to_spec(), before);
    }

    #[test]
    fn test_unknown_node_is_error() {
        let p = page();
        let bogus = {
            let mut other = Document::new();
            for _ in 0..p.doc.len() + 5 {
                other.append(other.root(), Element::new("div"));
            }
            *other.children(other.root()).last().unwrap()
        };
        let mut ctl = Controller::new(p.doc);

        assert_eq!(ctl.click(bogus), Err(DispatchError::UnknownNode(bogus)));
    }

    #[test]
    fn test_tool_header_beats_token_toggle() {
        let mut p = page();
        // A token toggle wrapped inside a tool header.
        let tool_header = header(&p.doc, p.tools[0]);
        let mut toggle = Element::new("span");
        Document::push_class_raw(&mut toggle, markers::TOKEN_TOGGLE);
        let toggle = p.doc.append(tool_header, toggle);
        let mut ctl = Controller::new(p.doc);

        let interaction = ctl.click(toggle).unwrap();
        assert_eq!(interaction.kind(), Some(TargetKind::ToolHeader));
        assert!(!ctl.tokens_expanded());
        for &g in &p.groups {
            assert_eq!(group_state(ctl.document(), g).1.as_deref(), Some("[+]"));
        }
    }

    // ==========================================================================
    // Handlers
    // ==========================================================================

    #[test]
    fn test_double_click_tool_is_idempotent() {
        let p = page();
        let h = header(&p.doc, p.tools[1]);
        let before = p.doc.to_spec();
        let mut ctl = Controller::new(p.doc);

        ctl.click(h).unwrap();
        ctl.click(h).unwrap();
        assert_eq!(ctl.document().to_spec(), before);
    }

    #[test]
    fn test_outer_tool_click_leaves_nested_untouched() {
        let p = page();
        let sink = Arc::new(MemorySink::new());
        let h = header(&p.doc, p.tools[1]);
        let mut ctl = Controller::builder().sink(sink.clone()).build(p.doc);

        let interaction = ctl.click(h).unwrap();
        let Interaction::Handled {
            effect:
                Effect::ToolCall {
                    tool,
                    expanded,
                    before,
                    after,
                },
            ..
        } = interaction
        else {
            panic!("expected tool call effect");
        };
        assert_eq!(tool, Some(p.tools[1]));
        assert_eq!(expanded, Some(true));
        assert!(ctl.document().has_class(p.tools[1], markers::EXPANDED));
        assert!(!ctl.document().has_class(p.nested, markers::EXPANDED));
        assert!(!ctl.document().has_class(p.tools[0], markers::EXPANDED));

        let before = before.unwrap();
        assert_eq!(before.nested_task_entries, 1);
        assert!(!before.inside_task_entry);
        assert!(!before.expanded);
        let after = after.unwrap();
        assert!(after.expanded);
        assert_eq!(after.details_display.as_deref(), Some("block"));

        let lines = sink.lines();
        let clicked = lines.iter().position(|l| l == "=== Tool header clicked ===");
        let toggled = lines.iter().position(|l| l == "=== After toggle ===");
        assert!(clicked.unwrap() < toggled.unwrap());

        let nested = ToolCallReport::collect(ctl.document(), p.nested, ctl.styles()).unwrap();
        assert!(nested.inside_task_entry);
        assert!(!nested.expanded);
    }

    #[test]
    fn test_result_header_toggles_panel() {
        let p = page();
        let h = header(&p.doc, p.result);
        let mut ctl = Controller::new(p.doc);

        let interaction = ctl.click(h).unwrap();
        assert_eq!(interaction.kind(), Some(TargetKind::ResultHeader));
        let content = ctl.document().next_element_sibling(h).unwrap();
        assert_eq!(ctl.document().style(content, "display"), Some("block"));
        // The enclosing tool call is not a target for this click.
        assert!(!ctl.document().has_class(p.nested, markers::EXPANDED));
    }

    #[test]
    fn test_caveat_without_content_is_handled_noop() {
        let mut doc = Document::new();
        let message = doc.append(doc.root(), Element::new("div"));
        let mut h = Element::new("div");
        Document::push_class_raw(&mut h, markers::CAVEAT_HEADER);
        let h = doc.append(message, h);
        let mut icon = Element::new("svg");
        Document::push_class_raw(&mut icon, markers::CAVEAT_ICON);
        doc.append(h, icon);
        let before = doc.to_spec();
        let mut ctl = Controller::new(doc);

        let interaction = ctl.click(h).unwrap();
        assert_eq!(
            interaction,
            Interaction::Handled {
                kind: TargetKind::CaveatHeader,
                target: h,
                effect: Effect::Panel {
                    kind: PanelKind::Caveat,
                    state: None,
                },
            }
        );
        assert_eq!(ctl.document().to_spec(), before);
    }

    #[test]
    fn test_token_click_synchronises_all_groups() {
        let p = page();
        let icon = p.doc.first_with_class(p.groups[1], markers::TOKEN_ICON).unwrap();
        let mut ctl = Controller::new(p.doc);

        let interaction = ctl.click(icon).unwrap();
        assert_eq!(interaction.kind(), Some(TargetKind::TokenToggle));
        assert!(ctl.tokens_expanded());
        let states: Vec<_> = p.groups.iter().map(|&g| group_state(ctl.document(), g)).collect();
        assert!(states.iter().all(|s| *s == (Some(true), Some("[-]".to_string()))));

        ctl.click(p.groups[0]).unwrap();
        let states: Vec<_> = p.groups.iter().map(|&g| group_state(ctl.document(), g)).collect();
        assert!(states.iter().all(|s| *s == (Some(false), Some("[+]".to_string()))));
    }

    #[test]
    fn test_click_debug_id() {
        let p = page();
        let mut ctl = Controller::new(p.doc);

        let interaction = ctl.click_debug_id("tool-t3").unwrap();
        assert_eq!(interaction.kind(), Some(TargetKind::ToolHeader));
        assert!(ctl.document().has_class(p.tools[2], markers::EXPANDED));

        assert_eq!(
            ctl.click_debug_id("tool-missing"),
            Err(DispatchError::UnknownDebugId("tool-missing".to_string()))
        );
        assert_eq!(
            ctl.click_debug_id("entry-cccccccc").unwrap(),
            Interaction::Ignored
        );
    }

    #[test]
    fn test_caveat_header_toggles_panel() {
        let p = page();
        let h = header(&p.doc, p.caveat);
        let mut ctl = Controller::new(p.doc);

        let interaction = ctl.click(h).unwrap();
        assert_eq!(interaction.kind(), Some(TargetKind::CaveatHeader));
        let content = ctl.document().next_element_sibling(h).unwrap();
        assert_eq!(ctl.document().style(content, "display"), Some("block"));

        ctl.click(h).unwrap();
        assert_eq!(ctl.document().style(content, "display"), Some("none"));
    }

    #[test]
    fn test_page_ready_runs_once() {
        let p = page();
        let sink = Arc::new(MemorySink::new());
        let mut ctl = Controller::builder().sink(sink.clone()).build(p.doc);

        let audit = ctl.page_ready().unwrap();
        assert_eq!(audit.total_tool_calls(), 4);
        assert!(ctl.page_ready().is_none());
        assert_eq!(
            sink.lines()
                .iter()
                .filter(|l| l.starts_with("=== Page loaded"))
                .count(),
            1
        );
    }

    #[test]
    fn test_untraced_controller_reports_nothing() {
        let p = page();
        let h = header(&p.doc, p.tools[0]);
        let mut ctl = Controller::new(p.doc);

        assert!(ctl.page_ready().is_none());
        let Interaction::Handled {
            effect: Effect::ToolCall { before, after, .. },
            ..
        } = ctl.click(h).unwrap()
        else {
            panic!("expected tool call effect");
        };
        assert!(before.is_none());
        assert!(after.is_none());
    }
}
