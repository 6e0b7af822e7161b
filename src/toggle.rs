//! Per-node expand/collapse.
//!
//! Tool calls carry their state as the `expanded` class. Result and caveat
//! panels instead show or hide the content region that follows their header
//! and rotate the header's chevron to match. Missing markup turns a toggle
//! into a no-op.

use serde::Serialize;

use crate::document::{markers, Document, NodeId};

/// Which kind of header-plus-content panel a header belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Result,
    Caveat,
}

impl PanelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PanelKind::Result => "result",
            PanelKind::Caveat => "caveat",
        }
    }

    pub fn header_class(self) -> &'static str {
        match self {
            PanelKind::Result => markers::RESULT_HEADER,
            PanelKind::Caveat => markers::CAVEAT_HEADER,
        }
    }

    pub fn icon_class(self) -> &'static str {
        match self {
            PanelKind::Result => markers::RESULT_ICON,
            PanelKind::Caveat => markers::CAVEAT_ICON,
        }
    }
}

/// Chevron rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rotation {
    /// 0°, panel closed.
    Collapsed,
    /// 90°, panel open.
    Expanded,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Collapsed => 0,
            Rotation::Expanded => 90,
        }
    }

    pub fn css(self) -> String {
        format!("rotate({}deg)", self.degrees())
    }

    /// Parse an inline `transform` value. Unset means collapsed.
    pub fn from_css(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("rotate(90deg)") => Rotation::Expanded,
            _ => Rotation::Collapsed,
        }
    }
}

/// Panel state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PanelState {
    pub content: NodeId,
    pub indicator: NodeId,
    pub visible: bool,
    pub rotation: Rotation,
}

/// A panel content region is hidden when its inline display is unset or `none`.
pub fn is_content_visible(doc: &Document, content: NodeId) -> bool {
    match doc.style(content, markers::STYLE_DISPLAY).map(str::trim) {
        None | Some("") | Some("none") => false,
        Some(_) => true,
    }
}

/// The tool call a header controls: its parent, when that is a tool call.
pub fn tool_call_for_header(doc: &Document, header: NodeId) -> Option<NodeId> {
    doc.parent(header)
        .filter(|&p| doc.has_class(p, markers::TOOL_CALL))
}

/// Flip the `expanded` marker of the tool call owning `header`.
///
/// Returns the new marker, or `None` when the header has no tool-call parent.
pub fn toggle_tool_call(doc: &mut Document, header: NodeId) -> Option<bool> {
    let Some(tool) = tool_call_for_header(doc, header) else {
        tracing::trace!(header = header.index(), "tool header without tool-call parent");
        return None;
    };
    Some(doc.toggle_class(tool, markers::EXPANDED))
}

/// Locate the content region and indicator for a panel header.
pub fn panel_parts(doc: &Document, header: NodeId, kind: PanelKind) -> Option<(NodeId, NodeId)> {
    let content = doc.next_element_sibling(header)?;
    let indicator = doc.first_with_class(header, kind.icon_class())?;
    Some((content, indicator))
}

/// Show or hide the content that follows a result or caveat header.
///
/// Nothing is mutated unless both the content region and the indicator exist.
pub fn toggle_panel(doc: &mut Document, header: NodeId, kind: PanelKind) -> Option<PanelState> {
    let Some((content, indicator)) = panel_parts(doc, header, kind) else {
        tracing::trace!(header = header.index(), ?kind, "panel markup incomplete, skipping");
        return None;
    };

    let visible = !is_content_visible(doc, content);
    let rotation = if visible {
        Rotation::Expanded
    } else {
        Rotation::Collapsed
    };
    doc.set_style(
        content,
        markers::STYLE_DISPLAY,
        if visible { "block" } else { "none" },
    );
    doc.set_style(indicator, markers::STYLE_TRANSFORM, rotation.css());

    Some(PanelState {
        content,
        indicator,
        visible,
        rotation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::build::{PageBuilder, Role};
    use crate::document::Element;

    fn page() -> (Document, NodeId, NodeId, NodeId) {
        let mut page = PageBuilder::new();
        let root = page.root();
        let entry = page.entry(root, "aaaaaaaa", Role::Assistant);
        let tool = page.tool_call(entry, "t1", "Grep");
        let result = page.result(tool, "found");
        let caveat = page.caveat(entry, "note");
        (page.finish(), tool, result, caveat)
    }

    fn header_of(doc: &Document, section: NodeId) -> NodeId {
        doc.children(section)[0]
    }

    // ==========================================================================
    // Tool calls
    // ==========================================================================

    #[test]
    fn test_tool_toggle_twice_restores_state() {
        let (mut doc, tool, _, _) = page();
        let header = header_of(&doc, tool);
        let before = doc.get(tool).unwrap().class_name();

        assert_eq!(toggle_tool_call(&mut doc, header), Some(true));
        assert!(doc.has_class(tool, markers::EXPANDED));
        assert_eq!(toggle_tool_call(&mut doc, header), Some(false));
        assert_eq!(doc.get(tool).unwrap().class_name(), before);
    }

    #[test]
    fn test_tool_toggle_without_tool_parent_is_noop() {
        let mut doc = Document::new();
        let mut stray = Element::new("div");
        Document::push_class_raw(&mut stray, markers::TOOL_HEADER);
        let header = doc.append(doc.root(), stray);

        assert_eq!(toggle_tool_call(&mut doc, header), None);
        assert!(!doc.has_class(doc.root(), markers::EXPANDED));
    }

    // ==========================================================================
    // Panels
    // ==========================================================================

    #[test]
    fn test_result_panel_opens_and_rotates() {
        let (mut doc, _, result, _) = page();
        let header = header_of(&doc, result);

        let state = toggle_panel(&mut doc, header, PanelKind::Result).unwrap();
        assert!(state.visible);
        assert_eq!(state.rotation, Rotation::Expanded);
        assert_eq!(doc.style(state.content, "display"), Some("block"));
        assert_eq!(doc.style(state.indicator, "transform"), Some("rotate(90deg)"));

        let state = toggle_panel(&mut doc, header, PanelKind::Result).unwrap();
        assert!(!state.visible);
        assert_eq!(doc.style(state.content, "display"), Some("none"));
        assert_eq!(doc.style(state.indicator, "transform"), Some("rotate(0deg)"));
    }

    #[test]
    fn test_rotation_tracks_visibility() {
        let (mut doc, _, _, caveat) = page();
        let header = header_of(&doc, caveat);

        for _ in 0..5 {
            let state = toggle_panel(&mut doc, header, PanelKind::Caveat).unwrap();
            let visible = is_content_visible(&doc, state.content);
            let rotation =
                Rotation::from_css(doc.style(state.indicator, markers::STYLE_TRANSFORM));
            assert_eq!(visible, state.visible);
            assert_eq!(rotation.degrees() == 90, visible);
        }
    }

    #[test]
    fn test_unset_display_counts_as_hidden() {
        let (mut doc, _, result, _) = page();
        let header = header_of(&doc, result);
        let content = doc.next_element_sibling(header).unwrap();
        doc.set_style(content, "display", "");
        assert!(!is_content_visible(&doc, content));

        let state = toggle_panel(&mut doc, header, PanelKind::Result).unwrap();
        assert!(state.visible);
        assert_eq!(doc.style(content, "display"), Some("block"));
    }

    #[test]
    fn test_caveat_without_content_is_noop() {
        let mut doc = Document::new();
        let message = doc.append(doc.root(), Element::new("div"));
        let mut header = Element::new("div");
        Document::push_class_raw(&mut header, markers::CAVEAT_HEADER);
        let header = doc.append(message, header);
        let mut icon = Element::new("svg");
        Document::push_class_raw(&mut icon, markers::CAVEAT_ICON);
        let icon = doc.append(header, icon);

        assert_eq!(toggle_panel(&mut doc, header, PanelKind::Caveat), None);
        assert_eq!(doc.style(icon, "transform"), None);
    }

    #[test]
    fn test_panel_without_indicator_is_noop() {
        let mut doc = Document::new();
        let section = doc.append(doc.root(), Element::new("div"));
        let mut header = Element::new("div");
        Document::push_class_raw(&mut header, markers::RESULT_HEADER);
        let header = doc.append(section, header);
        let content = doc.append(section, Element::new("div"));

        assert_eq!(toggle_panel(&mut doc, header, PanelKind::Result), None);
        assert_eq!(doc.style(content, "display"), None);
    }
}
