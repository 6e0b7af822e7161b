//! Read-only disclosure accessors over page elements.

use super::markers;
use super::{Element, NodeId};

/// Structural role of an element, derived from its class markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisclosureKind {
    ToolCall,
    TaskEntry,
    ResultPanel,
    CaveatPanel,
    TokenDetailGroup,
    Plain,
}

impl DisclosureKind {
    /// Classify an element. The first matching marker wins.
    pub fn of(element: &Element) -> Self {
        if element.has_class(markers::TOOL_CALL) {
            Self::ToolCall
        } else if element.has_class(markers::TASK_ENTRY) {
            Self::TaskEntry
        } else if element.has_class(markers::RESULT_SECTION) {
            Self::ResultPanel
        } else if element.has_class(markers::CAVEAT_MESSAGE) {
            Self::CaveatPanel
        } else if element.has_class(markers::TOKEN_TOGGLE) {
            Self::TokenDetailGroup
        } else {
            Self::Plain
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolCall => "tool-call",
            Self::TaskEntry => "task-entry",
            Self::ResultPanel => "result-panel",
            Self::CaveatPanel => "caveat-panel",
            Self::TokenDetailGroup => "token-detail-group",
            Self::Plain => "plain",
        }
    }
}

/// Borrowed view of one element with the disclosure attributes decoded.
#[derive(Debug, Clone, Copy)]
pub struct DisclosureNode<'a> {
    id: NodeId,
    element: &'a Element,
}

impl<'a> DisclosureNode<'a> {
    pub(super) fn new(id: NodeId, element: &'a Element) -> Self {
        Self { id, element }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    pub fn debug_id(&self) -> Option<&'a str> {
        self.element
            .attr(markers::ATTR_DEBUG_ID)
            .filter(|id| !id.is_empty())
    }

    pub fn kind(&self) -> DisclosureKind {
        DisclosureKind::of(self.element)
    }

    /// Tool name; only tool-call elements carry one.
    pub fn tool_name(&self) -> Option<&'a str> {
        match self.kind() {
            DisclosureKind::ToolCall => self.element.attr(markers::ATTR_TOOL_NAME),
            _ => None,
        }
    }

    pub fn parent_entry(&self) -> Option<&'a str> {
        self.element.attr(markers::ATTR_PARENT_ENTRY)
    }

    pub fn parent_tool(&self) -> Option<&'a str> {
        self.element.attr(markers::ATTR_PARENT_TOOL)
    }

    /// Render-time flag; the attribute is only emitted when true.
    pub fn has_nested_task_entries(&self) -> bool {
        self.element.attr(markers::ATTR_HAS_TASK_ENTRIES) == Some("true")
    }

    pub fn is_expanded(&self) -> bool {
        self.element.has_class(markers::EXPANDED)
    }

    pub fn class_name(&self) -> String {
        self.element.class_name()
    }

    /// Debug id when present, otherwise the class string.
    pub fn label(&self) -> String {
        self.debug_id()
            .map(str::to_string)
            .unwrap_or_else(|| self.class_name())
    }
}
