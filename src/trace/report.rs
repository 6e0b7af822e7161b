//! Structured diagnostic reports.
//!
//! These are plain data collected from the page. The tracer turns them into
//! sink records; the CLI prints them as JSON.

use serde::Serialize;

use crate::document::{markers, Document, NodeId};
use crate::hierarchy::{self, HierarchyPath};
use crate::style::{MatchedRule, StyleSheets};

/// Everything known about one tool call at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCallReport {
    pub debug_id: Option<String>,
    pub tool_name: Option<String>,
    pub parent_entry: Option<String>,
    pub has_task_entries: bool,
    pub class_name: String,
    pub expanded: bool,
    pub hierarchy_path: HierarchyPath,
    pub inside_task_entry: bool,
    pub task_entry_id: Option<String>,
    pub parent_tool: Option<String>,
    pub nested_task_entries: usize,
    pub details_display: Option<String>,
    /// Whether the details region and every ancestor are displayed.
    pub details_rendered: Option<bool>,
    pub matching_rules: Vec<MatchedRule>,
}

impl ToolCallReport {
    pub fn collect(doc: &Document, tool: NodeId, styles: &StyleSheets) -> Option<Self> {
        let node = doc.node(tool)?;
        let task_entry = hierarchy::enclosing_task_entry(doc, tool).and_then(|t| doc.node(t));
        let details = details_region(doc, tool);

        Some(Self {
            debug_id: node.debug_id().map(str::to_string),
            tool_name: node.tool_name().map(str::to_string),
            parent_entry: node.parent_entry().map(str::to_string),
            has_task_entries: node.has_nested_task_entries(),
            class_name: node.class_name(),
            expanded: node.is_expanded(),
            hierarchy_path: hierarchy::debug_path(doc, tool),
            inside_task_entry: task_entry.is_some(),
            task_entry_id: task_entry.and_then(|t| t.debug_id()).map(str::to_string),
            parent_tool: task_entry.and_then(|t| t.parent_tool()).map(str::to_string),
            nested_task_entries: hierarchy::nested_task_entry_count(doc, tool),
            details_display: details.map(|d| styles.computed_display(doc, d).to_string()),
            details_rendered: details.map(|d| styles.is_rendered(doc, d)),
            matching_rules: details
                .map(|d| styles.matching_rules(doc, d))
                .unwrap_or_default(),
        })
    }
}

/// State of a tool call right after its header was clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AfterToggleReport {
    pub expanded: bool,
    pub details_display: Option<String>,
    pub details_visible: Option<bool>,
}

impl AfterToggleReport {
    pub fn collect(doc: &Document, tool: NodeId, styles: &StyleSheets) -> Self {
        // Looked up again here; the region may not exist at all.
        let display = details_region(doc, tool).map(|d| styles.computed_display(doc, d));
        Self {
            expanded: doc.has_class(tool, markers::EXPANDED),
            details_visible: display.as_ref().map(|d| !d.is_none()),
            details_display: display.map(|d| d.to_string()),
        }
    }

    pub fn visibility_label(&self) -> Option<&'static str> {
        self.details_visible
            .map(|v| if v { "VISIBLE" } else { "HIDDEN" })
    }
}

/// A tool call as seen by the page-ready audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditedToolCall {
    pub index: usize,
    #[serde(flatten)]
    pub report: ToolCallReport,
    /// Task entries between this call and the top level.
    pub task_depth: usize,
}

impl AuditedToolCall {
    fn collect(doc: &Document, index: usize, tool: NodeId, styles: &StyleSheets) -> Option<Self> {
        Some(Self {
            index,
            report: ToolCallReport::collect(doc, tool, styles)?,
            task_depth: hierarchy::task_depth(doc, tool),
        })
    }

    /// Enclosing task entry id, `"none"` when there is none.
    pub fn task_entry_label(&self) -> &str {
        self.report.task_entry_id.as_deref().unwrap_or("none")
    }

    /// Details display, `"no-details"` when the call has no details region.
    pub fn details_label(&self) -> &str {
        self.report.details_display.as_deref().unwrap_or("no-details")
    }
}

/// Whole-page structure audit taken once the page is ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageAudit {
    pub tool_calls: Vec<AuditedToolCall>,
    pub nested_tool_calls: Vec<AuditedToolCall>,
    /// Every element carrying `expanded`, by debug id or class string.
    pub expanded_elements: Vec<String>,
}

impl PageAudit {
    pub fn collect(doc: &Document, styles: &StyleSheets) -> Self {
        let audit = |tools: Vec<NodeId>| -> Vec<AuditedToolCall> {
            tools
                .into_iter()
                .enumerate()
                .filter_map(|(index, tc)| AuditedToolCall::collect(doc, index, tc, styles))
                .collect()
        };

        let expanded_elements = doc
            .query_class(markers::EXPANDED)
            .into_iter()
            .filter_map(|e| doc.node(e).map(|n| n.label()))
            .collect();

        Self {
            tool_calls: audit(doc.query_class(markers::TOOL_CALL)),
            nested_tool_calls: audit(hierarchy::nested_tool_calls(doc)),
            expanded_elements,
        }
    }

    pub fn total_tool_calls(&self) -> usize {
        self.tool_calls.len()
    }
}

/// The details region belonging to a tool call.
pub fn details_region(doc: &Document, tool: NodeId) -> Option<NodeId> {
    doc.children(tool)
        .iter()
        .copied()
        .find(|&c| doc.has_class(c, markers::TOOL_DETAILS))
        .or_else(|| doc.first_with_class(tool, markers::TOOL_DETAILS))
}
