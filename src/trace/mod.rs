//! Diagnostic tracing of the page hierarchy.
//!
//! The tracer is built once with a sink. With [`NoopSink`] every method
//! returns before touching the document, so production pages pay nothing.

mod report;
mod sink;

use std::sync::Arc;

pub use report::{details_region, AfterToggleReport, AuditedToolCall, PageAudit, ToolCallReport};
pub use sink::{format_record, DebugSink, MemorySink, NoopSink, TraceValue, TracingSink};

use crate::document::{Document, NodeId};
use crate::style::StyleSheets;

const RULE: &str = "========================";

/// Emits hierarchy diagnostics to a [`DebugSink`].
#[derive(Clone)]
pub struct Tracer {
    sink: Arc<dyn DebugSink>,
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Tracer {
    pub fn new(sink: Arc<dyn DebugSink>) -> Self {
        Self { sink }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopSink))
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.enabled()
    }

    fn emit(&self, args: &[TraceValue]) {
        self.sink.log(args);
    }

    fn line(&self, label: &str, value: impl Into<TraceValue>) {
        self.emit(&[label.into(), value.into()]);
    }

    /// Report a tool call before its header click is applied.
    pub fn before_toggle(
        &self,
        doc: &Document,
        tool: NodeId,
        styles: &StyleSheets,
    ) -> Option<ToolCallReport> {
        if !self.is_enabled() {
            return None;
        }
        let report = ToolCallReport::collect(doc, tool, styles)?;

        self.emit(&["=== Tool header clicked ===".into()]);
        self.line("Tool debug-id:", report.debug_id.clone());
        self.line("Tool name:", report.tool_name.clone());
        self.line("Parent entry:", report.parent_entry.clone());
        self.line("Has task entries:", report.has_task_entries);
        self.line("Current classes:", report.class_name.clone());
        self.line("Has expanded class:", report.expanded);
        self.line("Full hierarchy path:", report.hierarchy_path.to_string());
        self.line("Inside task-entry:", report.inside_task_entry);
        if report.inside_task_entry {
            self.line("Task entry debug-id:", report.task_entry_id.clone());
            self.line("Parent tool:", report.parent_tool.clone());
        }
        self.line("Nested task entries within:", report.nested_task_entries);
        if let Some(display) = &report.details_display {
            self.line("Tool details computed style:", display.as_str());
            self.line("Tool details rendered:", report.details_rendered);
            let rules: Vec<String> = report
                .matching_rules
                .iter()
                .map(|r| match &r.display {
                    Some(d) => format!("{} {{display: {d}}}", r.selector),
                    None => r.selector.clone(),
                })
                .collect();
            self.line("Matching CSS rules:", rules);
        }
        Some(report)
    }

    /// Report a tool call after its header click was applied.
    pub fn after_toggle(
        &self,
        doc: &Document,
        tool: NodeId,
        styles: &StyleSheets,
    ) -> Option<AfterToggleReport> {
        if !self.is_enabled() {
            return None;
        }
        let report = AfterToggleReport::collect(doc, tool, styles);

        self.emit(&["=== After toggle ===".into()]);
        self.line("Has expanded class:", report.expanded);
        if let Some(display) = &report.details_display {
            self.line("Tool details computed style:", display.as_str());
        }
        if let Some(label) = report.visibility_label() {
            self.line("Display changed:", label);
        }
        self.emit(&[RULE.into()]);
        Some(report)
    }

    /// Audit every tool call on the page once it has loaded.
    pub fn page_ready(&self, doc: &Document, styles: &StyleSheets) -> Option<PageAudit> {
        if !self.is_enabled() {
            return None;
        }
        let audit = PageAudit::collect(doc, styles);

        self.emit(&["=== Page loaded - checking CSS rules ===".into()]);
        self.line("Total tool calls found:", audit.total_tool_calls());
        for tc in &audit.tool_calls {
            self.emit(&[format!(
                "Tool {}: {} ({}) - Has tasks: {}",
                tc.index,
                tc.report.debug_id.as_deref().unwrap_or("null"),
                tc.report.tool_name.as_deref().unwrap_or("null"),
                tc.report.has_task_entries,
            )
            .into()]);
            self.audit_row(tc);
        }

        self.line("Nested tool calls:", audit.nested_tool_calls.len());
        self.emit(&["Checking for expanded ancestors:".into()]);
        for (index, label) in audit.expanded_elements.iter().enumerate() {
            self.line(&format!("Expanded element {index}:"), label.as_str());
        }

        for nested in &audit.nested_tool_calls {
            self.emit(&[format!(
                "Nested {}: {} ({})",
                nested.index,
                nested.report.debug_id.as_deref().unwrap_or("null"),
                nested.report.tool_name.as_deref().unwrap_or("null"),
            )
            .into()]);
            self.emit(&[format!("  In task-entry: {}", nested.task_entry_label()).into()]);
            self.emit(&[format!("  Tool-details display: {}", nested.details_label()).into()]);
            self.emit(&[format!("  Has tasks: {}", nested.report.has_task_entries).into()]);
            self.audit_row(nested);
        }
        self.emit(&[RULE.into()]);
        Some(audit)
    }

    /// Per-call attributes shared by the top-level and nested listings.
    fn audit_row(&self, row: &AuditedToolCall) {
        let report = &row.report;
        self.emit(&[format!("  Current classes: {}", report.class_name).into()]);
        self.emit(&[format!("  Has expanded class: {}", report.expanded).into()]);
        self.emit(&[format!("  Full hierarchy path: {}", report.hierarchy_path).into()]);
        self.emit(&[format!("  Inside task-entry: {}", report.inside_task_entry).into()]);
        self.emit(&[format!("  Nested task entries within: {}", report.nested_task_entries).into()]);
        self.emit(&[format!("  Task depth: {}", row.task_depth).into()]);
    }
}
