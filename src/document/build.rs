//! Page assembly with the renderer's markup.
//!
//! Produces the same element structure the HTML template emits so tests and
//! tools can work on realistic pages without going through JSON.

use super::markers;
use super::{Document, Element, NodeId};

/// Who wrote an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Leading eight characters of a uuid, as used in debug ids.
pub fn short_uuid(uuid: &str) -> &str {
    match uuid.char_indices().nth(8) {
        Some((idx, _)) => &uuid[..idx],
        None => uuid,
    }
}

/// Incremental builder for a page document.
#[derive(Debug, Default)]
pub struct PageBuilder {
    doc: Document,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> NodeId {
        self.doc.root()
    }

    pub fn finish(self) -> Document {
        self.doc
    }

    fn el(&mut self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let mut element = Element::new(tag);
        for class in classes {
            Document::push_class_raw(&mut element, *class);
        }
        self.doc.append(parent, element)
    }

    fn child_with_class(&self, parent: NodeId, class: &str) -> Option<NodeId> {
        self.doc
            .children(parent)
            .iter()
            .copied()
            .find(|&c| self.doc.has_class(c, class))
    }

    /// Append a conversation entry under `parent` (the root or a task entry).
    pub fn entry(&mut self, parent: NodeId, uuid: &str, role: Role) -> NodeId {
        let entry = self.el(parent, "div", &[markers::ENTRY, role.as_str()]);
        self.doc
            .set_attr(entry, markers::ATTR_DEBUG_ID, format!("entry-{}", short_uuid(uuid)));
        self.doc.set_attr(entry, "data-uuid", uuid);
        let header = self.el(entry, "div", &[markers::ENTRY_HEADER]);
        let role_span = self.el(header, "span", &["role", role.as_str()]);
        self.doc.set_text(role_span, role.as_str());
        entry
    }

    /// Add the token usage toggle to an entry header.
    pub fn token_toggle(&mut self, entry: NodeId, details: &str) -> NodeId {
        let header = self
            .child_with_class(entry, markers::ENTRY_HEADER)
            .unwrap_or(entry);
        let toggle = self.el(header, "span", &[markers::TOKEN_TOGGLE]);
        let icon = self.el(toggle, "span", &[markers::TOKEN_ICON]);
        self.doc.set_text(icon, markers::GLYPH_COLLAPSED);
        let body = self.el(toggle, "span", &[markers::TOKEN_DETAILS]);
        self.doc.set_text(body, details);
        toggle
    }

    /// Add a tool call to an entry. Bash calls render without a header.
    pub fn tool_call(&mut self, entry: NodeId, tool_id: &str, name: &str) -> NodeId {
        let list = match self.child_with_class(entry, "tool-calls") {
            Some(list) => list,
            None => self.el(entry, "div", &["tool-calls"]),
        };
        let tool = self.el(list, "div", &[markers::TOOL_CALL]);
        self.doc
            .set_attr(tool, markers::ATTR_DEBUG_ID, format!("tool-{tool_id}"));
        self.doc.set_attr(tool, markers::ATTR_TOOL_NAME, name);
        if let Some(uuid) = self.doc.attr(entry, "data-uuid").map(str::to_string) {
            self.doc
                .set_attr(tool, markers::ATTR_PARENT_ENTRY, short_uuid(&uuid));
        }

        if name == "Bash" {
            let container = self.el(tool, "div", &["bash-tool-container"]);
            let copy = self.el(container, "div", &["tool-id-copy"]);
            self.doc.set_text(copy, format!("Tool ID: {tool_id}"));
            return tool;
        }

        let header = self.el(tool, "div", &[markers::TOOL_HEADER]);
        self.el(header, "svg", &[markers::EXPAND_ICON]);
        let name_span = self.el(header, "span", &["tool-name"]);
        self.doc.set_text(name_span, name);
        let id_span = self.el(header, "span", &["tool-id"]);
        self.doc.set_text(id_span, tool_id);
        self.el(tool, "div", &[markers::TOOL_DETAILS]);
        tool
    }

    /// Open a task entry inside a tool call's details.
    ///
    /// Returns the task-entry container; put nested entries under it with
    /// [`PageBuilder::entry`].
    pub fn task_entry(&mut self, tool: NodeId, uuid: &str) -> NodeId {
        let details = match self.child_with_class(tool, markers::TOOL_DETAILS) {
            Some(details) => details,
            None => self.el(tool, "div", &[markers::TOOL_DETAILS]),
        };
        self.doc
            .set_attr(tool, markers::ATTR_HAS_TASK_ENTRIES, "true");
        let wrapper = match self.child_with_class(details, "task-entries") {
            Some(w) => w,
            None => self.el(details, "div", &["task-entries"]),
        };
        let task = self.el(wrapper, "div", &[markers::TASK_ENTRY]);
        self.doc.set_attr(
            task,
            markers::ATTR_DEBUG_ID,
            format!("task-entry-{}", short_uuid(uuid)),
        );
        let tool_id = self
            .doc
            .attr(tool, markers::ATTR_DEBUG_ID)
            .and_then(|d| d.strip_prefix("tool-"))
            .unwrap_or_default()
            .to_string();
        self.doc.set_attr(task, markers::ATTR_PARENT_TOOL, tool_id);
        task
    }

    /// Add a collapsible result section to a tool call's details.
    pub fn result(&mut self, tool: NodeId, content: &str) -> NodeId {
        let details = match self.child_with_class(tool, markers::TOOL_DETAILS) {
            Some(details) => details,
            None => self.el(tool, "div", &[markers::TOOL_DETAILS]),
        };
        let section = self.el(details, "div", &[markers::RESULT_SECTION]);
        let header = self.el(section, "div", &[markers::RESULT_HEADER]);
        self.el(header, "svg", &[markers::RESULT_ICON]);
        let label = self.el(header, "strong", &[]);
        self.doc.set_text(label, "Result");
        let body = self.el(section, "div", &[markers::RESULT_CONTENT]);
        self.doc.set_style(body, markers::STYLE_DISPLAY, "none");
        self.doc.set_text(body, content);
        section
    }

    /// Add a collapsed caveat message to an entry.
    pub fn caveat(&mut self, entry: NodeId, content: &str) -> NodeId {
        let message = self.el(entry, "div", &[markers::CAVEAT_MESSAGE]);
        let header = self.el(message, "div", &[markers::CAVEAT_HEADER]);
        self.el(header, "svg", &[markers::CAVEAT_ICON]);
        let label = self.el(header, "span", &[]);
        self.doc.set_text(label, "Command caveat message");
        let body = self.el(message, "div", &[markers::CAVEAT_CONTENT]);
        self.doc.set_style(body, markers::STYLE_DISPLAY, "none");
        self.doc.set_text(body, content);
        message
    }
}
