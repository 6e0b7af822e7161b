//! Class, attribute and glyph names emitted by the page renderer.

pub const TOOL_CALL: &str = "tool-call";
pub const TOOL_HEADER: &str = "tool-header";
pub const TOOL_DETAILS: &str = "tool-details";
pub const EXPAND_ICON: &str = "expand-icon";
pub const EXPANDED: &str = "expanded";

pub const TASK_ENTRY: &str = "task-entry";
pub const ENTRY: &str = "entry";
pub const ENTRY_HEADER: &str = "entry-header";

pub const RESULT_SECTION: &str = "tool-result-section";
pub const RESULT_HEADER: &str = "result-header";
pub const RESULT_ICON: &str = "result-expand-icon";
pub const RESULT_CONTENT: &str = "result-content";

pub const CAVEAT_MESSAGE: &str = "caveat-message";
pub const CAVEAT_HEADER: &str = "caveat-header";
pub const CAVEAT_ICON: &str = "caveat-expand-icon";
pub const CAVEAT_CONTENT: &str = "caveat-content";

pub const TOKEN_TOGGLE: &str = "token-toggle";
pub const TOKEN_DETAILS: &str = "token-details";
pub const TOKEN_ICON: &str = "token-expand-icon";
pub const SHOW: &str = "show";

pub const ATTR_DEBUG_ID: &str = "data-debug-id";
pub const ATTR_TOOL_NAME: &str = "data-tool-name";
pub const ATTR_PARENT_ENTRY: &str = "data-parent-entry";
pub const ATTR_PARENT_TOOL: &str = "data-parent-tool";
pub const ATTR_HAS_TASK_ENTRIES: &str = "data-has-task-entries";

/// Token indicator text while details are shown.
pub const GLYPH_EXPANDED: &str = "[-]";
/// Token indicator text while details are hidden.
pub const GLYPH_COLLAPSED: &str = "[+]";

pub const STYLE_DISPLAY: &str = "display";
pub const STYLE_TRANSFORM: &str = "transform";
