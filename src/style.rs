//! Style-rule introspection.
//!
//! The controller never styles anything itself. It only needs to ask which
//! rules apply to an element and what `display` value wins, so the tracer can
//! report whether a region is actually visible after a toggle.
//!
//! Supported selector syntax is the subset the viewer's stylesheet uses:
//! tag and class compounds (`div.tool-call.expanded`, `.token-details`, `*`)
//! joined by child (`>`) or descendant (whitespace) combinators, optionally
//! grouped with commas.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::document::{markers, Document, Element, NodeId};

/// Errors from stylesheet access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("Cannot read rules from cross-origin stylesheet: {0}")]
    CrossOrigin(String),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Computed `display` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    None,
    Block,
    Inline,
    InlineBlock,
    Flex,
    Other(String),
}

impl Display {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "none" => Self::None,
            "block" => Self::Block,
            "inline" => Self::Inline,
            "inline-block" => Self::InlineBlock,
            "flex" => Self::Flex,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Block => "block",
            Self::Inline => "inline",
            Self::InlineBlock => "inline-block",
            Self::Flex => "flex",
            Self::Other(s) => s,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    fn default_for(element: &Element) -> Self {
        match element.tag.as_str() {
            "span" | "strong" | "code" | "svg" | "em" | "a" => Self::Inline,
            _ => Self::Block,
        }
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Selectors
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(token: &str, selector: &str) -> Result<Self, StyleError> {
        let invalid = |reason: &str| StyleError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        };
        if let Some(bad) = token
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '*')))
        {
            return Err(invalid(&format!("unsupported character '{bad}'")));
        }

        let mut parts = token.split('.');
        let head = parts.next().unwrap_or_default();
        let tag = match head {
            "" | "*" => None,
            name => Some(name.to_ascii_lowercase()),
        };
        let classes: Vec<String> = parts.map(str::to_string).collect();
        if classes.iter().any(String::is_empty) {
            return Err(invalid("empty class name"));
        }
        if tag.is_none() && classes.is_empty() && head != "*" {
            return Err(invalid("empty compound"));
        }
        Ok(Self { tag, classes })
    }

    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.classes.iter().all(|c| element.has_class(c))
    }
}

/// A single complex selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    text: String,
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

impl Selector {
    pub fn parse(text: &str) -> Result<Self, StyleError> {
        let text = text.trim();
        let invalid = |reason: &str| StyleError::InvalidSelector {
            selector: text.to_string(),
            reason: reason.to_string(),
        };
        let spaced = text.replace('>', " > ");

        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pending: Option<Combinator> = None;
        for token in spaced.split_whitespace() {
            if token == ">" {
                if compounds.is_empty() || pending == Some(Combinator::Child) {
                    return Err(invalid("misplaced '>'"));
                }
                pending = Some(Combinator::Child);
                continue;
            }
            if !compounds.is_empty() {
                combinators.push(pending.take().unwrap_or(Combinator::Descendant));
            }
            compounds.push(Compound::parse(token, text)?);
        }
        if compounds.is_empty() {
            return Err(invalid("empty selector"));
        }
        if pending.is_some() {
            return Err(invalid("dangling '>'"));
        }
        Ok(Self {
            text: text.to_string(),
            compounds,
            combinators,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// (class count, tag count).
    pub fn specificity(&self) -> (usize, usize) {
        self.compounds.iter().fold((0, 0), |(c, t), comp| {
            (c + comp.classes.len(), t + usize::from(comp.tag.is_some()))
        })
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.matches_at(doc, self.compounds.len() - 1, node)
    }

    fn matches_at(&self, doc: &Document, idx: usize, node: NodeId) -> bool {
        let Some(element) = doc.get(node) else {
            return false;
        };
        if !self.compounds[idx].matches(element) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        let Some(parent) = doc.parent(node) else {
            return false;
        };
        match self.combinators[idx - 1] {
            Combinator::Child => self.matches_at(doc, idx - 1, parent),
            Combinator::Descendant => doc
                .ancestors(parent)
                .any(|a| self.matches_at(doc, idx - 1, a)),
        }
    }
}

// =============================================================================
// Rules and sheets
// =============================================================================

/// One style rule: a selector list and the `display` it sets, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    selectors: Vec<Selector>,
    display: Option<Display>,
}

impl StyleRule {
    pub fn new(selector_text: &str, display: Option<&str>) -> Result<Self, StyleError> {
        let selectors = selector_text
            .split(',')
            .map(Selector::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            selectors,
            display: display.map(Display::parse),
        })
    }

    pub fn selector_text(&self) -> String {
        self.selectors
            .iter()
            .map(Selector::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn display(&self) -> Option<&Display> {
        self.display.as_ref()
    }

    /// Highest specificity among the selectors matching `node`.
    fn matching_specificity(&self, doc: &Document, node: NodeId) -> Option<(usize, usize)> {
        self.selectors
            .iter()
            .filter(|s| s.matches(doc, node))
            .map(Selector::specificity)
            .max()
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.matching_specificity(doc, node).is_some()
    }
}

/// Anything that can list style rules. Reading may be refused.
pub trait StyleSource: Send + Sync {
    fn origin(&self) -> &str;

    fn rules(&self) -> Result<&[StyleRule], StyleError>;
}

/// In-memory stylesheet.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    origin: String,
    rules: Vec<StyleRule>,
    cross_origin: bool,
}

impl StyleSheet {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            rules: Vec::new(),
            cross_origin: false,
        }
    }

    /// A sheet whose rules cannot be read, like a cross-origin stylesheet.
    pub fn cross_origin(origin: impl Into<String>) -> Self {
        Self {
            cross_origin: true,
            ..Self::new(origin)
        }
    }

    pub fn rule(mut self, selector: &str, display: Option<&str>) -> Result<Self, StyleError> {
        self.rules.push(StyleRule::new(selector, display)?);
        Ok(self)
    }
}

impl StyleSource for StyleSheet {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn rules(&self) -> Result<&[StyleRule], StyleError> {
        if self.cross_origin {
            return Err(StyleError::CrossOrigin(self.origin.clone()));
        }
        Ok(&self.rules)
    }
}

/// A rule that matched an element, as reported by the tracer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRule {
    pub selector: String,
    pub display: Option<String>,
}

/// Ordered set of style sources for a page.
#[derive(Default)]
pub struct StyleSheets {
    sources: Vec<Box<dyn StyleSource>>,
}

impl fmt::Debug for StyleSheets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleSheets")
            .field("sources", &self.sources.iter().map(|s| s.origin()).collect::<Vec<_>>())
            .finish()
    }
}

impl StyleSheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// The viewer's own disclosure rules.
    pub fn viewer_default() -> Self {
        let mut sheets = Self::new();
        sheets.push(viewer_sheet());
        sheets
    }

    pub fn push(&mut self, source: impl StyleSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn with(mut self, source: impl StyleSource + 'static) -> Self {
        self.push(source);
        self
    }

    /// Readable rules in source order. Unreadable sources are skipped.
    fn readable_rules(&self) -> impl Iterator<Item = &StyleRule> + '_ {
        self.sources.iter().flat_map(|source| {
            source
                .rules()
                .unwrap_or_else(|err| {
                    tracing::debug!(origin = source.origin(), %err, "skipping stylesheet");
                    &[]
                })
                .iter()
        })
    }

    pub fn matching_rules(&self, doc: &Document, node: NodeId) -> Vec<MatchedRule> {
        self.readable_rules()
            .filter(|rule| rule.matches(doc, node))
            .map(|rule| MatchedRule {
                selector: rule.selector_text(),
                display: rule.display().map(|d| d.to_string()),
            })
            .collect()
    }

    /// The winning `display` value for one element.
    pub fn computed_display(&self, doc: &Document, node: NodeId) -> Display {
        let Some(element) = doc.get(node) else {
            return Display::None;
        };
        if let Some(inline) = element.style(markers::STYLE_DISPLAY) {
            return Display::parse(inline);
        }
        self.readable_rules()
            .enumerate()
            .filter_map(|(order, rule)| {
                let display = rule.display()?;
                let specificity = rule.matching_specificity(doc, node)?;
                Some(((specificity, order), display))
            })
            .max_by_key(|(key, _)| *key)
            .map(|(_, display)| display.clone())
            .unwrap_or_else(|| Display::default_for(element))
    }

    /// Whether the element and all of its ancestors are displayed.
    pub fn is_rendered(&self, doc: &Document, node: NodeId) -> bool {
        doc.contains(node)
            && doc
                .ancestors(node)
                .all(|a| !self.computed_display(doc, a).is_none())
    }
}

fn viewer_sheet() -> StyleSheet {
    const RULES: &[(&str, &str)] = &[
        (".tool-details", "none"),
        (".tool-call.expanded > .tool-details", "block"),
        (".token-details", "none"),
        (".token-details.show", "inline"),
    ];
    let mut sheet = StyleSheet::new("viewer");
    for (selector, display) in RULES {
        match StyleRule::new(selector, Some(display)) {
            Ok(rule) => sheet.rules.push(rule),
            Err(err) => tracing::warn!(%err, "built-in rule rejected"),
        }
    }
    sheet
}
