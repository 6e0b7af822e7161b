//! Page-wide token usage breakdown state.
//!
//! Every assistant entry shows a token summary with a `[+]` toggle. Opening
//! one opens all of them: the state is one boolean for the whole page, not a
//! per-entry flag. The boolean starts `false` when the page loads and only
//! [`TokenDetails::toggle`] changes it.

use crate::document::{markers, Document, NodeId};

/// The single token-details flag for a page.
#[derive(Debug, Default)]
pub struct TokenDetails {
    expanded: bool,
}

impl TokenDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Flip the flag and push it to every token group on the page.
    ///
    /// Returns the new value.
    pub fn toggle(&mut self, doc: &mut Document) -> bool {
        self.expanded = !self.expanded;
        let groups = self.sync(doc);
        tracing::debug!(expanded = self.expanded, groups, "token details toggled");
        self.expanded
    }

    /// Apply the current flag to every token group without flipping it.
    ///
    /// Returns how many groups were visited.
    pub fn sync(&self, doc: &mut Document) -> usize {
        let groups = doc.query_class(markers::TOKEN_TOGGLE);
        for &group in &groups {
            apply_to_group(doc, group, self.expanded);
        }
        groups.len()
    }
}

fn apply_to_group(doc: &mut Document, group: NodeId, expanded: bool) {
    match doc.first_with_class(group, markers::TOKEN_DETAILS) {
        Some(details) if expanded => doc.add_class(details, markers::SHOW),
        Some(details) => doc.remove_class(details, markers::SHOW),
        None => tracing::trace!(group = group.index(), "token group has no details region"),
    }
    match doc.first_with_class(group, markers::TOKEN_ICON) {
        Some(icon) => doc.set_text(icon, glyph(expanded)),
        None => tracing::trace!(group = group.index(), "token group has no indicator"),
    }
}

pub fn glyph(expanded: bool) -> &'static str {
    if expanded {
        markers::GLYPH_EXPANDED
    } else {
        markers::GLYPH_COLLAPSED
    }
}

/// Shown/hidden state and glyph of one group, for inspection.
pub fn group_state(doc: &Document, group: NodeId) -> (Option<bool>, Option<String>) {
    let shown = doc
        .first_with_class(group, markers::TOKEN_DETAILS)
        .map(|d| doc.has_class(d, markers::SHOW));
    let glyph = doc
        .first_with_class(group, markers::TOKEN_ICON)
        .and_then(|i| doc.text(i))
        .map(str::to_string);
    (shown, glyph)
}
