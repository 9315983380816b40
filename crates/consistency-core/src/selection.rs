//! Active-issue selection and single-sentence highlighting.

use crate::model::{Issue, Sentence};

/// Resolve the active issue against the currently displayed list.
///
/// Keeps `active` when it is still displayed, otherwise falls back to the
/// first displayed issue. Returns `None` only when nothing is displayed.
pub fn select_default(display: &[&Issue], active: Option<&str>) -> Option<String> {
    if let Some(id) = active
        && display.iter().any(|issue| issue.id == id)
    {
        return Some(id.to_string());
    }
    display.first().map(|issue| issue.id.clone())
}

/// Tracks the one sentence currently emphasized, by position.
///
/// Sentence ids are not guaranteed unique, so the highlight is the index of
/// the first sentence carrying the requested id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlighter {
    current: Option<usize>,
}

impl Highlighter {
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Highlight `sentence_id`, replacing any previous highlight.
    ///
    /// An id with no matching sentence leaves nothing highlighted.
    pub fn highlight(&mut self, sentence_id: &str, sentences: &[Sentence]) {
        self.current = sentences.iter().position(|s| s.id == sentence_id);
    }
}
