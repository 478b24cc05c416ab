//! Renders a user's accumulated context into a single bounded text block for
//! inclusion in a provider prompt.
//!
//! Layout (sections only appear when non-empty, entries in insertion order):
//!
//! ```text
//! === Q&A Context ===
//! Q: <question>
//! A: <answer>
//!
//! === Document Context ===
//! Title: <title>
//! Content: <content>
//!
//! ```
//!
//! Output longer than `max_chars` is cut back to the last line boundary and
//! tagged with [`TRUNCATION_MARKER`].

use crate::context::models::UserContext;
use crate::context::store::ContextStore;

pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 8000;

pub const QA_SECTION_HEADER: &str = "=== Q&A Context ===";
pub const DOCUMENT_SECTION_HEADER: &str = "=== Document Context ===";
pub const TRUNCATION_MARKER: &str = "\n[Context truncated...]";

#[derive(Debug, Clone, Copy)]
pub struct ContextFormatter {
    max_chars: usize,
}

impl Default for ContextFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTEXT_CHARS)
    }
}

impl ContextFormatter {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Formats the stored context for `user_id`. Empty string means there is
    /// nothing to include.
    pub fn format_context_for_prompt(&self, store: &ContextStore, user_id: &str) -> String {
        self.format(&store.get_context(user_id))
    }

    pub fn format(&self, context: &UserContext) -> String {
        let mut out = String::new();

        if !context.qa.is_empty() {
            out.push_str(QA_SECTION_HEADER);
            out.push('\n');
            for entry in &context.qa {
                out.push_str(&format!("Q: {}\nA: {}\n\n", entry.question, entry.answer));
            }
        }

        if !context.documents.is_empty() {
            out.push_str(DOCUMENT_SECTION_HEADER);
            out.push('\n');
            for doc in &context.documents {
                out.push_str(&format!("Title: {}\nContent: {}\n\n", doc.title, doc.content));
            }
        }

        truncate_context(&out, self.max_chars)
    }
}

/// Bounds `text` to `max_chars` characters.
///
/// When a cut is needed the result backtracks to the last newline inside the
/// cut and appends [`TRUNCATION_MARKER`]. If the cut holds no newline past the
/// first character, the hard cut is returned without a marker.
pub fn truncate_context(text: &str, max_chars: usize) -> String {
    let cut = match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => return text.to_string(),
    };

    match cut.rfind('\n') {
        Some(newline) if newline > 0 => format!("{}{}", &cut[..newline], TRUNCATION_MARKER),
        _ => cut.to_string(),
    }
}
