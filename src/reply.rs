//! Reply-context detection for inbound message bodies.
//!
//! A structurally-resolved reply target always wins. When the source
//! platform did not link one, a fixed ordered sequence of text patterns is
//! tried against the raw body. The heuristic is best-effort: a plain
//! `@name` mention at the start of a message will be misclassified as a
//! reply convention. That is a known limitation, not a contract.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::event::ReplyTarget;

/// Maximum characters of a structurally-resolved target kept as excerpt.
const STRUCTURAL_EXCERPT_CHARS: usize = 100;

/// Quoted excerpt plus quoted-author label derived for one relay operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    /// Display name of the quoted author.
    pub quoted_author: String,
    /// Quoted excerpt, truncated to a bounded length.
    pub quoted_excerpt: String,
}

/// Ordered reply conventions. First match with two capture groups wins;
/// group 1 is the quoted-author token, group 2 the remaining content.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?s)^Reply to @(\w+):\s*(.+)$",
        r"(?s)^@(\w+)\s+(.+)$",
        r"(?s)^>\s*(.+?)\n+(.+)$",
        r#"(?s)^"([^"]+)"\s+(.+)$"#,
    ]
    .into_iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Build a reply context from a structurally-resolved target.
#[must_use]
pub fn from_structural(target: &ReplyTarget) -> ReplyContext {
    ReplyContext {
        quoted_author: target.author.clone(),
        quoted_excerpt: target
            .content
            .chars()
            .take(STRUCTURAL_EXCERPT_CHARS)
            .collect(),
    }
}

/// Try the textual reply conventions against a raw message body.
///
/// Returns `(quoted_author, remaining_content)` for the first matching
/// pattern, or `None` when the body follows no known convention.
#[must_use]
pub fn detect_textual(body: &str) -> Option<(String, String)> {
    for pattern in PATTERNS.iter() {
        if let Some(captures) = pattern.captures(body) {
            if captures.len() == 3 {
                let author = captures.get(1)?.as_str().to_owned();
                let rest = captures.get(2)?.as_str().to_owned();
                return Some((author, rest));
            }
        }
    }
    None
}
