//! Composition of outbound post text.
//!
//! Pure text assembly: attribution, optional quoted-reply framing, and the
//! image-only fallback line. Attachment annotations (` [Image upload
//! failed]`, ` [Attached: …]`) are appended to the body by the router
//! before this module runs, so they land inside the formatted output.

use crate::reply::{self, ReplyContext};

/// Maximum characters of a quoted excerpt shown in the reply frame.
const EXCERPT_CHARS: usize = 50;

/// Truncate to `limit` characters, appending `...` when anything was cut.
pub(crate) fn truncate_excerpt(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    let cut: String = text.chars().take(limit).collect();
    format!("{cut}...")
}

/// Compose the final outbound text for one post.
///
/// Precedence: a resolved reply context, then the textual reply heuristic
/// on the body itself, then plain attribution, then the image-only line
/// for an empty body. Deterministic; performs no I/O.
#[must_use]
pub fn format_outbound(author: &str, body: &str, context: Option<&ReplyContext>) -> String {
    if let Some(ctx) = context {
        let excerpt = truncate_excerpt(&ctx.quoted_excerpt, EXCERPT_CHARS);
        return format!(
            "↪ Replying to {}: \"{excerpt}\"\n\n{author}: {body}",
            ctx.quoted_author
        );
    }

    if let Some((quoted_author, cleaned_body)) = reply::detect_textual(body) {
        return format!("↪ Replying to {quoted_author}:\n\n{author}: {cleaned_body}");
    }

    if body.trim().is_empty() {
        return format!("{author} sent an image");
    }

    format!("{author}: {body}")
}
