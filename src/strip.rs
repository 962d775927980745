//! Normalize raw annotation lines by stripping markers and the keyword.

use crate::lang::{BULLET_MARKER, COMMENT_MARKER};
use regex::Regex;
use std::sync::LazyLock;

/// The annotation keyword followed by a colon or whitespace, any case.
static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)todo(\s|:)").expect("keyword pattern"));

/// Strip a raw line down to its annotation content.
///
/// Removes at most one leading comment or bullet marker. With
/// `collapse_whitespace`, surrounding whitespace and the gap left by the
/// marker are trimmed as well. With `strip_keyword`, the first
/// case-insensitive `todo` followed by `:` or whitespace is removed and the
/// result trimmed. Never fails; a line without a marker passes through
/// marker removal untouched.
pub fn strip_line(line: &str, collapse_whitespace: bool, strip_keyword: bool) -> String {
    let trimmed = if collapse_whitespace { line.trim() } else { line };

    let unmarked = trimmed
        .strip_prefix(COMMENT_MARKER)
        .or_else(|| trimmed.strip_prefix(BULLET_MARKER))
        .unwrap_or(trimmed);

    let mut result = if collapse_whitespace {
        unmarked.trim_start().to_string()
    } else {
        unmarked.to_string()
    };

    if strip_keyword {
        result = KEYWORD_RE.replacen(&result, 1, "").trim().to_string();
    }

    result
}
