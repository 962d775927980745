//! Decide whether one diff line opens a todo annotation.

use crate::diff::{DiffLine, LineStatus};
use crate::lang::SKIP_MARKER;
use crate::strip::strip_line;
use regex::Regex;
use std::sync::LazyLock;

/// Inline opener shape: a comment whose first token is the keyword,
/// followed by `:`, whitespace or `(`.
static INLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s+(?i:todo)(:|\s|\()").expect("inline pattern"));

/// Docstring bullet shape: optional indent, then a bullet marker.
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*").expect("bullet pattern"));

/// Match a diff line against the extracted annotation blocks.
///
/// Context lines never match. Added lines are looked up in `blocks_after`,
/// deleted lines in `blocks_before`. The line must look like an annotation
/// opener and not carry the skip marker; its normalized fragment must then
/// occur inside a candidate block. The first containing block wins, and the
/// whole block is returned.
pub fn match_todo_block<'a>(
    line: &DiffLine,
    blocks_before: &'a [String],
    blocks_after: &'a [String],
) -> Option<&'a str> {
    let candidates = match line.status {
        LineStatus::Unchanged => return None,
        LineStatus::Added => blocks_after,
        LineStatus::Deleted => blocks_before,
    };

    let skip = line.value.contains(SKIP_MARKER);
    let fragment = if INLINE_RE.is_match(&line.value) && !skip {
        strip_line(&line.value.replacen('#', "", 1), true, true)
    } else if BULLET_RE.is_match(&line.value) && !skip {
        strip_line(&line.value.replacen('*', "", 1), true, true)
    } else {
        return None;
    };

    candidates
        .iter()
        .find(|block| block.contains(fragment.as_str()))
        .map(|block| block.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(value: &str) -> DiffLine {
        DiffLine {
            value: value.to_string(),
            status: LineStatus::Added,
            source_line: None,
            target_line: Some(1),
        }
    }

    fn deleted(value: &str) -> DiffLine {
        DiffLine {
            value: value.to_string(),
            status: LineStatus::Deleted,
            source_line: Some(1),
            target_line: None,
        }
    }

    fn blocks(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_context_line_never_matches() {
        let line = DiffLine {
            value: "# todo: Present in both".to_string(),
            status: LineStatus::Unchanged,
            source_line: Some(3),
            target_line: Some(3),
        };
        let after = blocks(&["Present in both"]);
        assert_eq!(match_todo_block(&line, &[], &after), None);
    }

    #[test]
    fn test_added_line_uses_after_list() {
        let after = blocks(&["Fix the frobnicator\nassignees: dave"]);
        let got = match_todo_block(&added("# todo: Fix the frobnicator"), &[], &after);
        assert_eq!(got, Some("Fix the frobnicator\nassignees: dave"));
    }

    #[test]
    fn test_deleted_line_uses_before_list() {
        let before = blocks(&["Old chore"]);
        let got = match_todo_block(&deleted("# todo: Old chore"), &before, &[]);
        assert_eq!(got, Some("Old chore"));
        assert_eq!(match_todo_block(&added("# todo: Old chore"), &before, &[]), None);
    }

    #[test]
    fn test_bullet_shape() {
        let after = blocks(&["(alice) Assigned entry."]);
        let got = match_todo_block(&added("    * (alice) Assigned entry."), &[], &after);
        assert_eq!(got, Some("(alice) Assigned entry."));
    }

    #[test]
    fn test_skip_marker_inline() {
        let after = blocks(&["Fix it"]);
        let line = added("# todo: Fix it # todo: +SKIP");
        assert_eq!(match_todo_block(&line, &[], &after), None);
    }

    #[test]
    fn test_skip_marker_bullet() {
        let after = blocks(&["Fix it"]);
        let line = added("    * Fix it # todo: +SKIP");
        assert_eq!(match_todo_block(&line, &[], &after), None);
    }

    #[test]
    fn test_skip_marker_is_case_sensitive() {
        let after = blocks(&["Fix it # TODO: +skip"]);
        let line = added("# todo: Fix it # TODO: +skip");
        assert!(match_todo_block(&line, &[], &after).is_some());
    }

    #[test]
    fn test_plain_comment_is_no_opener() {
        let after = blocks(&["just a comment"]);
        assert_eq!(match_todo_block(&added("# just a comment"), &[], &after), None);
    }

    #[test]
    fn test_shape_without_membership() {
        let after = blocks(&["Something else entirely"]);
        assert_eq!(match_todo_block(&added("# todo: ghost entry"), &[], &after), None);
    }

    #[test]
    fn test_first_matching_block_wins() {
        let after = blocks(&["prefix beta suffix", "beta"]);
        let got = match_todo_block(&added("# todo: beta"), &[], &after);
        assert_eq!(got, Some("prefix beta suffix"));
    }
}
