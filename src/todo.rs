//! Turn a matched diff line and its annotation block into a work item.

use crate::diff::{DiffLine, FileDiff, Hunk, LineStatus};
use crate::error::Result;
use crate::issue::Issue;
use crate::lang::{DEFAULT_LABEL, DOC_DELIMITER, FENCE_LANGUAGE};

/// One parsed annotation, tied to the diff line that surfaced it.
#[derive(Debug, Clone)]
pub struct Todo {
    pub status: LineStatus,
    pub title: String,
    pub body: Vec<String>,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub milestone: Option<String>,
    pub hunk: String,
    pub file_name: String,
    pub start_line: usize,
}

impl Todo {
    /// Parse `block` and capture the location of `line` within `file`.
    ///
    /// The fields are peeled off the block in a fixed order: assignees,
    /// then labels, then milestone. Whatever remains becomes the title
    /// and body.
    pub fn from_parts(line: &DiffLine, block: &str, hunk: &Hunk, file: &FileDiff) -> Self {
        let status = match line.status {
            LineStatus::Added => LineStatus::Added,
            _ => LineStatus::Deleted,
        };

        let lines: Vec<String> = block.trim().split('\n').map(str::to_string).collect();
        let (lines, assignees) = take_assignees(lines);
        let (lines, labels) = take_labels(lines);
        let (lines, milestone) = take_milestone(lines);

        let (title, body) = match lines.split_first() {
            Some((first, rest)) => (
                first.trim_start().to_string(),
                rest.iter().map(|l| l.trim_start().to_string()).collect(),
            ),
            None => (String::new(), Vec::new()),
        };

        Todo {
            status,
            title,
            body,
            assignees,
            labels,
            milestone,
            hunk: balanced_excerpt(hunk.target_text()),
            file_name: file.path().to_string(),
            start_line: line.target_line.or(line.source_line).unwrap_or_default(),
        }
    }

    /// Build the issue this annotation asks for.
    pub fn into_issue(self) -> Result<Issue> {
        let mut labels = vec![DEFAULT_LABEL.to_string()];
        labels.extend(self.labels);
        Issue::builder()
            .title(self.title)
            .labels(labels)
            .assignees(self.assignees)
            .milestone(self.milestone)
            .body(self.body)
            .hunk(self.hunk)
            .file_name(self.file_name)
            .start_line(self.start_line)
            .markdown_language(FENCE_LANGUAGE)
            .status(self.status)
            .build()
    }
}

/// Extract assignees from the block, returning the remaining lines.
///
/// Multi-line blocks name assignees on a dedicated `assignees:` line.
/// A single-line block may instead carry a parenthesized list right after
/// the keyword; the parentheses are cut out of the line.
fn take_assignees(lines: Vec<String>) -> (Vec<String>, Vec<String>) {
    if lines.len() > 1 {
        let mut assignees = Vec::new();
        let mut remaining = Vec::new();
        for line in lines {
            match line.trim_start().strip_prefix("assignees:") {
                Some(rest) => assignees = split_list(rest),
                None => remaining.push(line),
            }
        }
        (remaining, assignees)
    } else if let Some(line) = lines.first() {
        let open = line.find('(');
        let close = line.find(')');
        match (open, close) {
            (Some(open), Some(close)) if open < close => {
                let inner = line[open + 1..close].to_string();
                let stripped = line.replace(&format!("({inner})"), "");
                (vec![stripped], split_list(&inner))
            }
            _ => (lines, Vec::new()),
        }
    } else {
        (lines, Vec::new())
    }
}

/// Extract labels from a `labels:` line, returning the remaining lines.
fn take_labels(lines: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut labels = Vec::new();
    let mut remaining = Vec::new();
    for line in lines {
        match line.trim_start().strip_prefix("labels:") {
            Some(rest) => labels = split_list(rest),
            None => remaining.push(line),
        }
    }
    (remaining, labels)
}

/// Extract the milestone from a `milestone:` or `milestones:` line.
fn take_milestone(lines: Vec<String>) -> (Vec<String>, Option<String>) {
    let mut milestone = None;
    let mut remaining = Vec::new();
    for line in lines {
        let trimmed = line.trim_start();
        let rest = trimmed
            .strip_prefix("milestones:")
            .or_else(|| trimmed.strip_prefix("milestone:"));
        match rest {
            Some(rest) => milestone = Some(rest.trim().to_string()),
            None => remaining.push(line),
        }
    }
    (remaining, milestone)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|elem| !elem.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render the hunk's target text, closing an unbalanced docstring.
///
/// An excerpt that cuts a docstring in half contains a single delimiter.
/// When that delimiter sits in the first half of the text the docstring
/// opened inside the excerpt and needs a closing delimiter; otherwise it
/// closed inside and needs an opening one.
fn balanced_excerpt(text: String) -> String {
    if text.matches(DOC_DELIMITER).count() != 1 {
        return text;
    }
    let position = match text.find(DOC_DELIMITER) {
        Some(position) => position,
        None => return text,
    };
    let total = text.chars().count();
    let before = text[..position].chars().count();
    if before + DOC_DELIMITER.len() <= total / 2 {
        format!("{text}\n{DOC_DELIMITER}")
    } else {
        format!("{DOC_DELIMITER}\n{text}")
    }
}
