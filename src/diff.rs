//! Unified-diff text parsing and the diff data model.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Provenance of a diff line relative to the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    Added,
    Deleted,
    Unchanged,
}

/// One line of a unified diff, with its position in both revisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLine {
    pub value: String,
    pub status: LineStatus,
    /// 1-based line number in the source revision; absent for added lines.
    pub source_line: Option<usize>,
    /// 1-based line number in the target revision; absent for deleted lines.
    pub target_line: Option<usize>,
}

/// A contiguous run of changed lines with surrounding context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hunk {
    pub source_start: usize,
    pub source_count: usize,
    pub target_start: usize,
    pub target_count: usize,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Only the added lines, in order.
    pub fn added_lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines.iter().filter(|l| l.status == LineStatus::Added)
    }

    /// The source-side view: deleted and unchanged lines, in order.
    pub fn source_lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines.iter().filter(|l| l.status != LineStatus::Added)
    }

    /// The target-side view: added and unchanged lines, in order.
    pub fn target_lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines.iter().filter(|l| l.status != LineStatus::Deleted)
    }

    /// The concatenated target-side text of this hunk.
    pub fn target_text(&self) -> String {
        self.target_lines()
            .map(|l| l.value.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// All hunks of one changed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    /// Path in the source revision, cleaned of the `a/` prefix.
    /// `/dev/null` for created files.
    pub source_path: String,
    /// Path in the target revision, cleaned of the `b/` prefix.
    /// `/dev/null` for deleted files.
    pub target_path: String,
    pub hunks: Vec<Hunk>,
    pub additions: usize,
    pub deletions: usize,
}

impl FileDiff {
    /// The repository-relative path of the file, preferring the target side.
    pub fn path(&self) -> &str {
        if self.target_path == "/dev/null" {
            &self.source_path
        } else {
            &self.target_path
        }
    }

    pub fn is_new(&self) -> bool {
        self.source_path == "/dev/null"
    }

    pub fn is_deleted(&self) -> bool {
        self.target_path == "/dev/null"
    }
}

/// Parse unified diff text into per-file records.
///
/// Recognizes `diff --git` file headers, `---`/`+++` path lines and `@@`
/// hunk headers. `index`/mode noise between files is skipped, as are
/// `\ No newline at end of file` markers. Malformed hunk headers are an
/// error.
pub fn parse_diff(diff_text: &str) -> Result<Vec<FileDiff>> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut file: Option<FileDiff> = None;
    let mut hunk: Option<Hunk> = None;
    let mut source_no = 0usize;
    let mut target_no = 0usize;

    for line in diff_text.lines() {
        if let Some(header) = line.strip_prefix("diff --git ") {
            if let Some(mut f) = file.take() {
                if let Some(h) = hunk.take() {
                    f.hunks.push(h);
                }
                files.push(f);
            }
            let (source_path, target_path) = parse_git_header(header, line)?;
            file = Some(FileDiff {
                source_path,
                target_path,
                hunks: Vec::new(),
                additions: 0,
                deletions: 0,
            });
        } else if hunk.is_none() && line.starts_with("--- ") {
            if let (Some(f), Some(rest)) = (file.as_mut(), line.strip_prefix("--- ")) {
                f.source_path = clean_path(rest, "a/");
            }
        } else if hunk.is_none() && line.starts_with("+++ ") {
            if let (Some(f), Some(rest)) = (file.as_mut(), line.strip_prefix("+++ ")) {
                f.target_path = clean_path(rest, "b/");
            }
        } else if line.starts_with("@@") {
            let f = file
                .as_mut()
                .ok_or_else(|| Error::DiffParse(format!("hunk header outside any file: {line}")))?;
            if let Some(h) = hunk.take() {
                f.hunks.push(h);
            }
            let (source_start, source_count, target_start, target_count) = parse_hunk_header(line)?;
            source_no = source_start;
            target_no = target_start;
            hunk = Some(Hunk {
                source_start,
                source_count,
                target_start,
                target_count,
                lines: Vec::new(),
            });
        } else if let (Some(f), Some(h)) = (file.as_mut(), hunk.as_mut()) {
            if line.starts_with('\\') {
                continue;
            }
            let (status, value) = match line.as_bytes().first() {
                Some(b'+') => (LineStatus::Added, &line[1..]),
                Some(b'-') => (LineStatus::Deleted, &line[1..]),
                Some(b' ') => (LineStatus::Unchanged, &line[1..]),
                // Some producers drop the space on empty context lines.
                None => (LineStatus::Unchanged, ""),
                _ => continue,
            };
            let (source_line, target_line) = match status {
                LineStatus::Added => {
                    f.additions += 1;
                    let t = target_no;
                    target_no += 1;
                    (None, Some(t))
                }
                LineStatus::Deleted => {
                    f.deletions += 1;
                    let s = source_no;
                    source_no += 1;
                    (Some(s), None)
                }
                LineStatus::Unchanged => {
                    let (s, t) = (source_no, target_no);
                    source_no += 1;
                    target_no += 1;
                    (Some(s), Some(t))
                }
            };
            h.lines.push(DiffLine {
                value: value.to_string(),
                status,
                source_line,
                target_line,
            });
        }
    }

    if let Some(mut f) = file.take() {
        if let Some(h) = hunk.take() {
            f.hunks.push(h);
        }
        files.push(f);
    }

    Ok(files)
}

/// Split `a/old b/new` out of a `diff --git` header.
fn parse_git_header(header: &str, line: &str) -> Result<(String, String)> {
    let (source, target) = header
        .split_once(" b/")
        .ok_or_else(|| Error::DiffParse(format!("malformed file header: {line}")))?;
    let source = source.strip_prefix("a/").unwrap_or(source);
    Ok((source.to_string(), target.to_string()))
}

fn clean_path(raw: &str, prefix: &str) -> String {
    let path = raw.split('\t').next().unwrap_or(raw);
    path.strip_prefix(prefix).unwrap_or(path).to_string()
}

/// Parse `@@ -start,count +start,count @@` hunk ranges.
fn parse_hunk_header(line: &str) -> Result<(usize, usize, usize, usize)> {
    let rest = line
        .strip_prefix("@@ -")
        .ok_or_else(|| malformed_hunk(line))?;
    let (source, rest) = rest.split_once(" +").ok_or_else(|| malformed_hunk(line))?;
    let (target, _) = rest.split_once(" @@").ok_or_else(|| malformed_hunk(line))?;
    let (source_start, source_count) = parse_range(source).ok_or_else(|| malformed_hunk(line))?;
    let (target_start, target_count) = parse_range(target).ok_or_else(|| malformed_hunk(line))?;
    Ok((source_start, source_count, target_start, target_count))
}

fn malformed_hunk(line: &str) -> Error {
    Error::DiffParse(format!("malformed hunk header: {line}"))
}

/// A range is `start,count`, or a bare `start` meaning one line.
fn parse_range(range: &str) -> Option<(usize, usize)> {
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}
