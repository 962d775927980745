//! Extract raw todo annotation blocks from one file revision.

use crate::error::Result;
use crate::lang::{COMMENT_MARKER, SECTION_HEADER, SKIP_MARKER, TODO_KEYWORD};
use crate::python::DocStringSource;
use crate::strip::strip_line;

/// Extract every todo annotation from `source`, one entry per block, title
/// and continuation lines joined by newlines.
///
/// Two passes feed one ordered list: docstring todo sections first, then
/// line comments. The order is stable, which the diff-line classifier
/// relies on for membership matching.
pub fn extract_todos(source: &str, docs: &dyn DocStringSource) -> Result<Vec<String>> {
    let mut todos = Vec::new();

    for doc in docs.doc_strings(source)?.into_iter().flatten() {
        extract_from_docstring(&doc, &mut todos);
    }
    extract_from_comments(source, &mut todos);

    Ok(todos)
}

/// Pass A: `Todo:` sections in a docstring, bullet entries split per line.
fn extract_from_docstring(doc: &str, todos: &mut Vec<String>) {
    for paragraph in doc.split("\n\n") {
        if !is_todo_section(paragraph) {
            continue;
        }
        let body = paragraph.splitn(2, '\n').nth(1).unwrap_or("");
        for entry in split_bullets(body) {
            if entry.contains(SKIP_MARKER) {
                continue;
            }
            // Continuations drop one level of indentation.
            let entry = strip_line(&entry, true, true).replace("\n ", "\n");
            todos.push(entry);
        }
    }
}

/// A paragraph opens a todo section when its first non-blank line is the
/// section header.
fn is_todo_section(paragraph: &str) -> bool {
    paragraph
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim_start().starts_with(SECTION_HEADER))
        .unwrap_or(false)
}

/// Split a section body on bullet markers. A line not opening a bullet
/// continues the previous entry; text before the first bullet is dropped.
fn split_bullets(section: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in section.lines() {
        if let Some(rest) = line.trim_start().strip_prefix("* ") {
            if let Some(entry) = current.take() {
                entries.push(entry.join("\n"));
            }
            current = Some(vec![rest]);
        } else if let Some(entry) = current.as_mut() {
            entry.push(line);
        }
    }
    if let Some(entry) = current.take() {
        entries.push(entry.join("\n"));
    }

    entries
}

/// Pass B: comment lines. An opener is any comment whose text starts with
/// the keyword; following comment lines indented by at least two spaces are
/// absorbed into the same block.
fn extract_from_comments(source: &str, todos: &mut Vec<String>) {
    let comment_lines: Vec<String> = source
        .lines()
        .filter(|line| line.trim_start().starts_with(COMMENT_MARKER))
        .map(|line| line.trim().replacen(COMMENT_MARKER, "", 1))
        .collect();

    let mut i = 0;
    while i < comment_lines.len() {
        let line = &comment_lines[i];
        let opens = line.trim().to_lowercase().starts_with(TODO_KEYWORD);
        if !opens || line.contains(SKIP_MARKER) {
            i += 1;
            continue;
        }

        let mut block = vec![strip_line(line, true, true)];
        let mut j = i + 1;
        while j < comment_lines.len() && comment_lines[j].starts_with("  ") {
            block.push(strip_line(&comment_lines[j], true, true));
            j += 1;
        }
        todos.push(block.join("\n"));
        i = j;
    }
}
