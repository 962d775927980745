//! Locate docstrings in Python source without a full parser.
//!
//! A line-oriented scanner finds the module docstring and the docstring of
//! every top-level `def`/`class`. That is all the structural awareness the
//! extractor needs; nested scopes and expression-level strings are skipped.

use crate::error::{Error, Result};

/// Source of docstrings for one host language.
///
/// Returns one entry per scope: the module first, then each top-level
/// definition in source order. `None` marks a scope without a docstring.
/// Fails on syntactically invalid input.
pub trait DocStringSource {
    fn doc_strings(&self, source: &str) -> Result<Vec<Option<String>>>;
}

/// The Python implementation of [`DocStringSource`].
pub struct PythonSource;

impl DocStringSource for PythonSource {
    fn doc_strings(&self, source: &str) -> Result<Vec<Option<String>>> {
        let lines: Vec<&str> = source.lines().collect();
        let mut docs = Vec::new();
        let mut i = 0;

        while i < lines.len() && is_blank_or_comment(lines[i]) {
            i += 1;
        }

        // Module docstring: the file's first statement, when it is a
        // triple-quoted string literal.
        if i < lines.len() {
            if let Some((delim, offset)) = doc_opener(lines[i]) {
                let (raw, next) = read_string(&lines, i, delim, offset)?;
                docs.push(Some(cleandoc(&raw)));
                i = next;
            } else {
                docs.push(None);
            }
        } else {
            docs.push(None);
        }

        let mut depth = 0i32;
        while i < lines.len() {
            let line = lines[i];
            if is_blank_or_comment(line) {
                i += 1;
                continue;
            }

            if depth == 0 && is_definition(line) {
                let (doc, next) = read_definition_doc(&lines, i)?;
                docs.push(doc);
                i = next;
                continue;
            }

            let stretch = advance_code(&lines, i, depth)?;
            depth += stretch.delta;
            i = stretch.next;
        }

        Ok(docs)
    }
}

/// Consume a `def`/`class` header starting at `start` and return the body's
/// docstring, if any, plus the index to resume scanning from.
fn read_definition_doc(lines: &[&str], start: usize) -> Result<(Option<String>, usize)> {
    let mut i = start;
    let mut depth = 0i32;
    let mut colon = false;
    let mut inline = false;
    let mut closed = false;

    // The header is complete once a colon has appeared at bracket depth
    // zero and the brackets are balanced. Code after that colon puts the
    // whole body on the header line.
    while i < lines.len() {
        let stretch = advance_code(lines, i, depth)?;
        depth += stretch.delta;
        colon |= stretch.colon;
        inline |= stretch.trailing_code;
        i = stretch.next;
        if depth <= 0 && colon {
            closed = true;
            break;
        }
    }
    if !closed {
        return Err(Error::Syntax {
            line: start + 1,
            message: "unterminated definition header".to_string(),
        });
    }

    // A one-liner body never holds a docstring.
    if inline {
        return Ok((None, i));
    }

    // First statement of the body; the docstring must be an indented
    // triple-quoted string literal.
    let mut j = i;
    while j < lines.len() && is_blank_or_comment(lines[j]) {
        j += 1;
    }
    if j < lines.len() && lines[j].starts_with([' ', '\t']) {
        if let Some((delim, offset)) = doc_opener(lines[j]) {
            let (raw, next) = read_string(lines, j, delim, offset)?;
            return Ok((Some(cleandoc(&raw)), next));
        }
    }

    Ok((None, i))
}

fn is_blank_or_comment(line: &str) -> bool {
    let t = line.trim_start();
    t.is_empty() || t.starts_with('#')
}

fn is_definition(line: &str) -> bool {
    !line.starts_with([' ', '\t'])
        && (line.starts_with("def ")
            || line.starts_with("class ")
            || line.starts_with("async def "))
}

/// Detect a triple-quoted string literal at the start of a line (after
/// indentation and an optional one- or two-letter literal prefix). Returns
/// the delimiter and the byte offset of the string content within the line.
fn doc_opener(line: &str) -> Option<(&'static str, usize)> {
    let trimmed = line.trim_start();
    let indent = line.len() - trimmed.len();

    let mut prefix = 0;
    for ch in trimmed.bytes().take(2) {
        if matches!(ch, b'r' | b'R' | b'b' | b'B' | b'u' | b'U' | b'f' | b'F') {
            prefix += 1;
        } else {
            break;
        }
    }

    let rest = &trimmed[prefix..];
    if rest.starts_with("\"\"\"") {
        Some(("\"\"\"", indent + prefix + 3))
    } else if rest.starts_with("'''") {
        Some(("'''", indent + prefix + 3))
    } else {
        None
    }
}

/// Read a triple-quoted string whose content begins at `lines[start][offset]`.
/// Returns the raw content and the index of the line after the closing
/// delimiter. Fails when the string never closes.
fn read_string(lines: &[&str], start: usize, delim: &str, offset: usize) -> Result<(String, usize)> {
    let first = &lines[start][offset..];
    if let Some(end) = first.find(delim) {
        return Ok((first[..end].to_string(), start + 1));
    }

    let mut parts = vec![first.to_string()];
    for (j, line) in lines.iter().enumerate().skip(start + 1) {
        if let Some(end) = line.find(delim) {
            parts.push(line[..end].to_string());
            return Ok((parts.join("\n"), j + 1));
        }
        parts.push((*line).to_string());
    }

    Err(Error::Syntax {
        line: start + 1,
        message: "unterminated triple-quoted string".to_string(),
    })
}

/// One logical stretch of code: a line plus any spill-over of a
/// triple-quoted string it leaves open.
struct Stretch {
    delta: i32,
    colon: bool,
    trailing_code: bool,
    next: usize,
}

/// Scan one logical stretch of code starting at `lines[start]` with `depth`
/// brackets already open, consuming any triple-quoted string that spans onto
/// further lines. Reports the bracket-depth delta, whether a colon appeared
/// at overall depth zero, whether any code followed that colon, and the next
/// line index.
fn advance_code(lines: &[&str], start: usize, depth: i32) -> Result<Stretch> {
    let mut delta = 0i32;
    let mut colon = false;
    let mut trailing_code = false;
    let mut i = start;
    let mut rest = lines[i];

    loop {
        let scan = scan_code(rest, depth + delta);
        delta += scan.delta;
        colon |= scan.colon;
        trailing_code |= scan.trailing_code;

        let Some(delim) = scan.open else {
            return Ok(Stretch {
                delta,
                colon,
                trailing_code,
                next: i + 1,
            });
        };

        // String spills onto following lines; resume after its closer.
        let mut j = i + 1;
        loop {
            if j >= lines.len() {
                return Err(Error::Syntax {
                    line: i + 1,
                    message: "unterminated triple-quoted string".to_string(),
                });
            }
            if let Some(end) = lines[j].find(delim) {
                rest = &lines[j][end + delim.len()..];
                i = j;
                break;
            }
            j += 1;
        }
    }
}

struct CodeScan {
    delta: i32,
    colon: bool,
    trailing_code: bool,
    open: Option<&'static str>,
}

/// Scan a single line of code assumed to start outside any string literal,
/// with `depth` brackets already open where it begins. Strings and the
/// trailing comment are skipped; brackets outside strings are counted.
/// `colon` reports the first colon seen at overall depth zero,
/// `trailing_code` any code after it, and `open` a triple-quoted string left
/// unclosed at end of line.
fn scan_code(line: &str, depth: i32) -> CodeScan {
    let bytes = line.as_bytes();
    let mut delta = 0i32;
    let mut colon = false;
    let mut trailing_code = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'#' => break,
            b'(' | b'[' | b'{' => {
                trailing_code |= colon;
                delta += 1;
                i += 1;
            }
            b')' | b']' | b'}' => {
                trailing_code |= colon;
                delta -= 1;
                i += 1;
            }
            b':' if depth + delta <= 0 && !colon => {
                colon = true;
                i += 1;
            }
            quote @ (b'"' | b'\'') => {
                trailing_code |= colon;
                let delim: &'static str = if quote == b'"' { "\"\"\"" } else { "'''" };
                if line[i..].starts_with(delim) {
                    match line[i + 3..].find(delim) {
                        Some(end) => {
                            i = i + 3 + end + 3;
                        }
                        None => {
                            return CodeScan {
                                delta,
                                colon,
                                trailing_code,
                                open: Some(delim),
                            };
                        }
                    }
                } else {
                    // Single-quoted string; honor backslash escapes.
                    let mut j = i + 1;
                    let mut closed = false;
                    while j < bytes.len() {
                        if bytes[j] == b'\\' {
                            j += 2;
                        } else if bytes[j] == quote {
                            closed = true;
                            break;
                        } else {
                            j += 1;
                        }
                    }
                    i = if closed { j + 1 } else { bytes.len() };
                }
            }
            other => {
                if !other.is_ascii_whitespace() {
                    trailing_code |= colon;
                }
                i += 1;
            }
        }
    }

    CodeScan {
        delta,
        colon,
        trailing_code,
        open: None,
    }
}

/// Normalize a docstring the way Python's `inspect.cleandoc` does: expand
/// tabs, strip the common leading margin of every line after the first,
/// left-trim the first line, and drop leading and trailing blank lines.
pub fn cleandoc(doc: &str) -> String {
    let expanded = expand_tabs(doc);
    let lines: Vec<&str> = expanded.split('\n').collect();

    let mut margin = usize::MAX;
    for line in lines.iter().skip(1) {
        let stripped = line.trim_start();
        if !stripped.is_empty() {
            let indent = line.chars().count() - stripped.chars().count();
            margin = margin.min(indent);
        }
    }

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if idx == 0 {
            cleaned.push(line.trim_start().to_string());
        } else if margin != usize::MAX {
            cleaned.push(line.chars().skip(margin).collect());
        } else {
            cleaned.push((*line).to_string());
        }
    }

    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned
        .iter()
        .position(|l| !l.is_empty())
        .unwrap_or(cleaned.len());
    cleaned.drain(..leading);

    cleaned.join("\n")
}

fn expand_tabs(text: &str) -> String {
    const TAB_STOP: usize = 8;
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;

    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = TAB_STOP - (column % TAB_STOP);
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }

    out
}
