//! Walk the working tree for annotations without needing a diff.

use crate::error::{Error, Result};
use crate::extract::extract_todos;
use crate::lang::is_python_file;
use crate::python::DocStringSource;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// An annotation block found in the working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorktreeTodo {
    pub file: PathBuf,
    pub block: String,
}

/// Collect every annotation block under `root`.
///
/// Hidden directories and files without a Python extension are skipped.
/// Files that fail to parse are logged and skipped rather than aborting
/// the walk.
pub fn scan_worktree(root: &Path, docs: &dyn DocStringSource) -> Result<Vec<WorktreeTodo>> {
    let mut todos = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
    {
        let path = entry.path();
        if !is_python_file(path) {
            continue;
        }
        let text = fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        match extract_todos(&text, docs) {
            Ok(blocks) => {
                for block in blocks {
                    todos.push(WorktreeTodo {
                        file: path.to_path_buf(),
                        block,
                    });
                }
            }
            Err(Error::Syntax { line, message }) => {
                warn!(file = %path.display(), line, %message, "skipping unparsable file");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(todos)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}
