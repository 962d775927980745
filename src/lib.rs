//! # todo2issue
//!
//! A library for turning todo annotations in Python diffs into GitHub
//! issues. The scanner parses the textual diff between two revisions,
//! recognizes annotations in line comments and docstring `Todo:` sections,
//! and converts each one into a structured work item with a title, body,
//! assignees, labels and milestone.
//!
//! ## Example
//!
//! ```rust
//! use todo2issue::{extract_todos, PythonSource};
//!
//! let source = "# todo: Tidy up the import list (alice)\nimport os\n";
//! let todos = extract_todos(source, &PythonSource).unwrap();
//! assert_eq!(todos, vec!["Tidy up the import list (alice)"]);
//! ```

pub mod classify;
pub mod config;
pub mod diff;
pub mod error;
pub mod extract;
pub mod github;
pub mod issue;
pub mod lang;
pub mod output;
pub mod python;
pub mod repo;
pub mod scan;
pub mod strip;
pub mod todo;
pub mod worktree;

pub use classify::match_todo_block;
pub use config::Config;
pub use diff::{parse_diff, DiffLine, FileDiff, Hunk, LineStatus};
pub use error::{Error, Result};
pub use extract::extract_todos;
pub use github::{CloseOutcome, CreateOutcome, GitHubClient};
pub use issue::Issue;
pub use output::{format_issues, format_worktree, OutputFormat};
pub use python::{DocStringSource, PythonSource};
pub use repo::GitRepo;
pub use scan::{RevisionSource, TodoScan};
pub use todo::Todo;
pub use worktree::{scan_worktree, WorktreeTodo};
