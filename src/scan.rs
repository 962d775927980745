//! Scan the diff between two revisions for todo annotations.

use crate::classify::match_todo_block;
use crate::diff::parse_diff;
use crate::error::{Error, Result};
use crate::extract::extract_todos;
use crate::issue::Issue;
use crate::lang::is_python_file;
use crate::python::DocStringSource;
use crate::todo::Todo;
use std::path::Path;
use tracing::debug;

/// Read access to committed file contents.
pub trait RevisionSource {
    /// Return the contents of `path` at `revision`.
    fn read_file(&self, revision: &str, path: &str) -> Result<String>;
}

/// Walks a unified diff and collects issues from recognized annotations.
pub struct TodoScan<'a> {
    revisions: &'a dyn RevisionSource,
    docs: &'a dyn DocStringSource,
}

impl<'a> TodoScan<'a> {
    pub fn new(revisions: &'a dyn RevisionSource, docs: &'a dyn DocStringSource) -> Self {
        TodoScan { revisions, docs }
    }

    /// Find every annotation the diff touched.
    ///
    /// Both revisions of each changed Python file are parsed for annotation
    /// blocks, then every added or deleted diff line that opens one of those
    /// blocks becomes an issue. Added lines resolve against the after
    /// revision, deleted lines against the before revision. Files without a
    /// Python extension are skipped, and a file missing from a revision
    /// contributes no blocks.
    pub fn find_todos(&self, diff_text: &str, before: &str, after: &str) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        for file in parse_diff(diff_text)? {
            let path = file.path().to_string();
            if !is_python_file(Path::new(&path)) {
                debug!(file = %path, "skipping non-python file");
                continue;
            }

            let blocks_before = if file.is_new() {
                Vec::new()
            } else {
                let text = self.read_or_missing(before, &file.source_path)?;
                extract_todos(&text, self.docs)?
            };
            let blocks_after = if file.is_deleted() {
                Vec::new()
            } else {
                let text = self.read_or_missing(after, &file.target_path)?;
                extract_todos(&text, self.docs)?
            };

            for hunk in &file.hunks {
                for line in hunk.source_lines().chain(hunk.target_lines()) {
                    if let Some(block) = match_todo_block(line, &blocks_before, &blocks_after) {
                        debug!(
                            file = %path,
                            line = ?line.target_line.or(line.source_line),
                            "matched annotation"
                        );
                        let todo = Todo::from_parts(line, block, hunk, &file);
                        issues.push(todo.into_issue()?);
                    }
                }
            }
        }
        Ok(issues)
    }

    fn read_or_missing(&self, revision: &str, path: &str) -> Result<String> {
        match self.revisions.read_file(revision, path) {
            Ok(text) => Ok(text),
            Err(Error::NotFound { .. }) => Ok(String::new()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::LineStatus;
    use crate::python::PythonSource;
    use std::collections::HashMap;

    struct MapSource {
        files: HashMap<(String, String), String>,
    }

    impl MapSource {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            let files = entries
                .iter()
                .map(|(rev, path, text)| {
                    ((rev.to_string(), path.to_string()), text.to_string())
                })
                .collect();
            MapSource { files }
        }
    }

    impl RevisionSource for MapSource {
        fn read_file(&self, revision: &str, path: &str) -> Result<String> {
            self.files
                .get(&(revision.to_string(), path.to_string()))
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    revision: revision.to_string(),
                    path: path.to_string(),
                })
        }
    }

    const DIFF_ADDED: &str = "\
diff --git a/pkg/frob.py b/pkg/frob.py
index 83db48f..f735c2d 100644
--- a/pkg/frob.py
+++ b/pkg/frob.py
@@ -1,3 +1,5 @@
 def frobnicate():
     value = 1
+    # todo: Fix the frobnicator
+    #  assignees: dave
     return value
";

    #[test]
    fn test_added_annotation_becomes_issue() {
        let before_text = "def frobnicate():\n    value = 1\n    return value\n";
        let after_text = "def frobnicate():\n    value = 1\n    # todo: Fix the frobnicator\n    #  assignees: dave\n    return value\n";
        let revisions = MapSource::new(&[
            ("before", "pkg/frob.py", before_text),
            ("after", "pkg/frob.py", after_text),
        ]);
        let docs = PythonSource;
        let scan = TodoScan::new(&revisions, &docs);

        let issues = scan.find_todos(DIFF_ADDED, "before", "after").unwrap();
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.title, "Fix the frobnicator");
        assert_eq!(issue.assignees, vec!["dave"]);
        assert_eq!(issue.labels, vec!["todo"]);
        assert_eq!(issue.status, LineStatus::Added);
        assert_eq!(issue.file_name, "pkg/frob.py");
        assert_eq!(issue.start_line, 3);
        assert!(issue.hunk.contains("# todo: Fix the frobnicator"));
    }

    const DIFF_DELETED: &str = "\
diff --git a/old.py b/old.py
index 1111111..2222222 100644
--- a/old.py
+++ b/old.py
@@ -1,3 +1,2 @@
 x = 1
-# todo: Old chore
 y = 2
";

    #[test]
    fn test_deleted_annotation_becomes_issue() {
        let revisions = MapSource::new(&[
            ("before", "old.py", "x = 1\n# todo: Old chore\ny = 2\n"),
            ("after", "old.py", "x = 1\ny = 2\n"),
        ]);
        let docs = PythonSource;
        let scan = TodoScan::new(&revisions, &docs);

        let issues = scan.find_todos(DIFF_DELETED, "before", "after").unwrap();
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.title, "Old chore");
        assert_eq!(issue.status, LineStatus::Deleted);
        assert_eq!(issue.start_line, 2);
    }

    const DIFF_DOCSTRING: &str = "\
diff --git a/doc.py b/doc.py
index 3333333..4444444 100644
--- a/doc.py
+++ b/doc.py
@@ -1,5 +1,6 @@
 \"\"\"Module.

 Todo:
+    * (alice) New docstring entry.
     * Old entry.
 \"\"\"
";

    #[test]
    fn test_docstring_bullet_addition() {
        let before_text = "\"\"\"Module.\n\nTodo:\n    * Old entry.\n\"\"\"\n";
        let after_text =
            "\"\"\"Module.\n\nTodo:\n    * (alice) New docstring entry.\n    * Old entry.\n\"\"\"\n";
        let revisions = MapSource::new(&[
            ("before", "doc.py", before_text),
            ("after", "doc.py", after_text),
        ]);
        let docs = PythonSource;
        let scan = TodoScan::new(&revisions, &docs);

        let issues = scan.find_todos(DIFF_DOCSTRING, "before", "after").unwrap();
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.title, "New docstring entry.");
        assert_eq!(issue.assignees, vec!["alice"]);
        assert_eq!(issue.start_line, 4);
        assert_eq!(issue.status, LineStatus::Added);
    }

    const DIFF_ONE_LINER: &str = "\
diff --git a/util.py b/util.py
index 7777777..8888888 100644
--- a/util.py
+++ b/util.py
@@ -1,4 +1,5 @@
 def noop(): pass


+# todo: Retire the noop shim
 x = 1
";

    #[test]
    fn test_annotation_in_file_with_one_liner_definition() {
        let before_text = "def noop(): pass\n\n\nx = 1\n";
        let after_text = "def noop(): pass\n\n\n# todo: Retire the noop shim\nx = 1\n";
        let revisions = MapSource::new(&[
            ("before", "util.py", before_text),
            ("after", "util.py", after_text),
        ]);
        let docs = PythonSource;
        let scan = TodoScan::new(&revisions, &docs);

        let issues = scan.find_todos(DIFF_ONE_LINER, "before", "after").unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "Retire the noop shim");
        assert_eq!(issues[0].start_line, 4);
        assert_eq!(issues[0].status, LineStatus::Added);
    }

    const DIFF_TEXT_FILE: &str = "\
diff --git a/notes.txt b/notes.txt
index 5555555..6666666 100644
--- a/notes.txt
+++ b/notes.txt
@@ -1,1 +1,2 @@
 first line
+# todo: Not code
";

    #[test]
    fn test_non_python_file_is_skipped() {
        let revisions = MapSource::new(&[]);
        let docs = PythonSource;
        let scan = TodoScan::new(&revisions, &docs);

        let issues = scan.find_todos(DIFF_TEXT_FILE, "before", "after").unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_missing_revision_contributes_no_blocks() {
        let revisions = MapSource::new(&[]);
        let docs = PythonSource;
        let scan = TodoScan::new(&revisions, &docs);

        let issues = scan.find_todos(DIFF_ADDED, "before", "after").unwrap();
        assert!(issues.is_empty());
    }
}
