//! Constants of the annotation grammar and source-file recognition.

use std::path::Path;

/// Line-comment prefix of the host language.
pub const COMMENT_MARKER: char = '#';

/// Bullet marker used by docstring todo sections.
pub const BULLET_MARKER: char = '*';

/// The annotation keyword, matched case-insensitively.
pub const TODO_KEYWORD: &str = "todo";

/// Header that opens a todo section inside a docstring.
pub const SECTION_HEADER: &str = "Todo:";

/// Verbatim escape marker; lines containing it are never annotations.
/// Matched case-sensitively.
pub const SKIP_MARKER: &str = "# todo: +SKIP";

/// Triple-quote delimiter of the host language's docstrings.
pub const DOC_DELIMITER: &str = "\"\"\"";

/// Language tag used to fence code excerpts in issue bodies.
pub const FENCE_LANGUAGE: &str = "python";

/// Label attached to every issue raised from an annotation.
pub const DEFAULT_LABEL: &str = "todo";

/// File extensions recognized as Python source.
pub const PYTHON_EXTENSIONS: &[&str] = &["py", "pyi"];

/// Check whether a file should be scanned based on its extension.
pub fn is_python_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PYTHON_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_file() {
        assert!(is_python_file(Path::new("pkg/module.py")));
        assert!(is_python_file(Path::new("stubs.pyi")));
    }

    #[test]
    fn test_other_files() {
        assert!(!is_python_file(Path::new("README.md")));
        assert!(!is_python_file(Path::new("Makefile")));
        assert!(!is_python_file(Path::new("script.py.bak")));
    }
}
