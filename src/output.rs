//! Render scan results for the terminal.

use crate::diff::LineStatus;
use crate::issue::Issue;
use crate::worktree::WorktreeTodo;
use colored::Colorize;

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// Format scanned issues in the chosen output format.
pub fn format_issues(issues: &[Issue], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(issues).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(issues).unwrap_or_default(),
        OutputFormat::Text => format_issues_text(issues),
    }
}

fn format_issues_text(issues: &[Issue]) -> String {
    let mut output = String::new();

    for issue in issues {
        let status = match issue.status {
            LineStatus::Added => "ADDED".green().bold(),
            LineStatus::Deleted => "DELETED".red().bold(),
            LineStatus::Unchanged => "UNCHANGED".dimmed(),
        };
        let location = format!("{}:{}", issue.file_name, issue.start_line);
        output.push_str(&format!(
            "{} {} - {}\n",
            status,
            location.dimmed(),
            issue.title.bold()
        ));

        for line in &issue.body {
            output.push_str(&format!("    {line}\n"));
        }
        if !issue.assignees.is_empty() {
            output.push_str(&format!(
                "    {} {}\n",
                "assignees:".cyan(),
                issue.assignees.join(", ")
            ));
        }
        if issue.labels.len() > 1 {
            output.push_str(&format!(
                "    {} {}\n",
                "labels:".cyan(),
                issue.labels.join(", ")
            ));
        }
        if let Some(milestone) = &issue.milestone {
            output.push_str(&format!("    {} {milestone}\n", "milestone:".cyan()));
        }
    }

    let added = issues
        .iter()
        .filter(|issue| issue.status == LineStatus::Added)
        .count();
    let deleted = issues
        .iter()
        .filter(|issue| issue.status == LineStatus::Deleted)
        .count();
    output.push('\n');
    output.push_str(&format!("{added} added, {deleted} deleted annotations\n"));

    output
}

/// Format working-tree annotations in the chosen output format.
pub fn format_worktree(todos: &[WorktreeTodo], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(todos).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(todos).unwrap_or_default(),
        OutputFormat::Text => format_worktree_text(todos),
    }
}

fn format_worktree_text(todos: &[WorktreeTodo]) -> String {
    let mut output = String::new();

    for todo in todos {
        let mut lines = todo.block.lines();
        let title = lines.next().unwrap_or("");
        output.push_str(&format!(
            "{} - {}\n",
            todo.file.display().to_string().dimmed(),
            title.bold()
        ));
        for line in lines {
            output.push_str(&format!("    {line}\n"));
        }
    }

    output.push('\n');
    output.push_str(&format!("{} annotations\n", todos.len()));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_issue() -> Issue {
        Issue::builder()
            .title("Fix the frobnicator")
            .labels(Vec::new())
            .assignees(vec!["dave".to_string()])
            .milestone(None)
            .body(Vec::new())
            .hunk("# todo: Fix the frobnicator")
            .file_name("pkg/frob.py")
            .start_line(3)
            .markdown_language("python")
            .status(LineStatus::Added)
            .build()
            .unwrap()
    }

    #[test]
    fn test_text_output() {
        let text = format_issues(&[sample_issue()], OutputFormat::Text);
        assert!(text.contains("ADDED"));
        assert!(text.contains("pkg/frob.py:3"));
        assert!(text.contains("Fix the frobnicator"));
        assert!(text.contains("dave"));
        assert!(text.contains("1 added, 0 deleted"));
    }

    #[test]
    fn test_json_output_round_trips() {
        let issues = vec![sample_issue()];
        let json = format_issues(&issues, OutputFormat::Json);
        let parsed: Vec<Issue> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, issues);
    }
}
