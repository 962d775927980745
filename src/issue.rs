//! Work item model produced by the diff scan.

use crate::diff::LineStatus;
use crate::error::{Error, Result};
use crate::lang::DEFAULT_LABEL;
use serde::{Deserialize, Serialize};

/// A structured work item distilled from one todo annotation.
///
/// Everything the issue tracker needs lives here: the texts, the people, and
/// the source location the annotation was found at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue title.
    pub title: String,
    /// Labels to attach. Always contains `todo`.
    pub labels: Vec<String>,
    /// Usernames to assign. May be empty.
    pub assignees: Vec<String>,
    /// Milestone title, if the annotation named one.
    pub milestone: Option<String>,
    /// Body lines, rendered below the standard preamble.
    pub body: Vec<String>,
    /// Code excerpt shown in a fenced block.
    pub hunk: String,
    /// Path of the file the annotation lives in, relative to the repo root.
    pub file_name: String,
    /// Line number the annotation starts on.
    pub start_line: usize,
    /// Language tag for the fenced code block.
    pub markdown_language: String,
    /// Whether the annotation was added or deleted.
    pub status: LineStatus,
}

impl Issue {
    pub fn builder() -> IssueBuilder {
        IssueBuilder::default()
    }
}

/// Builder for [`Issue`].
///
/// Every attribute must be supplied, even when its value is empty or
/// absent; `build` fails naming the first field left unset.
#[derive(Debug, Default)]
pub struct IssueBuilder {
    title: Option<String>,
    labels: Option<Vec<String>>,
    assignees: Option<Vec<String>>,
    milestone: Option<Option<String>>,
    body: Option<Vec<String>>,
    hunk: Option<String>,
    file_name: Option<String>,
    start_line: Option<usize>,
    markdown_language: Option<String>,
    status: Option<LineStatus>,
}

impl IssueBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn assignees(mut self, assignees: Vec<String>) -> Self {
        self.assignees = Some(assignees);
        self
    }

    pub fn milestone(mut self, milestone: Option<String>) -> Self {
        self.milestone = Some(milestone);
        self
    }

    pub fn body(mut self, body: Vec<String>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn hunk(mut self, hunk: impl Into<String>) -> Self {
        self.hunk = Some(hunk.into());
        self
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn start_line(mut self, start_line: usize) -> Self {
        self.start_line = Some(start_line);
        self
    }

    pub fn markdown_language(mut self, language: impl Into<String>) -> Self {
        self.markdown_language = Some(language.into());
        self
    }

    pub fn status(mut self, status: LineStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Assemble the issue, guaranteeing the `todo` label is present.
    pub fn build(self) -> Result<Issue> {
        let title = self.title.ok_or(Error::MissingField("title"))?;
        let mut labels = self.labels.ok_or(Error::MissingField("labels"))?;
        let assignees = self.assignees.ok_or(Error::MissingField("assignees"))?;
        let milestone = self.milestone.ok_or(Error::MissingField("milestone"))?;
        let body = self.body.ok_or(Error::MissingField("body"))?;
        let hunk = self.hunk.ok_or(Error::MissingField("hunk"))?;
        let file_name = self.file_name.ok_or(Error::MissingField("file_name"))?;
        let start_line = self.start_line.ok_or(Error::MissingField("start_line"))?;
        let markdown_language = self
            .markdown_language
            .ok_or(Error::MissingField("markdown_language"))?;
        let status = self.status.ok_or(Error::MissingField("status"))?;

        if !labels.iter().any(|label| label == DEFAULT_LABEL) {
            labels.push(DEFAULT_LABEL.to_string());
        }

        Ok(Issue {
            title,
            labels,
            assignees,
            milestone,
            body,
            hunk,
            file_name,
            start_line,
            markdown_language,
            status,
        })
    }
}
