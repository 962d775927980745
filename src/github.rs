//! GitHub issue tracker adapter.
//!
//! The pure rendering helpers live at the top of the module so the exact
//! bytes of an issue body can be tested without a network. [`GitHubClient`]
//! wraps the REST API: it pre-fetches the open `todo` issues of the
//! repository once, then creates and closes issues against that snapshot.

use crate::error::{Error, Result};
use crate::issue::Issue;
use crate::lang::DEFAULT_LABEL;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

const API_ROOT: &str = "https://api.github.com";
const USER_AGENT: &str = "todo2issue";
const TITLE_LIMIT: usize = 80;

/// Sentence opening every issue body raised from an annotation.
const ANNOTATION: &str =
    "This issue was automatically created from a todo annotation in the repository.";

/// Join the preamble and the body lines of an issue.
pub fn join_lines(issue: &Issue, line_break: &str) -> String {
    format!("{ANNOTATION}\n\n{}", issue.body.join(line_break))
}

/// Render the full issue body: preamble, body lines, permalink, code fence.
pub fn issue_body(issue: &Issue, url: &str, line_break: &str) -> String {
    format!(
        "{}\n\n{}\n\n```{}\n{}\n```",
        join_lines(issue, line_break),
        url,
        issue.markdown_language,
        issue.hunk
    )
}

/// Permalink to the annotation's first line at a fixed commit.
pub fn permalink(repo: &str, sha: &str, file_name: &str, start_line: usize) -> String {
    format!("https://github.com/{repo}/blob/{sha}/{file_name}#L{start_line}")
}

/// Cap a title at 80 bytes, cutting at a character boundary.
pub fn truncate_title(title: &str) -> String {
    if title.len() <= TITLE_LIMIT {
        return title.to_string();
    }
    let mut end = TITLE_LIMIT;
    while !title.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &title[..end])
}

/// The subset of the issue listing response the duplicate check needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ExistingIssue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
}

/// Compare a scanned annotation with an issue already open on GitHub.
///
/// Titles must match. When the existing body carries a permalink the text
/// above it is compared against our own rendering as well; bodies written
/// by hand are matched on title alone.
pub fn is_same_issue(issue: &Issue, existing: &ExistingIssue, line_break: &str) -> bool {
    let titles_match = issue.title == existing.title;
    let body = existing.body.as_deref().unwrap_or("");
    if !body.contains("https://github.com/") {
        return titles_match;
    }
    let this_text = join_lines(issue, line_break);
    let other_text = body.split("https://github.com").next().unwrap_or(body);
    titles_match && this_text.trim_end() == other_text.trim_end()
}

/// What happened to a create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new issue was opened under this number.
    Created(u64),
    /// An identical open issue already exists.
    SkippedExisting,
}

/// What happened to a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed(u64),
    /// No open issue matched the annotation.
    NoMatch,
    /// More than one open issue matched; none were touched.
    MultipleMatches,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    number: u64,
}

/// REST client bound to one repository and one commit.
pub struct GitHubClient {
    http: Client,
    repo: String,
    sha: String,
    token: String,
    line_break: String,
    existing_issues: Vec<ExistingIssue>,
}

impl GitHubClient {
    /// Connect to the API and pre-fetch the open `todo` issues of the repo.
    pub async fn connect(
        repo: String,
        sha: String,
        token: String,
        line_break: String,
    ) -> Result<Self> {
        let mut client = GitHubClient {
            http: Client::new(),
            repo,
            sha,
            token,
            line_break,
            existing_issues: Vec::new(),
        };
        client.existing_issues = client.fetch_existing_issues().await?;
        info!(
            repo = %client.repo,
            count = client.existing_issues.len(),
            "fetched open todo issues"
        );
        Ok(client)
    }

    pub fn existing_issues(&self) -> &[ExistingIssue] {
        &self.existing_issues
    }

    /// Open an issue for the annotation, unless an identical one is open.
    ///
    /// The milestone and each assignee are validated against the repository
    /// first; names the API does not know are dropped with a warning.
    pub async fn create_issue(&self, issue: &Issue) -> Result<CreateOutcome> {
        if self
            .existing_issues
            .iter()
            .any(|existing| is_same_issue(issue, existing, &self.line_break))
        {
            info!(title = %issue.title, "issue already exists, skipping");
            return Ok(CreateOutcome::SkippedExisting);
        }

        let url = permalink(&self.repo, &self.sha, &issue.file_name, issue.start_line);
        let mut payload = json!({
            "title": truncate_title(&issue.title),
            "body": issue_body(issue, &url, &self.line_break),
            "labels": issue.labels,
        });

        if let Some(milestone) = &issue.milestone {
            if self.milestone_exists(milestone).await? {
                payload["milestone"] = json!(milestone);
            } else {
                warn!(milestone = %milestone, "milestone not found in repository, dropping it");
            }
        }

        let mut valid_assignees = Vec::new();
        for assignee in &issue.assignees {
            if self.assignee_exists(assignee).await? {
                valid_assignees.push(assignee.clone());
            } else {
                warn!(assignee = %assignee, "assignee not found in repository, dropping them");
            }
        }
        payload["assignees"] = json!(valid_assignees);

        let response = self
            .request(Method::POST, &self.issues_url())
            .json(&payload)
            .send()
            .await?;
        let response = ensure_success(response)?;
        let created: CreatedIssue = response.json().await?;
        info!(number = created.number, title = %issue.title, "created issue");
        Ok(CreateOutcome::Created(created.number))
    }

    /// Close the open issue raised from this annotation.
    ///
    /// Only acts when exactly one open issue matches. Zero matches is a
    /// no-op; several matches leave everything alone rather than guess.
    pub async fn close_issue(&self, issue: &Issue) -> Result<CloseOutcome> {
        let matches: Vec<u64> = self
            .existing_issues
            .iter()
            .filter(|existing| is_same_issue(issue, existing, &self.line_break))
            .map(|existing| existing.number)
            .collect();

        let number = match matches.as_slice() {
            [] => {
                debug!(title = %issue.title, "no open issue matches, nothing to close");
                return Ok(CloseOutcome::NoMatch);
            }
            [number] => *number,
            _ => {
                warn!(
                    title = %issue.title,
                    count = matches.len(),
                    "multiple open issues match, not closing any"
                );
                return Ok(CloseOutcome::MultipleMatches);
            }
        };

        let url = format!("{API_ROOT}/repos/{}/issues/{number}", self.repo);
        let response = self
            .request(Method::PATCH, &url)
            .json(&json!({ "state": "closed" }))
            .send()
            .await?;
        ensure_success(response)?;

        let comment_url = format!("{API_ROOT}/repos/{}/issues/{number}/comments", self.repo);
        let comment = json!({ "body": format!("Closed in {}", self.sha) });
        let response = self
            .request(Method::POST, &comment_url)
            .json(&comment)
            .send()
            .await?;
        ensure_success(response)?;

        info!(number, title = %issue.title, "closed issue");
        Ok(CloseOutcome::Closed(number))
    }

    fn issues_url(&self) -> String {
        format!("{API_ROOT}/repos/{}/issues", self.repo)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/vnd.github.v3+json")
            .header(header::AUTHORIZATION, format!("token {}", self.token))
    }

    async fn fetch_existing_issues(&self) -> Result<Vec<ExistingIssue>> {
        let url = self.issues_url();
        let mut issues = Vec::new();
        let mut page = 1u32;
        loop {
            let page_number = page.to_string();
            let response = self
                .request(Method::GET, &url)
                .query(&[
                    ("per_page", "100"),
                    ("page", page_number.as_str()),
                    ("state", "open"),
                    ("labels", DEFAULT_LABEL),
                ])
                .send()
                .await?;
            let response = ensure_success(response)?;
            let has_next = has_next_page(response.headers());
            issues.extend(response.json::<Vec<ExistingIssue>>().await?);
            if !has_next {
                break;
            }
            page += 1;
        }
        Ok(issues)
    }

    async fn milestone_exists(&self, milestone: &str) -> Result<bool> {
        let url = format!("{API_ROOT}/repos/{}/milestones/{milestone}", self.repo);
        let response = self.request(Method::GET, &url).send().await?;
        Ok(response.status() == StatusCode::OK)
    }

    async fn assignee_exists(&self, assignee: &str) -> Result<bool> {
        let url = format!("{API_ROOT}/repos/{}/assignees/{assignee}", self.repo);
        let response = self.request(Method::GET, &url).send().await?;
        Ok(response.status() == StatusCode::NO_CONTENT)
    }
}

fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::ApiStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

fn has_next_page(headers: &header::HeaderMap) -> bool {
    headers
        .get(header::LINK)
        .and_then(|value| value.to_str().ok())
        .map(|link| link.contains("rel=\"next\""))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::LineStatus;

    fn sample_issue() -> Issue {
        Issue::builder()
            .title("Fix the frobnicator")
            .labels(Vec::new())
            .assignees(Vec::new())
            .milestone(None)
            .body(vec!["It breaks on Tuesdays.".to_string()])
            .hunk("# todo: Fix the frobnicator")
            .file_name("pkg/frob.py")
            .start_line(3)
            .markdown_language("python")
            .status(LineStatus::Added)
            .build()
            .unwrap()
    }

    #[test]
    fn test_issue_body_rendering() {
        let issue = sample_issue();
        let url = permalink("octo/project", "abc1234", &issue.file_name, issue.start_line);
        let body = issue_body(&issue, &url, "\n");
        let expected = format!(
            "{ANNOTATION}\n\nIt breaks on Tuesdays.\n\n\
             https://github.com/octo/project/blob/abc1234/pkg/frob.py#L3\n\n\
             ```python\n# todo: Fix the frobnicator\n```"
        );
        assert_eq!(body, expected);
        assert_eq!(body, issue_body(&issue, &url, "\n"));
    }

    #[test]
    fn test_empty_body_renders_preamble_only() {
        let mut issue = sample_issue();
        issue.body.clear();
        assert_eq!(join_lines(&issue, "\n"), format!("{ANNOTATION}\n\n"));
    }

    #[test]
    fn test_permalink() {
        assert_eq!(
            permalink("octo/project", "abc1234", "a/b.py", 12),
            "https://github.com/octo/project/blob/abc1234/a/b.py#L12"
        );
    }

    #[test]
    fn test_truncate_title_short() {
        assert_eq!(truncate_title("short"), "short");
        let exactly_80 = "a".repeat(80);
        assert_eq!(truncate_title(&exactly_80), exactly_80);
    }

    #[test]
    fn test_truncate_title_long() {
        let long = "a".repeat(100);
        let truncated = truncate_title(&long);
        assert_eq!(truncated.len(), 83);
        assert!(truncated.ends_with("..."));
        assert!(truncated.starts_with(&"a".repeat(80)));
    }

    #[test]
    fn test_truncate_title_respects_char_boundaries() {
        let title = format!("{}🦀 and more text to push it over", "a".repeat(79));
        let truncated = truncate_title(&title);
        assert_eq!(truncated, format!("{}...", "a".repeat(79)));
    }

    #[test]
    fn test_same_issue_title_only_without_permalink() {
        let issue = sample_issue();
        let existing = ExistingIssue {
            number: 1,
            title: "Fix the frobnicator".to_string(),
            body: Some("hand-written description".to_string()),
        };
        assert!(is_same_issue(&issue, &existing, "\n"));
    }

    #[test]
    fn test_same_issue_compares_rendered_body() {
        let issue = sample_issue();
        let url = permalink("octo/project", "abc1234", &issue.file_name, issue.start_line);
        let same = ExistingIssue {
            number: 1,
            title: "Fix the frobnicator".to_string(),
            body: Some(issue_body(&issue, &url, "\n")),
        };
        assert!(is_same_issue(&issue, &same, "\n"));

        let mut other = sample_issue();
        other.body = vec!["A different body.".to_string()];
        let different = ExistingIssue {
            number: 2,
            title: "Fix the frobnicator".to_string(),
            body: Some(issue_body(&other, &url, "\n")),
        };
        assert!(!is_same_issue(&issue, &different, "\n"));
    }

    #[test]
    fn test_same_issue_across_commits() {
        let issue = sample_issue();
        let old_url = permalink("octo/project", "9fceb02", &issue.file_name, issue.start_line);
        let new_url = permalink("octo/project", "abc1234", &issue.file_name, issue.start_line);
        assert_ne!(
            issue_body(&issue, &old_url, "\n"),
            issue_body(&issue, &new_url, "\n")
        );

        let stored = ExistingIssue {
            number: 1,
            title: "Fix the frobnicator".to_string(),
            body: Some(issue_body(&issue, &old_url, "\n")),
        };
        assert!(is_same_issue(&issue, &stored, "\n"));

        let mut other = sample_issue();
        other.body = vec!["A different body.".to_string()];
        let stored_other = ExistingIssue {
            number: 2,
            title: "Fix the frobnicator".to_string(),
            body: Some(issue_body(&other, &old_url, "\n")),
        };
        assert!(!is_same_issue(&issue, &stored_other, "\n"));
    }

    #[test]
    fn test_same_issue_different_title() {
        let issue = sample_issue();
        let existing = ExistingIssue {
            number: 1,
            title: "Another thing".to_string(),
            body: None,
        };
        assert!(!is_same_issue(&issue, &existing, "\n"));
    }
}
