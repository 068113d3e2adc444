use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::github::{GitHubClient, GitHubComment, GitHubIssue};
use crate::errors::ScoutError;

const GOOD_FIRST_ISSUE_LABEL: &str = "good first issue";

/// One entry of an issue's discussion. Index 0 is the issue body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    pub index: usize,
    pub text: String,
}

/// An open issue with its full discussion, as written to `issues.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedIssue {
    pub title: String,
    pub number: i64,
    pub url: String,
    pub labels: Vec<String>,
    pub comments: Vec<IssueComment>,
}

/// Where issues and their comments come from.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn open_issues(&self, owner: &str, repo: &str) -> Result<Vec<GitHubIssue>>;

    async fn comments(&self, owner: &str, repo: &str, number: i64) -> Result<Vec<GitHubComment>>;
}

/// GitHub REST access with an optional token for higher rate limits.
pub struct GitHubIssueSource {
    client: GitHubClient,
    token: Option<String>,
}

impl GitHubIssueSource {
    pub fn new(client: GitHubClient, token: Option<String>) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl IssueSource for GitHubIssueSource {
    async fn open_issues(&self, owner: &str, repo: &str) -> Result<Vec<GitHubIssue>> {
        self.client
            .list_issues(owner, repo, self.token.as_deref())
            .await
    }

    async fn comments(&self, owner: &str, repo: &str, number: i64) -> Result<Vec<GitHubComment>> {
        self.client
            .list_issue_comments(owner, repo, number, self.token.as_deref())
            .await
    }
}

pub fn is_good_first_issue(issue: &GitHubIssue) -> bool {
    issue
        .labels
        .iter()
        .any(|label| label.name.eq_ignore_ascii_case(GOOD_FIRST_ISSUE_LABEL))
}

/// Flatten an issue and its comments into the output shape. Missing bodies
/// become empty strings.
pub fn format_issue(issue: &GitHubIssue, comments: &[GitHubComment]) -> FormattedIssue {
    let body = IssueComment {
        index: 0,
        text: issue.body.clone().unwrap_or_default(),
    };
    let rest = comments.iter().enumerate().map(|(i, c)| IssueComment {
        index: i + 1,
        text: c.body.clone().unwrap_or_default(),
    });

    FormattedIssue {
        title: issue.title.clone(),
        number: issue.number,
        url: issue.html_url.clone(),
        labels: issue.labels.iter().map(|l| l.name.clone()).collect(),
        comments: std::iter::once(body).chain(rest).collect(),
    }
}

pub fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("█▓▒░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_prefix("Issues");
    bar
}

/// Fetch comments for every issue and format them. A failed comment fetch
/// leaves that issue with only its body.
pub async fn collect_issues(
    source: &dyn IssueSource,
    owner: &str,
    repo: &str,
    issues: &[GitHubIssue],
    progress: &ProgressBar,
) -> Vec<FormattedIssue> {
    let mut formatted = Vec::with_capacity(issues.len());

    for issue in issues {
        progress.set_message(format!("#{}", issue.number));
        let comments = match source.comments(owner, repo, issue.number).await {
            Ok(comments) => comments,
            Err(e) => {
                warn!(issue = issue.number, error = %e, "failed to fetch comments");
                Vec::new()
            }
        };
        debug!(issue = issue.number, comments = comments.len(), "processed issue");
        formatted.push(format_issue(issue, &comments));
        progress.inc(1);
    }

    progress.finish_and_clear();
    formatted
}

/// Write the issues as pretty-printed JSON, keeping non-ASCII text as is.
pub fn write_issues(path: &Path, issues: &[FormattedIssue]) -> Result<(), ScoutError> {
    let json = serde_json::to_string_pretty(issues).map_err(anyhow::Error::from)?;
    std::fs::write(path, json).map_err(|source| ScoutError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::github::GitHubLabel;

    fn issue(number: i64, body: Option<&str>, labels: &[&str]) -> GitHubIssue {
        GitHubIssue {
            number,
            title: format!("Issue {}", number),
            body: body.map(String::from),
            html_url: format!("https://github.com/o/r/issues/{}", number),
            labels: labels
                .iter()
                .map(|name| GitHubLabel {
                    name: name.to_string(),
                })
                .collect(),
            pull_request: None,
        }
    }

    fn comment(body: &str) -> GitHubComment {
        GitHubComment {
            body: Some(body.to_string()),
        }
    }

    struct StubSource;

    #[async_trait]
    impl IssueSource for StubSource {
        async fn open_issues(&self, _owner: &str, _repo: &str) -> Result<Vec<GitHubIssue>> {
            Ok(vec![issue(1, Some("body"), &[])])
        }

        async fn comments(
            &self,
            _owner: &str,
            _repo: &str,
            number: i64,
        ) -> Result<Vec<GitHubComment>> {
            if number == 2 {
                anyhow::bail!("rate limited");
            }
            Ok(vec![comment("first"), comment("second")])
        }
    }

    #[test]
    fn test_format_issue_body_is_index_zero() {
        let formatted = format_issue(
            &issue(7, Some("the body"), &["bug"]),
            &[comment("a"), comment("b")],
        );
        assert_eq!(formatted.number, 7);
        assert_eq!(formatted.labels, vec!["bug"]);
        assert_eq!(formatted.comments.len(), 3);
        assert_eq!(
            formatted.comments[0],
            IssueComment {
                index: 0,
                text: "the body".into()
            }
        );
        assert_eq!(formatted.comments[2].index, 2);
        assert_eq!(formatted.comments[2].text, "b");
    }

    #[test]
    fn test_format_issue_missing_body() {
        let formatted = format_issue(&issue(1, None, &[]), &[]);
        assert_eq!(formatted.comments.len(), 1);
        assert_eq!(formatted.comments[0].text, "");
    }

    #[test]
    fn test_formatted_issue_json_shape() {
        let formatted = format_issue(&issue(3, Some("x"), &[]), &[]);
        let json = serde_json::to_value(&formatted).unwrap();
        assert_eq!(json["url"], "https://github.com/o/r/issues/3");
        assert_eq!(json["comments"][0]["index"], 0);
        assert_eq!(json["comments"][0]["text"], "x");
    }

    #[test]
    fn test_good_first_issue_label_case_insensitive() {
        assert!(is_good_first_issue(&issue(1, None, &["Good First Issue"])));
        assert!(is_good_first_issue(&issue(1, None, &["bug", "good first issue"])));
        assert!(!is_good_first_issue(&issue(1, None, &["good-first-issue"])));
        assert!(!is_good_first_issue(&issue(1, None, &[])));
    }

    #[tokio::test]
    async fn test_collect_issues_tolerates_comment_failures() {
        let issues = vec![issue(1, Some("one"), &[]), issue(2, Some("two"), &[])];
        let progress = ProgressBar::hidden();
        let formatted = collect_issues(&StubSource, "o", "r", &issues, &progress).await;

        assert_eq!(formatted.len(), 2);
        assert_eq!(formatted[0].comments.len(), 3);
        assert_eq!(formatted[1].comments.len(), 1);
        assert_eq!(formatted[1].comments[0].text, "two");
    }

    #[test]
    fn test_write_issues_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.json");
        let issues = vec![format_issue(&issue(5, Some("héllo"), &["docs"]), &[])];
        write_issues(&path, &issues).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  {"));
        assert!(content.contains("héllo"));
        let parsed: Vec<FormattedIssue> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, issues);
    }

    #[test]
    fn test_write_issues_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("issues.json");
        let err = write_issues(&path, &[]).unwrap_err();
        assert!(matches!(err, ScoutError::OutputWriteFailed { .. }));
    }

    #[tokio::test]
    async fn test_collect_issues_empty() {
        let progress = ProgressBar::hidden();
        let formatted = collect_issues(&StubSource, "o", "r", &[], &progress).await;
        assert!(formatted.is_empty());
    }
}
