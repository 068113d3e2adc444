//! Issue extraction and first-issue recommendation for real GitHub
//! repositories. Used by the `extract` command.

pub mod issues;
pub mod recommend;

pub use issues::{FormattedIssue, GitHubIssueSource, IssueComment, IssueSource};
pub use recommend::{MANUAL_PROMPT_HINT, Recommender};
