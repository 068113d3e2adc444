use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Complexity {
    Easy,
    Medium,
    Hard,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Self::Easy),
            "Medium" => Ok(Self::Medium),
            "Hard" => Ok(Self::Hard),
            _ => Err(format!("Invalid complexity: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub complexity: Complexity,
    pub estimated_time: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub status: String,
}

/// Externally visible job status. The names on the wire are the ones the
/// frontend polls for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobStatus {
    #[serde(rename = "in_progress")]
    Pending,
    #[serde(rename = "completed")]
    Done,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "in_progress",
            Self::Done => "completed",
        }
    }
}

/// Lifecycle of a simulated job. The result only exists once the job is done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JobState<T> {
    #[default]
    Pending,
    Done(T),
}

impl<T> JobState<T> {
    pub fn status(&self) -> JobStatus {
        match self {
            Self::Pending => JobStatus::Pending,
            Self::Done(_) => JobStatus::Done,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Pending => None,
            Self::Done(result) => Some(result),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanJob {
    pub id: String,
    pub repository_url: String,
    pub repository_key: String,
    pub created_at: DateTime<Utc>,
    pub state: JobState<Vec<Issue>>,
}

impl ScanJob {
    pub fn view(&self) -> ScanView {
        ScanView {
            scan_id: self.id.clone(),
            status: self.state.status(),
            issues: self.state.result().cloned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImplementationJob {
    pub id: String,
    pub scan_id: String,
    pub issue_id: i64,
    pub created_at: DateTime<Utc>,
    /// A done job may still carry no pull request when the issue has no fixture.
    pub state: JobState<Option<PullRequest>>,
}

impl ImplementationJob {
    pub fn view(&self) -> ImplementationView {
        ImplementationView {
            implementation_id: self.id.clone(),
            status: self.state.status(),
            pull_request: self.state.result().cloned().flatten(),
        }
    }
}

// API view types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanView {
    pub scan_id: String,
    pub status: JobStatus,
    pub issues: Option<Vec<Issue>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImplementationView {
    pub implementation_id: String,
    pub status: JobStatus,
    pub pull_request: Option<PullRequest>,
}

// Session and repository listing models

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub github_username: String,
    pub avatar_url: Option<String>,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: String,
    pub github_username: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            github_username: user.github_username.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub url: String,
    pub description: Option<String>,
}

/// Where a repository listing came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RepositorySource {
    /// Live GitHub API response.
    Github,
    /// Mock mode; no OAuth credentials configured.
    Fixture,
    /// GitHub failed or returned nothing, fixtures served instead.
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryListResponse {
    pub repositories: Vec<Repository>,
    pub source: RepositorySource,
}
