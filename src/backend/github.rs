use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::models::Repository;
use crate::errors::ScoutError;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_OAUTH_URL: &str = "https://github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = "issue-scout";
const PER_PAGE: usize = 100;

/// Response from GitHub's OAuth code exchange endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
}

/// The authenticated GitHub account (subset of fields).
#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

/// A GitHub repository (subset of fields we care about).
#[derive(Debug, Deserialize)]
pub struct GitHubRepo {
    pub owner: GitHubOwner,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
}

impl From<GitHubRepo> for Repository {
    fn from(repo: GitHubRepo) -> Self {
        Self {
            owner: repo.owner.login,
            name: repo.name,
            full_name: repo.full_name,
            url: repo.html_url,
            description: repo.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
}

/// A GitHub issue (subset of fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub number: i64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    /// Pull requests also come through the issues endpoint; filter them out.
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubComment {
    #[serde(default)]
    pub body: Option<String>,
}

/// Known GitHub token prefixes.
/// See: https://github.blog/2021-04-05-behind-githubs-new-authentication-token-formats/
const GITHUB_TOKEN_PREFIXES: &[&str] = &[
    "ghp_",        // Personal access tokens (classic)
    "github_pat_", // Fine-grained personal access tokens
    "gho_",        // OAuth access tokens
    "ghu_",        // GitHub App user-to-server tokens
    "ghs_",        // GitHub App server-to-server tokens
    "ghr_",        // GitHub App refresh tokens
];

/// Format check only; does not verify the token is active.
pub fn is_valid_github_token(token: &str) -> bool {
    GITHUB_TOKEN_PREFIXES
        .iter()
        .any(|prefix| token.starts_with(prefix))
}

/// Parse `(owner, repo)` from a GitHub URL, rejecting anything that is not
/// one. Unlike the catalog key extractor this is strict.
pub fn parse_github_url(url: &str) -> Result<(String, String), ScoutError> {
    let parts: Vec<&str> = url.trim_matches('/').split('/').collect();
    let host = parts
        .iter()
        .position(|part| *part == "github.com")
        .ok_or_else(|| ScoutError::InvalidUrl {
            url: url.to_string(),
        })?;

    match (parts.get(host + 1), parts.get(host + 2)) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ScoutError::IncompleteUrl {
            url: url.to_string(),
        }),
    }
}

/// Source of the signed-in user's repositories.
#[async_trait]
pub trait RepositoryLister: Send + Sync {
    async fn list_repositories(&self, token: &str) -> anyhow::Result<Vec<Repository>>;
}

/// Thin async client over the GitHub REST and OAuth endpoints.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new(GITHUB_API_URL, GITHUB_OAUTH_URL)
    }
}

impl GitHubClient {
    pub fn new(api_base: &str, oauth_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            oauth_base: oauth_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn authorize_url(&self, client_id: &str) -> String {
        format!(
            "{}/login/oauth/authorize?client_id={}&scope=repo",
            self.oauth_base, client_id
        )
    }

    fn get(&self, url: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let req = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT);
        match token {
            Some(token) => req.header(AUTHORIZATION, format!("token {}", token)),
            None => req,
        }
    }

    /// Exchange an OAuth callback code for an access token.
    ///
    /// GitHub reports bad codes with a 200 and an `error` field, so the caller
    /// must inspect the response rather than rely on `Err`.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> anyhow::Result<TokenResponse> {
        self.http
            .post(format!("{}/login/oauth/access_token", self.oauth_base))
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("code", code),
            ])
            .send()
            .await
            .context("Failed to send token exchange request to GitHub")?
            .error_for_status()
            .context("GitHub token endpoint returned error status")?
            .json::<TokenResponse>()
            .await
            .context("Failed to parse token response from GitHub")
    }

    pub async fn get_user(&self, token: &str) -> anyhow::Result<GitHubUser> {
        self.get(&format!("{}/user", self.api_base), Some(token))
            .send()
            .await
            .context("Failed to send user request to GitHub")?
            .error_for_status()
            .context("GitHub user API returned error status")?
            .json::<GitHubUser>()
            .await
            .context("Failed to parse user response from GitHub")
    }

    /// Most recently updated repositories of the authenticated user (one page).
    pub async fn list_user_repos(&self, token: &str) -> anyhow::Result<Vec<GitHubRepo>> {
        self.get(&format!("{}/user/repos", self.api_base), Some(token))
            .query(&[("sort", "updated"), ("per_page", "100")])
            .send()
            .await
            .context("Failed to send repos request to GitHub")?
            .error_for_status()
            .context("GitHub repos API returned error status")?
            .json::<Vec<GitHubRepo>>()
            .await
            .context("Failed to parse repos response from GitHub")
    }

    /// Fetch every page of a list endpoint. Stops on the first short page.
    async fn paginate<T: DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&str>,
        params: &[(&str, &str)],
    ) -> anyhow::Result<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let batch: Vec<T> = self
                .get(url, token)
                .query(params)
                .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())])
                .send()
                .await
                .with_context(|| format!("Failed to send request to {}", url))?
                .error_for_status()
                .with_context(|| format!("GitHub returned error status for {}", url))?
                .json()
                .await
                .with_context(|| format!("Failed to parse response from {}", url))?;

            let count = batch.len();
            all.extend(batch);

            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    /// List open issues for a repository (excludes pull requests).
    pub async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> anyhow::Result<Vec<GitHubIssue>> {
        let url = format!("{}/repos/{}/{}/issues", self.api_base, owner, repo);
        let issues: Vec<GitHubIssue> = self.paginate(&url, token, &[("state", "open")]).await?;
        Ok(issues
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .collect())
    }

    pub async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        number: i64,
        token: Option<&str>,
    ) -> anyhow::Result<Vec<GitHubComment>> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_base, owner, repo, number
        );
        self.paginate(&url, token, &[]).await
    }
}

#[async_trait]
impl RepositoryLister for GitHubClient {
    async fn list_repositories(&self, token: &str) -> anyhow::Result<Vec<Repository>> {
        let repos = self.list_user_repos(token).await?;
        Ok(repos.into_iter().map(Repository::from).collect())
    }
}
