use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::issues::{FormattedIssue, IssueComment};
use crate::config::LlmSection;
use crate::util::truncate_chars;

/// Longest comment text (in characters) sent to the model.
pub const MAX_COMMENT_CHARS: usize = 500;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes GitHub issues to find the best first issues for newcomers.";

/// Printed when no API key is configured so the user can paste the issues
/// into an LLM of their choice.
pub const MANUAL_PROMPT_HINT: &str = "Given the following list of GitHub issues and their full discussions, what is the best first issue\n\
for someone who wants to contribute to this repository? Please consider clarity, complexity, and\n\
whether the issue seems well-scoped for a newcomer. Return your recommendation along with a short explanation.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Copy of the issues with every comment cut to [`MAX_COMMENT_CHARS`].
pub fn simplify_issues(issues: &[FormattedIssue]) -> Vec<FormattedIssue> {
    issues
        .iter()
        .map(|issue| FormattedIssue {
            comments: issue
                .comments
                .iter()
                .map(|c| IssueComment {
                    index: c.index,
                    text: truncate_chars(&c.text, MAX_COMMENT_CHARS),
                })
                .collect(),
            ..issue.clone()
        })
        .collect()
}

pub fn build_prompt(issues: &[FormattedIssue], owner: &str, repo: &str) -> Result<String> {
    let issues_json = serde_json::to_string_pretty(&simplify_issues(issues))
        .context("Failed to serialize issues for the prompt")?;

    Ok(format!(
        "Given the following list of GitHub issues and their full discussions from the repository {owner}/{repo}, \n\
what is the best first issue for someone who wants to contribute to this repository? \n\
Please consider clarity, complexity, and whether the issue seems well-scoped for a newcomer.\n\
Return your recommendation along with a short explanation.\n\
\n\
Issues:\n\
{issues_json}\n"
    ))
}

/// Chat-completions client that asks for a first-issue recommendation.
pub struct Recommender {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Recommender {
    /// `None` when no API key is configured.
    pub fn from_config(llm: &LlmSection) -> Option<Self> {
        let api_key = llm.api_key.clone().filter(|k| !k.is_empty())?;
        Some(Self {
            http: reqwest::Client::new(),
            api_key,
            api_base: llm.api_base.trim_end_matches('/').to_string(),
            model: llm.model.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
        })
    }

    pub async fn recommend(
        &self,
        issues: &[FormattedIssue],
        owner: &str,
        repo: &str,
    ) -> Result<String> {
        let prompt = build_prompt(issues, owner, repo)?;
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage::new("system", SYSTEM_PROMPT),
                ChatMessage::new("user", prompt),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.api_base);
        debug!(%url, model = %self.model, issues = issues.len(), "requesting recommendation");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send chat completion request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Chat completion request failed with {}: {}", status, body);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("Chat completion response had no choices")?;

        info!(chars = content.len(), "received recommendation");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, routing::post};

    fn sample_issue(text: &str) -> FormattedIssue {
        FormattedIssue {
            title: "Fix typo".into(),
            number: 12,
            url: "https://github.com/o/r/issues/12".into(),
            labels: vec!["good first issue".into()],
            comments: vec![IssueComment {
                index: 0,
                text: text.to_string(),
            }],
        }
    }

    fn llm_config(api_base: &str, key: Option<&str>) -> LlmSection {
        LlmSection {
            api_key: key.map(String::from),
            api_base: api_base.to_string(),
            ..LlmSection::default()
        }
    }

    #[test]
    fn test_simplify_truncates_long_comments() {
        let long = "x".repeat(600);
        let simplified = simplify_issues(&[sample_issue(&long)]);
        let text = &simplified[0].comments[0].text;
        assert_eq!(text.chars().count(), MAX_COMMENT_CHARS + 3);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn test_simplify_keeps_short_comments() {
        let simplified = simplify_issues(&[sample_issue("short")]);
        assert_eq!(simplified[0].comments[0].text, "short");
        assert_eq!(simplified[0].title, "Fix typo");
    }

    #[test]
    fn test_build_prompt_mentions_repo_and_issues() {
        let prompt = build_prompt(&[sample_issue("body")], "octo", "cat").unwrap();
        assert!(prompt.contains("from the repository octo/cat"));
        assert!(prompt.contains("Issues:\n["));
        assert!(prompt.contains("\"number\": 12"));
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(Recommender::from_config(&llm_config("http://x", None)).is_none());
        assert!(Recommender::from_config(&llm_config("http://x", Some(""))).is_none());
        assert!(Recommender::from_config(&llm_config("http://x", Some("sk-1"))).is_some());
    }

    async fn spawn_llm(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_recommend_returns_first_choice() {
        let router = Router::new().route(
            "/chat/completions",
            post(
                |headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                    assert_eq!(headers["authorization"], "Bearer sk-test");
                    assert_eq!(body["model"], "gpt-3.5-turbo");
                    assert_eq!(body["messages"][0]["role"], "system");
                    assert_eq!(body["messages"][1]["role"], "user");
                    assert_eq!(body["max_tokens"], 500);
                    Json(serde_json::json!({
                        "choices": [{"message": {"role": "assistant", "content": "Pick #12"}}]
                    }))
                },
            ),
        );
        let base = spawn_llm(router).await;
        let recommender = Recommender::from_config(&llm_config(&base, Some("sk-test"))).unwrap();

        let answer = recommender
            .recommend(&[sample_issue("body")], "o", "r")
            .await
            .unwrap();
        assert_eq!(answer, "Pick #12");
    }

    #[tokio::test]
    async fn test_recommend_surfaces_http_errors() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    "invalid api key",
                )
            }),
        );
        let base = spawn_llm(router).await;
        let recommender = Recommender::from_config(&llm_config(&base, Some("bad"))).unwrap();

        let err = recommender.recommend(&[], "o", "r").await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_recommend_empty_choices_is_error() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(serde_json::json!({"choices": []})) }),
        );
        let base = spawn_llm(router).await;
        let recommender = Recommender::from_config(&llm_config(&base, Some("k"))).unwrap();

        let err = recommender.recommend(&[], "o", "r").await.unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }
}
