//! Static catalog of demo issues and pull requests.
//!
//! Scans resolve to the issue list for their repository key, falling back to
//! the `default` bucket. Implementations resolve to the pull request recorded
//! for their issue id, if any.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::models::{Complexity, Issue, PullRequest, Repository};
use super::repo_key::DEFAULT_REPOSITORY_KEY;

fn issue(
    id: i64,
    title: &str,
    description: &str,
    complexity: Complexity,
    estimated_time: &str,
    url: &str,
) -> Issue {
    Issue {
        id,
        title: title.to_string(),
        description: description.to_string(),
        complexity,
        estimated_time: estimated_time.to_string(),
        url: url.to_string(),
    }
}

fn pull_request(id: i64, title: &str, url: &str) -> PullRequest {
    PullRequest {
        id,
        title: title.to_string(),
        url: url.to_string(),
        status: "open".to_string(),
    }
}

static ISSUES: LazyLock<HashMap<&'static str, Vec<Issue>>> = LazyLock::new(|| {
    HashMap::from([
        (
            DEFAULT_REPOSITORY_KEY,
            vec![
                issue(
                    1,
                    "Fix typo in README",
                    "There's a typo in the README file that needs to be fixed.",
                    Complexity::Easy,
                    "5 minutes",
                    "https://github.com/user/repo/issues/1",
                ),
                issue(
                    2,
                    "Add missing import statement",
                    "The file src/utils.js is missing an import statement for the lodash library.",
                    Complexity::Easy,
                    "10 minutes",
                    "https://github.com/user/repo/issues/2",
                ),
                issue(
                    3,
                    "Fix CSS styling in navbar",
                    "The navbar has incorrect padding which causes it to look misaligned on mobile devices.",
                    Complexity::Medium,
                    "30 minutes",
                    "https://github.com/user/repo/issues/3",
                ),
            ],
        ),
        (
            "facebook/react",
            vec![
                issue(
                    101,
                    "Fix documentation for useEffect",
                    "The documentation for useEffect hook has an incorrect example.",
                    Complexity::Easy,
                    "15 minutes",
                    "https://github.com/facebook/react/issues/101",
                ),
                issue(
                    102,
                    "Add type definitions for new API",
                    "The new API introduced in v18.0 is missing TypeScript type definitions.",
                    Complexity::Medium,
                    "45 minutes",
                    "https://github.com/facebook/react/issues/102",
                ),
                issue(
                    103,
                    "Fix performance regression in concurrent mode",
                    "There's a performance regression in concurrent mode when rendering large lists.",
                    Complexity::Hard,
                    "3 hours",
                    "https://github.com/facebook/react/issues/103",
                ),
            ],
        ),
        (
            "openai/openai-python",
            vec![
                issue(
                    201,
                    "Add example for streaming API",
                    "The documentation is missing an example for using the streaming API.",
                    Complexity::Easy,
                    "20 minutes",
                    "https://github.com/openai/openai-python/issues/201",
                ),
                issue(
                    202,
                    "Fix error handling in async calls",
                    "Error handling in async calls doesn't correctly propagate error messages.",
                    Complexity::Medium,
                    "40 minutes",
                    "https://github.com/openai/openai-python/issues/202",
                ),
                issue(
                    203,
                    "Add retry mechanism for rate limits",
                    "The client should automatically retry requests when hitting rate limits.",
                    Complexity::Medium,
                    "1 hour",
                    "https://github.com/openai/openai-python/issues/203",
                ),
            ],
        ),
    ])
});

static PULL_REQUESTS: LazyLock<HashMap<i64, PullRequest>> = LazyLock::new(|| {
    HashMap::from([
        (1, pull_request(1001, "Fix typo in README", "https://github.com/user/repo/pull/1001")),
        (
            2,
            pull_request(1002, "Add missing import statement", "https://github.com/user/repo/pull/1002"),
        ),
        (
            3,
            pull_request(1003, "Fix CSS styling in navbar", "https://github.com/user/repo/pull/1003"),
        ),
        (
            101,
            pull_request(
                2001,
                "Fix documentation for useEffect",
                "https://github.com/facebook/react/pull/2001",
            ),
        ),
        (
            102,
            pull_request(
                2002,
                "Add type definitions for new API",
                "https://github.com/facebook/react/pull/2002",
            ),
        ),
        (
            103,
            pull_request(
                2003,
                "Fix performance regression in concurrent mode",
                "https://github.com/facebook/react/pull/2003",
            ),
        ),
        (
            201,
            pull_request(
                3001,
                "Add example for streaming API",
                "https://github.com/openai/openai-python/pull/3001",
            ),
        ),
        (
            202,
            pull_request(
                3002,
                "Fix error handling in async calls",
                "https://github.com/openai/openai-python/pull/3002",
            ),
        ),
        (
            203,
            pull_request(
                3003,
                "Add retry mechanism for rate limits",
                "https://github.com/openai/openai-python/pull/3003",
            ),
        ),
    ])
});

/// Issues recorded for `repository_key`, or the default list.
pub fn issues_for(repository_key: &str) -> &'static [Issue] {
    ISSUES
        .get(repository_key)
        .or_else(|| ISSUES.get(DEFAULT_REPOSITORY_KEY))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Pull request recorded for `issue_id`. There is no default entry.
pub fn pull_request_for(issue_id: i64) -> Option<PullRequest> {
    PULL_REQUESTS.get(&issue_id).cloned()
}

/// Repositories offered to users when GitHub is not available.
pub fn fixture_repositories() -> Vec<Repository> {
    [
        ("facebook", "react"),
        ("openai", "openai-python"),
        ("microsoft", "vscode"),
    ]
    .into_iter()
    .map(|(owner, name)| Repository {
        owner: owner.to_string(),
        name: name.to_string(),
        full_name: format!("{}/{}", owner, name),
        url: format!("https://github.com/{}/{}", owner, name),
        description: None,
    })
    .collect()
}
