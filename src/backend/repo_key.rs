/// Fixture bucket used when no `owner/name` can be read from a URL.
pub const DEFAULT_REPOSITORY_KEY: &str = "default";

const GITHUB_HOST: &str = "github.com";

/// Derive the `owner/name` catalog key from a repository URL.
///
/// Looks for a `github.com` path segment and takes the two segments after it.
/// Anything else, including plain garbage, maps to [`DEFAULT_REPOSITORY_KEY`].
pub fn extract_key(url: &str) -> String {
    let parts: Vec<&str> = url.trim_matches('/').split('/').collect();
    parts
        .iter()
        .position(|part| *part == GITHUB_HOST)
        .and_then(|host| Some((parts.get(host + 1)?, parts.get(host + 2)?)))
        .map(|(owner, name)| format!("{}/{}", owner, name))
        .unwrap_or_else(|| DEFAULT_REPOSITORY_KEY.to_string())
}
