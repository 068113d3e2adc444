//! Layered configuration for Issue Scout.
//!
//! Settings come from an optional `scout.toml`, then from the environment
//! (including a `.env` file loaded at startup), then from CLI flags.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//! frontend_url = "http://localhost:5174"
//! allowed_origins = ["http://localhost:5173", "http://localhost:5174"]
//!
//! [jobs]
//! scan_threshold_secs = 5
//! implementation_threshold_secs = 10
//!
//! [github]
//! client_id = "Iv1.abc"
//! client_secret = "..."
//!
//! [llm]
//! model = "gpt-3.5-turbo"
//! temperature = 0.5
//! max_tokens = 500
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::backend::github::{GITHUB_API_URL, GITHUB_OAUTH_URL, is_valid_github_token};

pub const DEFAULT_CONFIG_FILE: &str = "scout.toml";

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Where OAuth redirects send the browser back to.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    /// Origins allowed to call the API with credentials.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_frontend_url() -> String {
    "http://localhost:5174".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:5174".to_string(),
    ]
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_url: default_frontend_url(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Completion delays of the simulated jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsSection {
    #[serde(default = "default_scan_threshold_secs")]
    pub scan_threshold_secs: u64,
    #[serde(default = "default_implementation_threshold_secs")]
    pub implementation_threshold_secs: u64,
}

fn default_scan_threshold_secs() -> u64 {
    5
}

fn default_implementation_threshold_secs() -> u64 {
    10
}

impl Default for JobsSection {
    fn default() -> Self {
        Self {
            scan_threshold_secs: default_scan_threshold_secs(),
            implementation_threshold_secs: default_implementation_threshold_secs(),
        }
    }
}

impl JobsSection {
    pub fn scan_threshold(&self) -> Duration {
        Duration::from_secs(self.scan_threshold_secs)
    }

    pub fn implementation_threshold(&self) -> Duration {
        Duration::from_secs(self.implementation_threshold_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// GitHub OAuth app and API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSection {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Personal token for the `extract` command; raises the rate limit.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_oauth_base")]
    pub oauth_base: String,
}

fn default_api_base() -> String {
    GITHUB_API_URL.to_string()
}

fn default_oauth_base() -> String {
    GITHUB_OAUTH_URL.to_string()
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            token: None,
            api_base: default_api_base(),
            oauth_base: default_oauth_base(),
        }
    }
}

impl GitHubSection {
    /// Both halves of the OAuth app, or `None` for mock mode.
    pub fn oauth_credentials(&self) -> Option<OAuthCredentials> {
        let client_id = self.client_id.as_deref().filter(|s| !s.is_empty())?;
        let client_secret = self.client_secret.as_deref().filter(|s| !s.is_empty())?;
        Some(OAuthCredentials {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }
}

/// Chat completion settings for issue recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    500
}

fn default_llm_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_base: default_llm_api_base(),
        }
    }
}

/// Root of `scout.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub jobs: JobsSection,
    #[serde(default)]
    pub github: GitHubSection,
    #[serde(default)]
    pub llm: LlmSection,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse scout.toml")
    }

    /// Write the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        fn mask(value: &Option<String>) -> Option<String> {
            value.as_ref().map(|_| "********".to_string())
        }
        let mut copy = self.clone();
        copy.github.client_secret = mask(&self.github.client_secret);
        copy.github.token = mask(&self.github.token);
        copy.llm.api_key = mask(&self.llm.api_key);
        copy
    }

    /// Load `explicit` if given (it must exist), otherwise `scout.toml` in the
    /// working directory if present, otherwise defaults. Environment
    /// overrides are applied on top.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides through `lookup`, so tests can supply
    /// their own environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(id) = lookup("GITHUB_CLIENT_ID") {
            self.github.client_id = Some(id);
        }
        if let Some(secret) = lookup("GITHUB_CLIENT_SECRET") {
            self.github.client_secret = Some(secret);
        }
        if let Some(token) = lookup("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = lookup("SCOUT_FRONTEND_URL") {
            self.server.frontend_url = url;
        }
        if let Some(port) = lookup("SCOUT_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn is_mock_github(&self) -> bool {
        self.github.oauth_credentials().is_none()
    }

    /// Human-readable warnings about suspicious settings. Never fatal.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.jobs.scan_threshold_secs == 0 {
            warnings.push("jobs.scan_threshold_secs is 0; scans complete on first poll".to_string());
        }
        if self.jobs.implementation_threshold_secs <= self.jobs.scan_threshold_secs {
            warnings.push(format!(
                "jobs.implementation_threshold_secs ({}) should be longer than scan_threshold_secs ({})",
                self.jobs.implementation_threshold_secs, self.jobs.scan_threshold_secs
            ));
        }
        if self.server.allowed_origins.is_empty() {
            warnings.push("server.allowed_origins is empty; browsers cannot call the API".to_string());
        }
        if self.github.client_id.is_some() != self.github.client_secret.is_some() {
            warnings.push(
                "Only one of github.client_id / github.client_secret is set; running in mock mode"
                    .to_string(),
            );
        }
        if let Some(token) = &self.github.token {
            if !is_valid_github_token(token) {
                warnings.push("github.token does not look like a GitHub token".to_string());
            }
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            warnings.push(format!(
                "llm.temperature {} is outside 0.0..=2.0",
                self.llm.temperature
            ));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.frontend_url, "http://localhost:5174");
        assert_eq!(config.server.allowed_origins.len(), 2);
        assert_eq!(config.jobs.scan_threshold(), Duration::from_secs(5));
        assert_eq!(config.jobs.implementation_threshold(), Duration::from_secs(10));
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.max_tokens, 500);
        assert!(config.is_mock_github());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_parse_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.github.api_base, "https://api.github.com");
    }

    #[test]
    fn test_parse_partial_sections() {
        let config = Config::parse(
            r#"
            [server]
            port = 9000

            [jobs]
            scan_threshold_secs = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.jobs.scan_threshold_secs, 1);
        assert_eq!(config.jobs.implementation_threshold_secs, 10);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = Config::parse("[server\nport = ").unwrap_err();
        assert!(err.to_string().contains("Failed to parse scout.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scout.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gpt-4o-mini\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_resolve_missing_explicit_file_fails() {
        let dir = tempdir().unwrap();
        let result = Config::resolve(Some(&dir.path().join("missing.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("scout.toml");
        let mut config = Config::default();
        config.server.port = 9001;
        config.llm.temperature = 0.25;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.server.port, 9001);
        assert_eq!(loaded.llm.temperature, 0.25);
        assert!(loaded.github.client_id.is_none());
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = Config::default();
        config.github.client_id = Some("public-id".into());
        config.github.client_secret = Some("s3cret".into());
        config.llm.api_key = Some("sk-live".into());
        let shown = config.redacted().to_toml().unwrap();
        assert!(shown.contains("public-id"));
        assert!(!shown.contains("s3cret"));
        assert!(!shown.contains("sk-live"));
        assert!(config.redacted().github.token.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("GITHUB_CLIENT_ID", "id"),
            ("GITHUB_CLIENT_SECRET", "secret"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SCOUT_PORT", "8123"),
        ]));
        assert!(!config.is_mock_github());
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("GITHUB_CLIENT_ID", ""), ("SCOUT_PORT", "not-a-port")]));
        assert!(config.github.client_id.is_none());
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_mock_mode_needs_both_credentials() {
        let mut config = Config::default();
        config.github.client_id = Some("id".into());
        assert!(config.is_mock_github());
        assert!(
            config
                .validate()
                .iter()
                .any(|w| w.contains("running in mock mode"))
        );
        config.github.client_secret = Some("secret".into());
        assert!(!config.is_mock_github());
    }

    #[test]
    fn test_validate_threshold_ordering() {
        let mut config = Config::default();
        config.jobs.implementation_threshold_secs = 5;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("should be longer"));
    }

    #[test]
    fn test_validate_suspicious_token() {
        let mut config = Config::default();
        config.github.token = Some("hunter2".into());
        assert!(
            config
                .validate()
                .iter()
                .any(|w| w.contains("does not look like"))
        );
    }
}
