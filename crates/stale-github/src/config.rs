//! GitHub connection configuration

use crate::error::GithubError;
use crate::Result;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// `owner/name` of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| GithubError::InvalidRepository(raw.to_string()))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(GithubError::InvalidRepository(raw.to_string()));
        }
        Ok(RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// GitHub client configuration
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// REST API base, e.g. `https://api.github.com` or `https://ghe.example.com/api/v3`
    pub api_url: String,
    pub repository: RepoRef,
    /// Token sent as a bearer credential (optional for public read-only use)
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl GithubConfig {
    /// Create config for a repository on the public API
    pub fn new(repository: &str) -> Result<Self> {
        Ok(GithubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            repository: RepoRef::parse(repository)?,
            token: None,
            user_agent: format!("stale-sweeper/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        })
    }

    /// Load config from environment variables
    ///
    /// - GITHUB_REPOSITORY (required, `owner/name`)
    /// - GITHUB_TOKEN (optional)
    /// - GITHUB_API_URL (optional, default: https://api.github.com)
    pub fn from_env() -> Result<Self> {
        let repository = std::env::var("GITHUB_REPOSITORY")
            .map_err(|_| GithubError::MissingEnv("GITHUB_REPOSITORY"))?;
        let mut config = Self::new(&repository)?;
        if let Ok(url) = std::env::var("GITHUB_API_URL") {
            config.api_url = url;
        }
        config.token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}
