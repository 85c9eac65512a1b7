//! GitHub REST API client
//!
//! This module fetches user profiles, repositories, language breakdowns and README
//! text from the GitHub API. Only the profile lookup can fail the request; the
//! secondary lookups degrade to empty results.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{FetchError, ProfileSource};

/// Base URL for the GitHub API
pub const GITHUB_API_BASE_URL: &str = "https://api.github.com";

/// User agent sent with every GitHub request
const GITHUB_USER_AGENT: &str = "GitHub-Roaster-App";

/// Media type that makes the readme endpoint return raw text
const RAW_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";

/// Errors that can occur when fetching GitHub data
#[derive(Debug, Error)]
pub enum GithubError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// GitHub answered 404 for the user
    #[error("GitHub user '{0}' not found")]
    NotFound(String),

    /// Any other non-success status
    #[error("GitHub API returned status {0}")]
    Status(StatusCode),
}

impl From<GithubError> for FetchError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::NotFound(_) => FetchError::NotFound,
            other => FetchError::Upstream(other.to_string()),
        }
    }
}

/// Public profile as returned by `GET /users/{username}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubProfile {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub public_repos: u64,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GithubProfile {
    /// Display name, falling back to the login when unset
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.login,
        }
    }
}

/// Repository as returned by `GET /users/{username}/repos`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubRepo {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub language: Option<String>,
}

/// Profile plus repositories, the unit cached per GitHub user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubSnapshot {
    pub profile: GithubProfile,
    /// Newest first
    pub repos: Vec<GithubRepo>,
}

/// Client for the GitHub REST API
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubClient {
    /// Create a new GithubClient with default settings and no token
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create a new GithubClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: GITHUB_API_BASE_URL.to_string(),
            token: None,
        }
    }

    /// Point the client at a different API root (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Authenticate requests with a personal access token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header(USER_AGENT, GITHUB_USER_AGENT);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("token {token}")),
            None => request,
        }
    }

    /// Fetch the public profile for a user
    ///
    /// # Returns
    /// * `Ok(GithubProfile)` - The user's profile
    /// * `Err(GithubError::NotFound)` - GitHub answered 404, or the login is malformed
    /// * `Err(GithubError)` - Any other request or parsing failure
    pub async fn fetch_user_profile(&self, username: &str) -> Result<GithubProfile, GithubError> {
        if !is_valid_login(username) {
            return Err(GithubError::NotFound(username.to_string()));
        }
        let response = self.get(&format!("/users/{username}")).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(GithubError::NotFound(username.to_string())),
            status if !status.is_success() => Err(GithubError::Status(status)),
            _ => {
                let text = response.text().await?;
                Ok(serde_json::from_str(&text)?)
            }
        }
    }

    /// Fetch a user's repositories, newest first
    ///
    /// Returns an empty list if the request fails for any reason.
    pub async fn fetch_user_repos(&self, username: &str) -> Vec<GithubRepo> {
        let path = format!("/users/{username}/repos?sort=created&direction=desc");
        match self.get_json::<Vec<GithubRepo>>(&path).await {
            Ok(repos) => repos,
            Err(e) => {
                warn!(username, error = %e, "failed to fetch repositories");
                Vec::new()
            }
        }
    }

    /// Fetch bytes of code per language for a repository
    ///
    /// Returns an empty map if the request fails.
    pub async fn fetch_repo_languages(&self, owner: &str, repo: &str) -> BTreeMap<String, u64> {
        let path = format!("/repos/{owner}/{repo}/languages");
        match self.get_json(&path).await {
            Ok(languages) => languages,
            Err(e) => {
                debug!(owner, repo, error = %e, "failed to fetch languages");
                BTreeMap::new()
            }
        }
    }

    /// Fetch a repository's README as cleaned plain text
    ///
    /// Returns `None` when the repository has no README or the request fails.
    pub async fn fetch_repo_readme(&self, owner: &str, repo: &str) -> Option<String> {
        let path = format!("/repos/{owner}/{repo}/readme");
        let response = match self.get(&path).header(ACCEPT, RAW_MEDIA_TYPE).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(owner, repo, status = %response.status(), "no readme");
                return None;
            }
            Err(e) => {
                debug!(owner, repo, error = %e, "failed to fetch readme");
                return None;
            }
        };

        let text = response.text().await.ok()?;
        let cleaned = clean_readme_text(&text);
        (!cleaned.is_empty()).then_some(cleaned)
    }

    /// Fetch the profile and repositories together
    pub async fn fetch_snapshot(&self, username: &str) -> Result<GithubSnapshot, GithubError> {
        let profile = self.fetch_user_profile(username).await?;
        let repos = self.fetch_user_repos(username).await;
        Ok(GithubSnapshot { profile, repos })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, GithubError> {
        let response = self.get(path).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GithubError::Status(status));
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ProfileSource for GithubClient {
    type Profile = GithubSnapshot;

    fn namespace(&self) -> &'static str {
        "github"
    }

    async fn fetch(&self, username: &str) -> Result<GithubSnapshot, FetchError> {
        Ok(self.fetch_snapshot(username).await?)
    }
}

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`]*`").expect("valid regex"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"));
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static LOGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{1,39}$").expect("valid regex"));

/// Whether `username` is a well-formed GitHub login
///
/// Logins are 1 to 39 ASCII letters, digits or hyphens. Anything else cannot name a
/// GitHub user and must not be spliced into an API path.
pub fn is_valid_login(username: &str) -> bool {
    LOGIN.is_match(username)
}

/// Strips markdown and HTML noise from README text
///
/// Code blocks, inline code, images and tags are removed, links keep their text,
/// and runs of whitespace collapse to a single space.
pub fn clean_readme_text(text: &str) -> String {
    let text = CODE_FENCE.replace_all(text, "");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = HTML_TAG.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
