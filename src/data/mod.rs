//! Core data models for PushClash
//!
//! This module contains the profile types assembled from GitHub and LeetCode and
//! the clients that fetch them.

pub mod github;
pub mod leetcode;

pub use github::{is_valid_login, GithubClient, GithubError, GithubProfile, GithubRepo, GithubSnapshot};
pub use leetcode::{LeetcodeClient, LeetcodeError};

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Number of repositories included in the prepared GitHub summary
pub const TOP_REPO_COUNT: usize = 5;

/// GitHub user summary handed to the text generator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GithubUserData {
    pub username: String,
    /// Display name, falling back to the login
    pub name: String,
    pub bio: String,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub company: String,
    pub location: String,
    pub blog: String,
    pub created_at: DateTime<Utc>,
    /// Most recently created repositories, newest first
    pub top_repos: Vec<TopRepo>,
}

/// Condensed view of a repository
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopRepo {
    pub name: String,
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
}

impl GithubUserData {
    /// Builds the summary from a raw profile and its repositories
    ///
    /// Empty or missing text fields are replaced with readable placeholders so the
    /// prompt never shows `null`.
    pub fn prepare(profile: &GithubProfile, repos: &[GithubRepo]) -> Self {
        Self {
            username: profile.login.clone(),
            name: profile.display_name().to_string(),
            bio: or_placeholder(&profile.bio, "No bio provided"),
            followers: profile.followers,
            following: profile.following,
            public_repos: profile.public_repos,
            company: or_placeholder(&profile.company, "Not specified"),
            location: or_placeholder(&profile.location, "Not specified"),
            blog: or_placeholder(&profile.blog, "Not specified"),
            created_at: profile.created_at,
            top_repos: repos
                .iter()
                .take(TOP_REPO_COUNT)
                .map(|repo| TopRepo {
                    name: repo.name.clone(),
                    description: or_placeholder(&repo.description, "No description"),
                    stars: repo.stargazers_count,
                    forks: repo.forks_count,
                    language: repo.language.clone(),
                })
                .collect(),
        }
    }
}

/// LeetCode profile flattened from the GraphQL response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeProfile {
    pub username: String,
    /// Real name, falling back to the username
    pub name: String,
    pub avatar: Option<String>,
    pub about: Option<String>,
    pub country: Option<String>,
    pub company: Option<String>,
    pub school: Option<String>,
    pub job_title: Option<String>,
    pub ranking: Option<u64>,
    pub reputation: Option<i64>,
    pub star_rating: Option<f64>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub badges: Vec<Badge>,
    pub languages: Vec<LanguageCount>,
    pub contest_badge: Option<ContestBadge>,
    pub total_solved: u64,
    pub easy_solved: u64,
    pub medium_solved: u64,
    pub hard_solved: u64,
    /// Accepted over total submissions as a percentage with one decimal
    pub acceptance_rate: Option<String>,
    pub rating: f64,
}

/// An earned LeetCode badge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub name: Option<String>,
    pub display_name: Option<String>,
}

impl Badge {
    /// Label shown to users, preferring the display name
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Unnamed badge")
    }
}

/// Problems solved in one language
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageCount {
    pub language_name: String,
    pub problems_solved: u64,
}

/// Contest achievement badge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContestBadge {
    pub name: String,
    #[serde(default)]
    pub expired: bool,
}

/// Stats block returned alongside LeetCode roast and battle results
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeStats {
    pub total_solved: u64,
    pub easy_solved: u64,
    pub medium_solved: u64,
    pub hard_solved: u64,
    pub acceptance_rate: Option<String>,
    pub rating: f64,
    pub ranking: Option<u64>,
}

impl From<&LeetcodeProfile> for LeetcodeStats {
    fn from(profile: &LeetcodeProfile) -> Self {
        Self {
            total_solved: profile.total_solved,
            easy_solved: profile.easy_solved,
            medium_solved: profile.medium_solved,
            hard_solved: profile.hard_solved,
            acceptance_rate: profile.acceptance_rate.clone(),
            rating: profile.rating,
            ranking: profile.ranking,
        }
    }
}

static PLACEHOLDER_AVATAR_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://ui-avatars.com/api/").expect("valid URL"));

/// Avatar used when LeetCode has none for a user
///
/// The username is query-encoded.
pub fn placeholder_avatar(username: &str) -> String {
    let mut url = PLACEHOLDER_AVATAR_BASE.clone();
    url.query_pairs_mut()
        .append_pair("name", username)
        .append_pair("background", "random");
    url.into()
}

fn or_placeholder(value: &Option<String>, placeholder: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => placeholder.to_string(),
    }
}
