//! LeetCode GraphQL client
//!
//! Fetches a user's public profile, badges and submission stats from the LeetCode
//! GraphQL endpoint and flattens them into a [`LeetcodeProfile`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use super::{Badge, ContestBadge, LanguageCount, LeetcodeProfile};
use crate::cache::{FetchError, ProfileSource};

/// LeetCode GraphQL endpoint
pub const LEETCODE_GRAPHQL_URL: &str = "https://leetcode.com/graphql";

const FULL_PROFILE_QUERY: &str = r#"query getFullProfile($username: String!) {
  matchedUser(username: $username) {
    username
    githubUrl
    linkedinUrl
    twitterUrl
    profile {
      realName
      userAvatar
      aboutMe
      countryName
      company
      school
      jobTitle
      ranking
      reputation
      starRating
    }
    badges { id name displayName icon creationDate }
    submitStats {
      acSubmissionNum { difficulty count submissions }
      totalSubmissionNum { difficulty count submissions }
    }
    languageProblemCount { languageName problemsSolved }
    contestBadge { name expired hoverText icon }
  }
}"#;

/// Errors that can occur when fetching LeetCode data
#[derive(Debug, Error)]
pub enum LeetcodeError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Response carried no `data` object
    #[error("LeetCode API returned no data")]
    NoData,

    /// Non-success status from the endpoint
    #[error("LeetCode API returned status {0}")]
    Status(StatusCode),

    /// No matched user, or the API reported errors for the lookup
    #[error("LeetCode user '{0}' not found")]
    NotFound(String),
}

impl From<LeetcodeError> for FetchError {
    fn from(err: LeetcodeError) -> Self {
        match err {
            LeetcodeError::NotFound(_) => FetchError::NotFound,
            other => FetchError::Upstream(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<GraphqlData>,
    errors: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlData {
    matched_user: Option<MatchedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchedUser {
    username: String,
    github_url: Option<String>,
    linkedin_url: Option<String>,
    twitter_url: Option<String>,
    profile: Option<RawProfile>,
    badges: Option<Vec<Badge>>,
    submit_stats: Option<SubmitStats>,
    language_problem_count: Option<Vec<LanguageCount>>,
    contest_badge: Option<ContestBadge>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfile {
    real_name: Option<String>,
    user_avatar: Option<String>,
    about_me: Option<String>,
    country_name: Option<String>,
    company: Option<String>,
    school: Option<String>,
    job_title: Option<String>,
    ranking: Option<u64>,
    reputation: Option<i64>,
    star_rating: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitStats {
    #[serde(default)]
    ac_submission_num: Vec<SubmissionCount>,
    #[serde(default)]
    total_submission_num: Vec<SubmissionCount>,
}

#[derive(Debug, Deserialize)]
struct SubmissionCount {
    difficulty: String,
    count: u64,
}

/// Count for one difficulty bucket, zero when absent
fn count_for(counts: &[SubmissionCount], difficulty: &str) -> u64 {
    counts
        .iter()
        .find(|c| c.difficulty == difficulty)
        .map_or(0, |c| c.count)
}

/// Total across difficulties
///
/// LeetCode reports an aggregate `All` bucket next to the per-difficulty ones; it is
/// used directly when present so the buckets are not counted twice.
fn total_count(counts: &[SubmissionCount]) -> u64 {
    counts
        .iter()
        .find(|c| c.difficulty == "All")
        .map(|c| c.count)
        .unwrap_or_else(|| counts.iter().map(|c| c.count).sum())
}

fn acceptance_rate(accepted: u64, total: u64) -> Option<String> {
    (total > 0).then(|| format!("{:.1}", accepted as f64 / total as f64 * 100.0))
}

impl From<MatchedUser> for LeetcodeProfile {
    fn from(user: MatchedUser) -> Self {
        let profile = user.profile.unwrap_or_default();
        let stats = user.submit_stats.unwrap_or_default();
        let total_solved = total_count(&stats.ac_submission_num);
        let total_submitted = total_count(&stats.total_submission_num);

        Self {
            name: profile
                .real_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| user.username.clone()),
            username: user.username,
            avatar: profile.user_avatar.filter(|a| !a.is_empty()),
            about: profile.about_me,
            country: profile.country_name,
            company: profile.company,
            school: profile.school,
            job_title: profile.job_title,
            ranking: profile.ranking,
            reputation: profile.reputation,
            star_rating: profile.star_rating,
            github_url: user.github_url,
            linkedin_url: user.linkedin_url,
            twitter_url: user.twitter_url,
            badges: user.badges.unwrap_or_default(),
            languages: user.language_problem_count.unwrap_or_default(),
            contest_badge: user.contest_badge,
            total_solved,
            easy_solved: count_for(&stats.ac_submission_num, "Easy"),
            medium_solved: count_for(&stats.ac_submission_num, "Medium"),
            hard_solved: count_for(&stats.ac_submission_num, "Hard"),
            acceptance_rate: acceptance_rate(total_solved, total_submitted),
            rating: profile.star_rating.unwrap_or(0.0),
        }
    }
}

/// Client for the LeetCode GraphQL API
#[derive(Debug, Clone)]
pub struct LeetcodeClient {
    client: Client,
    endpoint: String,
}

impl Default for LeetcodeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LeetcodeClient {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            endpoint: LEETCODE_GRAPHQL_URL.to_string(),
        }
    }

    /// Send queries to a different endpoint (for testing)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Fetch and flatten the full profile for a user
    ///
    /// # Returns
    /// * `Ok(LeetcodeProfile)` - The flattened profile
    /// * `Err(LeetcodeError::NotFound)` - No such user
    /// * `Err(LeetcodeError)` - Transport, status or decoding failure
    pub async fn fetch_profile(&self, username: &str) -> Result<LeetcodeProfile, LeetcodeError> {
        let body = json!({
            "query": FULL_PROFILE_QUERY,
            "variables": { "username": username },
        });

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LeetcodeError::Status(status));
        }

        let text = response.text().await?;
        let parsed: GraphqlResponse = serde_json::from_str(&text)?;
        parse_response(parsed, username)
    }
}

fn parse_response(
    response: GraphqlResponse,
    username: &str,
) -> Result<LeetcodeProfile, LeetcodeError> {
    let data = response.data.ok_or(LeetcodeError::NoData)?;
    let has_errors = response.errors.is_some_and(|errors| !errors.is_empty());

    match data.matched_user {
        Some(user) if !has_errors => Ok(user.into()),
        _ => Err(LeetcodeError::NotFound(username.to_string())),
    }
}

#[async_trait]
impl ProfileSource for LeetcodeClient {
    type Profile = LeetcodeProfile;

    fn namespace(&self) -> &'static str {
        "leetcode"
    }

    async fn fetch(&self, username: &str) -> Result<LeetcodeProfile, FetchError> {
        Ok(self.fetch_profile(username).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn matched_user_body() -> serde_json::Value {
        json!({
            "data": {
                "matchedUser": {
                    "username": "neo",
                    "githubUrl": "https://github.com/neo",
                    "linkedinUrl": null,
                    "twitterUrl": null,
                    "profile": {
                        "realName": "Thomas Anderson",
                        "userAvatar": "https://assets.leetcode.com/neo.png",
                        "aboutMe": "",
                        "countryName": "United States",
                        "company": "Metacortex",
                        "school": null,
                        "jobTitle": null,
                        "ranking": 12345,
                        "reputation": 3,
                        "starRating": 2.5
                    },
                    "badges": [{ "id": "1", "name": "annual", "displayName": "Annual Badge", "icon": "", "creationDate": "2023-01-01" }],
                    "submitStats": {
                        "acSubmissionNum": [
                            { "difficulty": "All", "count": 60, "submissions": 90 },
                            { "difficulty": "Easy", "count": 40, "submissions": 50 },
                            { "difficulty": "Medium", "count": 15, "submissions": 30 },
                            { "difficulty": "Hard", "count": 5, "submissions": 10 }
                        ],
                        "totalSubmissionNum": [
                            { "difficulty": "All", "count": 80, "submissions": 200 },
                            { "difficulty": "Easy", "count": 45, "submissions": 100 },
                            { "difficulty": "Medium", "count": 25, "submissions": 70 },
                            { "difficulty": "Hard", "count": 10, "submissions": 30 }
                        ]
                    },
                    "languageProblemCount": [{ "languageName": "Rust", "problemsSolved": 60 }],
                    "contestBadge": null
                }
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_profile_flattens_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({ "variables": { "username": "neo" } })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(matched_user_body().to_string())
            .create_async()
            .await;

        let client = LeetcodeClient::new().with_endpoint(format!("{}/graphql", server.url()));
        let profile = client.fetch_profile("neo").await.unwrap();

        mock.assert_async().await;
        assert_eq!(profile.name, "Thomas Anderson");
        assert_eq!(profile.total_solved, 60);
        assert_eq!(profile.easy_solved, 40);
        assert_eq!(profile.medium_solved, 15);
        assert_eq!(profile.hard_solved, 5);
        assert_eq!(profile.acceptance_rate.as_deref(), Some("75.0"));
        assert_eq!(profile.rating, 2.5);
        assert_eq!(profile.ranking, Some(12345));
        assert_eq!(profile.badges[0].label(), "Annual Badge");
        assert_eq!(profile.languages[0].language_name, "Rust");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(
                json!({
                    "errors": [{ "message": "That user does not exist." }],
                    "data": { "matchedUser": null }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = LeetcodeClient::new().with_endpoint(format!("{}/graphql", server.url()));
        let err = client.fetch_profile("ghost").await.unwrap_err();

        assert!(matches!(err, LeetcodeError::NotFound(_)));
        assert_eq!(FetchError::from(err), FetchError::NotFound);
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(502)
            .create_async()
            .await;

        let client = LeetcodeClient::new().with_endpoint(format!("{}/graphql", server.url()));
        let err = client.fetch_profile("neo").await.unwrap_err();

        assert!(matches!(FetchError::from(err), FetchError::Upstream(_)));
    }

    #[test]
    fn test_missing_data_is_upstream_failure() {
        let response: GraphqlResponse = serde_json::from_str(r#"{"errors":[]}"#).unwrap();

        let err = parse_response(response, "neo").unwrap_err();

        assert!(matches!(err, LeetcodeError::NoData));
    }

    #[test]
    fn test_totals_without_all_bucket_are_summed() {
        let counts = vec![
            SubmissionCount {
                difficulty: "Easy".to_string(),
                count: 3,
            },
            SubmissionCount {
                difficulty: "Hard".to_string(),
                count: 2,
            },
        ];

        assert_eq!(total_count(&counts), 5);
        assert_eq!(count_for(&counts, "Medium"), 0);
    }

    #[test]
    fn test_acceptance_rate_requires_submissions() {
        assert_eq!(acceptance_rate(0, 0), None);
        assert_eq!(acceptance_rate(1, 3).as_deref(), Some("33.3"));
    }

    #[test]
    fn test_name_falls_back_to_username() {
        let user: MatchedUser =
            serde_json::from_value(json!({ "username": "trinity", "profile": null })).unwrap();

        let profile = LeetcodeProfile::from(user);

        assert_eq!(profile.name, "trinity");
        assert_eq!(profile.total_solved, 0);
        assert!(profile.badges.is_empty());
        assert_eq!(profile.rating, 0.0);
    }
}
