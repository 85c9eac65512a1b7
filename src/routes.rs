//! HTTP route handlers
//!
//! Each handler pulls profiles through the memoized sources, builds a prompt and
//! returns the generated text alongside a small card describing each user.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::ai::prompts;
use crate::cache::FetchError;
use crate::data::{
    is_valid_login, placeholder_avatar, GithubSnapshot, GithubUserData, LeetcodeProfile, LeetcodeStats,
};
use crate::error::AppError;
use crate::state::AppState;

type AppResult<T> = Result<Json<T>, AppError>;

/// Repositories expanded with languages and README on `/github/user`
const DETAILED_REPO_COUNT: usize = 3;

/// Characters of README text kept per repository
const README_EXCERPT_CHARS: usize = 500;

const ROAST_FAILED: &str = "Failed to generate roast";
const BATTLE_FAILED: &str = "Failed to generate battle results";
const LEETCODE_ROAST_FAILED: &str = "Failed to generate LeetCode roast";
const LEETCODE_BATTLE_FAILED: &str = "Failed to generate LeetCode battle results";
const PROFILE_FAILED: &str = "Failed to fetch GitHub profile";

#[derive(Debug, Deserialize)]
pub struct RoastRequest {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BattleRequest {
    pub username1: Option<String>,
    pub username2: Option<String>,
}

/// Who a result is about
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCard {
    pub username: String,
    pub avatar_url: Option<String>,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastResponse {
    pub user: UserCard,
    pub roast_result: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResponse {
    pub user1: UserCard,
    pub user2: UserCard,
    pub battle_results: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeRoastResponse {
    pub user: UserCard,
    pub leetcode_stats: Option<LeetcodeStats>,
    pub roast_result: String,
}

#[derive(Debug, Serialize)]
pub struct LeetcodeCard {
    #[serde(flatten)]
    pub user: UserCard,
    pub stats: Option<LeetcodeStats>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeBattleResponse {
    pub user1: LeetcodeCard,
    pub user2: LeetcodeCard,
    pub battle_results: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageResponse {
    pub image_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub name: String,
    pub login: String,
    pub bio: String,
    pub followers: u64,
    pub following: u64,
    pub profile_image: String,
}

#[derive(Debug, Serialize)]
pub struct RepoDetail {
    pub name: String,
    pub description: Option<String>,
    pub languages: BTreeMap<String, u64>,
    pub readme: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GithubUserResponse {
    pub profile: ProfileSummary,
    pub repos: Vec<RepoDetail>,
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn require_username(request: &RoastRequest) -> Result<&str, AppError> {
    required(request.username.as_deref()).ok_or(AppError::BadRequest("Username is required"))
}

fn require_pair(request: &BattleRequest) -> Result<(&str, &str), AppError> {
    match (
        required(request.username1.as_deref()),
        required(request.username2.as_deref()),
    ) {
        (Some(first), Some(second)) => Ok((first, second)),
        _ => Err(AppError::BadRequest("Two usernames are required")),
    }
}

fn github_login(username: &str) -> Result<&str, AppError> {
    if is_valid_login(username) {
        Ok(username)
    } else {
        Err(AppError::BadRequest("Invalid GitHub username"))
    }
}

/// Maps a fetch failure onto a response error, naming the missing user on 404
fn fetch_failure(err: FetchError, site: &str, username: &str, context: &'static str) -> AppError {
    match err {
        FetchError::NotFound => AppError::NotFound(format!("{site} user {username} not found")),
        upstream => AppError::failed(context, upstream),
    }
}

async fn generate(state: &AppState, prompt: &str, context: &'static str) -> Result<String, AppError> {
    state
        .generator
        .generate(prompt)
        .await
        .map_err(|e| AppError::failed(context, e))
}

fn github_card(username: &str, snapshot: &GithubSnapshot) -> UserCard {
    UserCard {
        username: username.to_string(),
        avatar_url: Some(snapshot.profile.avatar_url.clone()),
        name: snapshot.profile.display_name().to_string(),
    }
}

fn leetcode_card(username: &str, profile: Option<&LeetcodeProfile>) -> LeetcodeCard {
    LeetcodeCard {
        user: UserCard {
            username: username.to_string(),
            avatar_url: Some(
                profile
                    .and_then(|p| p.avatar.clone())
                    .unwrap_or_else(|| placeholder_avatar(username)),
            ),
            name: profile.map_or_else(|| username.to_string(), |p| p.name.clone()),
        },
        stats: profile.map(LeetcodeStats::from),
    }
}

fn readme_excerpt(readme: String) -> String {
    match readme.char_indices().nth(README_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &readme[..cut]),
        None => readme,
    }
}

/// `GET /`
pub async fn root_handler() -> &'static str {
    "PushClash backend is working!"
}

/// `GET /api/wake`
pub async fn wake_handler() -> Json<Value> {
    Json(json!({ "status": "Server is awake" }))
}

/// `POST /api/roast`
///
/// A missing GitHub user still gets a response: the generator is asked to roast
/// the backend instead.
pub async fn roast_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RoastRequest>,
) -> AppResult<RoastResponse> {
    let username = github_login(require_username(&request)?)?;
    info!(username, "github roast requested");

    match state.github.fetch(username).await {
        Ok(snapshot) => {
            let data = GithubUserData::prepare(&snapshot.profile, &snapshot.repos);
            let roast_result = generate(&state, &prompts::github_roast(&data), ROAST_FAILED).await?;
            Ok(Json(RoastResponse {
                user: github_card(username, &snapshot),
                roast_result,
            }))
        }
        Err(FetchError::NotFound) => {
            let roast_result =
                generate(&state, &prompts::github_not_found(username), ROAST_FAILED).await?;
            Ok(Json(RoastResponse {
                user: UserCard {
                    username: username.to_string(),
                    avatar_url: None,
                    name: username.to_string(),
                },
                roast_result,
            }))
        }
        Err(err) => Err(AppError::failed(ROAST_FAILED, err)),
    }
}

/// `POST /api/battle`
pub async fn battle_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BattleRequest>,
) -> AppResult<BattleResponse> {
    let (username1, username2) = require_pair(&request)?;
    let (username1, username2) = (github_login(username1)?, github_login(username2)?);
    info!(username1, username2, "github battle requested");

    let (first, second) = tokio::join!(state.github.fetch(username1), state.github.fetch(username2));
    let first = first.map_err(|e| fetch_failure(e, "GitHub", username1, BATTLE_FAILED))?;
    let second = second.map_err(|e| fetch_failure(e, "GitHub", username2, BATTLE_FAILED))?;

    let prompt = prompts::github_battle(
        &GithubUserData::prepare(&first.profile, &first.repos),
        &GithubUserData::prepare(&second.profile, &second.repos),
    );
    let battle_results = generate(&state, &prompt, BATTLE_FAILED).await?;

    Ok(Json(BattleResponse {
        user1: github_card(username1, &first),
        user2: github_card(username2, &second),
        battle_results,
    }))
}

/// `POST /api/leetcode-roast`
///
/// Missing users and LeetCode outages both produce a roast aimed at the backend;
/// stats are omitted in those cases.
pub async fn leetcode_roast_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RoastRequest>,
) -> AppResult<LeetcodeRoastResponse> {
    let username = require_username(&request)?;
    info!(username, "leetcode roast requested");

    let fetched = state.leetcode.fetch(username).await;
    let prompt = match &fetched {
        Ok(profile) => prompts::leetcode_roast(profile),
        Err(FetchError::NotFound) => prompts::leetcode_not_found(username),
        Err(FetchError::Upstream(_)) => prompts::leetcode_api_error(&[username]),
    };
    let roast_result = generate(&state, &prompt, LEETCODE_ROAST_FAILED).await?;

    let card = leetcode_card(username, fetched.as_ref().ok());
    Ok(Json(LeetcodeRoastResponse {
        user: card.user,
        leetcode_stats: card.stats,
        roast_result,
    }))
}

/// `POST /api/leetcode-battle`
///
/// An unknown user fails the request with 404. If LeetCode itself is failing for
/// either user the generator roasts the backend instead.
pub async fn leetcode_battle_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BattleRequest>,
) -> AppResult<LeetcodeBattleResponse> {
    let (username1, username2) = require_pair(&request)?;
    info!(username1, username2, "leetcode battle requested");

    let (first, second) = tokio::join!(state.leetcode.fetch(username1), state.leetcode.fetch(username2));
    for (result, username) in [(&first, username1), (&second, username2)] {
        if let Err(FetchError::NotFound) = result {
            return Err(AppError::NotFound(format!("LeetCode user {username} not found")));
        }
    }

    let prompt = match (&first, &second) {
        (Ok(a), Ok(b)) => prompts::leetcode_battle(a, b),
        _ => {
            let failed: Vec<&str> = [(&first, username1), (&second, username2)]
                .into_iter()
                .filter(|(result, _)| result.is_err())
                .map(|(_, username)| username)
                .collect();
            prompts::leetcode_api_error(&failed)
        }
    };
    let battle_results = generate(&state, &prompt, LEETCODE_BATTLE_FAILED).await?;

    Ok(Json(LeetcodeBattleResponse {
        user1: leetcode_card(username1, first.as_ref().ok()),
        user2: leetcode_card(username2, second.as_ref().ok()),
        battle_results,
    }))
}

/// `GET /github/profile-image/{username}`
pub async fn profile_image_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<ProfileImageResponse> {
    github_login(&username)?;
    match state.github.fetch(&username).await {
        Ok(snapshot) => Ok(Json(ProfileImageResponse {
            image_url: snapshot.profile.avatar_url,
        })),
        Err(FetchError::NotFound) => Err(AppError::NotFound("Profile image not found".to_string())),
        Err(err) => Err(AppError::failed(PROFILE_FAILED, err)),
    }
}

/// `GET /github/user/{username}`
///
/// Expands the newest repositories with their language breakdown and a README
/// excerpt. Those lookups bypass the cache and degrade to empty values.
pub async fn github_user_handler(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<GithubUserResponse> {
    github_login(&username)?;
    let snapshot = state
        .github
        .fetch(&username)
        .await
        .map_err(|e| fetch_failure(e, "GitHub", &username, PROFILE_FAILED))?;

    let client = &state.github_client;
    let repos = join_all(snapshot.repos.iter().take(DETAILED_REPO_COUNT).map(|repo| {
        let owner = username.as_str();
        async move {
            let (languages, readme) = tokio::join!(
                client.fetch_repo_languages(owner, &repo.name),
                client.fetch_repo_readme(owner, &repo.name)
            );
            RepoDetail {
                name: repo.name.clone(),
                description: repo.description.clone(),
                languages,
                readme: readme.map(readme_excerpt),
            }
        }
    }))
    .await;

    let profile = &snapshot.profile;
    Ok(Json(GithubUserResponse {
        profile: ProfileSummary {
            name: profile.display_name().to_string(),
            login: profile.login.clone(),
            bio: profile
                .bio
                .clone()
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| "No bio provided".to_string()),
            followers: profile.followers,
            following: profile.following,
            profile_image: profile.avatar_url.clone(),
        },
        repos,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_username_rejects_blank() {
        let request = RoastRequest {
            username: Some("   ".to_string()),
        };

        assert!(matches!(
            require_username(&request),
            Err(AppError::BadRequest("Username is required"))
        ));
    }

    #[test]
    fn test_require_username_trims() {
        let request = RoastRequest {
            username: Some(" octocat ".to_string()),
        };

        assert_eq!(require_username(&request).unwrap(), "octocat");
    }

    #[test]
    fn test_require_pair_needs_both() {
        let request = BattleRequest {
            username1: Some("a".to_string()),
            username2: None,
        };

        assert!(matches!(
            require_pair(&request),
            Err(AppError::BadRequest("Two usernames are required"))
        ));
    }

    #[test]
    fn test_github_login_rejects_path_characters() {
        assert_eq!(github_login("octocat").unwrap(), "octocat");
        for bad in ["a/repos", "a?x", "a b"] {
            assert!(matches!(
                github_login(bad),
                Err(AppError::BadRequest("Invalid GitHub username"))
            ));
        }
    }

    #[test]
    fn test_readme_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(README_EXCERPT_CHARS + 10);
        let excerpt = readme_excerpt(long);

        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), README_EXCERPT_CHARS + 3);

        assert_eq!(readme_excerpt("short".to_string()), "short");
    }

    #[test]
    fn test_leetcode_card_without_profile_uses_placeholder() {
        let card = leetcode_card("neo", None);

        assert_eq!(card.user.name, "neo");
        assert_eq!(card.user.avatar_url.as_deref(), Some(placeholder_avatar("neo").as_str()));
        assert!(card.stats.is_none());
    }

    #[test]
    fn test_fetch_failure_mapping() {
        assert!(matches!(
            fetch_failure(FetchError::NotFound, "GitHub", "ghost", BATTLE_FAILED),
            AppError::NotFound(ref m) if m == "GitHub user ghost not found"
        ));
        assert!(matches!(
            fetch_failure(FetchError::Upstream("x".into()), "GitHub", "a", BATTLE_FAILED),
            AppError::Failed { context: BATTLE_FAILED, .. }
        ));
    }
}
