//! Shared application state handed to every route handler

use std::sync::Arc;

use reqwest::Client;

use crate::ai::{GeminiClient, TextGenerator};
use crate::cache::{MemoCache, MemoizedSource, ProfileSource};
use crate::cli::Config;
use crate::data::{GithubClient, GithubSnapshot, LeetcodeClient, LeetcodeProfile};

pub struct AppState {
    /// GitHub profiles and repositories, cached per username
    pub github: MemoizedSource<GithubSnapshot>,
    /// LeetCode profiles, cached per username
    pub leetcode: MemoizedSource<LeetcodeProfile>,
    /// Uncached client for per-repository details
    pub github_client: GithubClient,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    /// Assembles state from explicit collaborators
    ///
    /// Each source gets its own cache with the given TTL.
    pub fn new(
        github_source: Arc<dyn ProfileSource<Profile = GithubSnapshot>>,
        leetcode_source: Arc<dyn ProfileSource<Profile = LeetcodeProfile>>,
        github_client: GithubClient,
        generator: Arc<dyn TextGenerator>,
        cache_ttl_ms: u64,
    ) -> Self {
        Self {
            github: MemoizedSource::new(github_source, MemoCache::from_millis(cache_ttl_ms)),
            leetcode: MemoizedSource::new(leetcode_source, MemoCache::from_millis(cache_ttl_ms)),
            github_client,
            generator,
        }
    }

    /// Builds the production clients from configuration
    ///
    /// All clients share one connection pool with the configured request timeout.
    pub fn from_config(config: &Config) -> Result<Arc<Self>, reqwest::Error> {
        let http = Client::builder().timeout(config.request_timeout).build()?;

        let github = GithubClient::with_client(http.clone())
            .with_base_url(&config.github_api_url)
            .with_token(config.github_token.clone());
        let leetcode = LeetcodeClient::with_client(http.clone()).with_endpoint(&config.leetcode_url);
        let gemini = GeminiClient::with_client(http, &config.gemini_api_key)
            .with_model(&config.gemini_model)
            .with_base_url(&config.gemini_api_url);

        Ok(Arc::new(Self::new(
            Arc::new(github.clone()),
            Arc::new(leetcode),
            github,
            Arc::new(gemini),
            config.cache_ttl_ms,
        )))
    }
}
