//! Command-line interface parsing for the PushClash server
//!
//! This module handles parsing of CLI arguments using clap. Every option can also
//! be supplied through an environment variable, which is how deployments set the
//! API keys.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::ai::gemini::{DEFAULT_GEMINI_MODEL, GEMINI_BASE_URL};
use crate::cache::DEFAULT_TTL_MS;
use crate::data::github::GITHUB_API_BASE_URL;
use crate::data::leetcode::LEETCODE_GRAPHQL_URL;

/// Origins allowed by CORS when none are configured
pub const DEFAULT_ALLOWED_ORIGINS: &str =
    "https://pushclash.vercel.app,http://localhost:5173,http://localhost:3000,http://127.0.0.1:5173";

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// No Gemini API key was supplied
    #[error("Missing Gemini API key: pass --gemini-api-key or set GEMINI_API_KEY")]
    MissingApiKey,

    /// A zero TTL would turn every lookup into a miss
    #[error("Invalid cache TTL: {0} ms. The TTL must be greater than zero and at most {}", i64::MAX)]
    InvalidTtl(u64),

    /// Requests need a non-zero timeout
    #[error("Invalid request timeout: {0} seconds")]
    InvalidTimeout(u64),
}

/// PushClash - roast and battle GitHub and LeetCode profiles
#[derive(Parser, Debug)]
#[command(name = "pushclash")]
#[command(about = "Backend server for roasting and battling GitHub and LeetCode profiles")]
#[command(version)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// GitHub personal access token (raises the API rate limit)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model used for generation
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// How long fetched profiles stay cached, in milliseconds
    #[arg(long, env = "CACHE_TTL_MS", default_value_t = DEFAULT_TTL_MS)]
    pub cache_ttl_ms: u64,

    /// Comma-separated list of origins allowed to call the API
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',', default_value = DEFAULT_ALLOWED_ORIGINS)]
    pub allowed_origins: Vec<String>,

    /// Timeout for each upstream HTTP request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// GitHub API root
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_BASE_URL)]
    pub github_api_url: String,

    /// LeetCode GraphQL endpoint
    #[arg(long, env = "LEETCODE_GRAPHQL_URL", default_value = LEETCODE_GRAPHQL_URL)]
    pub leetcode_url: String,

    /// Gemini API root
    #[arg(long, env = "GEMINI_API_URL", default_value = GEMINI_BASE_URL)]
    pub gemini_api_url: String,
}

/// Validated server configuration derived from CLI arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub github_token: Option<String>,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub cache_ttl_ms: u64,
    pub allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    pub github_api_url: String,
    pub leetcode_url: String,
    pub gemini_api_url: String,
}

impl Config {
    /// Creates a Config from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(Config)` with validated settings
    /// * `Err(CliError)` if a required value is missing or out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let gemini_api_key = cli
            .gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(CliError::MissingApiKey)?
            .to_string();

        if cli.cache_ttl_ms == 0 || i64::try_from(cli.cache_ttl_ms).is_err() {
            return Err(CliError::InvalidTtl(cli.cache_ttl_ms));
        }
        if cli.request_timeout_secs == 0 {
            return Err(CliError::InvalidTimeout(cli.request_timeout_secs));
        }

        let allowed_origins = cli
            .allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Config {
            port: cli.port,
            github_token: cli.github_token.clone().filter(|t| !t.is_empty()),
            gemini_api_key,
            gemini_model: cli.gemini_model.clone(),
            cache_ttl_ms: cli.cache_ttl_ms,
            allowed_origins,
            request_timeout: Duration::from_secs(cli.request_timeout_secs),
            github_api_url: cli.github_api_url.clone(),
            leetcode_url: cli.leetcode_url.clone(),
            gemini_api_url: cli.gemini_api_url.clone(),
        })
    }
}
