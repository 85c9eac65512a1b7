//! Profile sources and their memoized wrapper

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use super::manager::MemoCache;

/// Why an upstream profile fetch produced no payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The upstream service affirmatively reports the user does not exist
    #[error("user not found")]
    NotFound,

    /// Any other failure: transport, decoding, rate limiting
    #[error("upstream request failed: {0}")]
    Upstream(String),
}

/// An upstream service that can look up a profile by username
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Payload returned for a found user
    type Profile: Clone + Send + Sync + 'static;

    /// Prefix that keeps this source's cache keys apart from other sources
    fn namespace(&self) -> &'static str;

    /// Performs the real network round-trip
    async fn fetch(&self, username: &str) -> Result<Self::Profile, FetchError>;
}

/// A profile source fronted by its own TTL cache
///
/// Keys are `namespace:username`, with the username kept exactly as supplied.
pub struct MemoizedSource<P> {
    source: Arc<dyn ProfileSource<Profile = P>>,
    cache: MemoCache<P>,
}

impl<P: Clone + Send + Sync + 'static> fmt::Debug for MemoizedSource<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizedSource")
            .field("namespace", &self.source.namespace())
            .field("cache", &self.cache)
            .finish()
    }
}

impl<P: Clone + Send + Sync + 'static> MemoizedSource<P> {
    pub fn new(source: Arc<dyn ProfileSource<Profile = P>>, cache: MemoCache<P>) -> Self {
        Self { source, cache }
    }

    /// Builds the cache key for `username`
    pub fn cache_key(&self, username: &str) -> String {
        format!("{}:{}", self.source.namespace(), username)
    }

    /// Fetches a profile, serving it from cache while fresh
    ///
    /// Failures are logged and returned as-is; they never reach the cache.
    pub async fn fetch(&self, username: &str) -> Result<P, FetchError> {
        let key = self.cache_key(username);
        self.cache
            .get_or_fetch(&key, || self.source.fetch(username))
            .await
            .inspect_err(|e| warn!(key = %key, error = %e, "profile fetch failed"))
    }

    /// Drops the cached profile for `username`
    pub fn invalidate(&self, username: &str) -> bool {
        self.cache.invalidate(&self.cache_key(username))
    }

    pub fn cache(&self) -> &MemoCache<P> {
        &self.cache
    }
}
