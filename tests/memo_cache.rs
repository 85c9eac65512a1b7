//! Behavioural tests for the profile memoization cache
//!
//! A manual clock drives expiry so every TTL edge is hit exactly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use pushclash::cache::{FetchError, ManualClock, MemoCache, MemoizedSource, ProfileSource};
use tokio::sync::Barrier;

const TTL_SECS: i64 = 600;

/// Source that replays scripted results and counts calls
///
/// With a gate set, every fetch waits at the barrier before taking its result, so
/// concurrent fetches are all in flight before any of them completes.
struct ScriptedSource {
    namespace: &'static str,
    script: Mutex<VecDeque<Result<String, FetchError>>>,
    calls: AtomicUsize,
    gate: Option<Barrier>,
}

impl ScriptedSource {
    fn new(namespace: &'static str, script: Vec<Result<String, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            namespace,
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            gate: None,
        })
    }

    fn gated(parties: usize, script: Vec<Result<String, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            namespace: "github",
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            gate: Some(Barrier::new(parties)),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileSource for ScriptedSource {
    type Profile = String;

    fn namespace(&self) -> &'static str {
        self.namespace
    }

    async fn fetch(&self, username: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Upstream(format!("script exhausted for {username}"))))
    }
}

fn memoized(source: Arc<ScriptedSource>) -> (MemoizedSource<String>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let cache = MemoCache::with_clock(Duration::seconds(TTL_SECS), clock.clone());
    (MemoizedSource::new(source, cache), clock)
}

fn ok(value: &str) -> Result<String, FetchError> {
    Ok(value.to_string())
}

#[tokio::test]
async fn test_cold_miss_populates() {
    let source = ScriptedSource::new("github", vec![ok("v1")]);
    let (memo, _clock) = memoized(source.clone());

    assert_eq!(memo.fetch("alice").await.unwrap(), "v1");

    assert_eq!(source.calls(), 1);
    let entry = memo.cache().peek("github:alice").expect("entry stored");
    assert_eq!(entry.data, "v1");
    assert!(!entry.is_expired);
}

#[tokio::test]
async fn test_warm_hit_short_circuits() {
    let source = ScriptedSource::new("github", vec![ok("v1"), ok("v2")]);
    let (memo, clock) = memoized(source.clone());

    memo.fetch("alice").await.unwrap();
    clock.advance(Duration::seconds(TTL_SECS - 1));

    assert_eq!(memo.fetch("alice").await.unwrap(), "v1");
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_expiry_forces_refresh() {
    let source = ScriptedSource::new("github", vec![ok("v1"), ok("v2")]);
    let (memo, clock) = memoized(source.clone());

    memo.fetch("alice").await.unwrap();
    clock.advance(Duration::seconds(TTL_SECS + 1));

    assert_eq!(memo.fetch("alice").await.unwrap(), "v2");
    assert_eq!(source.calls(), 2);
    assert_eq!(memo.cache().peek("github:alice").unwrap().data, "v2");
}

#[tokio::test]
async fn test_not_found_is_not_cached() {
    let source = ScriptedSource::new("github", vec![Err(FetchError::NotFound), ok("v1")]);
    let (memo, clock) = memoized(source.clone());

    assert_eq!(memo.fetch("alice").await, Err(FetchError::NotFound));
    assert!(memo.cache().is_empty());

    clock.advance(Duration::seconds(1));
    assert_eq!(memo.fetch("alice").await.unwrap(), "v1");
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_upstream_failure_is_not_cached() {
    let source = ScriptedSource::new(
        "github",
        vec![Err(FetchError::Upstream("rate limited".to_string())), ok("v1")],
    );
    let (memo, _clock) = memoized(source.clone());

    assert_eq!(
        memo.fetch("alice").await,
        Err(FetchError::Upstream("rate limited".to_string()))
    );
    assert_eq!(memo.fetch("alice").await.unwrap(), "v1");
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_failed_refresh_keeps_stale_entry_but_refetches_next_time() {
    let source = ScriptedSource::new(
        "github",
        vec![ok("v1"), Err(FetchError::Upstream("down".to_string())), ok("v3")],
    );
    let (memo, clock) = memoized(source.clone());

    memo.fetch("alice").await.unwrap();
    clock.advance(Duration::seconds(TTL_SECS));

    assert!(memo.fetch("alice").await.is_err());
    assert_eq!(memo.cache().peek("github:alice").unwrap().data, "v1");

    assert_eq!(memo.fetch("alice").await.unwrap(), "v3");
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn test_key_isolation() {
    let source = ScriptedSource::new("github", vec![ok("a1"), ok("b1"), ok("a2")]);
    let (memo, clock) = memoized(source.clone());

    memo.fetch("alice").await.unwrap();
    clock.advance(Duration::seconds(TTL_SECS / 2));
    memo.fetch("bob").await.unwrap();

    // alice is now past her TTL, bob is not
    clock.advance(Duration::seconds(TTL_SECS / 2));
    assert_eq!(memo.fetch("alice").await.unwrap(), "a2");
    assert_eq!(memo.fetch("bob").await.unwrap(), "b1");
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn test_ttl_boundary_is_expired() {
    let source = ScriptedSource::new("github", vec![ok("v1"), ok("v2")]);
    let (memo, clock) = memoized(source.clone());

    memo.fetch("alice").await.unwrap();
    clock.advance(Duration::seconds(TTL_SECS));

    assert_eq!(memo.fetch("alice").await.unwrap(), "v2");
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_namespaces_produce_distinct_keys() {
    let clock = Arc::new(ManualClock::default());
    let github = ScriptedSource::new("github", vec![ok("gh")]);
    let leetcode = ScriptedSource::new("leetcode", vec![ok("lc")]);
    let github_memo = MemoizedSource::new(
        github.clone(),
        MemoCache::with_clock(Duration::seconds(TTL_SECS), clock.clone()),
    );
    let leetcode_memo = MemoizedSource::new(
        leetcode.clone(),
        MemoCache::with_clock(Duration::seconds(TTL_SECS), clock),
    );

    assert_eq!(github_memo.fetch("neo").await.unwrap(), "gh");
    assert_eq!(leetcode_memo.fetch("neo").await.unwrap(), "lc");
    assert_eq!(github_memo.cache_key("neo"), "github:neo");
    assert_eq!(leetcode_memo.cache_key("neo"), "leetcode:neo");
    assert_eq!(github_memo.cache().peek("github:neo").unwrap().data, "gh");
    assert!(github_memo.cache().peek("leetcode:neo").is_none());
    assert_eq!(leetcode_memo.cache().peek("leetcode:neo").unwrap().data, "lc");
}

#[tokio::test]
async fn test_concurrent_misses_both_fetch_and_last_write_wins() {
    let source = ScriptedSource::gated(2, vec![ok("first"), ok("second")]);
    let (memo, _clock) = memoized(source.clone());

    let (a, b) = tokio::join!(memo.fetch("alice"), memo.fetch("alice"));

    assert_eq!(source.calls(), 2);
    let mut results = vec![a.unwrap(), b.unwrap()];
    results.sort();
    assert_eq!(results, ["first", "second"]);

    // "second" was taken last, and the store follows the take with no await between
    assert_eq!(memo.cache().len(), 1);
    assert_eq!(memo.cache().peek("github:alice").unwrap().data, "second");
}
