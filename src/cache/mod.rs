//! In-memory memoization for outbound profile lookups
//!
//! This module provides a TTL cache that sits between request handlers and the
//! upstream profile APIs. Entries live for the lifetime of the process, expire
//! lazily on read, and are only ever written after a successful fetch. Failures
//! pass straight through to the caller and are never cached.

mod clock;
mod manager;
mod source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{CachedData, MemoCache, DEFAULT_TTL_MS};
pub use source::{FetchError, MemoizedSource, ProfileSource};
