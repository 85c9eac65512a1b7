//! PushClash backend library
//!
//! Fetches GitHub and LeetCode profiles through a TTL memoization cache, turns them
//! into prompts and returns generated roast and battle text over HTTP. The modules
//! are public so integration tests can drive the router and the cache directly.

pub mod ai;
pub mod cache;
pub mod cli;
pub mod data;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;
