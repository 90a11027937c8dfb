//! Videoroll - a bounded-concurrency video feed aggregator
//!
//! Fetches RSSHub-style JSON video feeds in parallel, merges every channel's
//! uploads into a single newest-first list, and serves it over HTTP. A pass
//! survives individual source failures and reports how degraded it was.

pub mod aggregator;
pub mod config;
pub mod feed;
pub mod routes;
pub mod worker_pool;
