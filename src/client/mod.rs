//! A typed client for the pocketbook API.
//!
//! Reads are cached per query key, and mutations invalidate the affected key
//! prefixes so that the next read refetches, mirroring how the web UI
//! coordinates its data fetching.

mod api;
mod query_cache;

pub use api::{ApiClient, ClientError};
pub use query_cache::{QueryCache, QueryKey};
