//! A cache of query results keyed by hierarchical query keys.

use std::collections::HashMap;

use serde_json::Value;

/// A hierarchical cache key, e.g. `["overview", "stats", "balance",
/// "2024-01-01", "2024-01-31"]`.
///
/// Keys form a hierarchy by prefix: invalidating `["overview"]` covers every
/// key that starts with that segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Build a key from its segments, most general first.
    pub fn new<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        QueryKey(segments.into_iter().map(Into::into).collect())
    }

    fn starts_with(&self, prefix: &[&str]) -> bool {
        prefix.len() <= self.0.len()
            && prefix
                .iter()
                .zip(&self.0)
                .all(|(prefix_segment, segment)| prefix_segment == segment)
    }
}

/// Cached query results, stored as raw JSON so one cache serves every
/// response type.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Value>,
}

impl QueryCache {
    /// Get the cached result for `key`, if any.
    pub fn get(&self, key: &QueryKey) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Cache `value` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: QueryKey, value: Value) {
        self.entries.insert(key, value);
    }

    /// Drop every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&mut self, prefix: &[&str]) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
    }

    /// The number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod query_cache_tests {
    use serde_json::json;

    use super::{QueryCache, QueryKey};

    #[test]
    fn get_returns_inserted_value() {
        let mut cache = QueryCache::default();
        let key = QueryKey::new(["overview", "stats", "balance"]);

        cache.insert(key.clone(), json!({ "income": 1.0 }));

        assert_eq!(cache.get(&key), Some(&json!({ "income": 1.0 })));
    }

    #[test]
    fn invalidate_prefix_drops_matching_entries_only() {
        let mut cache = QueryCache::default();
        cache.insert(
            QueryKey::new(["overview", "stats", "balance"]),
            json!(null),
        );
        cache.insert(QueryKey::new(["overview", "history"]), json!(null));
        cache.insert(QueryKey::new(["categories"]), json!(null));

        cache.invalidate_prefix(&["overview"]);

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&QueryKey::new(["categories"])).is_some());
    }

    #[test]
    fn invalidation_does_not_match_partial_segments() {
        let mut cache = QueryCache::default();
        cache.insert(QueryKey::new(["transactions", "2024"]), json!(null));

        cache.invalidate_prefix(&["transaction"]);

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn longer_prefix_than_key_does_not_match() {
        let mut cache = QueryCache::default();
        cache.insert(QueryKey::new(["overview"]), json!(null));

        cache.invalidate_prefix(&["overview", "stats"]);

        assert_eq!(cache.len(), 1);
    }
}
