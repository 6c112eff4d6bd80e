//! Response cache collaborator and cache-key derivation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

/// Glue used between cache key parts.
pub const DEFAULT_GLUE: &str = "-";

/// Key-value store used by callers who memoize method responses.
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store an entry, optionally expiring after `ttl`.
    fn put(&self, key: &str, value: Value, ttl: Option<Duration>);

    /// Remove an entry; returns true if one was present.
    fn forget(&self, key: &str) -> bool;
}

/// In-process cache store.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Value, Option<Instant>)>>,
}

impl MemoryCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (Value, Option<Instant>)>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some((_, Some(expires))) if *expires <= Instant::now() => {
                entries.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }

    fn put(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let expires = ttl.map(|ttl| Instant::now() + ttl);
        self.lock().insert(key.to_string(), (value, expires));
    }

    fn forget(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }
}

/// Build a cache key: `name[<glue>suffix...]`.
///
/// Path separators (`::`, `\`, `.`) and spaces in the result are replaced by
/// the glue, so `Users.Get` with suffix `["7"]` becomes `Users-Get-7`.
pub fn compose_cache_key<S: AsRef<str>>(name: &str, suffix: &[S], glue: &str) -> String {
    let mut key = name.to_string();
    for part in suffix {
        key.push_str(glue);
        key.push_str(part.as_ref());
    }
    key.replace("::", glue)
        .replace(['\\', '.', ' '], glue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compose_cache_key() {
        assert_eq!(compose_cache_key("Users.Get", &["7"], DEFAULT_GLUE), "Users-Get-7");
        assert_eq!(
            compose_cache_key::<&str>("Users\\Get", &[], DEFAULT_GLUE),
            "Users-Get"
        );
        assert_eq!(
            compose_cache_key("app::rpc::Users", &["page 2", "x"], DEFAULT_GLUE),
            "app-rpc-Users-page-2-x"
        );
        assert_eq!(compose_cache_key("Users.Get", &["7"], "_"), "Users_Get_7");
    }

    #[test]
    fn test_memory_cache_put_get_forget() {
        let cache = MemoryCache::new();
        cache.put("k", json!({"a": 1}), None);

        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
        assert!(cache.forget("k"));
        assert!(!cache.forget("k"));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_memory_cache_expiry() {
        let cache = MemoryCache::new();
        cache.put("k", json!(1), Some(Duration::ZERO));
        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
    }
}
