use std::collections::HashMap;
use std::sync::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};

pub const CHARITIES_KEY: &str = "charities";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const INSTANCE_URL_KEY: &str = "instance_url";

#[derive(Debug)]
struct Entry {
    value: serde_json::Value,
    expires_at: OffsetDateTime,
}

// Process-local key-value cache with a fixed time-to-live per entry.
// Not linearizable: two callers racing on a miss may both refetch.
#[derive(Debug)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to acquire cache lock: {}", e);
                return None;
            }
        };

        let expired = match entries.get(key) {
            Some(entry) => OffsetDateTime::now_utc() >= entry.expires_at,
            None => return None,
        };

        if expired {
            debug!("Cache entry '{}' expired", key);
            entries.remove(key);
            return None;
        }

        entries.get(key).and_then(|entry| {
            serde_json::from_value(entry.value.clone())
                .map_err(|e| error!("Failed to deserialize cache entry '{}': {}", key, e))
                .ok()
        })
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                error!("Failed to serialize cache entry '{}': {}", key, e);
                return;
            }
        };

        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value,
                        expires_at: OffsetDateTime::now_utc() + self.ttl,
                    },
                );
            }
            Err(e) => error!("Failed to acquire cache lock: {}", e),
        }
    }

    // Reports whether an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => entries.remove(key).is_some(),
            Err(e) => {
                error!("Failed to acquire cache lock: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_roundtrips() {
        let cache = TtlCache::new(Duration::hours(1));
        cache.set("greeting", &"hello".to_string());
        assert_eq!(cache.get::<String>("greeting"), Some("hello".to_string()));
    }

    #[test]
    fn missing_key_is_a_miss() {
        let cache = TtlCache::new(Duration::hours(1));
        assert_eq!(cache.get::<String>("nope"), None);
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = TtlCache::new(Duration::seconds(-1));
        cache.set("stale", &42u32);
        assert_eq!(cache.get::<u32>("stale"), None);
    }

    #[test]
    fn delete_reports_presence() {
        let cache = TtlCache::new(Duration::hours(1));
        cache.set("key", &1u32);
        assert!(cache.delete("key"));
        assert!(!cache.delete("key"));
        assert_eq!(cache.get::<u32>("key"), None);
    }

    #[test]
    fn entries_are_independent() {
        let cache = TtlCache::new(Duration::hours(1));
        cache.set("a", &1u32);
        cache.set("b", &2u32);
        cache.delete("a");
        assert_eq!(cache.get::<u32>("b"), Some(2));
    }

    #[test]
    fn structured_values_roundtrip() {
        let cache = TtlCache::new(Duration::hours(1));
        let list = vec!["x".to_string(), "y".to_string()];
        cache.set("list", &list);
        assert_eq!(cache.get::<Vec<String>>("list"), Some(list));
    }
}
