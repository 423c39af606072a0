use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Time source for [`TtlCache`]. Injectable so tests can drive expiry
/// without sleeping.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: u64,
    last_accessed: u64,
}

/// In-memory expiring memoization store with approximate LRU pruning.
///
/// Keys compare structurally: they are serialized to a canonical JSON
/// string, so composite tuple keys hash consistently across call
/// sites. `get` performs lazy expiry; `set` prunes the oldest-accessed
/// 20% of entries once the store exceeds its capacity. Concurrent
/// writers may race on prune vs insert; the cache is advisory, not a
/// synchronization primitive.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    _key: PhantomData<fn(K)>,
}

impl<K: Serialize, V: Clone> TtlCache<K, V> {
    pub fn new(max_entries: usize) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        TtlCache {
            entries: Mutex::new(HashMap::new()),
            max_entries,
            clock,
            _key: PhantomData,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let k = Self::encode_key(key);
        let now = self.clock.now_ms();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get_mut(&k) {
            Some(entry) if now > entry.expires_at => {
                entries.remove(&k);
                None
            }
            Some(entry) => {
                entry.last_accessed = now;
                Some(entry.value.clone())
            }
            None => None,
        }
    }

    pub fn set(&self, key: &K, value: V, ttl: Duration) {
        let k = Self::encode_key(key);
        let now = self.clock.now_ms();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() > self.max_entries {
            Self::prune(&mut entries);
        }
        entries.insert(
            k,
            Entry {
                value,
                expires_at: now + ttl.as_millis() as u64,
                last_accessed: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops the oldest-accessed 20% of entries.
    fn prune(entries: &mut HashMap<String, Entry<V>>) {
        let mut by_age: Vec<(String, u64)> = entries
            .iter()
            .map(|(k, e)| (k.clone(), e.last_accessed))
            .collect();
        by_age.sort_by_key(|(_, last)| *last);
        let remove = by_age.len().div_ceil(5);
        for (k, _) in by_age.into_iter().take(remove) {
            entries.remove(&k);
        }
    }

    fn encode_key(key: &K) -> String {
        // Serialization of a plain tuple/struct key is infallible.
        serde_json::to_string(key).unwrap_or_default()
    }
}
