//! Bounded LRU cache of case id → resolution.
//!
//! Negative entries (`Resolution::Unresolved`) expire after a configurable
//! TTL so a data store that was briefly unreachable gets probed again.
//! Positive entries only leave by eviction.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::resolver::Resolution;

#[derive(Debug)]
struct Slot {
    value: Resolution,
    stored_at: Instant,
    last_access: u64,
}

#[derive(Debug)]
struct Lru {
    map: HashMap<String, Slot>,
    counter: u64,
}

/// Thread-safe LRU cache shared by all in-flight requests.
#[derive(Debug)]
pub struct LookupCache {
    inner: Mutex<Lru>,
    capacity: usize,
    negative_ttl: Option<Duration>,
}

impl LookupCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// `negative_ttl` of `None` keeps unresolved entries until evicted.
    pub fn new(capacity: usize, negative_ttl: Option<Duration>) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Lru {
                map: HashMap::with_capacity(capacity),
                counter: 0,
            }),
            capacity,
            negative_ttl,
        }
    }

    /// Look up a case id, refreshing its recency.
    pub fn get(&self, key: &str) -> Option<Resolution> {
        let mut guard = self.inner.lock();
        let lru = &mut *guard;
        lru.counter += 1;
        let now = lru.counter;

        let slot = lru.map.get_mut(key)?;
        if self.is_expired(slot) {
            lru.map.remove(key);
            return None;
        }
        slot.last_access = now;
        Some(slot.value.clone())
    }

    /// Store a resolution, evicting the least recently used entry when full.
    pub fn put(&self, key: impl Into<String>, value: Resolution) {
        let key = key.into();
        let mut guard = self.inner.lock();
        let lru = &mut *guard;
        lru.counter += 1;
        let now = lru.counter;

        if lru.map.len() >= self.capacity && !lru.map.contains_key(&key) {
            let oldest = lru
                .map
                .iter()
                .min_by_key(|(_, slot)| slot.last_access)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tracing::trace!(case_id = %oldest, "Evicting lookup cache entry");
                lru.map.remove(&oldest);
            }
        }

        lru.map.insert(
            key,
            Slot {
                value,
                stored_at: Instant::now(),
                last_access: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_expired(&self, slot: &Slot) -> bool {
        match (&slot.value, self.negative_ttl) {
            (Resolution::Unresolved, Some(ttl)) => slot.stored_at.elapsed() >= ttl,
            _ => false,
        }
    }
}
