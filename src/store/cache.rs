//! Memoization of loaded sources, keyed by source identity.
//!
//! An entry is served while it is fresh: loaded under the current cache
//! version and, when a TTL is set, younger than the TTL according to the
//! injected clock.

use super::SourceId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Time source for cache expiry and request signing.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    secs: AtomicU64,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        let secs = start
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            secs: AtomicU64::new(secs),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.secs.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.secs.load(Ordering::SeqCst))
    }
}

struct Entry<T> {
    value: Arc<T>,
    loaded_at: SystemTime,
    version: u64,
}

pub struct TableCache<T> {
    entries: HashMap<SourceId, Entry<T>>,
    clock: Arc<dyn Clock>,
    ttl: Option<Duration>,
    version: u64,
}

impl<T> TableCache<T> {
    pub fn new(clock: Arc<dyn Clock>, ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
            ttl,
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn is_fresh(&self, entry: &Entry<T>) -> bool {
        if entry.version != self.version {
            return false;
        }
        match self.ttl {
            Some(ttl) => self
                .clock
                .now()
                .duration_since(entry.loaded_at)
                .map(|age| age < ttl)
                .unwrap_or(true),
            None => true,
        }
    }

    /// Fresh cached value, if any.
    pub fn get(&self, id: &SourceId) -> Option<Arc<T>> {
        let hit = self
            .entries
            .get(id)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| Arc::clone(&entry.value));
        log::debug!("Cache {} for {}", if hit.is_some() { "hit" } else { "miss" }, id);
        hit
    }

    pub fn insert(&mut self, id: SourceId, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entries.insert(
            id,
            Entry {
                value: Arc::clone(&value),
                loaded_at: self.clock.now(),
                version: self.version,
            },
        );
        value
    }

    /// Mark every entry stale; the next access reloads.
    pub fn invalidate_all(&mut self) {
        self.version += 1;
        self.entries.clear();
    }
}
