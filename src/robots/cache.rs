//! Robots.txt caching implementation
//!
//! Per-origin cache of parsed rule sets with a 24-hour expiry, the interval
//! major crawlers use between robots.txt refreshes. The clock is injectable
//! so tests can exercise expiry without waiting a day.

use crate::robots::RuleSet;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// How long a cached robots.txt stays fresh
const ROBOTS_TTL_HOURS: i64 = 24;

/// Source of the current time, injectable for tests
pub type Clock = fn() -> DateTime<Utc>;

/// A cached rule set together with its fetch timestamp
#[derive(Debug, Clone)]
struct CachedRules {
    rules: RuleSet,
    fetched_at: DateTime<Utc>,
}

/// Cache of parsed robots.txt rule sets, keyed by origin
///
/// Lives for the process lifetime; crawl runs share it. Reads are the
/// common case, so entries are cloned out rather than borrowed. A stale
/// entry behaves exactly like a missing one: callers re-fetch and insert.
#[derive(Debug)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, CachedRules>>,
    clock: Clock,
}

impl RobotsCache {
    /// Creates a cache using the real system clock
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Creates a cache with an injected clock
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the cached rules for an origin, if still fresh
    pub fn get(&self, origin: &str) -> Option<RuleSet> {
        let entries = self.entries.lock().expect("robots cache lock poisoned");
        let entry = entries.get(origin)?;

        let age = (self.clock)() - entry.fetched_at;
        if age > Duration::hours(ROBOTS_TTL_HOURS) {
            return None;
        }

        Some(entry.rules.clone())
    }

    /// Stores freshly fetched rules for an origin
    pub fn insert(&self, origin: &str, rules: RuleSet) {
        let mut entries = self.entries.lock().expect("robots cache lock poisoned");
        entries.insert(
            origin.to_string(),
            CachedRules {
                rules,
                fetched_at: (self.clock)(),
            },
        );
    }

    /// Number of origins currently cached (fresh or stale)
    pub fn len(&self) -> usize {
        self.entries.lock().expect("robots cache lock poisoned").len()
    }

    /// Returns true when no origins are cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rewrites an entry's fetch timestamp, for expiry tests
    #[cfg(test)]
    fn force_fetched_at(&self, origin: &str, at: DateTime<Utc>) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(origin) {
            entry.fetched_at = at;
        }
    }
}

impl Default for RobotsCache {
    fn default() -> Self {
        Self::new()
    }
}
