//! Bounded in-memory cache for style reports.
//!
//! Keyed on `(language, code)`. Entries are evicted oldest-first once the
//! capacity is reached, and optionally expire after a TTL. A poisoned lock
//! degrades to a cache miss rather than an error.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::language::Language;

use super::style::StyleReport;

pub const DEFAULT_CAPACITY: usize = 1024;

type CacheKey = (Language, String);

struct CacheEntry {
    report: Arc<StyleReport>,
    inserted_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Insertion order, oldest first.
    order: VecDeque<CacheKey>,
}

/// Hit/miss counters plus the current entry count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct StyleCache {
    state: RwLock<CacheState>,
    capacity: usize,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl StyleCache {
    /// Create a cache holding at most `capacity` reports (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self::with_ttl(capacity, None)
    }

    pub fn with_ttl(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            capacity: capacity.max(1),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        match self.ttl {
            Some(ttl) => entry.inserted_at.elapsed() < ttl,
            None => true,
        }
    }

    /// Look up a report, counting the hit or miss.
    pub fn get(&self, language: &Language, code: &str) -> Option<Arc<StyleReport>> {
        let found = self.state.read().ok().and_then(|state| {
            state
                .entries
                .get(&(language.clone(), code.to_string()))
                .filter(|entry| self.is_fresh(entry))
                .map(|entry| Arc::clone(&entry.report))
        });

        match found {
            Some(report) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(report)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a report. The last write for a key wins.
    pub fn insert(&self, language: &Language, code: &str, report: StyleReport) -> Arc<StyleReport> {
        let report = Arc::new(report);
        let Ok(mut state) = self.state.write() else {
            return report;
        };
        let key = (language.clone(), code.to_string());

        if let Some(ttl) = self.ttl {
            state.entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
            let CacheState { entries, order } = &mut *state;
            order.retain(|k| entries.contains_key(k));
        }

        if state.entries.contains_key(&key) {
            state.order.retain(|k| k != &key);
        } else {
            while state.entries.len() >= self.capacity {
                let Some(oldest) = state.order.pop_front() else {
                    break;
                };
                state.entries.remove(&oldest);
            }
        }

        state.order.push_back(key.clone());
        state.entries.insert(
            key,
            CacheEntry {
                report: Arc::clone(&report),
                inserted_at: Instant::now(),
            },
        );

        report
    }

    /// Return the cached report or compute and store it.
    ///
    /// Concurrent misses on the same key may both compute; the results are
    /// identical so either write is fine.
    pub fn get_or_insert_with<F>(&self, language: &Language, code: &str, compute: F) -> Arc<StyleReport>
    where
        F: FnOnce() -> StyleReport,
    {
        if let Some(report) = self.get(language, code) {
            return report;
        }
        tracing::trace!(language = %language, bytes = code.len(), "style cache miss");
        self.insert(language, code, compute())
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.state.write() {
            state.entries.clear();
            state.order.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for StyleCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(score: i32) -> StyleReport {
        StyleReport {
            suggestions: vec![],
            warnings: vec![],
            optimizations: vec![],
            score,
            remark: "Good job!".to_string(),
        }
    }

    #[test]
    fn test_get_and_insert() {
        let cache = StyleCache::new(4);
        assert!(cache.get(&Language::Python, "a").is_none());
        cache.insert(&Language::Python, "a", report(100));
        assert_eq!(cache.get(&Language::Python, "a").map(|r| r.score), Some(100));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_oldest_entry_evicted_at_capacity() {
        let cache = StyleCache::new(2);
        cache.insert(&Language::Python, "a", report(1));
        cache.insert(&Language::Python, "b", report(2));
        cache.insert(&Language::Python, "c", report(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&Language::Python, "a").is_none());
        assert!(cache.get(&Language::Python, "b").is_some());
        assert!(cache.get(&Language::Python, "c").is_some());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = StyleCache::new(2);
        cache.insert(&Language::Python, "a", report(1));
        cache.insert(&Language::Python, "a", report(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&Language::Python, "a").map(|r| r.score), Some(2));
    }

    #[test]
    fn test_zero_capacity_still_holds_one() {
        let cache = StyleCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(&Language::Python, "a", report(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entries_are_misses() {
        let cache = StyleCache::with_ttl(4, Some(Duration::ZERO));
        cache.insert(&Language::Python, "a", report(1));
        assert!(cache.get(&Language::Python, "a").is_none());
    }

    #[test]
    fn test_get_or_insert_computes_once() {
        let cache = StyleCache::default();
        let mut calls = 0;
        cache.get_or_insert_with(&Language::Python, "x", || {
            calls += 1;
            report(1)
        });
        cache.get_or_insert_with(&Language::Python, "x", || {
            calls += 1;
            report(1)
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_clear() {
        let cache = StyleCache::new(4);
        cache.insert(&Language::JavaScript, "a", report(1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
