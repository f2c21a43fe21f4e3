//! Process-wide memo of item identifiers seen while parsing.
//!
//! The memo never changes what a parse returns; turning it off only saves
//! the memory of remembering every identifier. Its contents are the hook
//! for persisting "already seen" state across restarts
//! ([`restore_known_identifiers`] / [`known_identifiers`]).

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
pub struct IdentifierCache {
    enabled: AtomicBool,
    known: RwLock<HashSet<String>>,
}

impl Default for IdentifierCache {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierCache {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            known: RwLock::new(HashSet::new()),
        }
    }

    /// Shared instance used by [`Parser::new`](super::Parser::new).
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<IdentifierCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(IdentifierCache::new())).clone()
    }

    /// Enable or disable memoization. Returns the previous setting; the
    /// last writer wins.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::SeqCst)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Record `id` if memoization is on. Returns whether it was already known.
    pub fn observe(&self, id: &str) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if self.read().contains(id) {
            return true;
        }
        !self.write().insert(id.to_string())
    }

    /// Replace the memo with identifiers loaded from storage.
    pub fn restore(&self, ids: HashSet<String>) {
        *self.write() = ids;
    }

    pub fn known(&self) -> HashSet<String> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashSet<String>> {
        self.known.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<String>> {
        self.known.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Toggle memoization on the global cache. Returns the previous setting.
pub fn cache_parsed_item_ids(enabled: bool) -> bool {
    IdentifierCache::global().set_enabled(enabled)
}

/// Seed the global cache from external storage.
pub fn restore_known_identifiers(ids: HashSet<String>) {
    IdentifierCache::global().restore(ids);
}

/// Export the global cache for external storage.
pub fn known_identifiers() -> HashSet<String> {
    IdentifierCache::global().known()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_enabled_returns_previous() {
        let cache = IdentifierCache::new();
        assert!(cache.set_enabled(false));
        assert!(!cache.set_enabled(true));
        assert!(cache.is_enabled());
    }

    #[test]
    fn test_observe_records_when_enabled() {
        let cache = IdentifierCache::new();
        assert!(!cache.observe("a"));
        assert!(cache.observe("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_observe_is_noop_when_disabled() {
        let cache = IdentifierCache::new();
        cache.set_enabled(false);
        assert!(!cache.observe("a"));
        assert!(!cache.observe("a"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_restore_and_export() {
        let cache = IdentifierCache::new();
        cache.observe("old");
        cache.restore(["a".to_string(), "b".to_string()].into_iter().collect());

        let known = cache.known();
        assert_eq!(known.len(), 2);
        assert!(known.contains("a") && !known.contains("old"));
        assert!(cache.observe("b"));
    }

    #[test]
    fn test_global_hooks_share_one_cache() {
        restore_known_identifiers(["g-1".to_string()].into_iter().collect());
        let previous = cache_parsed_item_ids(true);

        assert!(IdentifierCache::global().observe("g-1"));
        assert!(known_identifiers().contains("g-1"));
        cache_parsed_item_ids(previous);
    }

    #[test]
    fn test_concurrent_toggle_and_observe() {
        let cache = Arc::new(IdentifierCache::new());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.set_enabled(i % 2 == 0);
                        cache.observe(&format!("{n}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 400);
    }
}
