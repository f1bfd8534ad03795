//! Transposition cache
//!
//! A concurrent map from canonical position keys to previously computed
//! scores, shared by every search worker of a game session.
//!
//! Concurrency contract: workers read and write without any lock beyond
//! the map's own shard locks. Two workers may race on the same key; the
//! last write wins. A lost race costs a recomputation or replaces a score
//! with another score computed for the same key, it never corrupts an
//! entry or a move.
//!
//! Entries are never evicted. The table grows for the lifetime of a game
//! session and is emptied with [`TranspositionCache::clear`] on a new game.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use super::search::Score;

/// What an entry is keyed by, and which results get stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// Key is (position, remaining depth); only exact scores are stored.
    #[default]
    DepthTagged,
    /// Key is the position alone; every completed node is stored, so a
    /// shallow score may answer a deeper query.
    PositionOnly,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey<K> {
    position: K,
    depth: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
}

pub struct TranspositionCache<K> {
    entries: DashMap<CacheKey<K>, Score>,
    mode: CacheMode,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

impl<K: Clone + Eq + Hash> TranspositionCache<K> {
    pub fn new(mode: CacheMode) -> Self {
        TranspositionCache {
            entries: DashMap::new(),
            mode,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    #[inline]
    fn key(&self, position: K, depth: u32) -> CacheKey<K> {
        let depth = match self.mode {
            CacheMode::DepthTagged => Some(depth),
            CacheMode::PositionOnly => None,
        };
        CacheKey { position, depth }
    }

    /// Look up a score for `position` searched to `depth`.
    pub fn get(&self, position: &K, depth: u32) -> Option<Score> {
        let found = self
            .entries
            .get(&self.key(position.clone(), depth))
            .map(|entry| *entry.value());
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store a score; overwrites whatever the key held.
    pub fn put(&self, position: K, depth: u32, score: Score) {
        self.entries.insert(self.key(position, depth), score);
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Only call between game sessions, never while a
    /// search holds the cache.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

impl<K: Clone + Eq + Hash> Default for TranspositionCache<K> {
    fn default() -> Self {
        Self::new(CacheMode::default())
    }
}
