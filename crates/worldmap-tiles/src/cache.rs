use std::num::NonZeroUsize;

use lru::LruCache;
use thiserror::Error;
use tracing::debug;
use worldmap_proto::ChunkKey;

use crate::tile::Tile;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache capacity must be at least 1")]
    ZeroCapacity,
}

#[derive(Clone, Debug)]
struct CacheEntry {
    tile: Tile,
    last_access: u64,
    access_count: u64,
    /// Set when the underlying column changed since this tile was produced
    /// but the entry hasn't been overwritten yet -- a stale read still
    /// returns data (better than nothing for a slow-moving viewer) but is
    /// tallied separately in [`CacheStats`].
    stale: bool,
}

/// Running counters for cache behavior, exposed for diagnostics.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub stale_reads: u64,
    pub len: usize,
}

/// Bounded LRU cache of the most recently produced [`Tile`] per chunk key.
///
/// Capacity is fixed at construction, matching the `lru::LruCache`-backed
/// `RegionFolder` this is grounded on: eviction happens implicitly on
/// insertion past capacity rather than through an explicit GC pass.
pub struct TileCache {
    entries: LruCache<ChunkKey, CacheEntry>,
    stats: CacheStats,
}

impl TileCache {
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;
        Ok(Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        })
    }

    /// Returns the cached tile for `key`, promoting it to most-recently-used.
    ///
    /// Counts as a hit even if the entry is [`Self::is_stale`]; callers that
    /// care about staleness should check that separately before relying on
    /// the content.
    pub fn get(&mut self, key: ChunkKey, now: u64) -> Option<&Tile> {
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.last_access = now;
                entry.access_count += 1;
                self.stats.hits += 1;
                if entry.stale {
                    self.stats.stale_reads += 1;
                }
                Some(&entry.tile)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn is_stale(&self, key: ChunkKey) -> bool {
        self.entries.peek(&key).is_some_and(|e| e.stale)
    }

    /// Inserts or replaces the tile for `key`, clearing any stale flag.
    ///
    /// If this insertion evicts the least-recently-used entry, the eviction
    /// counter is bumped; the caller isn't told which key was evicted since
    /// nothing downstream needs to react to it (evicted viewers simply
    /// re-request on their next visible-range change).
    pub fn put(&mut self, key: ChunkKey, tile: Tile, now: u64) {
        let was_full = self.entries.len() == self.entries.cap().get() && !self.entries.contains(&key);
        self.entries.put(
            key,
            CacheEntry { tile, last_access: now, access_count: 0, stale: false },
        );
        if was_full {
            self.stats.evictions += 1;
        }
        self.stats.len = self.entries.len();
    }

    /// Marks `key`'s entry stale without removing it, per §4.3's
    /// stale-vs-removed distinction. No-op if `key` isn't cached.
    pub fn invalidate(&mut self, key: ChunkKey) {
        if let Some(entry) = self.entries.peek_mut(&key) {
            entry.stale = true;
            debug!(%key, "tile marked stale");
        }
    }

    /// Hard-removes `key`'s entry, per the empty-tile Open Question
    /// resolution (§9): an empty tile is removed rather than cached as a
    /// void placeholder.
    pub fn remove(&mut self, key: ChunkKey) {
        if self.entries.pop(&key).is_some() {
            self.stats.len = self.entries.len();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.len = 0;
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        self.entries.contains(&key)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats { len: self.entries.len(), ..self.stats }
    }

    /// Iterates every cached key and tile without affecting recency, used
    /// for seeding a newly connected viewer's initial snapshot (§4.6).
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkKey, &Tile)> {
        self.entries.iter().map(|(k, e)| (k, &e.tile))
    }
}
