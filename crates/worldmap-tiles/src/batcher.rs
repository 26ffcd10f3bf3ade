use indexmap::IndexMap;
use tracing::warn;
use worldmap_proto::ChunkKey;

use crate::batch::{PendingUpdate, UpdateKind};

/// High-water mark: once the pending set reaches this many distinct keys,
/// further `enqueue` calls still coalesce (a key already pending is replaced
/// in place, not appended) but new keys are logged as backpressure per
/// §4.4, since the fan-out loop is falling behind the ingest rate.
pub const BACKPRESSURE_HIGH_WATER: usize = 10_000;

/// FIFO queue of per-key pending updates with dedup-by-replace semantics.
///
/// Enqueuing a key already pending replaces its payload and moves it to the
/// tail, re-anchoring its delivery order to the most recent enqueue (§4.4).
/// Draining removes entries in insertion order.
#[derive(Default)]
pub struct UpdateBatcher {
    pending: IndexMap<ChunkKey, PendingUpdate>,
}

impl UpdateBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `kind` for `key`. A key already pending is re-anchored to the
    /// tail of the queue (`shift_remove` then re-`insert`) with its
    /// `enqueue_time` refreshed to `now`, per §4.4.
    pub fn enqueue(&mut self, key: ChunkKey, kind: UpdateKind, now: u64) {
        if self.pending.len() >= BACKPRESSURE_HIGH_WATER && !self.pending.contains_key(&key) {
            warn!(
                pending = self.pending.len(),
                "update batcher over high-water mark, still accepting new key"
            );
        }

        self.pending.shift_remove(&key);
        self.pending.insert(key, PendingUpdate { key, kind, enqueue_time: now });
    }

    /// Removes and returns up to `max` pending updates, oldest first.
    pub fn drain(&mut self, max: usize) -> Vec<PendingUpdate> {
        let n = max.min(self.pending.len());
        self.pending.drain(..n).map(|(_, update)| update).collect()
    }

    /// Removes and returns every pending update.
    pub fn drain_all(&mut self) -> Vec<PendingUpdate> {
        self.pending.drain(..).map(|(_, update)| update).collect()
    }

    pub fn peek_all(&self) -> impl Iterator<Item = &PendingUpdate> {
        self.pending.values()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has(&self, key: ChunkKey) -> bool {
        self.pending.contains_key(&key)
    }

    pub fn remove(&mut self, key: ChunkKey) -> Option<PendingUpdate> {
        self.pending.shift_remove(&key)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use worldmap_proto::Dimension;

    use super::*;

    fn key(cx: i32) -> ChunkKey {
        ChunkKey::new(cx, 0, Dimension::Overworld)
    }

    #[test]
    fn drain_preserves_fifo_order() {
        let mut batcher = UpdateBatcher::new();
        batcher.enqueue(key(0), UpdateKind::Empty, 1);
        batcher.enqueue(key(1), UpdateKind::Empty, 2);
        batcher.enqueue(key(2), UpdateKind::Empty, 3);

        let drained = batcher.drain(10);
        assert_eq!(drained.iter().map(|u| u.key).collect::<Vec<_>>(), vec![key(0), key(1), key(2)]);
    }

    #[test]
    fn re_enqueue_moves_key_to_tail_and_refreshes_enqueue_time() {
        let mut batcher = UpdateBatcher::new();
        batcher.enqueue(key(0), UpdateKind::Empty, 1);
        batcher.enqueue(key(1), UpdateKind::Empty, 2);
        batcher.enqueue(key(0), UpdateKind::Delta(crate::tile::Tile {
            colors: [[worldmap_proto::BLACK; 16]; 16],
            heights: [[0; 16]; 16],
            ores: vec![],
            timestamp: 9,
        }), 3);

        assert_eq!(batcher.pending_count(), 2);
        let drained = batcher.drain(10);
        assert_eq!(drained[0].key, key(1));
        assert_eq!(drained[1].key, key(0));
        assert!(matches!(drained[1].kind, UpdateKind::Delta(_)));
        assert_eq!(drained[1].enqueue_time, 3);
    }

    #[test]
    fn drain_respects_max() {
        let mut batcher = UpdateBatcher::new();
        batcher.enqueue(key(0), UpdateKind::Empty, 1);
        batcher.enqueue(key(1), UpdateKind::Empty, 2);

        let first = batcher.drain(1);
        assert_eq!(first.len(), 1);
        assert_eq!(batcher.pending_count(), 1);
    }

    #[test]
    fn remove_drops_a_specific_key() {
        let mut batcher = UpdateBatcher::new();
        batcher.enqueue(key(0), UpdateKind::Empty, 1);
        assert!(batcher.remove(key(0)).is_some());
        assert!(!batcher.has(key(0)));
    }
}
