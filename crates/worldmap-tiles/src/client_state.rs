use std::collections::{HashMap, HashSet};

use rustc_hash::FxHashMap;
use worldmap_proto::ChunkKey;

/// Per-viewer delivery bookkeeping: which keys the viewer has already been
/// sent a tile for (and when), and which keys are queued but unconfirmed.
///
/// `sent` and `pending` are disjoint by construction -- a key moves from
/// `pending` to `sent` only through [`ClientState::mark_sent`], and
/// [`ClientStateManager::add_pending`] refuses to queue a key that's
/// already in `sent` (the fan-out loop should invalidate first).
#[derive(Clone, Debug, Default)]
pub struct ClientState {
    pub client_id: u64,
    pub sent: HashMap<ChunkKey, u64>,
    pub pending: HashSet<ChunkKey>,
    pub last_batch_id: Option<u64>,
    pub connect_time: u64,
}

impl ClientState {
    fn new(client_id: u64, connect_time: u64) -> Self {
        Self { client_id, connect_time, ..Default::default() }
    }
}

/// Tracks [`ClientState`] for every connected viewer, keyed by the
/// transport-level connection id (distinct from the stable `client_id` a
/// viewer may carry across reconnects).
#[derive(Default)]
pub struct ClientStateManager {
    states: FxHashMap<u64, ClientState>,
    client_id_to_conn: HashMap<u64, u64>,
}

impl ClientStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conn_id: u64, client_id: u64, now: u64) {
        self.states.insert(conn_id, ClientState::new(client_id, now));
        self.client_id_to_conn.insert(client_id, conn_id);
    }

    pub fn remove(&mut self, conn_id: u64) -> Option<ClientState> {
        let state = self.states.remove(&conn_id)?;
        self.client_id_to_conn.remove(&state.client_id);
        Some(state)
    }

    pub fn get(&self, conn_id: u64) -> Option<&ClientState> {
        self.states.get(&conn_id)
    }

    /// Moves `key` from `pending` to `sent` for `conn_id`, stamping it with
    /// `ts`. Idempotent: `mark_sent(v,k,t); mark_sent(v,k,t)` has the same
    /// effect as a single call.
    pub fn mark_sent(&mut self, conn_id: u64, key: ChunkKey, ts: u64) {
        if let Some(state) = self.states.get_mut(&conn_id) {
            state.pending.remove(&key);
            state.sent.insert(key, ts);
        }
    }

    pub fn has_sent(&self, conn_id: u64, key: ChunkKey) -> bool {
        self.states.get(&conn_id).is_some_and(|s| s.sent.contains_key(&key))
    }

    /// Queues `key` as pending for `conn_id`. No-op if already sent --
    /// callers that need to resend a changed tile should invalidate the
    /// sent-set entry first via a fresh [`Self::mark_sent`] cycle rather
    /// than going through `pending` twice.
    pub fn add_pending(&mut self, conn_id: u64, key: ChunkKey) {
        if let Some(state) = self.states.get_mut(&conn_id) {
            if !state.sent.contains_key(&key) {
                state.pending.insert(key);
            }
        }
    }

    pub fn drain_pending(&mut self, conn_id: u64) -> Vec<ChunkKey> {
        match self.states.get_mut(&conn_id) {
            Some(state) => state.pending.drain().collect(),
            None => Vec::new(),
        }
    }

    pub fn set_last_batch(&mut self, conn_id: u64, batch_id: u64) {
        if let Some(state) = self.states.get_mut(&conn_id) {
            state.last_batch_id = Some(batch_id);
        }
    }

    pub fn sent_keys_for(&self, conn_id: u64) -> impl Iterator<Item = (ChunkKey, u64)> + '_ {
        self.states.get(&conn_id).into_iter().flat_map(|s| s.sent.iter().map(|(k, ts)| (*k, *ts)))
    }

    /// Resolves a stable `client_id` back to its current `conn_id`, for a
    /// viewer that reconnected under a new transport-level connection but
    /// should keep its prior `sent` set.
    pub fn reconnect(&mut self, client_id: u64) -> Option<u64> {
        self.client_id_to_conn.get(&client_id).copied()
    }

    /// Drops every `sent` entry older than `max_age` relative to `now`, for
    /// every connection -- bounding memory for viewers that connect once and
    /// never leave, without disturbing state for connections that are simply
    /// long-lived (`connect_time` says nothing about staleness of any given
    /// entry). Never removes a `ClientState` itself; only `remove` does that.
    pub fn gc_old_sent(&mut self, now: u64, max_age: u64) {
        for state in self.states.values_mut() {
            state.sent.retain(|_, ts| now.saturating_sub(*ts) < max_age);
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
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
    fn pending_and_sent_stay_disjoint() {
        let mut mgr = ClientStateManager::new();
        mgr.add(1, 100, 0);
        mgr.add_pending(1, key(0));
        mgr.mark_sent(1, key(0), 1);

        let state = mgr.get(1).unwrap();
        assert!(state.sent.contains_key(&key(0)));
        assert!(!state.pending.contains(&key(0)));
    }

    #[test]
    fn add_pending_refuses_already_sent_key() {
        let mut mgr = ClientStateManager::new();
        mgr.add(1, 100, 0);
        mgr.mark_sent(1, key(0), 1);
        mgr.add_pending(1, key(0));
        assert!(mgr.get(1).unwrap().pending.is_empty());
    }

    #[test]
    fn mark_sent_twice_is_idempotent() {
        let mut mgr = ClientStateManager::new();
        mgr.add(1, 100, 0);
        mgr.mark_sent(1, key(0), 5);
        mgr.mark_sent(1, key(0), 5);
        assert_eq!(mgr.get(1).unwrap().sent.get(&key(0)), Some(&5));
        assert_eq!(mgr.get(1).unwrap().sent.len(), 1);
    }

    #[test]
    fn remove_clears_reverse_index() {
        let mut mgr = ClientStateManager::new();
        mgr.add(1, 100, 0);
        mgr.remove(1);
        assert!(mgr.reconnect(100).is_none());
    }

    #[test]
    fn reconnect_resolves_client_id_to_conn_id() {
        let mut mgr = ClientStateManager::new();
        mgr.add(5, 100, 0);
        assert_eq!(mgr.reconnect(100), Some(5));
    }

    #[test]
    fn gc_drops_only_stale_sent_entries_not_whole_connections() {
        let mut mgr = ClientStateManager::new();
        mgr.add(1, 100, 0);
        mgr.mark_sent(1, key(0), 10);
        mgr.mark_sent(1, key(1), 90);

        mgr.gc_old_sent(100, 60);

        let state = mgr.get(1).unwrap();
        assert!(!state.sent.contains_key(&key(0)));
        assert!(state.sent.contains_key(&key(1)));
    }

    #[test]
    fn gc_never_touches_reverse_index() {
        let mut mgr = ClientStateManager::new();
        mgr.add(1, 100, 0);
        mgr.mark_sent(1, key(0), 10);
        mgr.gc_old_sent(1_000, 60);
        assert!(mgr.get(1).is_some());
        assert_eq!(mgr.reconnect(100), Some(1));
    }
}
