use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};
use worldmap_ingest::{ChunkResponse, IngestEvent};
use worldmap_proto::{ChunkKey, PlayerPose};
use worldmap_tiles::{
    Batch, CacheError, ChunkProcessor, ClientStateManager, PendingUpdate, Tile, TileCache,
    UpdateBatcher, UpdateKind,
};

use crate::message::ServerMessage;
use crate::registry::ViewerRegistry;
use crate::transport::ViewerTransport;

/// Ties together the tile pipeline (processor, cache, batcher,
/// per-viewer state, and the live transports) into the tick-driven
/// delivery loop described in §4.6.
pub struct FanOutLoop {
    processor: ChunkProcessor,
    cache: TileCache,
    batcher: UpdateBatcher,
    clients: ClientStateManager,
    viewers: ViewerRegistry,
    max_batch_size: usize,
    next_batch_id: u64,
    current_pose: Option<PlayerPose>,
    /// Last tile content sent to each (viewer, key) as a Full update, used
    /// to satisfy the "no redundant byte-identical Full resend" invariant
    /// (§8, property 7). `ClientStateManager::sent` only tracks which keys
    /// were sent, not their content, so this lives alongside it here.
    last_full_sent: FxHashMap<(u64, ChunkKey), Tile>,
    /// Last player pose delivered to each viewer, for the per-viewer
    /// movement-beyond-epsilon check in step 2 of §4.6's algorithm.
    pose_sent: FxHashMap<u64, PlayerPose>,
}

impl FanOutLoop {
    pub fn new(cache_capacity: usize, max_batch_size: usize) -> Result<Self, CacheError> {
        Ok(Self {
            processor: ChunkProcessor::new(),
            cache: TileCache::new(cache_capacity)?,
            batcher: UpdateBatcher::new(),
            clients: ClientStateManager::new(),
            viewers: ViewerRegistry::new(),
            max_batch_size,
            next_batch_id: 0,
            current_pose: None,
            last_full_sent: FxHashMap::default(),
            pose_sent: FxHashMap::default(),
        })
    }

    /// Registers a new viewer connection and seeds its pending set with
    /// every non-empty cached tile, per §4.6's "initial snapshot" rule.
    /// `conn_id` is assigned by the transport layer (e.g. the TCP accept
    /// loop's connection counter), not here, so transport-level error
    /// reporting and fan-out bookkeeping agree on the same id.
    pub fn connect_viewer(
        &mut self,
        conn_id: u64,
        transport: Box<dyn ViewerTransport>,
        client_id: u64,
        now: u64,
    ) -> u64 {
        self.viewers.insert(conn_id, transport);
        self.clients.add(conn_id, client_id, now);

        let keys: Vec<ChunkKey> = self.cache.iter().map(|(key, _)| *key).collect();
        let seeded = keys.len();
        for key in keys {
            self.clients.add_pending(conn_id, key);
        }

        info!(conn_id, client_id, seeded, "viewer connected");
        conn_id
    }

    pub fn disconnect_viewer(&mut self, conn_id: u64) {
        self.viewers.remove(conn_id);
        // ClientState is deliberately kept in `clients` past disconnect, to
        // support `reconnect` within the grace period; `gc_old_sent` reaps it.
        self.last_full_sent.retain(|(c, _), _| *c != conn_id);
        self.pose_sent.remove(&conn_id);
        debug!(conn_id, "viewer disconnected");
    }

    /// Resolves a reconnecting viewer's stable `client_id` back onto its
    /// prior `ClientState`, per §4.5's `reconnect` operation. `new_conn_id`
    /// is used only if no prior connection is found for `client_id`, in
    /// which case this behaves like [`Self::connect_viewer`] without
    /// re-seeding from the cache (the caller didn't find a match to resume).
    pub fn reconnect_viewer(
        &mut self,
        new_conn_id: u64,
        transport: Box<dyn ViewerTransport>,
        client_id: u64,
    ) -> u64 {
        match self.clients.reconnect(client_id) {
            Some(conn_id) => {
                self.viewers.insert(conn_id, transport);
                conn_id
            }
            None => {
                self.viewers.insert(new_conn_id, transport);
                self.clients.add(new_conn_id, client_id, 0);
                new_conn_id
            }
        }
    }

    pub fn gc_old_sent(&mut self, now: u64, max_age: u64) {
        self.clients.gc_old_sent(now, max_age);
    }

    /// Applies one event from the I->T channel. `ConnectionStatus` and
    /// `WorldReset` are broadcast immediately (outside the batched path),
    /// satisfying §5's ordering guarantee that they're observed by every
    /// viewer before the next `batch-update`.
    pub async fn handle_ingest_event(&mut self, event: IngestEvent, now: u64) {
        match event {
            IngestEvent::PlayerPosition(pose) => {
                self.current_pose = Some(pose);
            }
            IngestEvent::ChunkData(responses) => {
                for response in responses {
                    self.handle_chunk_response(response, now);
                }
            }
            IngestEvent::ConnectionStatus { connected, message, .. } => {
                self.broadcast(ServerMessage::ConnectionStatus { connected, message }).await;
            }
            IngestEvent::WorldReset => {
                self.cache.clear();
                self.batcher.clear();
                self.broadcast(ServerMessage::WorldReset).await;
            }
        }
    }

    fn handle_chunk_response(&mut self, response: ChunkResponse, now: u64) {
        let Some(column) = response.column else {
            // Transport/decode failure upstream: leave the last known tile
            // in place but mark it stale rather than removing it outright.
            self.cache.invalidate(response.key);
            return;
        };

        match self.processor.process(&column, now) {
            Some(tile) => {
                let was_cached = self.cache.contains(response.key);
                self.cache.put(response.key, tile.clone(), now);
                let kind = if was_cached { UpdateKind::Delta(tile) } else { UpdateKind::Full(tile) };
                self.batcher.enqueue(response.key, kind, now);
            }
            None => {
                self.cache.remove(response.key);
                self.batcher.enqueue(response.key, UpdateKind::Empty, now);
            }
        }
    }

    /// Drains the batcher and emits one `Batch` to every connected viewer,
    /// per §4.6's per-tick algorithm.
    pub async fn tick(&mut self, now: u64) {
        let updates = self.batcher.drain(self.max_batch_size);
        let conn_ids: Vec<u64> = self.viewers.conn_ids().collect();
        for conn_id in conn_ids {
            self.emit_to_viewer(conn_id, &updates, now).await;
        }
    }

    async fn emit_to_viewer(&mut self, conn_id: u64, updates: &[PendingUpdate], now: u64) {
        let mut included = Vec::new();
        for update in updates {
            if self.is_redundant_full(conn_id, update) {
                continue;
            }
            included.push(update.clone());
        }

        let pending_keys = self.clients.drain_pending(conn_id);
        let mut outgoing = Vec::new();
        for key in pending_keys {
            if included.iter().any(|u| u.key == key) {
                continue;
            }
            if let Some(tile) = self.cache.get(key, now).cloned() {
                outgoing.push(PendingUpdate { key, kind: UpdateKind::Full(tile), enqueue_time: now });
            }
        }
        outgoing.extend(included);

        let pose_to_send = self.pose_for_viewer(conn_id);

        if outgoing.is_empty() && pose_to_send.is_none() {
            return;
        }

        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;

        let batch = Batch {
            batch_id,
            updates: outgoing.clone(),
            player_position: pose_to_send,
            timestamp: now,
        };

        if let Err(e) = self.viewers.send(conn_id, ServerMessage::BatchUpdate(batch)).await {
            warn!(conn_id, error = %e, "dropping batch, viewer write failed");
            return;
        }

        for update in &outgoing {
            self.clients.mark_sent(conn_id, update.key, now);
            if let UpdateKind::Full(tile) = &update.kind {
                self.last_full_sent.insert((conn_id, update.key), tile.clone());
            }
        }
        self.clients.set_last_batch(conn_id, batch_id);
        if let Some(pose) = pose_to_send {
            self.pose_sent.insert(conn_id, pose);
        }
    }

    fn is_redundant_full(&self, conn_id: u64, update: &PendingUpdate) -> bool {
        let UpdateKind::Full(tile) = &update.kind else {
            return false;
        };
        if !self.clients.has_sent(conn_id, update.key) {
            return false;
        }
        self.last_full_sent
            .get(&(conn_id, update.key))
            .is_some_and(|prev| prev.content_eq(tile))
    }

    fn pose_for_viewer(&self, conn_id: u64) -> Option<PlayerPose> {
        let pose = self.current_pose?;
        match self.pose_sent.get(&conn_id) {
            Some(prev) if !pose.moved_beyond_epsilon(prev) => None,
            _ => Some(pose),
        }
    }

    async fn broadcast(&mut self, message: ServerMessage) {
        let conn_ids: Vec<u64> = self.viewers.conn_ids().collect();
        for conn_id in conn_ids {
            let _ = self.viewers.send(conn_id, message.clone()).await;
        }
    }
}
