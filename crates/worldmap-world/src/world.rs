use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use worldmap_proto::ChunkKey;

use crate::column::ChunkColumn;
use crate::subchunk::{DecodeError, SubChunk, SubChunkPayload, MAX_SECTION_Y, MIN_SECTION_Y};

/// Result code for a single subchunk delivery, per §4.1.
#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
pub enum SubchunkResult {
    Success,
    SuccessAllAir,
    ChunkNotFound,
    InvalidDimension,
    PlayerNotFound,
    YOutOfBounds,
}

/// One entry of a `subchunk` delivery: an offset from the origin column and
/// the resolved result for that offset.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SubChunkEntry {
    pub dx: i32,
    pub dz: i32,
    pub dy: i32,
    pub result: SubchunkResult,
    pub payload: Option<SubChunkPayload>,
}

/// A targeted block write, addressed in world (absolute) coordinates.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct BlockPosition {
    pub key: ChunkKey,
    pub local_x: u8,
    pub abs_y: i32,
    pub local_z: u8,
}

/// In-memory set of chunk columns being tracked for the active session.
///
/// Single-writer: only the ingest packet handler mutates `World`; every
/// other component only reads through [`World::get_column`].
#[derive(Default)]
pub struct World {
    columns: FxHashMap<ChunkKey, ChunkColumn>,
    /// Keys whose surface may have changed since the last drain, and so need
    /// a fresh `ChunkResponse` produced and pushed downstream. There is no
    /// direct call from `World` into the tile service (the only I->T
    /// transport is the event channel in §4.7), so this is how a targeted
    /// block write eventually reaches `TileCache::invalidate`.
    dirty: Vec<ChunkKey>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or replaces the column for `key`.
    ///
    /// If `sub_chunk_count` is negative the column arrives skeleton-only and
    /// is completed by later `on_subchunk` deliveries. Otherwise `sections`
    /// must contain exactly `sub_chunk_count` contiguous payloads starting
    /// at section Y = -4.
    pub fn on_level_chunk(
        &mut self,
        key: ChunkKey,
        sub_chunk_count: i32,
        sections: Vec<SubChunkPayload>,
    ) -> Vec<DecodeError> {
        let mut column = ChunkColumn::new();
        let mut errors = Vec::new();

        if sub_chunk_count >= 0 {
            for (i, payload) in sections.into_iter().enumerate() {
                let y = MIN_SECTION_Y + i as i32;
                if y > MAX_SECTION_Y {
                    break;
                }
                match SubChunk::decode(y, payload) {
                    Ok(section) => column.insert_section(section),
                    Err(e) => {
                        warn!(%key, section_y = y, error = %e, "level_chunk section decode failed, treating as air");
                        errors.push(e);
                    }
                }
            }
        }

        self.columns.insert(key, column);
        self.mark_dirty(key);
        errors
    }

    /// Applies one `subchunk` delivery's entries to the column at `origin_key`.
    pub fn on_subchunk(&mut self, origin_key: ChunkKey, entries: Vec<SubChunkEntry>) {
        for entry in entries {
            match entry.result {
                SubchunkResult::Success => {
                    let Some(payload) = entry.payload else {
                        warn!("subchunk entry reported Success with no payload, skipping");
                        continue;
                    };
                    let key = offset_key(origin_key, entry.dx, entry.dz);
                    let abs_section_y = entry.dy;
                    match SubChunk::decode(abs_section_y, payload) {
                        Ok(section) => {
                            let column = self.columns.entry(key).or_default();
                            column.insert_section(section);
                            self.mark_dirty(key);
                        }
                        Err(e) => {
                            warn!(%key, error = %e, "subchunk decode failed, section treated as air");
                        }
                    }
                }
                SubchunkResult::SuccessAllAir => {
                    let key = offset_key(origin_key, entry.dx, entry.dz);
                    let column = self.columns.entry(key).or_default();
                    column.insert_section(SubChunk::all_air(entry.dy));
                    self.mark_dirty(key);
                }
                non_success => log_non_success(origin_key, non_success),
            }
        }
    }

    /// Replaces the single block at `position.key`'s column.
    ///
    /// If the replaced position was the previous surface candidate for its
    /// `(x, z)` -- or the column's surface at `(x, z)` otherwise changes as
    /// a result -- the key is marked dirty so a fresh tile gets produced.
    pub fn on_update_block(&mut self, position: BlockPosition, new_state: Arc<str>) {
        let Some(column) = self.columns.get_mut(&position.key) else {
            debug!(key = %position.key, "update_block for unloaded column, ignoring");
            return;
        };

        let section_y = position.abs_y.div_euclid(16);
        let local_y = position.abs_y.rem_euclid(16) as u8;

        let before = column.surface_at(position.local_x, position.local_z);

        if column.section(section_y).is_none() {
            column.insert_section(SubChunk::all_air(section_y));
        }
        let section = column
            .section_mut(section_y)
            .expect("section was just ensured to exist");
        section.set_block(position.local_x, local_y, position.local_z, new_state);

        let after = column.surface_at(position.local_x, position.local_z);
        if before != after {
            self.mark_dirty(position.key);
        }
    }

    /// Atomically drops all columns, per a `world-reset` event.
    pub fn on_world_reset(&mut self) {
        self.columns.clear();
        self.dirty.clear();
    }

    pub fn get_column(&self, key: ChunkKey) -> Option<&ChunkColumn> {
        self.columns.get(&key)
    }

    pub fn loaded_keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.columns.keys().copied()
    }

    /// Drains the set of keys whose column changed since the last drain.
    pub fn take_dirty_keys(&mut self) -> Vec<ChunkKey> {
        std::mem::take(&mut self.dirty)
    }

    fn mark_dirty(&mut self, key: ChunkKey) {
        if !self.dirty.contains(&key) {
            self.dirty.push(key);
        }
    }
}

fn offset_key(origin: ChunkKey, dx: i32, dz: i32) -> ChunkKey {
    ChunkKey::new(origin.cx + dx, origin.cz + dz, origin.dim)
}

fn log_non_success(origin: ChunkKey, result: SubchunkResult) {
    match result {
        SubchunkResult::PlayerNotFound | SubchunkResult::InvalidDimension => {
            // Expected transiently during a dimension change; not a real error.
            debug!(key = %origin, ?result, "subchunk not delivered, likely a dimension transition");
        }
        _ => warn!(key = %origin, ?result, "subchunk delivery failed, section left absent"),
    }
}
