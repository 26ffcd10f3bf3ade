use std::sync::Arc;

use worldmap_proto::{ChunkKey, PlayerPose};
use worldmap_world::{BlockPosition, SubChunkEntry, SubChunkPayload};

/// A decoded packet handed to the ingest service by the upstream relay
/// library, per §6.1. The relay is responsible for wire framing and
/// block-state-id resolution; everything arriving here is already a
/// structured record.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum UpstreamPacket {
    Join { protocol_version: i32 },
    StartGame { world_seed: i64 },
    ClientCacheMissResponse { key: ChunkKey, blob: Vec<u8> },
    LevelChunk { key: ChunkKey, sub_chunk_count: i32, sections: Vec<SubChunkPayload> },
    Subchunk { origin_key: ChunkKey, entries: Vec<SubChunkEntry> },
    UpdateBlock { position: BlockPosition, new_state: Arc<str> },
    PlayerAuthInput { pose: PlayerPose },
    WorldReset,
}
