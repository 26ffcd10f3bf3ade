use worldmap_proto::{ChunkKey, PlayerPose};
use worldmap_world::ChunkColumn;

/// A strictly typed replacement for the source's opaque "chunk response"
/// JSON blob (§9): either the decoded column, or an explicit failure.
#[derive(Clone, Debug)]
pub struct ChunkResponse {
    pub key: ChunkKey,
    pub success: bool,
    pub column: Option<ChunkColumn>,
}

impl ChunkResponse {
    pub fn ok(key: ChunkKey, column: ChunkColumn) -> Self {
        Self { key, success: true, column: Some(column) }
    }

    pub fn failed(key: ChunkKey) -> Self {
        Self { key, success: false, column: None }
    }
}

/// Events carried across the I->T channel, per §4.7.
#[derive(Clone, Debug)]
pub enum IngestEvent {
    PlayerPosition(PlayerPose),
    ChunkData(Vec<ChunkResponse>),
    ConnectionStatus { connected: bool, player_id: Option<u64>, message: Option<String> },
    WorldReset,
}
