use worldmap_proto::{ChunkKey, PlayerPose};

use crate::tile::Tile;

/// What kind of payload a batched update carries for one chunk key.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum UpdateKind {
    /// A full tile, sent the first time a viewer sees this key.
    Full(Tile),
    /// A changed tile a viewer has already seen once before.
    Delta(Tile),
    /// The column is now empty; viewers should drop any tile they have for
    /// this key.
    Empty,
}

/// One key's worth of pending delivery, queued by [`crate::UpdateBatcher`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PendingUpdate {
    pub key: ChunkKey,
    pub kind: UpdateKind,
    pub enqueue_time: u64,
}

/// A single outbound delivery to one or more viewers, produced by draining
/// the batcher.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Batch {
    pub batch_id: u64,
    pub updates: Vec<PendingUpdate>,
    pub player_position: Option<PlayerPose>,
    pub timestamp: u64,
}
