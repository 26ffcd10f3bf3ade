use worldmap_proto::{ChunkKey, Dimension};
use worldmap_tiles::Batch;

/// Server-to-client messages, per §6.3.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ServerMessage {
    BatchUpdate(Batch),
    PlayerMove { x: f64, z: f64, dim: Dimension },
    ConnectionStatus { connected: bool, message: Option<String> },
    WorldReset,
}

/// Client-to-server messages, per §6.3. `MinimapClick` and
/// `RequestInitialChunks`'s viewport hint are accepted but have no required
/// server-side effect; the fan-out loop already seeds every viewer from the
/// cache on connect regardless of viewport.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ClientMessage {
    RequestInitialChunks { viewport: Option<(ChunkKey, ChunkKey)>, dimension: Option<Dimension> },
    MinimapClick { x: f64, z: f64, dim: Dimension, modifiers: Vec<String> },
    UpdateSettings { ore_scan_y_offset: Option<i32> },
}
