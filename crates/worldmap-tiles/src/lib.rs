//! Chunk-to-tile projection, the bounded tile cache, the outbound update
//! batcher, and per-viewer delivery-state tracking for the tile service.

mod batch;
mod batcher;
mod cache;
mod client_state;
mod processor;
mod tile;

pub use batch::{Batch, PendingUpdate, UpdateKind};
pub use batcher::{UpdateBatcher, BACKPRESSURE_HIGH_WATER};
pub use cache::{CacheError, CacheStats, TileCache};
pub use client_state::{ClientState, ClientStateManager};
pub use processor::ChunkProcessor;
pub use tile::{OreHit, Tile};
