//! In-memory world state for the ingest service: chunk columns, subchunk
//! decode, and the targeted-block-update surface-change detection that
//! feeds tile invalidation downstream.

mod column;
mod subchunk;
mod world;

pub use column::ChunkColumn;
pub use subchunk::{DecodeError, SubChunk, SubChunkPayload, SECTION_VOLUME};
pub use world::{BlockPosition, SubChunkEntry, SubchunkResult, World};
