//! Shared wire and domain types for the worldmap pipeline: chunk
//! identifiers, player pose, and the static color/ore registries consumed
//! by the tile processor.

mod chunk_key;
mod color;
mod ore;
mod pose;
mod registry;

pub use chunk_key::{ChunkKey, Dimension};
pub use color::{height_shade_factor, shade, Rgb24, BLACK, MAX_Y, MIN_Y};
pub use ore::{is_surface_candidate, ore_type, OreType};
pub use pose::{PlayerPose, POSITION_EPSILON};
pub use registry::{base_color, DEFAULT_COLOR};
