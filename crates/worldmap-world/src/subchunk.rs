use std::sync::Arc;

use thiserror::Error;

/// Number of blocks in a 16x16x16 section.
pub const SECTION_VOLUME: usize = 4096;

/// Lowest section Y (absolute Y = `section_y * 16`).
pub const MIN_SECTION_Y: i32 = -4;
/// Highest section Y, inclusive.
pub const MAX_SECTION_Y: i32 = 19;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("subchunk has {0} indices, expected exactly {SECTION_VOLUME}")]
    WrongIndexCount(usize),
    #[error("subchunk index {index} at position {pos:?} exceeds palette length {palette_len}")]
    IndexOutOfRange {
        index: u16,
        pos: (u8, u8, u8),
        palette_len: usize,
    },
    #[error("section Y {0} is outside the valid range {MIN_SECTION_Y}..={MAX_SECTION_Y}")]
    SectionYOutOfRange(i32),
}

/// A decoded subchunk payload as handed to `World` by the ingest session.
///
/// The upstream relay library performs the actual bit-unpacking of the wire
/// format; by the time it reaches `World`, block-state ids have already been
/// resolved to symbolic names via the version's block registry (out of
/// scope here, per §6.1).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SubChunkPayload {
    pub palette: Vec<Arc<str>>,
    pub indices: Vec<u16>,
}

impl SubChunkPayload {
    pub fn all_air() -> Self {
        Self {
            palette: vec![Arc::from("air")],
            indices: vec![0; SECTION_VOLUME],
        }
    }
}

/// A 16x16x16 palette-indexed block array.
#[derive(Clone, Debug)]
pub struct SubChunk {
    pub y: i32,
    palette: Vec<Arc<str>>,
    indices: Box<[u16]>,
}

impl SubChunk {
    /// Decodes and validates a payload for section `y`.
    ///
    /// Rejects payloads whose index count isn't exactly [`SECTION_VOLUME`]
    /// or whose indices exceed the palette length, per §4.1.
    pub fn decode(y: i32, payload: SubChunkPayload) -> Result<Self, DecodeError> {
        if !(MIN_SECTION_Y..=MAX_SECTION_Y).contains(&y) {
            return Err(DecodeError::SectionYOutOfRange(y));
        }
        if payload.indices.len() != SECTION_VOLUME {
            return Err(DecodeError::WrongIndexCount(payload.indices.len()));
        }
        for (i, &idx) in payload.indices.iter().enumerate() {
            if idx as usize >= payload.palette.len() {
                return Err(DecodeError::IndexOutOfRange {
                    index: idx,
                    pos: index_to_xyz(i),
                    palette_len: payload.palette.len(),
                });
            }
        }

        Ok(Self {
            y,
            palette: payload.palette,
            indices: payload.indices.into_boxed_slice(),
        })
    }

    /// An empty (all-air) section, used for `SuccessAllAir` subchunk results
    /// and for sections that have never arrived.
    pub fn all_air(y: i32) -> Self {
        Self {
            y,
            palette: vec![Arc::from("air")],
            indices: vec![0; SECTION_VOLUME].into_boxed_slice(),
        }
    }

    /// The block name at local coordinates `(x, y, z)`, each in `0..16`.
    pub fn block_name(&self, x: u8, y: u8, z: u8) -> &str {
        let idx = self.indices[local_index(x, y, z)];
        &self.palette[idx as usize]
    }

    /// Overwrites the single block at local `(x, y, z)` with `name`,
    /// appending it to the palette if not already present.
    pub fn set_block(&mut self, x: u8, y: u8, z: u8, name: Arc<str>) {
        let palette_idx = match self.palette.iter().position(|p| **p == *name) {
            Some(i) => i,
            None => {
                self.palette.push(name);
                self.palette.len() - 1
            }
        };
        self.indices[local_index(x, y, z)] = palette_idx as u16;
    }
}

#[inline]
fn local_index(x: u8, y: u8, z: u8) -> usize {
    y as usize * 256 + z as usize * 16 + x as usize
}

#[inline]
fn index_to_xyz(index: usize) -> (u8, u8, u8) {
    let y = index / 256;
    let rem = index % 256;
    let z = rem / 16;
    let x = rem % 16;
    (x as u8, y as u8, z as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_index_count() {
        let payload = SubChunkPayload {
            palette: vec![Arc::from("air")],
            indices: vec![0; 10],
        };
        assert_eq!(
            SubChunk::decode(0, payload),
            Err(DecodeError::WrongIndexCount(10))
        );
    }

    #[test]
    fn rejects_out_of_range_index() {
        let mut indices = vec![0; SECTION_VOLUME];
        indices[42] = 5;
        let payload = SubChunkPayload {
            palette: vec![Arc::from("air")],
            indices,
        };
        assert!(matches!(
            SubChunk::decode(0, payload),
            Err(DecodeError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_section_y_out_of_bounds() {
        let payload = SubChunkPayload::all_air();
        assert_eq!(
            SubChunk::decode(20, payload),
            Err(DecodeError::SectionYOutOfRange(20))
        );
    }

    #[test]
    fn round_trips_block_name() {
        let mut indices = vec![0u16; SECTION_VOLUME];
        indices[local_index(7, 12, 9)] = 1;
        let payload = SubChunkPayload {
            palette: vec![Arc::from("air"), Arc::from("stone")],
            indices,
        };
        let section = SubChunk::decode(0, payload).unwrap();
        assert_eq!(section.block_name(7, 12, 9), "stone");
        assert_eq!(section.block_name(0, 0, 0), "air");
    }

    #[test]
    fn set_block_grows_palette_as_needed() {
        let mut section = SubChunk::all_air(0);
        section.set_block(1, 1, 1, Arc::from("diamond_ore"));
        assert_eq!(section.block_name(1, 1, 1), "diamond_ore");
        assert_eq!(section.block_name(0, 0, 0), "air");
    }
}
