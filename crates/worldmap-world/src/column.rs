use std::collections::BTreeMap;

use worldmap_proto::is_surface_candidate;

use crate::subchunk::SubChunk;

/// A vertical stack of subchunks for one chunk key.
///
/// Sections are keyed by their section Y (`-4..=19`); a missing section is
/// treated as all-air rather than stored explicitly, so a freshly-created
/// skeleton column (negative `sub_chunk_count`) is legitimately empty.
#[derive(Clone, Debug, Default)]
pub struct ChunkColumn {
    sections: BTreeMap<i32, SubChunk>,
}

impl ChunkColumn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, y: i32) -> Option<&SubChunk> {
        self.sections.get(&y)
    }

    pub fn insert_section(&mut self, section: SubChunk) {
        self.sections.insert(section.y, section);
    }

    pub fn section_mut(&mut self, y: i32) -> Option<&mut SubChunk> {
        self.sections.get_mut(&y)
    }

    /// Iterates loaded sections from the highest Y down to the lowest.
    pub fn sections_top_down(&self) -> impl Iterator<Item = &SubChunk> {
        self.sections.values().rev()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The block name and absolute Y of the surface at local `(x, z)`, if
    /// any block in the column at that position is a surface candidate.
    ///
    /// This is the same downward scan `ChunkProcessor` runs, but narrowed to
    /// a single `(x, z)` column; `World::on_update_block` uses it to decide
    /// whether a targeted block write changed the surface.
    pub fn surface_at(&self, x: u8, z: u8) -> Option<(i32, String)> {
        for section in self.sections_top_down() {
            for local_y in (0u8..16).rev() {
                let name = section.block_name(x, local_y, z);
                if is_surface_candidate(name) {
                    let abs_y = section.y * 16 + local_y as i32;
                    return Some((abs_y, name.to_owned()));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::subchunk::{SubChunk, SubChunkPayload};

    #[test]
    fn empty_column_has_no_surface() {
        let column = ChunkColumn::new();
        assert_eq!(column.surface_at(0, 0), None);
    }

    #[test]
    fn surface_is_highest_non_air_block() {
        let mut column = ChunkColumn::new();
        let mut indices = vec![0u16; crate::subchunk::SECTION_VOLUME];
        indices[15 * 256] = 1; // (x=0,y=15,z=0)
        let payload = SubChunkPayload {
            palette: vec![Arc::from("air"), Arc::from("stone")],
            indices,
        };
        column.insert_section(SubChunk::decode(0, payload).unwrap());

        assert_eq!(column.surface_at(0, 0), Some((15, "stone".to_owned())));
    }
}
