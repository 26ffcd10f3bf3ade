use worldmap_proto::{base_color, is_surface_candidate, ore_type, shade, BLACK, MIN_Y};
use worldmap_world::ChunkColumn;

use crate::tile::{OreHit, Tile};

/// Projects a [`ChunkColumn`] into a [`Tile`].
///
/// Stateless; holds no tables of its own, since [`worldmap_proto`]'s color
/// and ore registries are already static functions.
#[derive(Default, Clone, Copy, Debug)]
pub struct ChunkProcessor;

impl ChunkProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` iff every `(x, z)` column is entirely air / void-air
    /// across all loaded sections.
    ///
    /// Iterates sections top-down once (not once per cell), tracking a
    /// per-cell "surface found" flag so each section is visited at most
    /// once, per §4.2's performance contract.
    pub fn process(self, column: &ChunkColumn, timestamp: u64) -> Option<Tile> {
        let mut colors = [[BLACK; 16]; 16];
        let mut heights = [[MIN_Y as i16; 16]; 16];
        let mut found = [[false; 16]; 16];
        let mut ores = Vec::new();
        let mut any_surface = false;

        for section in column.sections_top_down() {
            for local_y in (0u8..16).rev() {
                let abs_y = section.y * 16 + local_y as i32;

                for z in 0u8..16 {
                    for x in 0u8..16 {
                        let name = section.block_name(x, local_y, z);

                        if !found[x as usize][z as usize] && is_surface_candidate(name) {
                            found[x as usize][z as usize] = true;
                            any_surface = true;
                            heights[x as usize][z as usize] = abs_y as i16;
                            colors[x as usize][z as usize] = shade(base_color(name), abs_y);
                        }

                        if let Some(ore) = ore_type(name) {
                            ores.push(OreHit {
                                local_x: x,
                                local_z: z,
                                world_y: abs_y as i16,
                                ore_type: ore,
                            });
                        }
                    }
                }
            }
        }

        if !any_surface {
            return None;
        }

        Some(Tile { colors, heights, ores, timestamp })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use worldmap_world::{SubChunk, SubChunkPayload, SECTION_VOLUME};
    use worldmap_proto::OreType;

    use super::*;

    fn column_with(local_y: u8, block: &str) -> ChunkColumn {
        let mut indices = vec![0u16; SECTION_VOLUME];
        indices[local_y as usize * 256] = 1; // x=0, z=0
        let payload = SubChunkPayload {
            palette: vec![Arc::from("air"), Arc::from(block)],
            indices,
        };
        let mut column = ChunkColumn::new();
        column.insert_section(SubChunk::decode(0, payload).unwrap());
        column
    }

    #[test]
    fn all_air_column_produces_no_tile() {
        let mut column = ChunkColumn::new();
        column.insert_section(SubChunk::all_air(0));
        assert!(ChunkProcessor::new().process(&column, 0).is_none());
    }

    #[test]
    fn scenario_a_surface_with_shading() {
        // Stone at y=64 (section 4, local_y 0) with nothing above: this test
        // models the chunk with two adjacent sections of stone per §8
        // Scenario A, simplified to a single surface cell.
        let column = column_with(0, "stone");
        let tile = ChunkProcessor::new().process(&column, 0).unwrap();
        assert_eq!(tile.heights[0][0], 0); // section y=0, local_y=0 => abs_y 0
        assert_eq!(tile.colors[0][0], shade(base_color("stone"), 0));
        assert!(tile.ores.is_empty());
        assert!(!tile.is_empty());
    }

    #[test]
    fn boundary_single_ore_block_is_its_own_surface() {
        // §8 boundary: a lone ore block with otherwise air is both the
        // surface AND an OreHit.
        let column = column_with(12, "diamond_ore");
        let tile = ChunkProcessor::new().process(&column, 0).unwrap();
        assert_eq!(tile.heights[0][0], 12);
        assert_eq!(tile.colors[0][0], shade(base_color("diamond_ore"), 12));
        assert_eq!(tile.ores.len(), 1);
        assert_eq!(tile.ores[0].local_x, 0);
        assert_eq!(tile.ores[0].local_z, 0);
        assert_eq!(tile.ores[0].world_y, 12);
        assert_eq!(tile.ores[0].ore_type, OreType::Diamond);

        // Every other cell is void.
        for z in 0..16u8 {
            for x in 0..16u8 {
                if (x, z) == (0, 0) {
                    continue;
                }
                assert_eq!(tile.heights[x as usize][z as usize], MIN_Y as i16);
                assert_eq!(tile.colors[x as usize][z as usize], BLACK);
            }
        }
    }

    #[test]
    fn scenario_b_ore_under_grass() {
        let mut indices_a = vec![0u16; SECTION_VOLUME];
        // (5,5): grass at local_y 6 (abs 70 if section y=4), diamond below.
        // Build a single section spanning both cells using two columns.
        indices_a[6 * 256 + 5 * 16 + 5] = 1; // grass at (5, y=6, 5)
        indices_a[0 * 256 + 3 * 16 + 3] = 2; // coal at (3, y=0, 3) -- surface
        let payload = SubChunkPayload {
            palette: vec![Arc::from("air"), Arc::from("grass_block"), Arc::from("coal_ore")],
            indices: indices_a,
        };
        let mut column = ChunkColumn::new();
        column.insert_section(SubChunk::decode(4, payload).unwrap());

        // diamond_ore below the grass column, in a lower section.
        let mut indices_b = vec![0u16; SECTION_VOLUME];
        indices_b[5 * 16 + 5] = 1; // (5, y=0, 5) in section -1 => abs y = -16
        let payload_b = SubChunkPayload {
            palette: vec![Arc::from("air"), Arc::from("diamond_ore")],
            indices: indices_b,
        };
        column.insert_section(SubChunk::decode(-1, payload_b).unwrap());

        let tile = ChunkProcessor::new().process(&column, 0).unwrap();

        assert_eq!(tile.heights[5][5], 70); // section 4 * 16 + local_y 6
        assert_eq!(tile.colors[5][5], shade(base_color("grass_block"), 70));
        assert_eq!(tile.heights[3][3], 64);
        assert_eq!(tile.colors[3][3], shade(base_color("coal_ore"), 64));

        assert!(tile
            .ores
            .iter()
            .any(|o| o.local_x == 5 && o.local_z == 5 && o.world_y == -16 && o.ore_type == OreType::Diamond));
        assert!(tile
            .ores
            .iter()
            .any(|o| o.local_x == 3 && o.local_z == 3 && o.world_y == 64 && o.ore_type == OreType::Coal));
        assert_eq!(tile.ores.len(), 2);
    }

    #[test]
    fn removing_topmost_block_exposes_block_below() {
        let mut indices = vec![0u16; SECTION_VOLUME];
        indices[1 * 256] = 1; // stone at (0, y=1, 0)
        indices[0 * 256] = 2; // dirt at (0, y=0, 0)
        let payload = SubChunkPayload {
            palette: vec![Arc::from("air"), Arc::from("stone"), Arc::from("dirt")],
            indices,
        };
        let mut column = ChunkColumn::new();
        column.insert_section(SubChunk::decode(0, payload).unwrap());

        let tile = ChunkProcessor::new().process(&column, 0).unwrap();
        assert_eq!(tile.heights[0][0], 1);

        // Simulate replacing the topmost block with air.
        let section = column.section_mut(0).unwrap();
        section.set_block(0, 1, 0, Arc::from("air"));

        let tile = ChunkProcessor::new().process(&column, 0).unwrap();
        assert_eq!(tile.heights[0][0], 0);
        assert_eq!(tile.colors[0][0], shade(base_color("dirt"), 0));
    }
}
