use worldmap_proto::{OreType, Rgb24};

/// A detected ore block within a processed tile.
#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
pub struct OreHit {
    pub local_x: u8,
    pub local_z: u8,
    pub world_y: i16,
    pub ore_type: OreType,
}

/// The 2D surface projection of a chunk column used by the minimap.
#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct Tile {
    pub colors: [[Rgb24; 16]; 16],
    pub heights: [[i16; 16]; 16],
    pub ores: Vec<OreHit>,
    pub timestamp: u64,
}

impl Tile {
    /// Whether every cell is void: black color and [`worldmap_proto::MIN_Y`]
    /// height, per §4.2's emptiness rule.
    pub fn is_empty(&self) -> bool {
        self.colors.iter().flatten().all(|c| *c == worldmap_proto::BLACK)
            && self
                .heights
                .iter()
                .flatten()
                .all(|h| *h as i32 == worldmap_proto::MIN_Y)
    }

    /// Equality ignoring `timestamp` -- the fan-out loop's "unchanged tile"
    /// check (§4.6) is about content, not when it was produced.
    pub fn content_eq(&self, other: &Tile) -> bool {
        self.colors == other.colors && self.heights == other.heights && self.ores == other.ores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn void_tile() -> Tile {
        Tile {
            colors: [[worldmap_proto::BLACK; 16]; 16],
            heights: [[worldmap_proto::MIN_Y as i16; 16]; 16],
            ores: vec![],
            timestamp: 0,
        }
    }

    #[test]
    fn all_void_tile_is_empty() {
        assert!(void_tile().is_empty());
    }

    #[test]
    fn content_eq_ignores_timestamp() {
        let mut a = void_tile();
        let mut b = void_tile();
        a.timestamp = 1;
        b.timestamp = 2;
        assert!(a.content_eq(&b));
        assert_ne!(a, b);
    }
}
