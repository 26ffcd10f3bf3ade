use std::cmp::Ordering;
use std::fmt;

/// The dimension a chunk column belongs to.
///
/// A closed set: the upstream relay never introduces a fourth dimension.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, serde::Serialize, serde::Deserialize)]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    End,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dimension::Overworld => "overworld",
            Dimension::Nether => "nether",
            Dimension::End => "end",
        };
        f.write_str(s)
    }
}

/// Identifies a 16x16 world column within a dimension.
///
/// Ordered by `(dim, cx, cz)` so that [`Ord`] gives a total, stable order
/// across dimensions first -- this is the order [`World`](crate) iteration
/// and eviction tie-breaks rely on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct ChunkKey {
    pub cx: i32,
    pub cz: i32,
    pub dim: Dimension,
}

impl ChunkKey {
    pub const fn new(cx: i32, cz: i32, dim: Dimension) -> Self {
        Self { cx, cz, dim }
    }
}

impl PartialOrd for ChunkKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChunkKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.dim, self.cx, self.cz).cmp(&(other.dim, other.cx, other.cz))
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{}", self.dim, self.cx, self.cz)
    }
}
