//! Coordinates
//!
//! A world cell decomposes uniquely into (chunk, local) by floor division and
//! Euclidean modulo with the chunk size. World y grows upward, so "down" is y - 1.

use serde::{Deserialize, Serialize};

/// Neighbor offsets, 4-connected first then diagonals.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, 0),  // Left
    (1, 0),   // Right
    (0, -1),  // Down
    (0, 1),   // Up
    (-1, -1), // Down-Left
    (1, -1),  // Down-Right
    (-1, 1),  // Up-Left
    (1, 1),   // Up-Right
];

pub const DOWN: (i32, i32) = (0, -1);
pub const UP: (i32, i32) = (0, 1);

/// Global cell coordinate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
}

impl WorldPos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Split into (chunk, local) for the given chunk size.
    #[inline]
    pub fn to_cell(self, chunk_size: i32) -> CellPos {
        debug_assert!(chunk_size > 0, "chunk size must be positive");
        CellPos {
            chunk: ChunkPos::new(self.x.div_euclid(chunk_size), self.y.div_euclid(chunk_size)),
            local: LocalPos::new(self.x.rem_euclid(chunk_size), self.y.rem_euclid(chunk_size)),
        }
    }
}

/// Chunk coordinate. Ordered row-major (y first) so iteration sweeps bottom rows first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub y: i32,
    pub x: i32,
}

impl ChunkPos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// World cell of this chunk's local (0, 0).
    #[inline]
    pub fn origin(self, chunk_size: i32) -> WorldPos {
        WorldPos::new(self.x * chunk_size, self.y * chunk_size)
    }
}

/// Cell inside a chunk, always in `0..chunk_size` on both axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalPos {
    pub y: i32,
    pub x: i32,
}

impl LocalPos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    /// Row-major slot index inside a chunk.
    #[inline]
    pub fn index(self, chunk_size: i32) -> usize {
        (self.y * chunk_size + self.x) as usize
    }

    #[inline]
    pub fn from_index(idx: usize, chunk_size: i32) -> Self {
        let idx = idx as i32;
        Self::new(idx % chunk_size, idx / chunk_size)
    }
}

/// (chunk, local) pair identifying one slot of the chunk map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub chunk: ChunkPos,
    pub local: LocalPos,
}

impl CellPos {
    #[inline]
    pub const fn new(chunk: ChunkPos, local: LocalPos) -> Self {
        Self { chunk, local }
    }

    /// Build from a possibly out-of-range local coordinate, carrying the
    /// overflow into the chunk coordinate.
    #[inline]
    pub fn normalize(chunk: ChunkPos, local_x: i32, local_y: i32, chunk_size: i32) -> Self {
        Self {
            chunk: chunk.offset(local_x.div_euclid(chunk_size), local_y.div_euclid(chunk_size)),
            local: LocalPos::new(local_x.rem_euclid(chunk_size), local_y.rem_euclid(chunk_size)),
        }
    }

    /// Neighbor cell, wrapping across chunk borders.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32, chunk_size: i32) -> Self {
        Self::normalize(self.chunk, self.local.x + dx, self.local.y + dy, chunk_size)
    }

    #[inline]
    pub fn to_world(self, chunk_size: i32) -> WorldPos {
        WorldPos::new(
            self.chunk.x * chunk_size + self.local.x,
            self.chunk.y * chunk_size + self.local.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_world_cells_floor_into_previous_chunk() {
        let cell = WorldPos::new(-1, -5).to_cell(4);
        assert_eq!(cell.chunk, ChunkPos::new(-1, -2));
        assert_eq!(cell.local, LocalPos::new(3, 3));
    }

    #[test]
    fn world_to_cell_is_a_bijection() {
        let size = 4;
        for y in -9..9 {
            for x in -9..9 {
                let world = WorldPos::new(x, y);
                let cell = world.to_cell(size);
                assert!((0..size).contains(&cell.local.x));
                assert!((0..size).contains(&cell.local.y));
                assert_eq!(cell.to_world(size), world);
            }
        }
    }

    #[test]
    fn offset_wraps_across_chunk_borders() {
        let size = 4;
        let left_edge = CellPos::new(ChunkPos::new(2, 0), LocalPos::new(0, 0));

        let stepped = left_edge.offset(-1, -1, size);
        assert_eq!(stepped.chunk, ChunkPos::new(1, -1));
        assert_eq!(stepped.local, LocalPos::new(3, 3));

        // Offsetting in cell space agrees with offsetting in world space.
        for dy in -6..6 {
            for dx in -6..6 {
                let via_cell = left_edge.offset(dx, dy, size).to_world(size);
                let via_world = left_edge.to_world(size).offset(dx, dy);
                assert_eq!(via_cell, via_world);
            }
        }
    }

    #[test]
    fn local_index_roundtrip() {
        let size = 8;
        for idx in 0..(size * size) as usize {
            assert_eq!(LocalPos::from_index(idx, size).index(size), idx);
        }
    }
}
