//! Static obstacle oracle
//!
//! Tile collision geometry is owned by the host; the engine only asks whether a
//! world cell is blocked. Answers must not change during a tick.

use std::collections::HashSet;

use super::coords::WorldPos;

pub trait ObstacleOracle {
    fn is_obstacle(&self, cell: WorldPos) -> bool;
}

/// Open world
#[derive(Clone, Copy, Debug, Default)]
pub struct NoObstacles;

impl ObstacleOracle for NoObstacles {
    #[inline]
    fn is_obstacle(&self, _cell: WorldPos) -> bool {
        false
    }
}

impl<F> ObstacleOracle for F
where
    F: Fn(WorldPos) -> bool,
{
    #[inline]
    fn is_obstacle(&self, cell: WorldPos) -> bool {
        self(cell)
    }
}

/// Explicit set of blocked cells.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSet {
    cells: HashSet<WorldPos>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cell: WorldPos) -> bool {
        self.cells.insert(cell)
    }

    pub fn remove(&mut self, cell: WorldPos) -> bool {
        self.cells.remove(&cell)
    }

    /// Block every cell of the `width` x `height` rectangle starting at `min`.
    pub fn insert_rect(&mut self, min: WorldPos, width: i32, height: i32) {
        for y in min.y..min.y + height {
            for x in min.x..min.x + width {
                self.cells.insert(WorldPos::new(x, y));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl ObstacleOracle for ObstacleSet {
    #[inline]
    fn is_obstacle(&self, cell: WorldPos) -> bool {
        self.cells.contains(&cell)
    }
}
