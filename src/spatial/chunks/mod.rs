//! Chunk System - sparse map of fixed-size chunks.
//!
//! Chunks are created once when the world is built and never destroyed.
//! Each chunk holds `chunk_size²` slots of optional element keys plus the
//! double-buffered activity pair (`is_active`, `is_active_next_frame`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{CellPos, ChunkPos, LocalPos};
use crate::spatial::arena::ElementKey;

mod counts;
mod lifecycle;
mod wake;

/// Which neighbors a mutation wakes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakePolicy {
    /// Also wake the four diagonal neighbors.
    pub diagonal: bool,
    /// Wake a neighbor only when the mutated cell lies on the shared edge.
    pub border_only: bool,
}

pub struct Chunk {
    pos: ChunkPos,
    size: i32,
    cells: Vec<Option<ElementKey>>,
    occupied: usize,

    /// Stepped during the current tick.
    pub is_active: bool,
    /// Set by mutations; folded into `is_active` at the end of the sweep.
    pub is_active_next_frame: bool,
}

/// Largest accepted chunk edge. Keeps `size * size` well inside `i32`.
pub const MAX_CHUNK_SIZE: i32 = 1024;

impl Chunk {
    pub fn new(pos: ChunkPos, size: i32) -> Self {
        debug_assert!(size > 0 && size <= MAX_CHUNK_SIZE);
        Self {
            pos,
            size,
            cells: vec![None; size as usize * size as usize],
            occupied: 0,
            is_active: false,
            is_active_next_frame: false,
        }
    }

    #[inline]
    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    #[inline]
    pub fn get(&self, local: LocalPos) -> Option<ElementKey> {
        self.cells[local.index(self.size)]
    }

    /// Replace the slot content, returning what was there.
    #[inline]
    pub fn set(&mut self, local: LocalPos, key: Option<ElementKey>) -> Option<ElementKey> {
        let slot = &mut self.cells[local.index(self.size)];
        let prev = std::mem::replace(slot, key);
        match (prev.is_some(), key.is_some()) {
            (false, true) => self.occupied += 1,
            (true, false) => self.occupied -= 1,
            _ => {}
        }
        prev
    }

    /// Snapshot of every occupied slot in row-major order (bottom row first).
    pub fn occupied_keys(&self) -> Vec<(LocalPos, ElementKey)> {
        let mut out = Vec::with_capacity(self.occupied);
        for (idx, slot) in self.cells.iter().enumerate() {
            if let Some(key) = slot {
                out.push((LocalPos::from_index(idx, self.size), *key));
            }
        }
        out
    }

    #[inline]
    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Fraction of slots holding an element, in [0, 1].
    pub fn percent_filled(&self) -> f32 {
        self.occupied as f32 / self.cells.len() as f32
    }
}

/// Owns every chunk. Iteration order is row-major over chunk coordinates.
pub struct ChunkMap {
    chunk_size: i32,
    chunks: BTreeMap<ChunkPos, Chunk>,
    wake: WakePolicy,
}

impl ChunkMap {
    pub fn new(chunk_size: i32, wake: WakePolicy) -> Self {
        debug_assert!(chunk_size > 0);
        Self {
            chunk_size,
            chunks: BTreeMap::new(),
            wake,
        }
    }

    /// Create a chunk. Only used while building the world; returns false if it already exists.
    pub fn insert_chunk(&mut self, pos: ChunkPos) -> bool {
        if self.chunks.contains_key(&pos) {
            return false;
        }
        self.chunks.insert(pos, Chunk::new(pos, self.chunk_size));
        true
    }

    /// Fill a `columns x rows` rectangle of chunks starting at `origin`.
    pub fn insert_rect(&mut self, origin: ChunkPos, columns: i32, rows: i32) {
        for dy in 0..rows {
            for dx in 0..columns {
                self.insert_chunk(origin.offset(dx, dy));
            }
        }
    }

    #[inline]
    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    #[inline]
    pub fn wake_policy(&self) -> WakePolicy {
        self.wake
    }

    #[inline]
    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    #[inline]
    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    #[inline]
    pub fn has_chunk(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn positions(&self) -> Vec<ChunkPos> {
        self.chunks.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.values()
    }

    // === Slots ===

    /// Occupant of a cell; `None` both for empty cells and cells outside every chunk.
    #[inline]
    pub fn occupant(&self, cell: CellPos) -> Option<ElementKey> {
        self.chunks.get(&cell.chunk).and_then(|c| c.get(cell.local))
    }

    /// Write a slot. A missing chunk is skipped and reported as `None`.
    #[inline]
    pub fn set_occupant(&mut self, cell: CellPos, key: Option<ElementKey>) -> Option<ElementKey> {
        match self.chunks.get_mut(&cell.chunk) {
            Some(chunk) => chunk.set(cell.local, key),
            None => None,
        }
    }
}
