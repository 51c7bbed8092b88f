use super::*;

use crate::domain::Category;
use crate::spatial::arena::ElementArena;

impl ChunkMap {
    // === Bulk introspection ===

    pub fn occupied_count(&self) -> usize {
        self.chunks.values().map(|c| c.occupied_count()).sum()
    }

    /// Fill ratio of one chunk, `None` when the chunk does not exist.
    pub fn percent_filled(&self, pos: ChunkPos) -> Option<f32> {
        self.chunks.get(&pos).map(|c| c.percent_filled())
    }

    /// Fill ratio over the whole map.
    pub fn total_percent_filled(&self) -> f32 {
        let slots = self.chunks.len() * (self.chunk_size * self.chunk_size) as usize;
        if slots == 0 {
            return 0.0;
        }
        self.occupied_count() as f32 / slots as f32
    }

    /// Does the chunk hold at least one element of `category`?
    pub fn contains_category(&self, arena: &ElementArena, pos: ChunkPos, category: Category) -> bool {
        let Some(chunk) = self.chunks.get(&pos) else {
            return false;
        };
        chunk
            .cells
            .iter()
            .flatten()
            .any(|key| arena.get(*key).map_or(false, |e| e.category() == category))
    }
}
