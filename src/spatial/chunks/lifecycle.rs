use super::*;

impl ChunkMap {
    // === Activity ===

    /// A cell changed during a tick: its chunk and the neighbors selected by the
    /// wake policy run next tick.
    #[inline]
    pub fn mark_mutated(&mut self, cell: CellPos) {
        if let Some(chunk) = self.chunks.get_mut(&cell.chunk) {
            chunk.is_active_next_frame = true;
        }
        for neighbor in self.neighbors_to_wake(cell) {
            if let Some(chunk) = self.chunks.get_mut(&neighbor) {
                chunk.is_active_next_frame = true;
            }
        }
    }

    /// Keep a chunk running next tick without waking anything around it.
    #[inline]
    pub fn keep_active(&mut self, pos: ChunkPos) {
        if let Some(chunk) = self.chunks.get_mut(&pos) {
            chunk.is_active_next_frame = true;
        }
    }

    /// A cell changed between ticks (command, clear, spawn). The chunk and its
    /// woken neighbors run on the very next sweep.
    pub fn activate(&mut self, cell: CellPos) {
        let mut targets = self.neighbors_to_wake(cell);
        targets.push(cell.chunk);
        for pos in targets {
            if let Some(chunk) = self.chunks.get_mut(&pos) {
                chunk.is_active = true;
                chunk.is_active_next_frame = true;
            }
        }
    }

    /// Between-tick activation of a single chunk, neighbors untouched.
    #[inline]
    pub fn activate_chunk(&mut self, pos: ChunkPos) {
        if let Some(chunk) = self.chunks.get_mut(&pos) {
            chunk.is_active = true;
            chunk.is_active_next_frame = true;
        }
    }

    /// Fold the mutation flags into the activity flags. Called once after the chunk sweep.
    pub fn end_tick(&mut self) {
        for chunk in self.chunks.values_mut() {
            chunk.is_active = chunk.is_active_next_frame;
            chunk.is_active_next_frame = false;
        }
    }

    #[inline]
    pub fn is_active(&self, pos: ChunkPos) -> bool {
        self.chunks.get(&pos).map_or(false, |c| c.is_active)
    }

    pub fn active_positions(&self) -> Vec<ChunkPos> {
        self.chunks
            .values()
            .filter(|c| c.is_active)
            .map(|c| c.pos)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.chunks.values().filter(|c| c.is_active).count()
    }

    /// Force every chunk to run next sweep.
    pub fn activate_all(&mut self) {
        for chunk in self.chunks.values_mut() {
            chunk.is_active = true;
            chunk.is_active_next_frame = true;
        }
    }
}
