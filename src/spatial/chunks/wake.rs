use super::*;

/// 4-connected first, diagonals after.
const WAKE_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

impl ChunkMap {
    /// Neighbor chunks a mutation at `cell` wakes under the current policy.
    /// Only existing chunks are returned.
    pub(super) fn neighbors_to_wake(&self, cell: CellPos) -> Vec<ChunkPos> {
        let count = if self.wake.diagonal { 8 } else { 4 };
        let last = self.chunk_size - 1;
        let mut out = Vec::with_capacity(count);

        for &(dx, dy) in &WAKE_OFFSETS[..count] {
            if self.wake.border_only {
                let on_x = match dx {
                    -1 => cell.local.x == 0,
                    1 => cell.local.x == last,
                    _ => true,
                };
                let on_y = match dy {
                    -1 => cell.local.y == 0,
                    1 => cell.local.y == last,
                    _ => true,
                };
                if !(on_x && on_y) {
                    continue;
                }
            }
            let pos = cell.chunk.offset(dx, dy);
            if self.chunks.contains_key(&pos) {
                out.push(pos);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(policy: WakePolicy) -> ChunkMap {
        let mut map = ChunkMap::new(4, policy);
        map.insert_rect(ChunkPos::new(-1, -1), 3, 3);
        map
    }

    fn cell(x: i32, y: i32) -> CellPos {
        CellPos::new(ChunkPos::new(0, 0), LocalPos::new(x, y))
    }

    #[test]
    fn interior_mutation_wakes_all_four_without_border_policy() {
        let m = map(WakePolicy { diagonal: false, border_only: false });
        assert_eq!(m.neighbors_to_wake(cell(1, 1)).len(), 4);
        let m = map(WakePolicy { diagonal: true, border_only: false });
        assert_eq!(m.neighbors_to_wake(cell(1, 1)).len(), 8);
    }

    #[test]
    fn border_only_wakes_the_shared_edges() {
        let m = map(WakePolicy { diagonal: true, border_only: true });
        assert!(m.neighbors_to_wake(cell(1, 2)).is_empty());

        let left_edge = m.neighbors_to_wake(cell(0, 2));
        assert_eq!(left_edge, vec![ChunkPos::new(-1, 0)]);

        let mut corner = m.neighbors_to_wake(cell(3, 0));
        corner.sort();
        let mut expected = vec![ChunkPos::new(1, 0), ChunkPos::new(0, -1), ChunkPos::new(1, -1)];
        expected.sort();
        assert_eq!(corner, expected);
    }

    #[test]
    fn end_tick_swaps_the_activity_buffers() {
        let mut m = map(WakePolicy::default());
        let c = cell(1, 1);
        m.mark_mutated(c);
        assert!(!m.is_active(c.chunk));
        m.end_tick();
        assert!(m.is_active(c.chunk));
        assert!(m.is_active(ChunkPos::new(-1, 0)));
        assert!(!m.is_active(ChunkPos::new(-1, -1)));
        m.end_tick();
        assert_eq!(m.active_count(), 0);
    }

    #[test]
    fn activation_between_ticks_is_immediate() {
        let mut m = map(WakePolicy { diagonal: false, border_only: true });
        m.activate(cell(2, 2));
        assert!(m.is_active(ChunkPos::new(0, 0)));
        assert_eq!(m.active_count(), 1);
    }
}
