use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::core::coords::NEIGHBORS_8;
use crate::core::CellPos;

use super::ScanView;

/// Shortest 8-connected path over matching cells from `seed` to the first cell
/// satisfying `is_goal`. Steps wrap across chunk borders.
pub(super) fn bfs_path<F>(view: &ScanView, seed: CellPos, is_goal: F) -> Option<Vec<CellPos>>
where
    F: Fn(CellPos) -> bool,
{
    let size = view.chunks.chunk_size();
    let mut parent: HashMap<CellPos, CellPos> = HashMap::new();
    let mut visited: HashSet<CellPos> = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(seed);
    queue.push_back(seed);

    while let Some(cell) = queue.pop_front() {
        if is_goal(cell) {
            let mut path = vec![cell];
            let mut cur = cell;
            while let Some(&prev) = parent.get(&cur) {
                path.push(prev);
                cur = prev;
            }
            path.reverse();
            return Some(path);
        }
        for (dx, dy) in NEIGHBORS_8 {
            let next = cell.offset(dx, dy, size);
            if visited.contains(&next) || !view.matches(next) {
                continue;
            }
            visited.insert(next);
            parent.insert(next, cell);
            queue.push_back(next);
        }
    }
    None
}

/// Every matching cell 8-connected to any cell of `start`.
pub(super) fn flood_fill(view: &ScanView, start: &[CellPos]) -> BTreeSet<CellPos> {
    let size = view.chunks.chunk_size();
    let mut out: BTreeSet<CellPos> = BTreeSet::new();
    let mut stack: Vec<CellPos> = Vec::with_capacity(start.len());

    for &cell in start {
        if out.insert(cell) {
            stack.push(cell);
        }
    }
    while let Some(cell) = stack.pop() {
        for (dx, dy) in NEIGHBORS_8 {
            let next = cell.offset(dx, dy, size);
            if out.contains(&next) || !view.matches(next) {
                continue;
            }
            out.insert(next);
            stack.push(next);
        }
    }
    out
}
