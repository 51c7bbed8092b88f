//! ConnectivityScanner - border-to-border line detection
//!
//! A line is a run of matching elements connecting the left edge of the
//! leftmost chunk column holding a match to the right edge of the rightmost
//! one. Matching: free element, optional category filter, and a palette color
//! equal (ignoring alpha) to one of the targets. Elements that do not take
//! part in color matching match any target.
//!
//! For each left-edge seed an 8-connected BFS looks for one path to the right
//! edge; the component touching that path is then flood-filled and added to
//! the result.

mod search;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::{CellPos, LocalPos, Rgba};
use crate::domain::Category;
use crate::spatial::{ChunkMap, ElementArena};

use search::{bfs_path, flood_fill};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Stop at the first seed that reaches the right edge.
    FirstMatch,
    /// Union the results of every seed.
    #[default]
    All,
}

/// What to look for.
#[derive(Clone, Copy, Debug)]
pub struct ScanQuery<'q> {
    /// `None` matches any category on color alone.
    pub category: Option<Category>,
    pub colors: &'q [Rgba],
}

/// Read-only view used while searching.
pub(crate) struct ScanView<'v> {
    pub(crate) chunks: &'v ChunkMap,
    pub(crate) elements: &'v ElementArena,
    pub(crate) query: ScanQuery<'v>,
}

impl<'v> ScanView<'v> {
    pub(crate) fn matches(&self, cell: CellPos) -> bool {
        let Some(key) = self.chunks.occupant(cell) else {
            return false;
        };
        let Some(el) = self.elements.get(key) else {
            return false;
        };
        if el.contained_in_object() {
            return false;
        }
        if let Some(category) = self.query.category {
            if el.category() != category {
                return false;
            }
        }
        !el.color_participates || el.palette.shares_color_with(self.query.colors)
    }
}

pub struct ConnectivityScanner;

impl ConnectivityScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn find_first(&self, chunks: &ChunkMap, elements: &ElementArena, query: ScanQuery) -> BTreeSet<CellPos> {
        self.scan(chunks, elements, query, ScanMode::FirstMatch)
    }

    pub fn find_all(&self, chunks: &ChunkMap, elements: &ElementArena, query: ScanQuery) -> BTreeSet<CellPos> {
        self.scan(chunks, elements, query, ScanMode::All)
    }

    /// Cells to clear for `query`; empty when no border-to-border line exists.
    pub fn scan(&self, chunks: &ChunkMap, elements: &ElementArena, query: ScanQuery, mode: ScanMode) -> BTreeSet<CellPos> {
        let view = ScanView { chunks, elements, query };
        let mut result = BTreeSet::new();

        let Some((min_x, max_x)) = Self::matching_column_range(&view) else {
            return result;
        };
        let size = chunks.chunk_size();

        for seed in Self::left_edge_seeds(&view, min_x) {
            if result.contains(&seed) {
                continue;
            }
            let Some(path) = bfs_path(&view, seed, |c| c.chunk.x == max_x && c.local.x == size - 1) else {
                continue;
            };
            result.extend(flood_fill(&view, &path));
            if mode == ScanMode::FirstMatch {
                break;
            }
        }
        result
    }

    /// Min and max chunk x over chunks holding at least one match.
    fn matching_column_range(view: &ScanView) -> Option<(i32, i32)> {
        let mut range: Option<(i32, i32)> = None;
        for chunk in view.chunks.iter() {
            let pos = chunk.pos();
            if let Some((lo, hi)) = range {
                if pos.x >= lo && pos.x <= hi {
                    continue;
                }
            }
            let has_match = chunk
                .occupied_keys()
                .into_iter()
                .any(|(local, _)| view.matches(CellPos::new(pos, local)));
            if has_match {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(pos.x), hi.max(pos.x)),
                    None => (pos.x, pos.x),
                });
            }
        }
        range
    }

    /// Matches in the first local column of the leftmost chunks, bottom up.
    fn left_edge_seeds(view: &ScanView, min_x: i32) -> Vec<CellPos> {
        let size = view.chunks.chunk_size();
        let mut seeds = Vec::new();
        for chunk in view.chunks.iter().filter(|c| c.pos().x == min_x) {
            for y in 0..size {
                let cell = CellPos::new(chunk.pos(), LocalPos::new(0, y));
                if view.matches(cell) {
                    seeds.push(cell);
                }
            }
        }
        seeds
    }
}

impl Default for ConnectivityScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChunkPos, Palette, WorldPos};
    use crate::domain::{Element, ElementKind, ElementProps};
    use crate::spatial::WakePolicy;

    const RED: Rgba = Rgba::opaque(220, 30, 30);
    const BLUE: Rgba = Rgba::opaque(30, 30, 220);

    struct Board {
        chunks: ChunkMap,
        elements: ElementArena,
    }

    impl Board {
        fn new(columns: i32, rows: i32) -> Self {
            let mut chunks = ChunkMap::new(4, WakePolicy::default());
            chunks.insert_rect(ChunkPos::new(0, 0), columns, rows);
            Self { chunks, elements: ElementArena::new() }
        }

        fn put(&mut self, kind: ElementKind, x: i32, y: i32, color: Rgba) -> crate::spatial::ElementKey {
            let cell = WorldPos::new(x, y).to_cell(4);
            let props = ElementProps::builtin(kind);
            let el = Element::with_color(kind, cell, &props, Palette::new(vec![color]), color);
            let key = self.elements.insert(el);
            self.chunks.set_occupant(cell, Some(key));
            key
        }

        fn row(&mut self, y: i32, xs: std::ops::Range<i32>, color: Rgba) {
            for x in xs {
                self.put(ElementKind::Sand, x, y, color);
            }
        }

        fn scan(&self, category: Option<Category>, colors: &[Rgba], mode: ScanMode) -> BTreeSet<WorldPos> {
            let query = ScanQuery { category, colors };
            ConnectivityScanner::new()
                .scan(&self.chunks, &self.elements, query, mode)
                .into_iter()
                .map(|c| c.to_world(4))
                .collect()
        }
    }

    #[test]
    fn full_row_across_three_chunks_is_one_line() {
        let mut board = Board::new(3, 1);
        board.row(0, 0..12, RED);

        let found = board.scan(None, &[RED], ScanMode::All);
        assert_eq!(found.len(), 12);
        assert!((0..12).all(|x| found.contains(&WorldPos::new(x, 0))));
    }

    #[test]
    fn a_gap_breaks_the_line() {
        let mut board = Board::new(3, 1);
        board.row(0, 0..6, RED);
        board.row(0, 7..12, RED);
        assert!(board.scan(None, &[RED], ScanMode::All).is_empty());
    }

    #[test]
    fn flood_fill_collects_attached_cells_only() {
        let mut board = Board::new(3, 2);
        board.row(0, 0..12, RED);
        // Attached diagonally above the line.
        board.put(ElementKind::Sand, 5, 1, RED);
        board.put(ElementKind::Sand, 6, 2, RED);
        // Same color but detached.
        board.put(ElementKind::Sand, 2, 6, RED);
        // Attached but a different color.
        board.put(ElementKind::Sand, 9, 1, BLUE);

        let found = board.scan(None, &[RED], ScanMode::All);
        assert_eq!(found.len(), 14);
        assert!(found.contains(&WorldPos::new(6, 2)));
        assert!(!found.contains(&WorldPos::new(2, 6)));
        assert!(!found.contains(&WorldPos::new(9, 1)));
    }

    #[test]
    fn diagonal_steps_connect_a_line() {
        let mut board = Board::new(2, 1);
        board.row(0, 0..4, RED);
        board.row(1, 4..8, RED);
        assert_eq!(board.scan(None, &[RED], ScanMode::All).len(), 8);
    }

    #[test]
    fn non_participating_elements_bridge_any_color() {
        let mut board = Board::new(2, 1);
        board.row(0, 0..3, RED);
        let key = board.put(ElementKind::Sand, 3, 0, BLUE);
        board.elements.get_mut(key).unwrap().color_participates = false;
        board.row(0, 4..8, RED);
        assert_eq!(board.scan(None, &[RED], ScanMode::All).len(), 8);
    }

    #[test]
    fn category_filter_and_block_ownership_exclude_elements() {
        let mut board = Board::new(2, 1);
        board.row(0, 0..8, RED);
        assert!(board.scan(Some(Category::Liquid), &[RED], ScanMode::All).is_empty());
        assert_eq!(board.scan(Some(Category::Powder), &[RED], ScanMode::All).len(), 8);

        let key = board.chunks.occupant(WorldPos::new(4, 0).to_cell(4)).unwrap();
        board.elements.get_mut(key).unwrap().block = Some(crate::systems::rigid_block::BlockId(1));
        assert!(board.scan(None, &[RED], ScanMode::All).is_empty());
    }

    #[test]
    fn first_match_stops_after_one_line() {
        let mut board = Board::new(2, 2);
        board.row(0, 0..8, RED);
        board.row(5, 0..8, RED);

        let all = board.scan(None, &[RED], ScanMode::All);
        assert_eq!(all.len(), 16);

        let first = board.scan(None, &[RED], ScanMode::FirstMatch);
        assert_eq!(first.len(), 8);
        assert!(first.contains(&WorldPos::new(0, 0)));
    }
}
