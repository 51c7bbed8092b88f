//! Periodic line scan and clearing
//!
//! Every palette registered by a spawned block is scanned color-only. The
//! union of all matches is cleared in one go and scored per cell.

use std::collections::BTreeSet;

use log::debug;

use crate::core::{CellPos, Palette, Rgba};
use crate::domain::Category;
use crate::systems::connectivity::{ScanMode, ScanQuery};

use super::events::EngineEvent;
use super::SimulationEngine;

pub(super) fn query(
    engine: &SimulationEngine,
    category: Option<Category>,
    colors: &[Rgba],
    mode: ScanMode,
) -> BTreeSet<CellPos> {
    let query = ScanQuery { category, colors };
    engine.scanner.scan(&engine.chunks, &engine.elements, query, mode)
}

/// Scan every registered target and clear the matches. Returns the number of cells cleared.
pub(super) fn run_scan(engine: &mut SimulationEngine) -> usize {
    prune_targets(engine);
    if engine.scan_targets.is_empty() {
        return 0;
    }

    let mut cells = BTreeSet::new();
    for palette in &engine.scan_targets {
        cells.extend(query(engine, None, palette.colors(), ScanMode::All));
    }
    if cells.is_empty() {
        return 0;
    }
    clear_cells(engine, &cells)
}

/// Forget palettes no element carries any more.
fn prune_targets(engine: &mut SimulationEngine) {
    let mut live: Vec<&Palette> = Vec::new();
    for (_, el) in engine.elements.iter() {
        if !live.contains(&&el.palette) {
            live.push(&el.palette);
        }
    }
    engine.scan_targets.retain(|p| live.contains(&p));
}

/// Remove the loose elements in `cells`, wake their chunks and raise the
/// score. Block members and empty cells are skipped.
pub(super) fn clear_cells(engine: &mut SimulationEngine, cells: &BTreeSet<CellPos>) -> usize {
    let mut ctx = sim_context!(engine, false);
    let mut count = 0;
    for &cell in cells {
        let Some(key) = ctx.chunks.occupant(cell) else {
            continue;
        };
        if ctx.elements.get(key).map_or(true, |el| el.contained_in_object()) {
            continue;
        }
        if ctx.remove_element(key).is_some() {
            count += 1;
        }
    }

    if count > 0 {
        let delta = count as u64 * engine.settings.points_per_cell;
        engine.score += delta;
        engine.events.push(EngineEvent::CellsCleared { count });
        engine.events.push(EngineEvent::Score { delta });
        debug!("cleared {} cells for {} points", count, delta);
    }
    count
}
