use crate::core::{CellPos, ChunkPos};
use crate::systems::behaviors::{BehaviorRegistry, SimulationContext, StepCounters};

use super::{ChunkOrdering, SimulationEngine};

/// FourSample pass order over `(x mod 2, y mod 2)`. Later passes see the
/// partial results of earlier ones within the same tick.
const FOUR_SAMPLE_PASSES: [(i32, i32); 4] = [(1, 1), (0, 0), (1, 0), (0, 1)];

/// Step every chunk that is active at the start of the tick.
pub(super) fn sweep(engine: &mut SimulationEngine) -> StepCounters {
    let order = sweep_order(&engine.chunks.active_positions(), engine.settings.ordering);
    let behaviors = &engine.behaviors;
    let mut ctx = sim_context!(engine, true);

    for pos in order {
        update_chunk(&mut ctx, behaviors, pos);
    }
    ctx.counters
}

/// Order in which `active` chunks are updated this tick.
pub(super) fn sweep_order(active: &[ChunkPos], ordering: ChunkOrdering) -> Vec<ChunkPos> {
    match ordering {
        ChunkOrdering::Sequential => active.to_vec(),
        ChunkOrdering::FourSample => FOUR_SAMPLE_PASSES
            .iter()
            .flat_map(|&(px, py)| {
                active
                    .iter()
                    .copied()
                    .filter(move |p| p.x.rem_euclid(2) == px && p.y.rem_euclid(2) == py)
            })
            .collect(),
    }
}

/// Simulate the loose elements of one chunk. Keys are snapshotted first; an
/// element that left its slot in the meantime is skipped here.
fn update_chunk(ctx: &mut SimulationContext, behaviors: &BehaviorRegistry, pos: ChunkPos) {
    let keys = match ctx.chunks.chunk(pos) {
        Some(chunk) if chunk.is_active => chunk.occupied_keys(),
        _ => return,
    };
    for (local, key) in keys {
        if ctx.chunks.occupant(CellPos::new(pos, local)) != Some(key) {
            continue;
        }
        behaviors.simulate(ctx, key);
    }
}
