use log::trace;

use super::perf_timer::{now_ms, timed};
use super::{chunk_processing, evacuation, rigid, scan, SimulationEngine, TaskKind};
use super::events::EngineEvent;

pub(super) fn step(engine: &mut SimulationEngine) {
    let perf_on = engine.perf_enabled;
    let step_started = perf_on.then(now_ms);
    if perf_on {
        engine.perf_stats.reset();
        engine.perf_stats.active_chunks = engine.chunks.active_count() as u32;
    }

    engine.tick += 1;

    // === CHUNK SWEEP ===
    // Mutations only mark chunks for the next tick; the flags are folded in
    // once every pass is done.
    let (counters, chunks_ms) = timed(perf_on, || chunk_processing::sweep(engine));
    engine.chunks.end_tick();

    // === BLOCK SWEEP ===
    let ((), blocks_ms) = timed(perf_on, || rigid::step_blocks(engine));

    // === TASKS ===
    let (tasks_run, tasks_ms) = timed(perf_on, || run_due_tasks(engine));

    trace!(
        "tick {}: simulated {} moved {} active chunks {}",
        engine.tick,
        counters.simulated,
        counters.moved,
        engine.chunks.active_count()
    );

    if let Some(started) = step_started {
        let stats = &mut engine.perf_stats;
        stats.chunks_ms = chunks_ms;
        stats.blocks_ms = blocks_ms;
        stats.tasks_ms = tasks_ms;
        stats.elements_simulated = counters.simulated;
        stats.elements_moved = counters.moved;
        stats.liquid_scans = counters.liquid_scans;
        stats.tasks_run = tasks_run;
        stats.element_count = engine.elements.len() as u32;
        stats.block_count = engine.blocks.len() as u32;
        stats.step_ms = now_ms() - started;
    }
}

/// Run every scheduled task that is due this tick.
pub(super) fn run_due_tasks(engine: &mut SimulationEngine) -> u32 {
    let due = engine.scheduler.poll(engine.tick);
    let count = due.len() as u32;
    for (_, kind) in due {
        match kind {
            TaskKind::ConnectivityScan => {
                let cleared = scan::run_scan(engine);
                if engine.perf_enabled {
                    engine.perf_stats.scans_run += 1;
                    engine.perf_stats.cells_cleared += cleared as u32;
                }
            }
            TaskKind::SpawnDue => engine.events.push(EngineEvent::SpawnDue),
            TaskKind::ExpireElement(key) => expire_element(engine, key),
            TaskKind::Evacuation => evacuation::run_evacuation(engine),
        }
    }
    count
}

/// Kill a temporary element. Already removed or block-owned elements are left alone.
fn expire_element(engine: &mut SimulationEngine, key: crate::spatial::ElementKey) {
    let owned = match engine.elements.get(key) {
        Some(el) => el.contained_in_object(),
        None => return,
    };
    if owned {
        return;
    }
    let mut ctx = sim_context!(engine, false);
    if ctx.remove_element(key).is_some() {
        engine.events.push(EngineEvent::ElementExpired);
    }
}
