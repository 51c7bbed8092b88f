use log::{info, warn};

use crate::core::WorldPos;
use crate::spatial::ElementKey;

use super::events::EngineEvent;
use super::SimulationEngine;

/// One evacuation run: move up to `evacuation_batch` loose particles from
/// outside the zone into random empty zone cells, topmost rows first.
/// Without a zone they are removed. Finishes once nothing is left outside,
/// ignoring particles that were already placed in the zone and fell out of it.
pub(super) fn run_evacuation(engine: &mut SimulationEngine) {
    let size = engine.chunks.chunk_size();
    let zone = engine.settings.evacuation_zone;

    let evacuated = &engine.evacuated;
    let mut pending: Vec<(ElementKey, WorldPos)> = engine
        .elements
        .iter()
        .filter(|(key, el)| !el.contained_in_object() && !evacuated.contains(key))
        .map(|(key, el)| (key, el.cell.to_world(size)))
        .filter(|(_, pos)| zone.map_or(true, |z| !z.contains(*pos)))
        .collect();

    if pending.is_empty() {
        finish(engine);
        return;
    }

    pending.sort_by(|a, b| b.1.y.cmp(&a.1.y).then(a.1.x.cmp(&b.1.x)));
    pending.truncate(engine.settings.evacuation_batch);
    let retries = engine.settings.evacuation_retries;

    let evacuated = &mut engine.evacuated;
    let mut ctx = sim_context!(engine, false);
    for (key, from) in pending {
        let Some(zone) = zone else {
            ctx.remove_element(key);
            continue;
        };

        let mut placed = false;
        for _ in 0..retries {
            let x = ctx.rng.range_i32(zone.x, zone.x + zone.width);
            let y = ctx.rng.range_i32(zone.y, zone.y + zone.height);
            let target = WorldPos::new(x, y).to_cell(size);
            if ctx.cell_state(target).is_empty() {
                ctx.move_element(key, target);
                if let Some(el) = ctx.elements.get_mut(key) {
                    el.wake();
                }
                evacuated.insert(key);
                placed = true;
                break;
            }
        }
        if !placed {
            warn!("evacuation found no room for particle at ({}, {}), dropping it", from.x, from.y);
            ctx.remove_element(key);
        }
    }
}

fn finish(engine: &mut SimulationEngine) {
    if let Some(handle) = engine.evacuation_task.take() {
        engine.scheduler.cancel(handle);
    }
    engine.evacuated.clear();
    info!("evacuation finished at tick {}", engine.tick);
    engine.events.push(EngineEvent::EvacuationFinished);
}
