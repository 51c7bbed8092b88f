use log::{debug, info};

use crate::core::Rgba;
use crate::domain::{ElementKind, ShapeTemplate};
use crate::systems::rigid_block::{BlockEvent, BlockId, BlockSpawn};

use super::events::EngineEvent;
use super::{SimulationEngine, TaskKind};

pub(super) fn spawn_block(
    engine: &mut SimulationEngine,
    anchor: (f32, f32),
    template: ShapeTemplate,
    tint: Rgba,
    kind: ElementKind,
) -> BlockId {
    let spawn = BlockSpawn { anchor, template, tint, kind };
    let mut ctx = sim_context!(engine, false);
    let id = engine.blocks.spawn(&mut ctx, &spawn);

    if let Some(block) = engine.blocks.get(id) {
        let palette = block.palette().clone();
        if !engine.scan_targets.contains(&palette) {
            engine.scan_targets.push(palette);
        }
    }
    id
}

/// The block the player is steering: the most recently spawned live one.
pub(super) fn current_block(engine: &SimulationEngine) -> Option<BlockId> {
    engine.blocks.ids().last().copied()
}

pub(super) fn rotate_current(engine: &mut SimulationEngine) -> bool {
    let Some(id) = current_block(engine) else {
        return false;
    };
    let mut ctx = sim_context!(engine, false);
    engine.blocks.rotate(&mut ctx, id)
}

/// Move every falling block one tick and follow up on granularizations.
pub(super) fn step_blocks(engine: &mut SimulationEngine) {
    if engine.blocks.is_empty() {
        return;
    }
    let mut ctx = sim_context!(engine, false);
    let events = engine.blocks.step(&mut ctx, &engine.control, &engine.block_config);
    for event in events {
        on_block_event(engine, event);
    }
}

fn on_block_event(engine: &mut SimulationEngine, event: BlockEvent) {
    match event {
        BlockEvent::Granularized { block, released, game_over } => {
            debug!("block {:?} granularized, {} elements released", block, released);
            engine.events.push(EngineEvent::BlockGranularized { block });

            let interval = engine.settings.scan_interval_ticks;
            engine.scheduler.ensure_periodic(engine.tick, interval, TaskKind::ConnectivityScan);

            if game_over {
                enter_game_over(engine);
            } else if !engine.game_over {
                let delay = engine.settings.spawn_delay_ticks;
                engine.scheduler.schedule_once(engine.tick, delay, TaskKind::SpawnDue);
            }
        }
    }
}

fn enter_game_over(engine: &mut SimulationEngine) {
    if engine.game_over {
        return;
    }
    info!("game over at tick {} with score {}", engine.tick, engine.score);
    engine.game_over = true;
    engine.events.push(EngineEvent::GameOver);

    let interval = engine.settings.evacuation_interval_ticks;
    let handle = engine.scheduler.ensure_periodic(engine.tick, interval, TaskKind::Evacuation);
    engine.evacuation_task = Some(handle);
}
