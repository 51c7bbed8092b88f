use log::debug;

use crate::core::{EngineError, EngineResult, ObstacleOracle, WorldPos};
use crate::domain::{Element, ElementKind};
use crate::spatial::ElementKey;
use crate::systems::behaviors::CellState;
use crate::systems::rigid_block::BlockControl;

use super::init::build_chunks;
use super::{HorizontalIntent, SimulationEngine, TaskKind};

pub(super) fn set_horizontal_intent(engine: &mut SimulationEngine, intent: HorizontalIntent) {
    engine.control.move_left = intent == HorizontalIntent::Left;
    engine.control.move_right = intent == HorizontalIntent::Right;
}

pub(super) fn set_move_left(engine: &mut SimulationEngine, on: bool) {
    engine.control.move_left = on;
}

pub(super) fn set_move_right(engine: &mut SimulationEngine, on: bool) {
    engine.control.move_right = on;
}

pub(super) fn set_fast_forward(engine: &mut SimulationEngine, on: bool) {
    engine.control.fast_forward = on;
}

pub(super) fn spawn_element(engine: &mut SimulationEngine, pos: WorldPos, kind: ElementKind) -> EngineResult<ElementKey> {
    let size = engine.chunks.chunk_size();
    let cell = pos.to_cell(size);
    let mut ctx = sim_context!(engine, false);

    match ctx.cell_state(cell) {
        CellState::Missing => return Err(EngineError::OutOfWorld { x: pos.x, y: pos.y }),
        CellState::Obstacle | CellState::Occupied(_) => {
            return Err(EngineError::Occupied { x: pos.x, y: pos.y })
        }
        CellState::Empty => {}
    }

    let table = ctx.table;
    let element = Element::new(kind, cell, table.props(kind), table.palette(kind).clone(), &mut *ctx.rng);
    ctx.place_element(element)
        .ok_or(EngineError::Occupied { x: pos.x, y: pos.y })
}

pub(super) fn spawn_temporary(
    engine: &mut SimulationEngine,
    pos: WorldPos,
    kind: ElementKind,
    lifetime_ticks: u64,
) -> EngineResult<ElementKey> {
    let key = spawn_element(engine, pos, kind)?;
    engine
        .scheduler
        .schedule_once(engine.tick, lifetime_ticks, TaskKind::ExpireElement(key));
    Ok(key)
}

pub(super) fn remove_element(engine: &mut SimulationEngine, pos: WorldPos) -> bool {
    let cell = pos.to_cell(engine.chunks.chunk_size());
    let Some(key) = engine.chunks.occupant(cell) else {
        return false;
    };
    if engine.elements.get(key).map_or(true, |el| el.contained_in_object()) {
        return false;
    }
    let mut ctx = sim_context!(engine, false);
    ctx.remove_element(key).is_some()
}

/// Swap the collision oracle. Every chunk is re-evaluated on the next tick.
pub(super) fn set_obstacles(engine: &mut SimulationEngine, obstacles: Box<dyn ObstacleOracle>) {
    engine.obstacles = obstacles;
    engine.chunks.activate_all();
}

pub(super) fn reset(engine: &mut SimulationEngine) {
    debug!("reset at tick {}", engine.tick);
    engine.chunks = build_chunks(&engine.settings);
    engine.elements.clear();
    engine.blocks.clear();
    engine.scheduler.clear();
    engine.control = BlockControl::default();
    engine.scan_targets.clear();
    engine.evacuation_task = None;
    engine.evacuated.clear();
    engine.events.clear();
    engine.tick = 0;
    engine.score = 0;
    engine.game_over = false;
    engine.perf_stats.reset();
}
