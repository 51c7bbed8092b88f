use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::core::{EngineError, ObstacleSet, Rgba, WorldPos};
use crate::domain::{ElementKind, ShapeTemplate};

use super::perf_stats::PerfStats;
use super::{SimulationEngine, SimulationSettings};

fn js_error(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn kind_from_id(id: u8) -> Result<ElementKind, JsValue> {
    ElementKind::from_id(id).ok_or_else(|| js_error(EngineError::UnknownKind(id)))
}

/// One occupied cell as seen by the presentation layer.
#[derive(Serialize)]
struct CellSnapshot {
    x: i32,
    y: i32,
    kind: ElementKind,
    color: u32,
    block: Option<u32>,
}

#[derive(Serialize)]
struct Snapshot {
    tick: u64,
    score: u64,
    game_over: bool,
    cells: Vec<CellSnapshot>,
}

#[wasm_bindgen]
pub struct World {
    core: SimulationEngine,
    obstacles: ObstacleSet,
}

#[wasm_bindgen]
impl World {
    /// Create a world from optional settings JSON; missing fields take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<World, JsValue> {
        let settings = match settings_json {
            Some(json) => SimulationSettings::from_json(&json).map_err(js_error)?,
            None => SimulationSettings::default(),
        };
        let core = SimulationEngine::new(settings).map_err(js_error)?;
        Ok(Self {
            core,
            obstacles: ObstacleSet::new(),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn tick(&self) -> u64 { self.core.tick() }

    #[wasm_bindgen(getter)]
    pub fn score(&self) -> u64 { self.core.score() }

    #[wasm_bindgen(getter)]
    pub fn game_over(&self) -> bool { self.core.is_game_over() }

    #[wasm_bindgen(getter)]
    pub fn element_count(&self) -> u32 { self.core.element_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn block_count(&self) -> u32 { self.core.block_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn active_chunks(&self) -> u32 { self.core.active_chunk_count() as u32 }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Get last step perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }

    pub fn step(&mut self) {
        self.core.step();
    }

    pub fn step_n(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.core.step();
        }
    }

    // === INPUT ===

    pub fn set_move_left(&mut self, on: bool) {
        self.core.set_move_left(on);
    }

    pub fn set_move_right(&mut self, on: bool) {
        self.core.set_move_right(on);
    }

    pub fn set_fast_forward(&mut self, on: bool) {
        self.core.set_fast_forward(on);
    }

    pub fn rotate(&mut self) -> bool {
        self.core.rotate()
    }

    // === SPAWNING ===

    /// Spawn a falling block from a `width` x `height` RGBA image.
    /// `tint` is 0xRRGGBBAA. Returns the block id.
    pub fn spawn_block(
        &mut self,
        x: f32,
        y: f32,
        width: u32,
        height: u32,
        rgba: &[u8],
        tint: u32,
        kind: u8,
    ) -> Result<u32, JsValue> {
        let kind = kind_from_id(kind)?;
        let template = ShapeTemplate::from_rgba_bytes(width, height, rgba).map_err(js_error)?;
        let id = self.core.spawn_block((x, y), template, Rgba::from_u32(tint), kind);
        Ok(id.0)
    }

    pub fn spawn_element(&mut self, x: i32, y: i32, kind: u8) -> Result<(), JsValue> {
        let kind = kind_from_id(kind)?;
        self.core.spawn_element(WorldPos::new(x, y), kind).map_err(js_error)?;
        Ok(())
    }

    pub fn spawn_temporary(&mut self, x: i32, y: i32, kind: u8, lifetime_ticks: u32) -> Result<(), JsValue> {
        let kind = kind_from_id(kind)?;
        self.core
            .spawn_temporary(WorldPos::new(x, y), kind, lifetime_ticks as u64)
            .map_err(js_error)?;
        Ok(())
    }

    pub fn remove_element(&mut self, x: i32, y: i32) -> bool {
        self.core.remove_element(WorldPos::new(x, y))
    }

    pub fn reset(&mut self) {
        self.core.reset();
    }

    // === OBSTACLES ===

    pub fn add_obstacle_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.obstacles.insert_rect(WorldPos::new(x, y), width, height);
        self.core.set_obstacles(Box::new(self.obstacles.clone()));
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles = ObstacleSet::new();
        self.core.set_obstacles(Box::new(ObstacleSet::new()));
    }

    // === OUTPUT ===

    /// Events since the last call as a JSON array.
    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        let events = self.core.drain_events();
        serde_json::to_string(&events).map_err(|e| js_error(e.into()))
    }

    /// Every occupied cell with its color, for rendering.
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        let size = self.core.chunk_size();
        let cells = self
            .core
            .elements()
            .iter()
            .map(|(_, el)| {
                let pos = el.cell.to_world(size);
                CellSnapshot {
                    x: pos.x,
                    y: pos.y,
                    kind: el.kind,
                    color: el.color.to_u32(),
                    block: el.block.map(|b| b.0),
                }
            })
            .collect();
        let snapshot = Snapshot {
            tick: self.core.tick(),
            score: self.core.score(),
            game_over: self.core.is_game_over(),
            cells,
        };
        serde_json::to_string(&snapshot).map_err(|e| js_error(e.into()))
    }
}
