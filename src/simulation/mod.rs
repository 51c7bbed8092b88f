//! Simulation - the engine driven one `step()` per tick
//!
//! `SimulationEngine` only orchestrates; the work is delegated:
//! - step/:       chunk sweep (Sequential or FourSample), block sweep, due tasks
//! - commands/:   intents, spawning, removal, introspection
//! - rigid/:      block spawn/rotate and granularization follow-up
//! - scan/:       periodic connectivity scan and clearing with score
//! - evacuation/: game-over relocation of loose particles
//! - scheduler/:  tick-driven one-shot and periodic tasks
//! - init/:       construction and settings
//! - perf/:       optional per-step timing

use std::collections::BTreeSet;

use crate::core::{
    CellPos, ChunkPos, EngineResult, ObstacleOracle, Palette, RandomSource, Rgba, WorldPos,
};
use crate::domain::{Category, Element, ElementKind, ElementTable, ShapeTemplate};
use crate::spatial::{ChunkMap, ElementArena, ElementKey};
use crate::systems::behaviors::BehaviorRegistry;
use crate::systems::connectivity::{ConnectivityScanner, ScanMode};
use crate::systems::rigid_block::{BlockConfig, BlockControl, BlockId, BlockTable, RigidBlock};

/// Borrow the engine's state as a `SimulationContext`, field by field, so
/// the block table and behavior registry stay usable alongside it.
macro_rules! sim_context {
    ($engine:expr, $in_sweep:expr) => {
        $crate::systems::behaviors::SimulationContext {
            chunks: &mut $engine.chunks,
            elements: &mut $engine.elements,
            table: &$engine.table,
            obstacles: &*$engine.obstacles,
            rng: &mut *$engine.rng,
            tick: $engine.tick,
            in_sweep: $in_sweep,
            counters: Default::default(),
        }
    };
}

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "scheduler/scheduler.rs"]
mod scheduler;
#[path = "step/step.rs"]
mod step;
#[path = "step/chunk_processing.rs"]
mod chunk_processing;
#[path = "commands/commands.rs"]
mod commands;
#[path = "rigid/rigid.rs"]
mod rigid;
#[path = "scan/scan.rs"]
mod scan;
#[path = "evacuation/evacuation.rs"]
mod evacuation;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod events;
mod facade;

pub use events::EngineEvent;
pub use facade::World;
pub use perf_stats::PerfStats;
pub use scheduler::{Scheduler, TaskHandle, TaskKind};
pub use settings::{CellRect, ChunkLayout, ChunkOrdering, SimulationSettings};

/// Horizontal player intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalIntent {
    #[default]
    None,
    Left,
    Right,
}

/// The simulation world
pub struct SimulationEngine {
    settings: SimulationSettings,
    table: ElementTable,
    chunks: ChunkMap,
    elements: ElementArena,
    blocks: BlockTable,
    behaviors: BehaviorRegistry,
    scanner: ConnectivityScanner,
    scheduler: Scheduler,
    obstacles: Box<dyn ObstacleOracle>,
    rng: Box<dyn RandomSource>,

    // Player input
    control: BlockControl,
    block_config: BlockConfig,

    // Palettes of every spawned block still checked by the periodic scan
    scan_targets: Vec<Palette>,
    evacuation_task: Option<TaskHandle>,
    // Particles already moved into the zone once; never collected again
    evacuated: BTreeSet<ElementKey>,
    events: Vec<EngineEvent>,

    // State
    tick: u64,
    score: u64,
    game_over: bool,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl SimulationEngine {
    /// Build the world from validated settings, with no obstacles and a
    /// `SeededRandom` seeded from `settings.seed`.
    pub fn new(settings: SimulationSettings) -> EngineResult<Self> {
        init::create_engine(settings)
    }

    /// Build the world with explicit collaborators.
    pub fn with_sources(
        settings: SimulationSettings,
        obstacles: Box<dyn ObstacleOracle>,
        rng: Box<dyn RandomSource>,
    ) -> EngineResult<Self> {
        init::create_engine_with(settings, obstacles, rng)
    }

    /// Advance one tick.
    pub fn step(&mut self) {
        step::step(self);
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunks.chunk_size()
    }

    pub fn chunks(&self) -> &ChunkMap {
        &self.chunks
    }

    pub fn elements(&self) -> &ElementArena {
        &self.elements
    }

    pub fn element_table(&self) -> &ElementTable {
        &self.table
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn element(&self, key: ElementKey) -> Option<&Element> {
        self.elements.get(key)
    }

    /// Element occupying a world cell.
    pub fn element_at(&self, pos: WorldPos) -> Option<&Element> {
        let key = self.chunks.occupant(pos.to_cell(self.chunk_size()))?;
        self.elements.get(key)
    }

    pub fn block(&self, id: BlockId) -> Option<&RigidBlock> {
        self.blocks.get(id)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn active_chunk_count(&self) -> usize {
        self.chunks.active_count()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    // === Intents ===

    pub fn set_horizontal_intent(&mut self, intent: HorizontalIntent) {
        commands::set_horizontal_intent(self, intent);
    }

    pub fn set_move_left(&mut self, on: bool) {
        commands::set_move_left(self, on);
    }

    pub fn set_move_right(&mut self, on: bool) {
        commands::set_move_right(self, on);
    }

    pub fn set_fast_forward(&mut self, on: bool) {
        commands::set_fast_forward(self, on);
    }

    /// Rotate the most recently spawned falling block 90 degrees clockwise.
    /// Returns false when there is no block or the rotation is blocked.
    pub fn rotate(&mut self) -> bool {
        rigid::rotate_current(self)
    }

    // === Spawning ===

    /// Spawn a falling block. `anchor` is the template pivot in world cells.
    pub fn spawn_block(
        &mut self,
        anchor: (f32, f32),
        template: ShapeTemplate,
        tint: Rgba,
        kind: ElementKind,
    ) -> BlockId {
        rigid::spawn_block(self, anchor, template, tint, kind)
    }

    /// Place one loose element.
    pub fn spawn_element(&mut self, pos: WorldPos, kind: ElementKind) -> EngineResult<ElementKey> {
        commands::spawn_element(self, pos, kind)
    }

    /// Place a loose element that is removed again after `lifetime_ticks`.
    pub fn spawn_temporary(
        &mut self,
        pos: WorldPos,
        kind: ElementKind,
        lifetime_ticks: u64,
    ) -> EngineResult<ElementKey> {
        commands::spawn_temporary(self, pos, kind, lifetime_ticks)
    }

    /// Remove the loose element at `pos`. Block members are left alone.
    pub fn remove_element(&mut self, pos: WorldPos) -> bool {
        commands::remove_element(self, pos)
    }

    pub fn set_obstacles(&mut self, obstacles: Box<dyn ObstacleOracle>) {
        commands::set_obstacles(self, obstacles);
    }

    /// Drop every element, block and pending task and start over at tick 0.
    pub fn reset(&mut self) {
        commands::reset(self);
    }

    // === Scanning ===

    /// Explicit connectivity query. `kind` narrows matches to its category.
    pub fn scan(&self, kind: Option<ElementKind>, colors: &[Rgba], mode: ScanMode) -> BTreeSet<CellPos> {
        scan::query(self, kind.map(|k| k.category()), colors, mode)
    }

    /// Run the registered scan targets now and clear what they find.
    pub fn scan_and_clear(&mut self) -> usize {
        scan::run_scan(self)
    }

    /// Clear the given cells, scoring each loose element removed.
    pub fn clear_cells(&mut self, cells: &BTreeSet<CellPos>) -> usize {
        scan::clear_cells(self, cells)
    }

    // === Introspection ===

    pub fn percent_filled(&self, chunk: ChunkPos) -> Option<f32> {
        self.chunks.percent_filled(chunk)
    }

    pub fn total_percent_filled(&self) -> f32 {
        self.chunks.total_percent_filled()
    }

    pub fn contains_category(&self, chunk: ChunkPos, category: Category) -> bool {
        self.chunks.contains_category(&self.elements, chunk, category)
    }

    /// Take every event raised since the last call.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // === Perf ===

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Last step perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
