use std::collections::BTreeSet;

use log::info;

use crate::core::{EngineResult, NoObstacles, ObstacleOracle, RandomSource, SeededRandom};
use crate::domain::ElementTable;
use crate::spatial::{ChunkMap, ElementArena};
use crate::systems::behaviors::BehaviorRegistry;
use crate::systems::connectivity::ConnectivityScanner;
use crate::systems::rigid_block::{BlockControl, BlockTable};

use super::perf_stats::PerfStats;
use super::{Scheduler, SimulationEngine, SimulationSettings};

pub(super) fn create_engine(settings: SimulationSettings) -> EngineResult<SimulationEngine> {
    let rng = Box::new(SeededRandom::new(settings.seed));
    create_engine_with(settings, Box::new(NoObstacles), rng)
}

pub(super) fn create_engine_with(
    settings: SimulationSettings,
    obstacles: Box<dyn ObstacleOracle>,
    rng: Box<dyn RandomSource>,
) -> EngineResult<SimulationEngine> {
    settings.validate()?;
    let table = ElementTable::with_overrides(&settings.element_overrides)?;
    let chunks = build_chunks(&settings);

    info!(
        "world built: {} chunks of {}x{}, {:?} ordering",
        chunks.len(),
        settings.chunk_size,
        settings.chunk_size,
        settings.ordering
    );

    Ok(SimulationEngine {
        block_config: settings.block_config(),
        settings,
        table,
        chunks,
        elements: ElementArena::new(),
        blocks: BlockTable::new(),
        behaviors: BehaviorRegistry::new(),
        scanner: ConnectivityScanner::new(),
        scheduler: Scheduler::new(),
        obstacles,
        rng,
        control: BlockControl::default(),
        scan_targets: Vec::new(),
        evacuation_task: None,
        evacuated: BTreeSet::new(),
        events: Vec::new(),
        tick: 0,
        score: 0,
        game_over: false,
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    })
}

/// Chunks are created here and nowhere else.
pub(super) fn build_chunks(settings: &SimulationSettings) -> ChunkMap {
    let mut chunks = ChunkMap::new(settings.chunk_size, settings.wake_policy());
    let layout = &settings.layout;
    chunks.insert_rect(layout.origin, layout.columns, layout.rows);
    for pos in &layout.extra {
        chunks.insert_chunk(*pos);
    }
    chunks
}
