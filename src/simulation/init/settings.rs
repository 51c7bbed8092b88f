use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{ChunkPos, EngineError, EngineResult, WorldPos};
use crate::domain::ElementKind;
use crate::spatial::{WakePolicy, MAX_CHUNK_SIZE};
use crate::systems::rigid_block::BlockConfig;

use super::perf_stats::PerfStats;
use super::SimulationEngine;

/// Order in which active chunks are stepped within one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkOrdering {
    /// Every active chunk once, row-major.
    Sequential,
    /// Four passes over `(x mod 2, y mod 2)`: (1,1), (0,0), (1,0), (0,1).
    #[default]
    FourSample,
}

/// Chunks created when the world is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkLayout {
    pub origin: ChunkPos,
    pub columns: i32,
    pub rows: i32,
    /// Sparse chunks outside the rectangle.
    pub extra: Vec<ChunkPos>,
}

impl Default for ChunkLayout {
    fn default() -> Self {
        Self {
            origin: ChunkPos::new(0, 0),
            columns: 3,
            rows: 6,
            extra: Vec::new(),
        }
    }
}

/// Axis-aligned rectangle in world cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CellRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn contains(&self, pos: WorldPos) -> bool {
        pos.x >= self.x && pos.x < self.x + self.width && pos.y >= self.y && pos.y < self.y + self.height
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub chunk_size: i32,
    pub layout: ChunkLayout,
    pub ordering: ChunkOrdering,
    pub wake_diagonal: bool,
    pub wake_border_only: bool,

    /// Cells per tick.
    pub block_fall_speed: f32,
    pub fast_forward_multiplier: f32,
    pub spawn_delay_ticks: u64,
    pub scan_interval_ticks: u64,
    pub game_over_lifetime_ticks: u64,
    pub points_per_cell: u64,

    pub evacuation_interval_ticks: u64,
    pub evacuation_batch: usize,
    pub evacuation_retries: u32,
    /// Without a zone, evacuated particles are removed.
    pub evacuation_zone: Option<CellRect>,

    pub seed: u64,
    /// Partial `ElementProps` objects merged over the built-in table.
    pub element_overrides: BTreeMap<ElementKind, Value>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            chunk_size: 32,
            layout: ChunkLayout::default(),
            ordering: ChunkOrdering::default(),
            wake_diagonal: true,
            wake_border_only: true,
            block_fall_speed: 1.0,
            fast_forward_multiplier: 2.0,
            spawn_delay_ticks: 30,
            scan_interval_ticks: 15,
            game_over_lifetime_ticks: 5,
            points_per_cell: 1,
            evacuation_interval_ticks: 2,
            evacuation_batch: 64,
            evacuation_retries: 8,
            evacuation_zone: None,
            seed: 0x5EED,
            element_overrides: BTreeMap::new(),
        }
    }
}

impl SimulationSettings {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let settings: SimulationSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |msg: &str| Err(EngineError::InvalidSettings(msg.to_string()));

        if self.chunk_size <= 0 {
            return invalid("chunk_size must be positive");
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return invalid("chunk_size is too large");
        }
        if self.layout.columns < 0 || self.layout.rows < 0 {
            return invalid("layout columns and rows must not be negative");
        }
        if (self.layout.columns == 0 || self.layout.rows == 0) && self.layout.extra.is_empty() {
            return invalid("layout creates no chunks");
        }
        if !self.block_fall_speed.is_finite() || self.block_fall_speed <= 0.0 {
            return invalid("block_fall_speed must be a positive number");
        }
        if !self.fast_forward_multiplier.is_finite() || self.fast_forward_multiplier < 1.0 {
            return invalid("fast_forward_multiplier must be at least 1");
        }
        if self.scan_interval_ticks == 0 {
            return invalid("scan_interval_ticks must be positive");
        }
        if self.evacuation_interval_ticks == 0 {
            return invalid("evacuation_interval_ticks must be positive");
        }
        if self.evacuation_batch == 0 {
            return invalid("evacuation_batch must be positive");
        }
        if let Some(zone) = self.evacuation_zone {
            if zone.width <= 0 || zone.height <= 0 {
                return invalid("evacuation_zone must have a positive size");
            }
        }
        Ok(())
    }

    pub fn wake_policy(&self) -> WakePolicy {
        WakePolicy {
            diagonal: self.wake_diagonal,
            border_only: self.wake_border_only,
        }
    }

    pub fn block_config(&self) -> BlockConfig {
        BlockConfig {
            fall_speed: self.block_fall_speed,
            fast_forward_multiplier: self.fast_forward_multiplier,
            game_over_lifetime_ticks: self.game_over_lifetime_ticks,
        }
    }
}

pub(super) fn enable_perf_metrics(engine: &mut SimulationEngine, enabled: bool) {
    engine.perf_enabled = enabled;
    if !enabled {
        engine.perf_stats = PerfStats::default();
    }
}

pub(super) fn get_perf_stats(engine: &SimulationEngine) -> PerfStats {
    engine.perf_stats.clone()
}
