//! Test fixture shared by the behavior unit tests.

use std::collections::VecDeque;

use crate::core::{ChunkPos, ObstacleSet, Palette, RandomSource, Rgba, WorldPos};
use crate::domain::{Element, ElementKind, ElementProps, ElementTable};
use crate::spatial::{ChunkMap, ElementArena, ElementKey, WakePolicy};

use super::{SimulationContext, StepCounters};

/// Replays fixed outcomes. Running out is a test bug.
#[derive(Default)]
pub(crate) struct ScriptedRandom {
    floats: VecDeque<f32>,
    ints: VecDeque<i32>,
    pub calls: usize,
}

impl ScriptedRandom {
    pub fn floats(&mut self, values: &[f32]) {
        self.floats.extend(values.iter().copied());
    }

    pub fn ints(&mut self, values: &[i32]) {
        self.ints.extend(values.iter().copied());
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f32(&mut self) -> f32 {
        self.calls += 1;
        self.floats.pop_front().expect("scripted floats exhausted")
    }

    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        self.calls += 1;
        let v = self.ints.pop_front().expect("scripted ints exhausted");
        assert!(v >= lo && v < hi.max(lo + 1), "scripted int {} outside {}..{}", v, lo, hi);
        v
    }
}

/// 3x3 chunks of 4 cells, world cells 0..12 on both axes.
pub(crate) struct Fixture {
    pub chunks: ChunkMap,
    pub elements: ElementArena,
    pub table: ElementTable,
    pub obstacles: ObstacleSet,
    pub rng: ScriptedRandom,
    pub tick: u64,
}

impl Fixture {
    pub fn new() -> Self {
        let mut chunks = ChunkMap::new(4, WakePolicy::default());
        chunks.insert_rect(ChunkPos::new(0, 0), 3, 3);
        Self {
            chunks,
            elements: ElementArena::new(),
            table: ElementTable::builtin(),
            obstacles: ObstacleSet::new(),
            rng: ScriptedRandom::default(),
            tick: 1,
        }
    }

    pub fn ctx(&mut self) -> SimulationContext<'_> {
        SimulationContext {
            chunks: &mut self.chunks,
            elements: &mut self.elements,
            table: &self.table,
            obstacles: &self.obstacles,
            rng: &mut self.rng,
            tick: self.tick,
            in_sweep: false,
            counters: StepCounters::default(),
        }
    }

    pub fn props(&self, kind: ElementKind) -> ElementProps {
        self.table.props(kind).clone()
    }

    pub fn put(&mut self, kind: ElementKind, x: i32, y: i32) -> ElementKey {
        let cell = WorldPos::new(x, y).to_cell(4);
        let props = self.props(kind);
        let el = Element::with_color(kind, cell, &props, Palette::default(), Rgba::WHITE);
        self.ctx().place_element(el).unwrap()
    }

    /// Obstacle floor along row `y`, leaving `holes` open.
    pub fn floor(&mut self, y: i32, holes: &[i32]) {
        self.obstacles.insert_rect(WorldPos::new(0, y), 12, 1);
        for &x in holes {
            self.obstacles.remove(WorldPos::new(x, y));
        }
    }

    pub fn world(&self, key: ElementKey) -> WorldPos {
        self.elements.get(key).unwrap().cell.to_world(4)
    }

    pub fn cell(x: i32, y: i32) -> crate::core::CellPos {
        WorldPos::new(x, y).to_cell(4)
    }
}
