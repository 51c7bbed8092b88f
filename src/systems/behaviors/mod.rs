//! Behaviors - per-category particle physics
//!
//! Each category implements `Behavior::try_step`, one discrete movement step.
//! `simulate` wraps it with the shared integration (contacts, friction,
//! velocity clamp, step count) and the collision/rest bookkeeping in `common`.
//!
//! Everything a behavior touches is reached through `SimulationContext`.

mod common;
mod powder;
mod liquid;
mod light_powder;
#[cfg(test)]
pub(crate) mod testing;

pub use common::{Attempt, REST_THRESHOLD};
pub use light_powder::LightPowderBehavior;
pub use liquid::LiquidBehavior;
pub use powder::PowderBehavior;

use crate::core::coords::NEIGHBORS_8;
use crate::core::{CellPos, ObstacleOracle, RandomSource, WorldPos};
use crate::domain::{Category, Element, ElementProps, ElementTable};
use crate::spatial::{ChunkMap, ElementArena, ElementKey};

/// Work counters for one sweep.
#[derive(Clone, Copy, Debug, Default)]
pub struct StepCounters {
    pub simulated: u32,
    pub moved: u32,
    pub liquid_scans: u32,
}

/// What a cell holds from the point of view of a moving element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    /// No chunk covers the cell.
    Missing,
    Obstacle,
    Empty,
    Occupied(ElementKey),
}

impl CellState {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == CellState::Empty
    }

    #[inline]
    pub fn is_blocked(self) -> bool {
        !self.is_empty()
    }
}

/// Explicit handle to the simulation state, threaded through every call.
pub struct SimulationContext<'a> {
    pub chunks: &'a mut ChunkMap,
    pub elements: &'a mut ElementArena,
    pub table: &'a ElementTable,
    pub obstacles: &'a dyn ObstacleOracle,
    pub rng: &'a mut dyn RandomSource,
    pub tick: u64,
    /// True while the chunk sweep runs: mutations then wake chunks for the
    /// next tick instead of the current one.
    pub in_sweep: bool,
    pub counters: StepCounters,
}

impl<'a> SimulationContext<'a> {
    #[inline]
    pub fn chunk_size(&self) -> i32 {
        self.chunks.chunk_size()
    }

    #[inline]
    pub fn world_of(&self, cell: CellPos) -> WorldPos {
        cell.to_world(self.chunks.chunk_size())
    }

    pub fn cell_state(&self, cell: CellPos) -> CellState {
        let Some(chunk) = self.chunks.chunk(cell.chunk) else {
            return CellState::Missing;
        };
        if self.obstacles.is_obstacle(self.world_of(cell)) {
            return CellState::Obstacle;
        }
        match chunk.get(cell.local) {
            Some(key) => CellState::Occupied(key),
            None => CellState::Empty,
        }
    }

    /// Record a change at `cell` for activity tracking.
    #[inline]
    pub fn touch(&mut self, cell: CellPos) {
        if self.in_sweep {
            self.chunks.mark_mutated(cell);
        } else {
            self.chunks.activate(cell);
        }
    }

    #[inline]
    fn touch_chunk_of(&mut self, cell: CellPos) {
        if self.in_sweep {
            self.chunks.keep_active(cell.chunk);
        } else {
            self.chunks.activate_chunk(cell.chunk);
        }
    }

    /// Wake sleeping free elements around `cell` and make sure settled
    /// neighbors get re-evaluated.
    pub fn wake_sleepers_around(&mut self, cell: CellPos) {
        let size = self.chunk_size();
        for (dx, dy) in NEIGHBORS_8 {
            let n = cell.offset(dx, dy, size);
            let Some(key) = self.chunks.occupant(n) else {
                continue;
            };
            let Some(el) = self.elements.get_mut(key) else {
                continue;
            };
            if el.contained_in_object() || !el.is_resting {
                continue;
            }
            if el.is_sleeping {
                el.wake();
            }
            self.touch_chunk_of(n);
        }
    }

    /// Relocate an element into an empty cell.
    pub fn move_element(&mut self, key: ElementKey, to: CellPos) {
        let Some(from) = self.elements.get(key).map(|e| e.cell) else {
            return;
        };
        self.chunks.set_occupant(from, None);
        self.chunks.set_occupant(to, Some(key));
        if let Some(el) = self.elements.get_mut(key) {
            el.cell = to;
        }
        self.touch(from);
        self.touch(to);
        self.wake_sleepers_around(from);
        self.wake_sleepers_around(to);
    }

    /// Exchange two elements' cells. The displaced one is woken.
    pub fn swap_elements(&mut self, a: ElementKey, b: ElementKey) {
        let (Some(ca), Some(cb)) = (
            self.elements.get(a).map(|e| e.cell),
            self.elements.get(b).map(|e| e.cell),
        ) else {
            return;
        };
        self.chunks.set_occupant(ca, Some(b));
        self.chunks.set_occupant(cb, Some(a));
        if let Some(el) = self.elements.get_mut(a) {
            el.cell = cb;
        }
        if let Some(el) = self.elements.get_mut(b) {
            el.cell = ca;
            el.is_resting = false;
            el.is_sleeping = false;
            el.rest_ticks = 0;
        }
        self.touch(ca);
        self.touch(cb);
    }

    /// Insert an element at its own `cell`. Skipped (returns `None`) when the
    /// cell is missing, blocked by an obstacle or already occupied.
    pub fn place_element(&mut self, element: Element) -> Option<ElementKey> {
        let cell = element.cell;
        if !self.cell_state(cell).is_empty() {
            return None;
        }
        let key = self.elements.insert(element);
        self.chunks.set_occupant(cell, Some(key));
        self.touch(cell);
        self.wake_sleepers_around(cell);
        Some(key)
    }

    /// Delete an element and free its slot.
    pub fn remove_element(&mut self, key: ElementKey) -> Option<Element> {
        let element = self.elements.remove(key)?;
        let cell = element.cell;
        if self.chunks.occupant(cell) == Some(key) {
            self.chunks.set_occupant(cell, None);
        }
        self.touch(cell);
        self.wake_sleepers_around(cell);
        Some(element)
    }
}

/// One discrete movement step for a category.
pub trait Behavior {
    /// Try to move the element at `cell` by one step. `Attempt::Open` means a
    /// move was available but a probability roll declined it.
    fn try_step(&self, ctx: &mut SimulationContext, key: ElementKey, cell: CellPos, props: &ElementProps) -> Attempt;

    /// Cheap check for a sleeping element: is it worth waking?
    fn should_wake(&self, ctx: &mut SimulationContext, key: ElementKey, cell: CellPos) -> bool {
        let below = cell.offset(0, -1, ctx.chunk_size());
        common::target_available(ctx, key, below, true)
    }
}

/// Behavior registry - dispatch by category
pub struct BehaviorRegistry {
    powder: PowderBehavior,
    liquid: LiquidBehavior,
    light_powder: LightPowderBehavior,
    dust: LightPowderBehavior,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self {
            powder: PowderBehavior::new(),
            liquid: LiquidBehavior::new(),
            light_powder: LightPowderBehavior::new(false),
            dust: LightPowderBehavior::new(true),
        }
    }

    #[inline]
    pub fn get(&self, category: Category) -> Option<&dyn Behavior> {
        match category {
            Category::Powder => Some(&self.powder),
            Category::Liquid => Some(&self.liquid),
            Category::LightPowder => Some(&self.light_powder),
            Category::Dust => Some(&self.dust),
            Category::Solid => None,
        }
    }

    /// Simulate one free element for the current tick. Block-owned elements and
    /// elements already simulated this tick are left alone. Returns true if it moved.
    pub fn simulate(&self, ctx: &mut SimulationContext, key: ElementKey) -> bool {
        let Some(el) = ctx.elements.get_mut(key) else {
            return false;
        };
        if el.contained_in_object() || el.last_step == ctx.tick {
            return false;
        }
        el.last_step = ctx.tick;
        let kind = el.kind;
        ctx.counters.simulated += 1;

        let table = ctx.table;
        let props = table.props(kind);
        let moved = match self.get(kind.category()) {
            Some(behavior) => common::run(behavior, ctx, key, props),
            None => {
                // Solids have no autonomous motion.
                if let Some(el) = ctx.elements.get_mut(key) {
                    el.is_resting = true;
                }
                false
            }
        };

        if moved {
            ctx.counters.moved += 1;
        }
        if let Some(el) = ctx.elements.get(key) {
            if !el.is_resting {
                let chunk = el.cell.chunk;
                ctx.chunks.keep_active(chunk);
            }
        }
        moved
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
