use std::collections::BTreeMap;

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::core::{Palette, Rgba};
use crate::domain::{ElementKind, ShapeTemplate};
use crate::systems::behaviors::SimulationContext;

use super::block::{BlockId, BlockState, RigidBlock};
use super::collision::{group_targets, shift_stays_in_chunks, target_free};
use super::rasterize::{clear_block, place_members, rasterize_spawn, restore_block};

/// Everything needed to spawn a block.
#[derive(Clone, Debug)]
pub struct BlockSpawn {
    /// Pivot position in world cells.
    pub anchor: (f32, f32),
    pub template: ShapeTemplate,
    /// Base tint, scaled per pixel by the template pixel's brightness.
    pub tint: Rgba,
    pub kind: ElementKind,
}

/// Player intents applied to falling blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockControl {
    pub move_left: bool,
    pub move_right: bool,
    pub fast_forward: bool,
}

impl BlockControl {
    /// -1, 0 or 1. Both intents cancel out.
    #[inline]
    pub fn horizontal(&self) -> i32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Cells per tick.
    pub fall_speed: f32,
    pub fast_forward_multiplier: f32,
    /// Granularizing younger than this many ticks is a game over.
    pub game_over_lifetime_ticks: u64,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            fall_speed: 1.0,
            fast_forward_multiplier: 2.0,
            game_over_lifetime_ticks: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockEvent {
    Granularized {
        block: BlockId,
        released: usize,
        game_over: bool,
    },
}

/// Owns every live block. Granularized blocks are removed immediately.
#[derive(Debug, Default)]
pub struct BlockTable {
    blocks: BTreeMap<BlockId, RigidBlock>,
    next_id: u32,
}

impl BlockTable {
    pub fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
            next_id: 1,
        }
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&RigidBlock> {
        self.blocks.get(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn ids(&self) -> Vec<BlockId> {
        self.blocks.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RigidBlock> + '_ {
        self.blocks.values()
    }

    /// Rasterize a new block. Its members are inserted without collision
    /// checks beyond skipping cells that cannot take an element.
    pub fn spawn(&mut self, ctx: &mut SimulationContext, spawn: &BlockSpawn) -> BlockId {
        let id = BlockId(self.next_id.max(1));
        self.next_id = id.0.wrapping_add(1);

        let mut block = RigidBlock {
            id,
            state: BlockState::Spawned,
            kind: spawn.kind,
            anchor: spawn.anchor,
            rotation: 0,
            members: Vec::new(),
            palette: Palette::default(),
            spawned_tick: ctx.tick,
        };
        rasterize_spawn(ctx, &mut block, spawn);
        debug!(
            "spawned block {:?} ({:?}) with {} elements at ({:.1}, {:.1})",
            id,
            spawn.kind,
            block.members.len(),
            spawn.anchor.0,
            spawn.anchor.1
        );
        self.blocks.insert(id, block);
        id
    }

    /// Quarter turn clockwise about the anchor. Returns false and leaves the
    /// raster untouched if any rotated cell is unavailable.
    pub fn rotate(&mut self, ctx: &mut SimulationContext, id: BlockId) -> bool {
        let Some(block) = self.blocks.get_mut(&id) else {
            return false;
        };
        if block.state == BlockState::Granularized {
            return false;
        }

        let size = ctx.chunk_size();
        let next_rotation = (block.rotation + 1) % 4;
        let cleared = clear_block(ctx, block);

        let mut moves = Vec::with_capacity(cleared.len());
        for &(key, from) in cleared.iter() {
            let Some(member) = block.members.iter().find(|m| m.key == key) else {
                continue;
            };
            let to = block.member_world(member, next_rotation).to_cell(size);
            if !target_free(ctx, id, to) {
                restore_block(ctx, &cleared);
                return false;
            }
            moves.push((key, from, to));
        }

        place_members(ctx, &moves);
        block.rotation = next_rotation;
        true
    }

    /// Advance every block by one tick.
    pub fn step(&mut self, ctx: &mut SimulationContext, control: &BlockControl, config: &BlockConfig) -> Vec<BlockEvent> {
        let mut to_granularize = Vec::new();

        for block in self.blocks.values_mut() {
            if block.state == BlockState::Spawned {
                block.state = BlockState::Falling;
            }
            if block.members.is_empty() {
                to_granularize.push(block.id);
                continue;
            }

            let mut dx = control.horizontal();
            if dx != 0 && !shift_stays_in_chunks(ctx, block, dx) {
                dx = 0;
            }

            let speed = if control.fast_forward {
                config.fall_speed * config.fast_forward_multiplier
            } else {
                config.fall_speed
            };
            let new_y = block.anchor.1 - speed;
            let dy = new_y.floor() as i32 - block.anchor.1.floor() as i32;

            if dx == 0 && dy == 0 {
                block.anchor.1 = new_y;
                continue;
            }

            // One cell per sub-step so nothing in between is skipped. The
            // horizontal shift rides on the first one.
            let mut blocked = false;
            for i in 0..dy.unsigned_abs().max(1) {
                let step_dx = if i == 0 { dx } else { 0 };
                let Some(moves) = group_targets(ctx, block, step_dx, dy.signum()) else {
                    blocked = true;
                    break;
                };
                clear_block(ctx, block);
                place_members(ctx, &moves);
                block.anchor.0 += step_dx as f32;
                block.anchor.1 += dy.signum() as f32;
            }

            if blocked {
                to_granularize.push(block.id);
            } else {
                block.anchor.1 = new_y;
            }
        }

        to_granularize
            .into_iter()
            .filter_map(|id| self.granularize(ctx, id, config))
            .collect()
    }

    /// Release every member into the chunk simulation and drop the block.
    pub fn granularize(&mut self, ctx: &mut SimulationContext, id: BlockId, config: &BlockConfig) -> Option<BlockEvent> {
        let mut block = self.blocks.remove(&id)?;
        block.state = BlockState::Granularized;
        let size = ctx.chunk_size();

        let mut released = 0;
        for member in block.members.iter() {
            let expected = block.member_world(member, block.rotation).to_cell(size);
            let Some(cell) = ctx.elements.get(member.key).map(|e| e.cell) else {
                error!("block {:?} lost element {:?}", id, member.key);
                debug_assert!(false, "block member missing from arena");
                continue;
            };
            if cell != expected || ctx.chunks.occupant(cell) != Some(member.key) {
                error!("block {:?} element {:?} has a stale chunk binding", id, member.key);
                debug_assert!(false, "block member out of place");
                if ctx.chunks.occupant(cell) != Some(member.key) {
                    ctx.elements.remove(member.key);
                    continue;
                }
            }

            if let Some(el) = ctx.elements.get_mut(member.key) {
                el.block = None;
                el.is_resting = false;
                el.is_sleeping = false;
                el.rest_ticks = 0;
                el.fall_velocity = 0.0;
                el.horizontal_velocity = 0.0;
            }
            ctx.touch(cell);
            released += 1;
        }

        let lifetime = ctx.tick.saturating_sub(block.spawned_tick);
        let game_over = lifetime < config.game_over_lifetime_ticks;
        debug!(
            "block {:?} granularized after {} ticks, released {} elements{}",
            id,
            lifetime,
            released,
            if game_over { " (game over)" } else { "" }
        );
        Some(BlockEvent::Granularized {
            block: id,
            released,
            game_over,
        })
    }

    /// Forget every block. Their elements are left to the caller.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}
