use serde::{Deserialize, Serialize};

use crate::core::{CellPos, Palette, WorldPos};
use crate::domain::{rotate_offset, ElementKind};
use crate::spatial::{ElementArena, ElementKey};

/// Index into the block table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    Spawned,
    Falling,
    Granularized,
}

/// One owned element and its unrotated template offset from the pivot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockMember {
    pub key: ElementKey,
    pub offset: (i32, i32),
}

#[derive(Clone, Debug)]
pub struct RigidBlock {
    pub(super) id: BlockId,
    pub(super) state: BlockState,
    pub(super) kind: ElementKind,
    /// Pivot position in world cells. The fractional part accumulates slow falls.
    pub(super) anchor: (f32, f32),
    /// Clockwise quarter turns applied to the template.
    pub(super) rotation: u8,
    pub(super) members: Vec<BlockMember>,
    pub(super) palette: Palette,
    pub(super) spawned_tick: u64,
}

impl RigidBlock {
    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> BlockState {
        self.state
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    #[inline]
    pub fn anchor(&self) -> (f32, f32) {
        self.anchor
    }

    #[inline]
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    #[inline]
    pub fn members(&self) -> &[BlockMember] {
        &self.members
    }

    /// Palette shared by every member, built from the rasterized colors.
    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn spawned_tick(&self) -> u64 {
        self.spawned_tick
    }

    /// World cell the pivot falls in.
    #[inline]
    pub fn anchor_cell(&self) -> WorldPos {
        WorldPos::new(self.anchor.0.floor() as i32, self.anchor.1.floor() as i32)
    }

    /// Where a member belongs for a given rotation.
    #[inline]
    pub(super) fn member_world(&self, member: &BlockMember, rotation: u8) -> WorldPos {
        let (dx, dy) = rotate_offset(member.offset, rotation);
        self.anchor_cell().offset(dx, dy)
    }

    /// Current cells of the members, read back from the arena.
    pub fn member_cells(&self, arena: &ElementArena) -> Vec<CellPos> {
        self.members
            .iter()
            .filter_map(|m| arena.get(m.key).map(|e| e.cell))
            .collect()
    }

    /// Member positions relative to the anchor cell, sorted.
    pub fn occupied_offsets(&self, arena: &ElementArena, chunk_size: i32) -> Vec<(i32, i32)> {
        let base = self.anchor_cell();
        let mut out: Vec<(i32, i32)> = self
            .member_cells(arena)
            .into_iter()
            .map(|c| {
                let w = c.to_world(chunk_size);
                (w.x - base.x, w.y - base.y)
            })
            .collect();
        out.sort_unstable();
        out
    }
}
