use crate::core::CellPos;
use crate::spatial::ElementKey;
use crate::systems::behaviors::{CellState, SimulationContext};

use super::block::{BlockId, RigidBlock};

/// A block may enter `cell` if it is free or already held by one of its own elements.
#[inline]
pub(super) fn target_free(ctx: &SimulationContext, id: BlockId, cell: CellPos) -> bool {
    match ctx.cell_state(cell) {
        CellState::Empty => true,
        CellState::Occupied(key) => owned_by(ctx, key, id),
        _ => false,
    }
}

#[inline]
pub(super) fn owned_by(ctx: &SimulationContext, key: ElementKey, id: BlockId) -> bool {
    ctx.elements.get(key).and_then(|e| e.block) == Some(id)
}

/// Every member shifted by `dx` still lands inside an existing chunk.
pub(super) fn shift_stays_in_chunks(ctx: &SimulationContext, block: &RigidBlock, dx: i32) -> bool {
    let size = ctx.chunk_size();
    block.members.iter().all(|m| {
        ctx.elements
            .get(m.key)
            .map_or(false, |e| ctx.chunks.has_chunk(e.cell.offset(dx, 0, size).chunk))
    })
}

/// Targets for a whole-block move, or `None` if any one of them is blocked.
pub(super) fn group_targets(
    ctx: &SimulationContext,
    block: &RigidBlock,
    dx: i32,
    dy: i32,
) -> Option<Vec<(ElementKey, CellPos, CellPos)>> {
    let size = ctx.chunk_size();
    let mut out = Vec::with_capacity(block.members.len());
    for m in block.members.iter() {
        let from = ctx.elements.get(m.key)?.cell;
        let to = from.offset(dx, dy, size);
        if !target_free(ctx, block.id, to) {
            return None;
        }
        out.push((m.key, from, to));
    }
    Some(out)
}
