use crate::core::{CellPos, Palette, Rgba};
use crate::domain::{Element, ShapeTemplate};
use crate::spatial::ElementKey;
use crate::systems::behaviors::SimulationContext;

use super::block::{BlockMember, RigidBlock};
use super::table::BlockSpawn;

/// Build the block's elements from its template. Cells that are missing,
/// blocked or occupied are skipped without error.
pub(super) fn rasterize_spawn(ctx: &mut SimulationContext, block: &mut RigidBlock, spawn: &BlockSpawn) {
    let pixels = tinted_pixels(&spawn.template, spawn);
    block.palette = Palette::from_distinct(pixels.iter().map(|(_, c)| *c));

    let size = ctx.chunk_size();
    let table = ctx.table;
    let props = table.props(block.kind);
    let base = block.anchor_cell();
    for (offset, color) in pixels {
        let cell = base.offset(offset.0, offset.1).to_cell(size);
        let mut element = Element::with_color(block.kind, cell, props, block.palette.clone(), color);
        element.block = Some(block.id);
        if let Some(key) = ctx.place_element(element) {
            block.members.push(BlockMember { key, offset });
        }
    }
}

fn tinted_pixels(template: &ShapeTemplate, spawn: &BlockSpawn) -> Vec<((i32, i32), Rgba)> {
    template
        .opaque_pixels()
        .into_iter()
        .map(|(offset, px)| (offset, px.tinted_by(spawn.tint)))
        .collect()
}

/// Empty every member slot, returning what was cleared so it can be restored.
pub(super) fn clear_block(ctx: &mut SimulationContext, block: &RigidBlock) -> Vec<(ElementKey, CellPos)> {
    let mut cleared = Vec::with_capacity(block.members.len());
    for m in block.members.iter() {
        let Some(cell) = ctx.elements.get(m.key).map(|e| e.cell) else {
            continue;
        };
        if ctx.chunks.occupant(cell) == Some(m.key) {
            ctx.chunks.set_occupant(cell, None);
        }
        cleared.push((m.key, cell));
    }
    cleared
}

/// Put cleared members back exactly where they were.
pub(super) fn restore_block(ctx: &mut SimulationContext, cleared: &[(ElementKey, CellPos)]) {
    for &(key, cell) in cleared {
        ctx.chunks.set_occupant(cell, Some(key));
    }
}

/// Write members into new cells (slots must already be free).
pub(super) fn place_members(ctx: &mut SimulationContext, moves: &[(ElementKey, CellPos, CellPos)]) {
    for &(key, _, to) in moves {
        ctx.chunks.set_occupant(to, Some(key));
        if let Some(el) = ctx.elements.get_mut(key) {
            el.cell = to;
        }
    }
    for &(_, from, to) in moves {
        ctx.touch(from);
        ctx.touch(to);
    }
}
