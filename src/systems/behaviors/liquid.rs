//! LiquidBehavior - water
//!
//! Straight down first, then dispersion: each side is scanned up to
//! `dispersion_rate` cells along the current row. The first cell on that row
//! with free space below is a cliff; dropping into it is accepted with
//! `flow_speed`, decaying linearly with distance. Without a cliff the liquid
//! flows sideways to the farthest free cell. Sides alternate from a random start.
//!
//! Liquids never sleep; they only rest.

use crate::core::CellPos;
use crate::domain::ElementProps;
use crate::spatial::ElementKey;

use super::common::{try_target, Attempt};
use super::{Behavior, SimulationContext};

/// Result of scanning one side of the current row
struct ScanResult {
    /// Distance of the first cliff, if any.
    cliff: Option<i32>,
    /// Farthest free cell on the row before the first obstruction.
    reach: i32,
}

pub struct LiquidBehavior;

impl LiquidBehavior {
    pub fn new() -> Self {
        Self
    }

    fn scan_side(ctx: &mut SimulationContext, cell: CellPos, dir: i32, range: i32) -> ScanResult {
        let size = ctx.chunk_size();
        ctx.counters.liquid_scans += 1;

        let mut reach = 0;
        for d in 1..=range {
            if ctx.cell_state(cell.offset(dir * d, -1, size)).is_empty() {
                return ScanResult { cliff: Some(d), reach };
            }
            if !ctx.cell_state(cell.offset(dir * d, 0, size)).is_empty() {
                break;
            }
            reach = d;
        }
        ScanResult { cliff: None, reach }
    }

    /// `flow_speed` at distance 1, falling linearly towards `flow_speed / range` at the edge.
    #[inline]
    fn flow_chance(props: &ElementProps, distance: i32, range: i32) -> f32 {
        let falloff = (distance - 1) as f32 / range as f32;
        props.flow_speed * (1.0 - falloff)
    }
}

impl Behavior for LiquidBehavior {
    fn try_step(&self, ctx: &mut SimulationContext, key: ElementKey, cell: CellPos, props: &ElementProps) -> Attempt {
        let size = ctx.chunk_size();

        if try_target(ctx, key, cell.offset(0, -1, size), false, props) == Attempt::Moved {
            return Attempt::Moved;
        }

        let range = props.dispersion_rate;
        if range <= 0 {
            return Attempt::Blocked;
        }

        let first = ctx.rng.sign();
        let sides = [first, -first];
        let scans = [
            Self::scan_side(ctx, cell, sides[0], range),
            Self::scan_side(ctx, cell, sides[1], range),
        ];
        let mut result = Attempt::Blocked;

        // Cliffs, nearest first, alternating sides.
        for d in 1..=range {
            for (dir, scan) in sides.iter().zip(scans.iter()) {
                if scan.cliff != Some(d) {
                    continue;
                }
                result = Attempt::Open;
                if ctx.rng.chance(Self::flow_chance(props, d, range)) {
                    ctx.move_element(key, cell.offset(dir * d, -1, size));
                    return Attempt::Moved;
                }
            }
        }

        // Level flow along the row.
        for (dir, scan) in sides.iter().zip(scans.iter()) {
            if scan.cliff.is_some() || scan.reach == 0 {
                continue;
            }
            result = Attempt::Open;
            if ctx.rng.chance(props.flow_speed) {
                ctx.move_element(key, cell.offset(dir * scan.reach, 0, size));
                return Attempt::Moved;
            }
        }
        result
    }
}
