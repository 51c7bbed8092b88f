//! PowderBehavior - heavy granular particles (sand)
//!
//! Straight down first (into empty space, or sinking through a lighter
//! liquid), then the two lower diagonals in coin-flip order.

use crate::core::CellPos;
use crate::domain::ElementProps;
use crate::spatial::ElementKey;

use super::common::{try_target, Attempt};
use super::{Behavior, SimulationContext};

pub struct PowderBehavior;

impl PowderBehavior {
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for PowderBehavior {
    fn try_step(&self, ctx: &mut SimulationContext, key: ElementKey, cell: CellPos, props: &ElementProps) -> Attempt {
        let size = ctx.chunk_size();

        let mut result = try_target(ctx, key, cell.offset(0, -1, size), true, props);
        if result == Attempt::Moved {
            return result;
        }

        let first = ctx.rng.sign();
        for dx in [first, -first] {
            let r = try_target(ctx, key, cell.offset(dx, -1, size), true, props);
            if r == Attempt::Moved {
                return r;
            }
            result = result.or(r);
        }
        result
    }
}
