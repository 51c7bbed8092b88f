//! LightPowderBehavior - saw dust and flour
//!
//! Powder movement with reduced gravity and more drag (see the element table).
//! Each step rolls `spread_probability`; a failed roll limits the step to
//! straight down. Dust shuffles its candidates every step.

use crate::core::random::shuffle;
use crate::core::CellPos;
use crate::domain::ElementProps;
use crate::spatial::ElementKey;

use super::common::{try_target, Attempt};
use super::{Behavior, SimulationContext};

pub struct LightPowderBehavior {
    shuffle: bool,
}

impl LightPowderBehavior {
    pub fn new(shuffle: bool) -> Self {
        Self { shuffle }
    }
}

impl Behavior for LightPowderBehavior {
    fn try_step(&self, ctx: &mut SimulationContext, key: ElementKey, cell: CellPos, props: &ElementProps) -> Attempt {
        let size = ctx.chunk_size();
        let spread = ctx.rng.chance(props.spread_probability);

        let mut candidates: Vec<(i32, i32)> = Vec::with_capacity(3);
        candidates.push((0, -1));
        if spread {
            let first = ctx.rng.sign();
            candidates.push((first, -1));
            candidates.push((-first, -1));
        }
        if self.shuffle {
            shuffle(&mut *ctx.rng, &mut candidates);
        }

        let mut result = Attempt::Blocked;
        for (dx, dy) in candidates {
            let r = try_target(ctx, key, cell.offset(dx, dy, size), true, props);
            if r == Attempt::Moved {
                return r;
            }
            result = result.or(r);
        }

        // Diagonals skipped by the spread roll still count as available.
        if !spread && result == Attempt::Blocked {
            let open = [-1, 1]
                .into_iter()
                .any(|dx| ctx.cell_state(cell.offset(dx, -1, size)).is_empty());
            if open {
                result = Attempt::Open;
            }
        }
        result
    }
}
