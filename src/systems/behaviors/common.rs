//! Shared element physics: integration, target checks, collision and rest.

use crate::core::CellPos;
use crate::domain::ElementProps;
use crate::spatial::ElementKey;

use super::{Behavior, CellState, SimulationContext};

/// Horizontal speed below which a blocked element counts as resting.
pub const REST_THRESHOLD: f32 = 0.1;

/// Outcome of trying one or more movement targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    Moved,
    /// A target was free but a probability roll declined it.
    Open,
    Blocked,
}

impl Attempt {
    /// Combine two failed attempts; `Open` wins over `Blocked`.
    #[inline]
    pub fn or(self, other: Attempt) -> Attempt {
        match (self, other) {
            (Attempt::Moved, _) | (_, Attempt::Moved) => Attempt::Moved,
            (Attempt::Open, _) | (_, Attempt::Open) => Attempt::Open,
            _ => Attempt::Blocked,
        }
    }
}

/// Chance that `mover` sinks into `target`, if `target` is a free liquid lighter than it.
pub(super) fn sink_chance(
    ctx: &SimulationContext,
    mover: ElementKey,
    target: ElementKey,
    props: &ElementProps,
) -> Option<f32> {
    let mover = ctx.elements.get(mover)?;
    let target = ctx.elements.get(target)?;
    if mover.category().is_liquid() || !target.category().is_liquid() || target.contained_in_object() {
        return None;
    }
    let diff = mover.density - target.density;
    if diff <= 0.0 {
        return None;
    }
    Some(props.sink_speed * diff.min(1.0))
}

/// Could `key` move into `to` at all (ignoring probability rolls)?
pub(super) fn target_available(ctx: &SimulationContext, key: ElementKey, to: CellPos, allow_sink: bool) -> bool {
    match ctx.cell_state(to) {
        CellState::Empty => true,
        CellState::Occupied(other) if allow_sink => {
            let Some(mover) = ctx.elements.get(key) else {
                return false;
            };
            let props = ctx.table.props(mover.kind);
            sink_chance(ctx, key, other, props).map_or(false, |p| p > 0.0)
        }
        _ => false,
    }
}

/// Move into `to` if it is empty, or swap with a lighter liquid after a
/// `sink_speed x min(density diff, 1)` roll.
pub(super) fn try_target(
    ctx: &mut SimulationContext,
    key: ElementKey,
    to: CellPos,
    allow_sink: bool,
    props: &ElementProps,
) -> Attempt {
    match ctx.cell_state(to) {
        CellState::Empty => {
            ctx.move_element(key, to);
            Attempt::Moved
        }
        CellState::Occupied(other) if allow_sink => match sink_chance(ctx, key, other, props) {
            Some(p) if p > 0.0 => {
                if ctx.rng.chance(p) {
                    ctx.swap_elements(key, other);
                    Attempt::Moved
                } else {
                    Attempt::Open
                }
            }
            _ => Attempt::Blocked,
        },
        _ => Attempt::Blocked,
    }
}

/// Update contacts and velocities; returns the number of discrete steps this tick.
pub(super) fn integrate(ctx: &mut SimulationContext, key: ElementKey, props: &ElementProps) -> u32 {
    let size = ctx.chunk_size();
    let Some(cell) = ctx.elements.get(key).map(|e| e.cell) else {
        return 0;
    };
    let ground = ctx.cell_state(cell.offset(0, -1, size)).is_blocked();
    let ceiling = ctx.cell_state(cell.offset(0, 1, size)).is_blocked();

    let Some(el) = ctx.elements.get_mut(key) else {
        return 0;
    };
    el.touching_ground = ground;
    el.touching_ceiling = ceiling;

    if ground {
        el.horizontal_velocity *= 1.0 - props.friction;
    } else {
        el.fall_velocity += props.gravity;
    }
    el.fall_velocity *= 1.0 - props.drag;

    el.fall_velocity = el.fall_velocity.clamp(0.0, props.max_fall_velocity);
    el.horizontal_velocity = el
        .horizontal_velocity
        .clamp(-props.max_horizontal_velocity, props.max_horizontal_velocity);

    let speed = (el.fall_velocity * el.fall_velocity
        + el.horizontal_velocity * el.horizontal_velocity)
        .sqrt();
    (speed.ceil() as u32).max(1)
}

/// Sideways slide driven by horizontal velocity. Clears the velocity when blocked.
fn slide(ctx: &mut SimulationContext, key: ElementKey) -> bool {
    let Some((cell, hv)) = ctx.elements.get(key).map(|e| (e.cell, e.horizontal_velocity)) else {
        return false;
    };
    if hv.abs() < REST_THRESHOLD {
        return false;
    }
    let dir = if hv < 0.0 { -1 } else { 1 };
    let to = cell.offset(dir, 0, ctx.chunk_size());
    if ctx.cell_state(to).is_empty() {
        ctx.move_element(key, to);
        return true;
    }
    if let Some(el) = ctx.elements.get_mut(key) {
        el.horizontal_velocity = 0.0;
    }
    false
}

/// No valid move: turn part of the fall into random sideways motion.
pub(super) fn resolve_collision(ctx: &mut SimulationContext, key: ElementKey, props: &ElementProps, open: bool) {
    let sign = ctx.rng.sign() as f32;
    let Some(el) = ctx.elements.get_mut(key) else {
        return;
    };
    let impact = (el.fall_velocity * props.velocity_absorption).min(props.max_horizontal_velocity);
    el.horizontal_velocity = (el.horizontal_velocity + impact * sign)
        .clamp(-props.max_horizontal_velocity, props.max_horizontal_velocity);
    el.fall_velocity = 0.0;

    if el.horizontal_velocity.abs() < REST_THRESHOLD && !open {
        el.horizontal_velocity = 0.0;
        el.is_resting = true;
    } else {
        el.is_resting = false;
    }
}

/// Rest counters after the tick. Powders fall asleep after `sleep_after` resting ticks.
fn settle(ctx: &mut SimulationContext, key: ElementKey, props: &ElementProps, moved: bool) {
    let Some(el) = ctx.elements.get_mut(key) else {
        return;
    };
    if moved {
        el.is_resting = false;
        el.is_sleeping = false;
        el.rest_ticks = 0;
        return;
    }
    if !el.is_resting {
        el.rest_ticks = 0;
        return;
    }
    el.rest_ticks = el.rest_ticks.saturating_add(1);
    if el.category().can_sleep() && props.sleep_after > 0 && el.rest_ticks >= props.sleep_after {
        el.is_sleeping = true;
    }
}

/// Full per-tick update of one free element. Returns true if it moved.
pub(super) fn run(behavior: &dyn Behavior, ctx: &mut SimulationContext, key: ElementKey, props: &ElementProps) -> bool {
    let Some((cell, sleeping)) = ctx.elements.get(key).map(|e| (e.cell, e.is_sleeping)) else {
        return false;
    };

    if sleeping {
        if !behavior.should_wake(ctx, key, cell) {
            settle(ctx, key, props, false);
            return false;
        }
        if let Some(el) = ctx.elements.get_mut(key) {
            el.wake();
        }
    }

    let steps = integrate(ctx, key, props);
    let mut moved = false;
    let mut stalled = None;

    for _ in 0..steps {
        let Some(cell) = ctx.elements.get(key).map(|e| e.cell) else {
            return moved;
        };
        match behavior.try_step(ctx, key, cell, props) {
            Attempt::Moved => moved = true,
            other => {
                if slide(ctx, key) {
                    moved = true;
                    continue;
                }
                stalled = Some(other);
                break;
            }
        }
    }

    if let Some(last) = stalled {
        resolve_collision(ctx, key, props, last == Attempt::Open);
    }
    settle(ctx, key, props, moved);
    moved
}
