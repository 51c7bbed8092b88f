//! Element Definitions
//!
//! An element is one simulated particle occupying exactly one cell. Behavior is
//! selected by `Category`; per-kind tuning lives in `content::ElementTable`.

use serde::{Deserialize, Serialize};

use crate::core::{CellPos, Palette, RandomSource, Rgba};
use crate::systems::rigid_block::BlockId;

use super::content::ElementProps;

/// Concrete particle kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Sand,
    Water,
    SawDust,
    Flour,
    Bricks,
}

/// Physics category - selects the operation table entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Powder,
    Liquid,
    LightPowder,
    Dust,
    Solid,
}

impl ElementKind {
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Sand,
        ElementKind::Water,
        ElementKind::SawDust,
        ElementKind::Flour,
        ElementKind::Bricks,
    ];

    #[inline]
    pub fn category(self) -> Category {
        match self {
            ElementKind::Sand => Category::Powder,
            ElementKind::Water => Category::Liquid,
            ElementKind::SawDust => Category::LightPowder,
            ElementKind::Flour => Category::Dust,
            ElementKind::Bricks => Category::Solid,
        }
    }

    /// Stable numeric id used by the JS facade.
    #[inline]
    pub fn id(self) -> u8 {
        match self {
            ElementKind::Sand => 1,
            ElementKind::Water => 2,
            ElementKind::SawDust => 3,
            ElementKind::Flour => 4,
            ElementKind::Bricks => 5,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        ElementKind::ALL.into_iter().find(|k| k.id() == id)
    }
}

impl Category {
    #[inline]
    pub fn is_liquid(self) -> bool {
        self == Category::Liquid
    }

    /// Everything but solids moves on its own.
    #[inline]
    pub fn is_movable(self) -> bool {
        self != Category::Solid
    }

    /// Liquids only rest, they never fall asleep.
    #[inline]
    pub fn can_sleep(self) -> bool {
        !matches!(self, Category::Liquid | Category::Solid)
    }
}

/// One particle. Owned by the element arena; the chunk slot at `cell` points back at it.
#[derive(Clone, Debug)]
pub struct Element {
    pub kind: ElementKind,
    /// Slot in the chunk map this element occupies.
    pub cell: CellPos,

    pub fall_velocity: f32,
    pub horizontal_velocity: f32,

    pub is_resting: bool,
    pub is_sleeping: bool,
    /// Consecutive simulated ticks spent resting.
    pub rest_ticks: u32,

    pub touching_ground: bool,
    pub touching_ceiling: bool,

    pub density: f32,
    pub palette: Palette,
    /// Rendered color, chosen once at creation.
    pub color: Rgba,

    /// Owning rigid block while `contained_in_object()`.
    pub block: Option<BlockId>,
    /// When false the element matches every color scan.
    pub color_participates: bool,
    /// Last tick this element was simulated; guards against a second update
    /// after it moved into a chunk processed later in the same sweep.
    pub last_step: u64,
}

impl Element {
    /// Free particle with a color drawn from the kind's palette.
    pub fn new(kind: ElementKind, cell: CellPos, props: &ElementProps, palette: Palette, rng: &mut dyn RandomSource) -> Self {
        let color = palette.pick(rng);
        Self::with_color(kind, cell, props, palette, color)
    }

    pub fn with_color(kind: ElementKind, cell: CellPos, props: &ElementProps, palette: Palette, color: Rgba) -> Self {
        Self {
            kind,
            cell,
            fall_velocity: 0.0,
            horizontal_velocity: 0.0,
            is_resting: false,
            is_sleeping: false,
            rest_ticks: 0,
            touching_ground: false,
            touching_ceiling: false,
            density: props.density,
            palette,
            color,
            block: None,
            color_participates: true,
            last_step: 0,
        }
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    #[inline]
    pub fn contained_in_object(&self) -> bool {
        self.block.is_some()
    }

    /// Wake from rest or sleep after a neighboring placement.
    #[inline]
    pub fn wake(&mut self) {
        self.is_resting = false;
        self.is_sleeping = false;
        self.rest_ticks = 0;
        self.fall_velocity = 0.0;
    }
}
