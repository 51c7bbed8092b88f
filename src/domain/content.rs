//! Element property table
//!
//! Built-in tuning per kind, optionally patched from JSON. A patch is a partial
//! object merged over the built-in values, so `{"water": {"flow_speed": 0.5}}`
//! only touches one field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{EngineError, EngineResult, Palette, Rgba};

use super::elements::ElementKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementProps {
    pub density: f32,
    /// Fall velocity gained per tick
    pub gravity: f32,
    pub max_fall_velocity: f32,
    pub max_horizontal_velocity: f32,
    /// Fraction of horizontal velocity lost per tick while in contact
    pub friction: f32,
    /// Fraction of fall velocity lost per tick to air drag
    pub drag: f32,
    /// Fraction of fall velocity converted to sideways motion on impact
    pub velocity_absorption: f32,
    /// Scales the chance of sinking through a lighter liquid
    pub sink_speed: f32,
    /// Liquids: how many cells sideways a particle may disperse in one step
    pub dispersion_rate: i32,
    /// Liquids: chance of taking the nearest dispersion candidate
    pub flow_speed: f32,
    /// Light powders: chance a step may consider diagonals at all
    pub spread_probability: f32,
    /// Resting ticks before a powder falls asleep
    pub sleep_after: u32,
    pub palette: Vec<Rgba>,
}

impl ElementProps {
    pub fn builtin(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Sand => Self {
                density: 1.6,
                gravity: 0.5,
                max_fall_velocity: 4.0,
                max_horizontal_velocity: 2.0,
                friction: 0.35,
                drag: 0.0,
                velocity_absorption: 0.4,
                sink_speed: 0.6,
                dispersion_rate: 0,
                flow_speed: 0.0,
                spread_probability: 1.0,
                sleep_after: 6,
                palette: vec![
                    Rgba::opaque(219, 193, 120),
                    Rgba::opaque(207, 180, 106),
                    Rgba::opaque(230, 205, 139),
                ],
            },
            ElementKind::Water => Self {
                density: 1.0,
                gravity: 0.5,
                max_fall_velocity: 4.0,
                max_horizontal_velocity: 3.0,
                friction: 0.05,
                drag: 0.0,
                velocity_absorption: 0.6,
                sink_speed: 0.0,
                dispersion_rate: 4,
                flow_speed: 0.9,
                spread_probability: 1.0,
                sleep_after: 0,
                palette: vec![Rgba::opaque(52, 112, 199), Rgba::opaque(61, 124, 212)],
            },
            ElementKind::SawDust => Self {
                density: 0.7,
                gravity: 0.25,
                max_fall_velocity: 2.0,
                max_horizontal_velocity: 1.0,
                friction: 0.6,
                drag: 0.15,
                velocity_absorption: 0.2,
                sink_speed: 0.3,
                dispersion_rate: 0,
                flow_speed: 0.0,
                spread_probability: 0.5,
                sleep_after: 8,
                palette: vec![Rgba::opaque(168, 122, 74), Rgba::opaque(186, 140, 90)],
            },
            ElementKind::Flour => Self {
                density: 1.2,
                gravity: 0.3,
                max_fall_velocity: 2.5,
                max_horizontal_velocity: 1.0,
                friction: 0.5,
                drag: 0.1,
                velocity_absorption: 0.25,
                sink_speed: 0.4,
                dispersion_rate: 0,
                flow_speed: 0.0,
                spread_probability: 0.6,
                sleep_after: 8,
                palette: vec![Rgba::opaque(244, 240, 228), Rgba::opaque(234, 229, 214)],
            },
            ElementKind::Bricks => Self {
                density: 3.0,
                gravity: 0.0,
                max_fall_velocity: 0.0,
                max_horizontal_velocity: 0.0,
                friction: 1.0,
                drag: 0.0,
                velocity_absorption: 0.0,
                sink_speed: 0.0,
                dispersion_rate: 0,
                flow_speed: 0.0,
                spread_probability: 0.0,
                sleep_after: 0,
                palette: vec![Rgba::opaque(156, 64, 48), Rgba::opaque(140, 56, 44)],
            },
        }
    }
}

/// Per-kind properties plus the shared default palette for each kind.
#[derive(Clone, Debug)]
pub struct ElementTable {
    props: BTreeMap<ElementKind, ElementProps>,
    palettes: BTreeMap<ElementKind, Palette>,
}

impl ElementTable {
    pub fn builtin() -> Self {
        let mut props = BTreeMap::new();
        for kind in ElementKind::ALL {
            props.insert(kind, ElementProps::builtin(kind));
        }
        Self::from_props(props)
    }

    /// Built-in table with partial JSON patches applied per kind.
    pub fn with_overrides(overrides: &BTreeMap<ElementKind, Value>) -> EngineResult<Self> {
        let mut props = BTreeMap::new();
        for kind in ElementKind::ALL {
            let base = ElementProps::builtin(kind);
            let merged = match overrides.get(&kind) {
                Some(patch) => merge_props(base, patch)?,
                None => base,
            };
            props.insert(kind, merged);
        }
        Ok(Self::from_props(props))
    }

    fn from_props(props: BTreeMap<ElementKind, ElementProps>) -> Self {
        let palettes = props
            .iter()
            .map(|(k, p)| (*k, Palette::from_distinct(p.palette.iter().copied())))
            .collect();
        Self { props, palettes }
    }

    #[inline]
    pub fn props(&self, kind: ElementKind) -> &ElementProps {
        // Every kind is inserted by both constructors.
        &self.props[&kind]
    }

    #[inline]
    pub fn palette(&self, kind: ElementKind) -> &Palette {
        &self.palettes[&kind]
    }
}

impl Default for ElementTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn merge_props(base: ElementProps, patch: &Value) -> EngineResult<ElementProps> {
    let Value::Object(fields) = patch else {
        return Err(EngineError::InvalidSettings(format!(
            "element override must be an object, got {}",
            patch
        )));
    };
    let mut value = serde_json::to_value(base)?;
    if let Value::Object(target) = &mut value {
        for (k, v) in fields.iter() {
            if !target.contains_key(k) {
                return Err(EngineError::InvalidSettings(format!("unknown element property '{}'", k)));
            }
            target.insert(k.clone(), v.clone());
        }
    }
    Ok(serde_json::from_value(value)?)
}
