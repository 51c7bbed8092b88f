//! Sandtris Engine - falling sand and rigid blocks on a sparse chunk map
//!
//! Architecture:
//! - core/        - coordinates, colors, random source, obstacles, errors, logging
//! - domain/      - element kinds, per-kind properties, shape templates
//! - spatial/     - element arena and chunk map with activity tracking
//! - systems/     - particle behaviors, rigid blocks, connectivity scan
//! - simulation/  - the stepped engine and its wasm facade

pub mod core;
pub mod spatial;
pub mod domain;
pub mod systems;
pub mod simulation;

use wasm_bindgen::prelude::*;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine: panic hook and console logging.
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    crate::core::logging::init_logging(log::LevelFilter::Info);
    log::info!("sandtris engine {} initialized", env!("CARGO_PKG_VERSION"));
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use crate::core::{EngineError, EngineResult, ObstacleOracle, RandomSource, Rgba, WorldPos};
pub use domain::{Category, ElementKind, ShapeTemplate};
pub use simulation::{EngineEvent, HorizontalIntent, SimulationEngine, SimulationSettings, World};
pub use systems::connectivity::ScanMode;

// Element kind ids for JS
#[wasm_bindgen]
pub fn el_sand() -> u8 { ElementKind::Sand.id() }
#[wasm_bindgen]
pub fn el_water() -> u8 { ElementKind::Water.id() }
#[wasm_bindgen]
pub fn el_saw_dust() -> u8 { ElementKind::SawDust.id() }
#[wasm_bindgen]
pub fn el_flour() -> u8 { ElementKind::Flour.id() }
#[wasm_bindgen]
pub fn el_bricks() -> u8 { ElementKind::Bricks.id() }
