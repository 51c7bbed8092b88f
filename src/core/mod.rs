//! Core - shared value types and the seams to external collaborators
//!
//! - coords:    world / chunk / local coordinates and wraparound normalization
//! - color:     RGBA colors and palettes used for rendering and color matching
//! - random:    seedable random source consumed by the physics
//! - obstacles: static collision oracle (tile geometry lives outside the engine)
//! - error:     command error type
//! - logging:   console logger for the `log` facade

pub mod coords;
pub mod color;
pub mod random;
pub mod obstacles;
pub mod error;
pub mod logging;

pub use coords::{CellPos, ChunkPos, LocalPos, WorldPos};
pub use color::{Palette, Rgba};
pub use error::{EngineError, EngineResult};
pub use obstacles::{NoObstacles, ObstacleOracle, ObstacleSet};
pub use random::{RandomSource, SeededRandom};
