//! Domain - what the simulation is made of
//!
//! - elements: particle kinds, physics categories and the `Element` record
//! - content:  per-kind tuning (`ElementTable`)
//! - template: block shape templates

pub mod elements;
pub mod content;
pub mod template;

pub use content::{ElementProps, ElementTable};
pub use elements::{Category, Element, ElementKind};
pub use template::{rotate_offset, ShapeTemplate};
