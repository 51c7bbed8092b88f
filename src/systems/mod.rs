//! Systems - behavior that runs over the world state
//!
//! - behaviors:    per-category particle physics and the simulation context
//! - rigid_block:  falling multi-element blocks
//! - connectivity: border-to-border line detection

pub mod behaviors;
pub mod rigid_block;
pub mod connectivity;
