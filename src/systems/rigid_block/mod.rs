//! RigidBlock - a falling cluster of elements that moves as one piece
//!
//! Lifecycle: Spawned -> Falling -> Granularized (terminal).
//!
//! - Spawning rasterizes a shape template into block-owned elements, skipping
//!   cells that are missing, blocked or occupied.
//! - Each tick a falling block moves all of its elements or none of them. Any
//!   blocked target granularizes it in place.
//! - Rotation is a quarter turn clockwise; a rejected rotation restores the
//!   exact previous raster.
//! - Granularizing releases every element to the chunk simulation and drops the block.

mod block;
mod collision;
mod rasterize;
mod table;

pub use block::{BlockId, BlockMember, BlockState, RigidBlock};
pub use table::{BlockConfig, BlockControl, BlockEvent, BlockSpawn, BlockTable};
