//! Spatial - where elements live
//!
//! - arena:  generational storage for every element
//! - chunks: sparse chunk map with per-chunk activity tracking

pub mod arena;
pub mod chunks;

pub use arena::{ElementArena, ElementKey};
pub use chunks::{Chunk, ChunkMap, WakePolicy, MAX_CHUNK_SIZE};
