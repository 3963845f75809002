//! Fractal world generation library
//!
//! Escape-time terrain, derived slope and mesh, and seeded asset placement.
//! Re-exports modules for use by binaries and tools.

pub mod assets;
pub mod error;
pub mod export;
pub mod fractal;
pub mod logging;
pub mod mesh;
pub mod params;
pub mod seeds;
pub mod slope;
pub mod tilemap;
pub mod world;

pub use error::{Result, WorldError};
