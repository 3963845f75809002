//! Asset placement: category profiles, site selection, per-instance
//! synthesis and the manifest that collects them.

pub mod assembler;
pub mod placement;
pub mod profiles;
pub mod synth;

pub use assembler::{AssetAssembler, WorldAssetManifest};
pub use placement::{find_sites, PlacementSite};
pub use profiles::{CategoryProfile, CategoryRegistry, PlacementKind, Rgb};
pub use synth::{synthesize, AssetInstance, Position};
