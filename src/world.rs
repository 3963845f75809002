//! World data container module
//!
//! Runs the full pipeline for one parameter record and bundles every
//! product (height map, slope, mesh, asset manifest) into one struct.

use tracing::info;

use crate::assets::{AssetAssembler, CategoryRegistry, WorldAssetManifest};
use crate::error::Result;
use crate::fractal::{GridParams, HeightMap};
use crate::mesh::{MeshData, DEFAULT_SCALE_FACTOR};
use crate::params::WorldParams;
use crate::seeds::WorldSeeds;
use crate::slope::SlopeField;

/// All generated world data bundled together
pub struct WorldData {
    /// Seed used for asset placement (allows recreation)
    pub seeds: WorldSeeds,
    /// Grid shape and complex-plane window
    pub grid: GridParams,
    /// Categories actually placed, after defaults were applied
    pub categories: Vec<String>,
    /// Normalised elevation (0.0-1.0)
    pub height_map: HeightMap,
    /// Normalised gradient magnitude (0.0-1.0)
    pub slope: SlopeField,
    pub mesh: MeshData,
    pub manifest: WorldAssetManifest,
}

impl WorldData {
    pub fn seed(&self) -> u64 {
        self.seeds.master
    }
}

/// Generate terrain and assets for `params`.
///
/// Parameters are validated before anything is computed. A missing seed is
/// replaced by a fresh one, reported in the result.
pub fn generate_world(params: &WorldParams, registry: &CategoryRegistry) -> Result<WorldData> {
    let grid = params.grid_params()?;
    let seeds = WorldSeeds::resolve(params.seed);
    let categories = params.resolved_entities();

    let (cx, cy) = grid.center();
    info!(
        width = grid.width(),
        height = grid.height(),
        center_x = cx,
        center_y = cy,
        zoom = grid.zoom(),
        max_iterations = grid.max_iterations(),
        "generating height map"
    );
    let mut height_map = HeightMap::compute(&grid)?;
    if params.quantize {
        height_map = height_map.quantized();
    }
    let stats = height_map.stats();
    info!(min = stats.min, max = stats.max, mean = stats.mean, quantized = params.quantize, "height map ready");

    let slope = SlopeField::derive(&height_map);
    let mesh = MeshData::build(&height_map, DEFAULT_SCALE_FACTOR)?;
    info!(vertices = mesh.vertex_count(), triangles = mesh.triangle_count(), "mesh built");

    let manifest = AssetAssembler::new(registry).assemble(
        &height_map,
        &slope,
        &categories,
        params.entity_density,
        seeds.master,
    )?;

    Ok(WorldData { seeds, grid, categories, height_map, slope, mesh, manifest })
}
