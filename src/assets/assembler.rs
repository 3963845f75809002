//! Runs placement and synthesis for every requested category.

use rayon::prelude::*;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

use crate::assets::placement::find_sites;
use crate::assets::profiles::CategoryRegistry;
use crate::assets::synth::{synthesize, AssetInstance};
use crate::error::{Result, WorldError};
use crate::fractal::HeightMap;
use crate::mesh::DEFAULT_SCALE_FACTOR;
use crate::seeds::{instance_seed, WorldSeeds};
use crate::slope::SlopeField;

/// Every asset produced by one run, plus the seed that reproduces it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WorldAssetManifest {
    pub seed: u64,
    pub assets: Vec<AssetInstance>,
}

impl WorldAssetManifest {
    pub fn count(&self) -> usize {
        self.assets.len()
    }

    /// Assets of one category, in manifest order.
    pub fn of_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a AssetInstance> + 'a {
        self.assets.iter().filter(move |a| a.category == category)
    }
}

impl Serialize for WorldAssetManifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("WorldAssetManifest", 3)?;
        state.serialize_field("seed", &self.seed)?;
        state.serialize_field("count", &self.assets.len())?;
        state.serialize_field("assets", &self.assets)?;
        state.end()
    }
}

/// Places assets against a fixed category registry.
pub struct AssetAssembler<'a> {
    registry: &'a CategoryRegistry,
    scale_factor: f64,
}

impl<'a> AssetAssembler<'a> {
    pub fn new(registry: &'a CategoryRegistry) -> Self {
        Self { registry, scale_factor: DEFAULT_SCALE_FACTOR }
    }

    /// Elevation multiplier for asset `z`; keep equal to the mesh's.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Category `i` is placed with seed `master + i`; its `j`-th site is
    /// synthesised with `master + i + j`. Output is ordered by category,
    /// then by draw order within the category.
    ///
    /// Categories run in parallel. Their seeds do not depend on one
    /// another, so the result is the same as a sequential run.
    pub fn assemble(
        &self,
        height_map: &HeightMap,
        slope: &SlopeField,
        categories: &[String],
        density: f64,
        master_seed: u64,
    ) -> Result<WorldAssetManifest> {
        if categories.is_empty() {
            return Err(WorldError::invalid("categories", "at least one category is required"));
        }
        if (height_map.width(), height_map.height()) != (slope.width(), slope.height()) {
            return Err(WorldError::invalid(
                "slope",
                format!(
                    "slope field is {}x{} but height map is {}x{}",
                    slope.width(), slope.height(), height_map.width(), height_map.height()
                ),
            ));
        }

        let seeds = WorldSeeds::from_master(master_seed);
        let per_category: Vec<Vec<AssetInstance>> = categories
            .par_iter()
            .enumerate()
            .map(|(i, name)| {
                let category_seed = seeds.category(i);
                let (profile, _) = self.registry.profile_or_default(name);
                let sites = find_sites(height_map, slope, profile, density, category_seed);
                debug!(category = %name, seed = category_seed, placed = sites.len(), "placed category");

                sites
                    .into_iter()
                    .enumerate()
                    .map(|(j, site)| {
                        synthesize(
                            name,
                            profile,
                            site,
                            height_map,
                            instance_seed(category_seed, j),
                            self.scale_factor,
                        )
                    })
                    .collect()
            })
            .collect();

        let assets: Vec<AssetInstance> = per_category.into_iter().flatten().collect();
        info!(seed = master_seed, categories = categories.len(), assets = assets.len(), "assembled world assets");

        Ok(WorldAssetManifest { seed: master_seed, assets })
    }
}
