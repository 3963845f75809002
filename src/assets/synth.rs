//! Per-instance asset properties.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::assets::placement::PlacementSite;
use crate::assets::profiles::{CategoryProfile, Rgb};
use crate::fractal::HeightMap;
use crate::seeds::rng_for;

/// Grid position plus world elevation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
    pub z: f64,
}

/// A placed asset. Written once by [`synthesize`], never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetInstance {
    #[serde(rename = "type")]
    pub category: String,
    pub height: f64,
    pub width: f64,
    pub color: Rgb,
    /// Degrees, in [0, 360)
    pub rotation: f64,
    pub position: Position,
}

/// Draw in `[lo, hi)`; returns `lo` for an empty range.
fn uniform(rng: &mut ChaCha8Rng, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.gen::<f64>()
}

/// Build one instance from a fresh generator seeded with `seed`.
///
/// Draw order is height, width, the three colour channels, then rotation.
/// `scale_factor` must match the one used for the terrain mesh so that
/// assets sit on its surface.
pub fn synthesize(
    category: &str,
    profile: &CategoryProfile,
    site: PlacementSite,
    height_map: &HeightMap,
    seed: u64,
    scale_factor: f64,
) -> AssetInstance {
    let mut rng = rng_for(seed);

    let height = uniform(&mut rng, profile.height_range.0, profile.height_range.1);
    let width = uniform(&mut rng, profile.width_range.0, profile.width_range.1);

    let (low, high) = profile.color_range;
    let mut color = [0.0; 3];
    for (channel, value) in color.iter_mut().enumerate() {
        *value = uniform(&mut rng, low[channel], high[channel]);
    }

    let rotation = rng.gen_range(0.0..360.0);

    AssetInstance {
        category: category.to_string(),
        height,
        width,
        color,
        rotation,
        position: Position {
            x: site.x,
            y: site.y,
            z: height_map.get(site.x, site.y) * scale_factor,
        },
    }
}
