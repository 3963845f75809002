//! Site selection: eligibility masks and seeded sampling.
//!
//! A cell is eligible when its height and slope sit inside the category's
//! window and the placement kind's own rule accepts it. A density-scaled
//! number of eligible cells is then drawn without replacement.

use rand::seq::index;
use tracing::debug;

use crate::assets::profiles::{CategoryProfile, PlacementKind};
use crate::fractal::HeightMap;
use crate::seeds::rng_for;
use crate::slope::SlopeField;
use crate::tilemap::Tilemap;

/// Heights at or below this level count as water.
pub const WATER_LEVEL: f64 = 0.3;
/// Upper slope bound for still water bodies.
const WATER_BODY_MAX_SLOPE: f64 = 0.1;
/// Highest ground a flowing water feature may follow.
const WATER_FLOW_MAX_HEIGHT: f64 = 0.5;
const WATER_FLOW_SLOPE: (f64, f64) = (0.05, 0.5);
/// A cell within this height of its neighbourhood minimum is a basin.
const DEPRESSION_TOLERANCE: f64 = 0.1;
/// Smallest side of the basin search window.
const DEPRESSION_MIN_WINDOW: usize = 5;
/// Placement count per sqrt(eligible cells), before density.
const COUNT_PER_SQRT_CELL: f64 = 0.1;

/// Grid coordinate chosen for an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlacementSite {
    pub x: usize,
    pub y: usize,
}

/// Boolean grid of cells a category may occupy.
pub fn eligibility_mask(
    height_map: &HeightMap,
    slope: &SlopeField,
    profile: &CategoryProfile,
) -> Tilemap<bool> {
    let window = height_map.tiles().zip_map(slope.tiles(), |&h, &s| {
        h >= profile.min_height
            && h <= profile.max_height
            && s >= profile.min_slope
            && s <= profile.max_slope
    });

    let kind = match profile.placement_kind {
        PlacementKind::Land | PlacementKind::Sky => return window,
        PlacementKind::Water => height_map.tiles().map(|&h| h <= WATER_LEVEL),
        PlacementKind::WaterBody => height_map
            .tiles()
            .zip_map(slope.tiles(), |&h, &s| h <= WATER_LEVEL && s <= WATER_BODY_MAX_SLOPE),
        PlacementKind::WaterFlow => height_map.tiles().zip_map(slope.tiles(), |&h, &s| {
            h <= WATER_FLOW_MAX_HEIGHT && s >= WATER_FLOW_SLOPE.0 && s <= WATER_FLOW_SLOPE.1
        }),
        PlacementKind::WaterCrossing => water_crossing_mask(height_map),
        PlacementKind::LandDepression => land_depression_mask(height_map),
    };

    window.zip_map(&kind, |&a, &b| a && b)
}

/// Cells where the one-step dilation of the water region overlaps the
/// one-step dilation of the land region: the shoreline band on both sides.
pub fn water_crossing_mask(height_map: &HeightMap) -> Tilemap<bool> {
    let water = height_map.tiles().map(|&h| h <= WATER_LEVEL);
    let land = water.map(|&w| !w);
    dilate(&water).zip_map(&dilate(&land), |&a, &b| a && b)
}

/// Cells whose height is within tolerance of the minimum over a square
/// neighbourhood of side `max(5, min(W, H) / 20)`.
pub fn land_depression_mask(height_map: &HeightMap) -> Tilemap<bool> {
    let side = depression_window(height_map.width(), height_map.height());
    let local_min = min_filter(height_map.tiles(), side);
    height_map
        .tiles()
        .zip_map(&local_min, |&h, &m| h - m < DEPRESSION_TOLERANCE)
}

pub fn depression_window(width: usize, height: usize) -> usize {
    DEPRESSION_MIN_WINDOW.max(width.min(height) / 20)
}

/// Binary dilation with the 4-connected cross; cells outside the grid are
/// treated as unset.
pub fn dilate(mask: &Tilemap<bool>) -> Tilemap<bool> {
    let (width, height) = (mask.width, mask.height);
    let mut out = Tilemap::new_with(width, height, false);
    for y in 0..height {
        for x in 0..width {
            let hit = *mask.get(x, y)
                || (x > 0 && *mask.get(x - 1, y))
                || (x + 1 < width && *mask.get(x + 1, y))
                || (y > 0 && *mask.get(x, y - 1))
                || (y + 1 < height && *mask.get(x, y + 1));
            out.set(x, y, hit);
        }
    }
    out
}

/// Minimum over a `side x side` window. For even sides the window reaches
/// one cell further back than forward. The window is clipped at the grid
/// edge. Computed separably, rows then columns.
pub fn min_filter(values: &Tilemap<f64>, side: usize) -> Tilemap<f64> {
    let back = side / 2;
    let forward = side.saturating_sub(1) - back;
    let (width, height) = (values.width, values.height);

    let mut rows = Tilemap::new_with(width, height, 0.0f64);
    for y in 0..height {
        for x in 0..width {
            let x0 = x.saturating_sub(back);
            let x1 = (x + forward).min(width - 1);
            let m = (x0..=x1).map(|i| *values.get(i, y)).fold(f64::INFINITY, f64::min);
            rows.set(x, y, m);
        }
    }

    let mut out = Tilemap::new_with(width, height, 0.0f64);
    for y in 0..height {
        let y0 = y.saturating_sub(back);
        let y1 = (y + forward).min(height - 1);
        for x in 0..width {
            let m = (y0..=y1).map(|j| *rows.get(x, j)).fold(f64::INFINITY, f64::min);
            out.set(x, y, m);
        }
    }
    out
}

/// Number of sites to draw from `eligible` cells at `density`.
///
/// `floor(sqrt(N) * 0.1)` scaled by density and truncated, at least one,
/// never more than `N`. Zero when nothing is eligible.
pub fn target_count(eligible: usize, density: f64) -> usize {
    if eligible == 0 {
        return 0;
    }
    let base = ((eligible as f64).sqrt() * COUNT_PER_SQRT_CELL).floor();
    let scaled = (base * density) as i64;
    (scaled.max(1) as usize).min(eligible)
}

/// Seeded selection of placement sites for one category.
///
/// Eligible cells are enumerated in row-major order; `target_count` of them
/// are drawn without replacement and returned in draw order.
pub fn find_sites(
    height_map: &HeightMap,
    slope: &SlopeField,
    profile: &CategoryProfile,
    density: f64,
    seed: u64,
) -> Vec<PlacementSite> {
    let mask = eligibility_mask(height_map, slope, profile);
    let candidates: Vec<PlacementSite> = mask
        .iter()
        .filter(|(_, _, &ok)| ok)
        .map(|(x, y, _)| PlacementSite { x, y })
        .collect();

    let count = target_count(candidates.len(), density);
    debug!(eligible = candidates.len(), count, seed, kind = ?profile.placement_kind, "selecting sites");
    if count == 0 {
        return Vec::new();
    }

    let mut rng = rng_for(seed);
    index::sample(&mut rng, candidates.len(), count)
        .into_iter()
        .map(|i| candidates[i])
        .collect()
}
