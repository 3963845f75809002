//! Escape-time terrain source.
//!
//! The height field is the Mandelbrot escape index of each grid cell,
//! sampled over a rectangular window of the complex plane and normalised
//! by the iteration cap.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{Result, WorldError};
use crate::tilemap::Tilemap;

/// |z| above this radius counts as escaped.
pub const ESCAPE_RADIUS: f64 = 2.0;

/// Half-extent of the window on the real axis at zoom 1.
const HALF_SPAN_X: f64 = 1.5;
/// Half-extent of the window on the imaginary axis at zoom 1.
const HALF_SPAN_Y: f64 = 1.0;

/// Number of discrete bands used by [`HeightMap::quantized`].
pub const QUANTIZE_BANDS: f64 = 10.0;

/// Grid shape plus complex-plane window for one generation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridParams {
    width: usize,
    height: usize,
    center_x: f64,
    center_y: f64,
    zoom: f64,
    max_iterations: u32,
}

/// Window bounds on the complex plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl GridParams {
    pub fn new(
        width: usize,
        height: usize,
        center_x: f64,
        center_y: f64,
        zoom: f64,
        max_iterations: u32,
    ) -> Result<Self> {
        let params = Self { width, height, center_x, center_y, zoom, max_iterations };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(WorldError::invalid("width", "must be greater than zero"));
        }
        if self.height == 0 {
            return Err(WorldError::invalid("height", "must be greater than zero"));
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(WorldError::invalid("zoom", format!("must be a positive finite number, got {}", self.zoom)));
        }
        if self.max_iterations == 0 {
            return Err(WorldError::invalid("max_iterations", "must be greater than zero"));
        }
        if !(self.center_x.is_finite() && self.center_y.is_finite()) {
            return Err(WorldError::invalid("center", "coordinates must be finite"));
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.center_x, self.center_y)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn window(&self) -> Window {
        Window {
            x_min: self.center_x - HALF_SPAN_X / self.zoom,
            x_max: self.center_x + HALF_SPAN_X / self.zoom,
            y_min: self.center_y - HALF_SPAN_Y / self.zoom,
            y_max: self.center_y + HALF_SPAN_Y / self.zoom,
        }
    }

    /// Complex value sampled at grid cell (x, y). Samples are evenly spaced
    /// with both window edges included; a single sample sits on the lower edge.
    pub fn sample_point(&self, x: usize, y: usize) -> (f64, f64) {
        let w = self.window();
        (
            linspace_at(w.x_min, w.x_max, self.width, x),
            linspace_at(w.y_min, w.y_max, self.height, y),
        )
    }
}

fn linspace_at(start: f64, end: f64, count: usize, i: usize) -> f64 {
    if count <= 1 {
        return start;
    }
    if i == count - 1 {
        return end;
    }
    let step = (end - start) / (count - 1) as f64;
    start + i as f64 * step
}

/// Iteration index at which z <- z^2 + c first leaves the escape radius,
/// or `max_iterations` if it never does.
pub fn escape_index(c_re: f64, c_im: f64, max_iterations: u32) -> u32 {
    let (mut z_re, mut z_im) = (0.0f64, 0.0f64);
    for i in 0..max_iterations {
        let re = z_re * z_re - z_im * z_im + c_re;
        let im = z_re * z_im + z_im * z_re + c_im;
        z_re = re;
        z_im = im;
        if z_re.hypot(z_im) > ESCAPE_RADIUS {
            return i;
        }
    }
    max_iterations
}

/// Escape index for every cell of the grid. Rows are computed in parallel;
/// each cell depends only on its own `c`, so the output matches a
/// sequential scan exactly.
pub fn compute_escape_field(params: &GridParams) -> Tilemap<u32> {
    let width = params.width;
    let max_iter = params.max_iterations;
    let mut field = Tilemap::new_with(width, params.height, 0u32);

    field
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let (c_re, c_im) = params.sample_point(x, y);
                *cell = escape_index(c_re, c_im, max_iter);
            }
        });

    field
}

/// Summary statistics of a height map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Normalised elevation grid, every value in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    cells: Tilemap<f64>,
}

impl HeightMap {
    /// Run the escape-time iteration for `params` and normalise the result.
    pub fn compute(params: &GridParams) -> Result<Self> {
        params.validate()?;
        let field = compute_escape_field(params);
        let map = Self::from_escape_field(&field, params.max_iterations);
        debug!(
            width = params.width,
            height = params.height,
            max_iterations = params.max_iterations,
            "computed escape field"
        );
        Ok(map)
    }

    /// Divide escape indices by the iteration cap.
    pub fn from_escape_field(field: &Tilemap<u32>, max_iterations: u32) -> Self {
        let cap = max_iterations as f64;
        Self { cells: field.map(|&n| n as f64 / cap) }
    }

    /// Wrap externally produced values (e.g. a map loaded from disk).
    /// Every value must be finite and within [0, 1].
    pub fn from_values(width: usize, height: usize, values: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(WorldError::invalid("height_map", "dimensions must be greater than zero"));
        }
        if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(WorldError::invalid("height_map", format!("value {} outside [0, 1]", bad)));
        }
        let cells = Tilemap::from_vec(width, height, values).ok_or_else(|| {
            WorldError::invalid("height_map", format!("expected {} values for {}x{}", width * height, width, height))
        })?;
        Ok(Self { cells })
    }

    /// Discretise into fixed bands: `floor(h * 10) / 10`.
    pub fn quantized(&self) -> Self {
        Self { cells: self.cells.map(|&h| (h * QUANTIZE_BANDS).floor() / QUANTIZE_BANDS) }
    }

    pub fn width(&self) -> usize {
        self.cells.width
    }

    pub fn height(&self) -> usize {
        self.cells.height
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        *self.cells.get(x, y)
    }

    pub fn tiles(&self) -> &Tilemap<f64> {
        &self.cells
    }

    /// Row-major values, `width * height` long.
    pub fn as_slice(&self) -> &[f64] {
        self.cells.as_slice()
    }

    pub fn stats(&self) -> HeightStats {
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        let mut sum = 0.0;
        for &h in self.as_slice() {
            if h < min { min = h; }
            if h > max { max = h; }
            sum += h;
        }
        HeightStats { min, max, mean: sum / self.cells.len() as f64 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_params(width: usize, height: usize, max_iterations: u32) -> GridParams {
        GridParams::new(width, height, -0.5, 0.0, 1.0, max_iterations).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        assert!(matches!(
            GridParams::new(0, 10, -0.5, 0.0, 1.0, 50),
            Err(WorldError::InvalidParameter { name: "width", .. })
        ));
        assert!(matches!(
            GridParams::new(10, 0, -0.5, 0.0, 1.0, 50),
            Err(WorldError::InvalidParameter { name: "height", .. })
        ));
        assert!(matches!(
            GridParams::new(10, 10, -0.5, 0.0, 0.0, 50),
            Err(WorldError::InvalidParameter { name: "zoom", .. })
        ));
        assert!(matches!(
            GridParams::new(10, 10, -0.5, 0.0, -2.0, 50),
            Err(WorldError::InvalidParameter { name: "zoom", .. })
        ));
        assert!(matches!(
            GridParams::new(10, 10, -0.5, 0.0, 1.0, 0),
            Err(WorldError::InvalidParameter { name: "max_iterations", .. })
        ));
    }

    #[test]
    fn test_window_bounds() {
        let w = GridParams::new(4, 4, 0.25, -0.5, 2.0, 10).unwrap().window();
        assert!((w.x_min - (-0.5)).abs() < 1e-12);
        assert!((w.x_max - 1.0).abs() < 1e-12);
        assert!((w.y_min - (-1.0)).abs() < 1e-12);
        assert!((w.y_max - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_last_sample_lands_on_window_edge() {
        let params = GridParams::new(7, 3, 0.1, 0.3, 3.0, 10).unwrap();
        let w = params.window();
        assert_eq!(params.sample_point(6, 2), (w.x_max, w.y_max));
        assert_eq!(params.sample_point(0, 0), (w.x_min, w.y_min));
    }

    #[test]
    fn test_single_cell_matches_reference_trace() {
        let params = default_params(1, 1, 100);
        // Single sample sits on the lower-left window corner: c = -2 - 1i.
        let (c_re, c_im) = params.sample_point(0, 0);
        assert_eq!((c_re, c_im), (-2.0, -1.0));

        // Reference trace: z1 = c, |z1| = sqrt(5) > 2, escapes on index 0.
        let mut z = (0.0f64, 0.0f64);
        let mut expected = 100;
        for i in 0..100 {
            z = (z.0 * z.0 - z.1 * z.1 + c_re, 2.0 * z.0 * z.1 + c_im);
            if (z.0 * z.0 + z.1 * z.1).sqrt() > 2.0 {
                expected = i;
                break;
            }
        }
        let field = compute_escape_field(&params);
        assert_eq!(*field.get(0, 0), expected);
        assert_eq!(expected, 0);
    }

    #[test]
    fn test_interior_point_never_escapes() {
        assert_eq!(escape_index(0.0, 0.0, 64), 64);
        assert_eq!(escape_index(-1.0, 0.0, 64), 64);
    }

    #[test]
    fn test_known_escape_index() {
        // c = 1: z = 1, 2, 5 -> |z| first exceeds 2 at the third step (index 2).
        assert_eq!(escape_index(1.0, 0.0, 50), 2);
    }

    #[test]
    fn test_parallel_field_matches_sequential() {
        let params = GridParams::new(37, 23, -0.6, 0.1, 1.3, 80).unwrap();
        let field = compute_escape_field(&params);
        for y in 0..23 {
            for x in 0..37 {
                let (c_re, c_im) = params.sample_point(x, y);
                assert_eq!(*field.get(x, y), escape_index(c_re, c_im, 80));
            }
        }
    }

    #[test]
    fn test_height_map_in_unit_range() {
        let map = HeightMap::compute(&default_params(10, 10, 50)).unwrap();
        assert_eq!((map.width(), map.height()), (10, 10));
        assert!(map.as_slice().iter().all(|h| (0.0..=1.0).contains(h)));
        // The centre of the default window lies inside the set.
        let stats = map.stats();
        assert_eq!(stats.max, 1.0);
    }

    #[test]
    fn test_quantized_values_are_band_multiples() {
        let map = HeightMap::compute(&GridParams::new(32, 24, -0.65, 0.1, 1.5, 50).unwrap()).unwrap();
        let blocky = map.quantized();
        for &h in blocky.as_slice() {
            let bands = h * 10.0;
            assert!((bands - bands.round()).abs() < 1e-9, "{} is not a multiple of 0.1", h);
            assert!((0.0..=1.0).contains(&h));
        }
        // Quantisation is a post-process; the source map is untouched.
        assert_ne!(map, blocky);
    }

    #[test]
    fn test_from_values_validates_range_and_shape() {
        assert!(HeightMap::from_values(2, 2, vec![0.0, 0.5, 1.0, 0.2]).is_ok());
        assert!(HeightMap::from_values(2, 2, vec![0.0, 1.5, 1.0, 0.2]).is_err());
        assert!(HeightMap::from_values(2, 2, vec![0.0, 0.5, 1.0]).is_err());
        assert!(HeightMap::from_values(0, 2, vec![]).is_err());
    }
}
