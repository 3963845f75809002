//! Slope (roughness) field derived from a height map.

use crate::fractal::HeightMap;
use crate::tilemap::Tilemap;

/// Gradient magnitude per cell, normalised by the field's own maximum.
#[derive(Clone, Debug, PartialEq)]
pub struct SlopeField {
    cells: Tilemap<f64>,
}

impl SlopeField {
    /// Central differences in the interior, one-sided differences on the
    /// border. An axis with a single sample has zero gradient along it.
    pub fn derive(height_map: &HeightMap) -> Self {
        let heights = height_map.tiles();
        let (width, height) = (heights.width, heights.height);
        let mut slope = Tilemap::new_with(width, height, 0.0f64);

        for y in 0..height {
            for x in 0..width {
                let gx = axis_gradient(width, x, |i| *heights.get(i, y));
                let gy = axis_gradient(height, y, |i| *heights.get(x, i));
                slope.set(x, y, (gx * gx + gy * gy).sqrt());
            }
        }

        let max = slope.as_slice().iter().cloned().fold(0.0f64, f64::max);
        if max > 0.0 {
            for v in slope.as_mut_slice() {
                *v /= max;
            }
        }

        Self { cells: slope }
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

    pub fn as_slice(&self) -> &[f64] {
        self.cells.as_slice()
    }
}

fn axis_gradient(len: usize, i: usize, sample: impl Fn(usize) -> f64) -> f64 {
    if len < 2 {
        0.0
    } else if i == 0 {
        sample(1) - sample(0)
    } else if i == len - 1 {
        sample(len - 1) - sample(len - 2)
    } else {
        (sample(i + 1) - sample(i - 1)) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> HeightMap {
        let values = (0..height)
            .flat_map(|_| (0..width).map(move |x| x as f64 / (width - 1) as f64))
            .collect();
        HeightMap::from_values(width, height, values).unwrap()
    }

    #[test]
    fn test_flat_map_has_zero_slope() {
        let flat = HeightMap::from_values(6, 4, vec![0.42; 24]).unwrap();
        let slope = SlopeField::derive(&flat);
        assert!(slope.as_slice().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_linear_ramp_is_uniform_after_normalisation() {
        let slope = SlopeField::derive(&ramp(5, 3));
        for &s in slope.as_slice() {
            assert!((s - 1.0).abs() < 1e-12, "expected uniform slope, got {}", s);
        }
    }

    #[test]
    fn test_values_normalised_to_unit_range() {
        let values = vec![
            0.0, 0.1, 0.9, 0.2,
            0.5, 0.3, 0.3, 1.0,
            0.0, 0.7, 0.2, 0.6,
        ];
        let slope = SlopeField::derive(&HeightMap::from_values(4, 3, values).unwrap());
        let max = slope.as_slice().iter().cloned().fold(0.0, f64::max);
        assert!((max - 1.0).abs() < 1e-12);
        assert!(slope.as_slice().iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn test_single_row_and_single_cell() {
        let row = HeightMap::from_values(3, 1, vec![0.0, 0.5, 1.0]).unwrap();
        let slope = SlopeField::derive(&row);
        assert_eq!(slope.as_slice(), &[1.0, 1.0, 1.0]);

        let cell = HeightMap::from_values(1, 1, vec![0.3]).unwrap();
        assert_eq!(SlopeField::derive(&cell).as_slice(), &[0.0]);
    }

    #[test]
    fn test_shape_matches_source() {
        let slope = SlopeField::derive(&ramp(7, 2));
        assert_eq!((slope.width(), slope.height()), (7, 2));
    }
}
