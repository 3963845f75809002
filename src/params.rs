//! World parameter record.
//!
//! This is what the description/keyword front end hands to the generator.
//! Every field has a default, so a partial JSON object is a valid record.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};
use crate::fractal::GridParams;

fn default_width() -> i64 { 800 }
fn default_height() -> i64 { 600 }
fn default_center_x() -> f64 { -0.5 }
fn default_zoom() -> f64 { 1.0 }
fn default_max_iterations() -> i64 { 100 }
fn default_density() -> f64 { 0.5 }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldParams {
    #[serde(default = "default_width")]
    pub width: i64,
    #[serde(default = "default_height")]
    pub height: i64,
    #[serde(default = "default_center_x")]
    pub center_x: f64,
    #[serde(default)]
    pub center_y: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: i64,
    /// Discretise the height map into 0.1 bands
    #[serde(default)]
    pub quantize: bool,
    /// Requested asset categories, in placement order
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default = "default_density")]
    pub entity_density: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            center_x: default_center_x(),
            center_y: 0.0,
            zoom: default_zoom(),
            max_iterations: default_max_iterations(),
            quantize: false,
            entities: Vec::new(),
            entity_density: default_density(),
            seed: None,
        }
    }
}

impl WorldParams {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Validated grid/window parameters.
    pub fn grid_params(&self) -> Result<GridParams> {
        let width = positive("width", self.width)?;
        let height = positive("height", self.height)?;
        let max_iterations = positive("max_iterations", self.max_iterations)?;
        let max_iterations = u32::try_from(max_iterations)
            .map_err(|_| WorldError::invalid("max_iterations", format!("{} is too large", self.max_iterations)))?;
        GridParams::new(width, height, self.center_x, self.center_y, self.zoom, max_iterations)
    }

    /// Requested categories, or a biome guess from the window centre when
    /// none were requested.
    pub fn resolved_entities(&self) -> Vec<String> {
        if !self.entities.is_empty() {
            return self.entities.clone();
        }
        default_entities(self.center_x, self.center_y)
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

fn positive(name: &'static str, value: i64) -> Result<usize> {
    if value <= 0 {
        return Err(WorldError::invalid(name, format!("must be greater than zero, got {}", value)));
    }
    usize::try_from(value).map_err(|_| WorldError::invalid(name, format!("{} is too large", value)))
}

/// Default categories by window centre: forest to the west, coast to the
/// north, desert in the south-east quadrant, mixed otherwise.
pub fn default_entities(center_x: f64, center_y: f64) -> &'static [&'static str] {
    if center_x < -0.7 {
        &["tree", "rock", "grass"]
    } else if center_y > 0.5 {
        &["water", "sand", "grass"]
    } else if center_x > 0.0 && center_y < 0.0 {
        &["cactus", "rock", "sand"]
    } else {
        &["tree", "grass", "flower", "rock"]
    }
}
