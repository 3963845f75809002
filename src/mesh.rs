//! Indexed triangle mesh built from a height map.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};
use crate::fractal::HeightMap;

/// Elevation multiplier shared by the mesh and asset positions.
pub const DEFAULT_SCALE_FACTOR: f64 = 50.0;

/// Up vector written for every vertex. Not derived from geometry.
const PLACEHOLDER_NORMAL: [f64; 3] = [0.0, 0.0, 1.0];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<[f64; 3]>,
    #[serde(rename = "faces")]
    pub triangles: Vec<[u32; 3]>,
    pub normals: Vec<[f64; 3]>,
}

impl MeshData {
    /// One vertex per grid cell, centred on the origin in x/y with
    /// elevation scaled by `scale_factor`. Each quad becomes
    /// `(i, i+1, i+W)` and `(i+1, i+W+1, i+W)`.
    ///
    /// Fails if the grid has more vertices than a `u32` index can address.
    pub fn build(height_map: &HeightMap, scale_factor: f64) -> Result<Self> {
        let width = height_map.width();
        let height = height_map.height();
        vertex_index_limit(width, height)?;
        let (w, h) = (width as f64, height as f64);

        let mut vertices = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                vertices.push([
                    (x as f64 - w / 2.0) / w,
                    (y as f64 - h / 2.0) / h,
                    height_map.get(x, y) * scale_factor,
                ]);
            }
        }

        let quads = width.saturating_sub(1) * height.saturating_sub(1);
        let mut triangles = Vec::with_capacity(quads * 2);
        // Every index is below `width * height`, which fits in u32.
        let stride = width as u32;
        for y in 0..height.saturating_sub(1) {
            for x in 0..width.saturating_sub(1) {
                let i = y as u32 * stride + x as u32;
                triangles.push([i, i + 1, i + stride]);
                triangles.push([i + 1, i + stride + 1, i + stride]);
            }
        }

        let normals = vec![PLACEHOLDER_NORMAL; vertices.len()];

        Ok(Self { vertices, triangles, normals })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

fn vertex_index_limit(width: usize, height: usize) -> Result<u32> {
    width
        .checked_mul(height)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            WorldError::invalid("height_map", format!("{}x{} grid exceeds u32 vertex indices", width, height))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_by_two_grid() {
        let map = HeightMap::from_values(2, 2, vec![0.0, 0.5, 0.25, 1.0]).unwrap();
        let mesh = MeshData::build(&map, DEFAULT_SCALE_FACTOR).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [1, 3, 2]]);
        assert!(mesh.triangles.iter().flatten().all(|&i| (i as usize) < mesh.vertex_count()));
        assert_eq!(mesh.normals.len(), 4);
    }

    #[test]
    fn test_vertex_positions_are_centred_and_scaled() {
        let map = HeightMap::from_values(2, 2, vec![0.0, 0.5, 0.25, 1.0]).unwrap();
        let mesh = MeshData::build(&map, 10.0).unwrap();
        assert_eq!(mesh.vertices[0], [-0.5, -0.5, 0.0]);
        assert_eq!(mesh.vertices[1], [0.0, -0.5, 5.0]);
        assert_eq!(mesh.vertices[2], [-0.5, 0.0, 2.5]);
        assert_eq!(mesh.vertices[3], [0.0, 0.0, 10.0]);
    }

    #[test]
    fn test_triangle_count_for_larger_grid() {
        let map = HeightMap::from_values(4, 3, vec![0.5; 12]).unwrap();
        let mesh = MeshData::build(&map, DEFAULT_SCALE_FACTOR).unwrap();
        assert_eq!(mesh.triangle_count(), 2 * 3 * 2);
        assert!(mesh.triangles.iter().flatten().all(|&i| i < 12));
    }

    #[test]
    fn test_degenerate_row_has_no_faces() {
        let map = HeightMap::from_values(3, 1, vec![0.1, 0.2, 0.3]).unwrap();
        let mesh = MeshData::build(&map, DEFAULT_SCALE_FACTOR).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.triangles.is_empty());
    }

    #[test]
    fn test_vertex_index_limit() {
        assert_eq!(vertex_index_limit(4, 3).unwrap(), 12);
        assert_eq!(vertex_index_limit(u32::MAX as usize, 1).unwrap(), u32::MAX);
        assert!(matches!(
            vertex_index_limit(u32::MAX as usize, 2),
            Err(WorldError::InvalidParameter { name: "height_map", .. })
        ));
        assert!(vertex_index_limit(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_serialises_with_faces_key() {
        let map = HeightMap::from_values(2, 2, vec![0.0; 4]).unwrap();
        let json = serde_json::to_value(MeshData::build(&map, 1.0).unwrap()).unwrap();
        assert!(json.get("faces").is_some());
        assert!(json.get("vertices").is_some());
        assert_eq!(json["normals"][0], serde_json::json!([0.0, 0.0, 1.0]));
    }
}
