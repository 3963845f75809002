//! Profiling tool to identify performance bottlenecks

use std::time::Instant;

use fractal_world::assets::{AssetAssembler, CategoryRegistry};
use fractal_world::fractal::{GridParams, HeightMap};
use fractal_world::mesh::{MeshData, DEFAULT_SCALE_FACTOR};
use fractal_world::params::default_entities;
use fractal_world::slope::SlopeField;

fn main() -> fractal_world::Result<()> {
    let width = 800;
    let height = 600;
    let max_iterations = 100;
    let seed = 1337u64;

    println!("=== Performance Profiling ===");
    println!("Map size: {}x{} ({} cells), {} iterations", width, height, width * height, max_iterations);
    println!();

    let params = GridParams::new(width, height, -0.5, 0.0, 1.0, max_iterations)?;

    let start = Instant::now();
    let height_map = HeightMap::compute(&params)?;
    let field_time = start.elapsed();
    println!("Escape field + normalisation: {:?}", field_time);

    let start = Instant::now();
    let slope = SlopeField::derive(&height_map);
    let slope_time = start.elapsed();
    println!("Slope field: {:?}", slope_time);

    let start = Instant::now();
    let mesh = MeshData::build(&height_map, DEFAULT_SCALE_FACTOR)?;
    let mesh_time = start.elapsed();
    println!("Mesh: {:?} ({} vertices, {} triangles)", mesh_time, mesh.vertex_count(), mesh.triangle_count());

    let registry = CategoryRegistry::defaults();
    let mut categories: Vec<String> = default_entities(-0.5, 0.0).iter().map(|s| s.to_string()).collect();
    categories.extend(["bridge", "valley", "lake"].iter().map(|s| s.to_string()));

    let start = Instant::now();
    let manifest = AssetAssembler::new(&registry).assemble(&height_map, &slope, &categories, 1.0, seed)?;
    let asset_time = start.elapsed();
    println!("Asset placement: {:?} ({} assets)", asset_time, manifest.count());

    let total = field_time + slope_time + mesh_time + asset_time;
    let pct = |d: std::time::Duration| 100.0 * d.as_secs_f64() / total.as_secs_f64();
    println!("\n=== Summary ===");
    println!("Escape field:     {:>8.2}% ({:?})", pct(field_time), field_time);
    println!("Slope:            {:>8.2}% ({:?})", pct(slope_time), slope_time);
    println!("Mesh:             {:>8.2}% ({:?})", pct(mesh_time), mesh_time);
    println!("Assets:           {:>8.2}% ({:?})", pct(asset_time), asset_time);
    println!("─────────────────────────────────");
    println!("Total:            {:?}", total);

    Ok(())
}
