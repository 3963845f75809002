//! Persistence and visualisation of generated products.
//!
//! JSON for the asset manifest and mesh, a raw binary dump for the height
//! map, and PNG renders of the terrain with or without asset markers.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use image::{ImageBuffer, Rgb, RgbImage};
use serde::Serialize;

use crate::assets::WorldAssetManifest;
use crate::error::{Result, WorldError};
use crate::fractal::HeightMap;
use crate::mesh::MeshData;

const HEIGHT_MAP_MAGIC: [u8; 4] = *b"HMAP";

/// Header of a raw height map file. Values follow as `width * height`
/// row-major f64 in native byte order.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct HeightMapHeader {
    magic: [u8; 4],
    width: u32,
    height: u32,
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// `{seed, count, assets: [...]}`
pub fn export_manifest_json(manifest: &WorldAssetManifest, path: &Path) -> Result<()> {
    write_json(manifest, path)
}

/// `{vertices, faces, normals}`
pub fn export_mesh_json(mesh: &MeshData, path: &Path) -> Result<()> {
    write_json(mesh, path)
}

pub fn save_height_map(height_map: &HeightMap, path: &Path) -> Result<()> {
    let header = HeightMapHeader {
        magic: HEIGHT_MAP_MAGIC,
        width: dimension(height_map.width())?,
        height: dimension(height_map.height())?,
    };
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(bytemuck::bytes_of(&header))?;
    writer.write_all(bytemuck::cast_slice(height_map.as_slice()))?;
    writer.flush()?;
    Ok(())
}

fn dimension(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| WorldError::HeightMapFormat(format!("dimension {} exceeds u32", value)))
}

pub fn load_height_map(path: &Path) -> Result<HeightMap> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;

    let header_len = std::mem::size_of::<HeightMapHeader>();
    if bytes.len() < header_len {
        return Err(WorldError::HeightMapFormat("file shorter than header".to_string()));
    }
    let header: HeightMapHeader = bytemuck::pod_read_unaligned(&bytes[..header_len]);
    if header.magic != HEIGHT_MAP_MAGIC {
        return Err(WorldError::HeightMapFormat("bad magic".to_string()));
    }

    let (width, height) = (header.width as usize, header.height as usize);
    let body = &bytes[header_len..];
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(std::mem::size_of::<f64>()))
        .ok_or_else(|| WorldError::HeightMapFormat(format!("dimensions {}x{} overflow", width, height)))?;
    if body.len() != expected {
        return Err(WorldError::HeightMapFormat(format!(
            "expected {} bytes of data for {}x{}, found {}",
            expected, width, height, body.len()
        )));
    }
    let values: Vec<f64> = bytemuck::pod_collect_to_vec(body);
    HeightMap::from_values(width, height, values)
}

/// Nine-stop ramp: deep blue through cyan and green to yellow, orange,
/// red and dark red.
fn height_colormap(t: f64) -> [u8; 3] {
    const STOPS: [[f64; 3]; 9] = [
        [0.0, 0.0, 0.5],
        [0.0, 0.0, 1.0],
        [0.0, 0.5, 1.0],
        [0.0, 1.0, 1.0],
        [0.5, 1.0, 0.5],
        [1.0, 1.0, 0.0],
        [1.0, 0.5, 0.0],
        [1.0, 0.0, 0.0],
        [0.5, 0.0, 0.0],
    ];

    let t_scaled = t.clamp(0.0, 1.0) * 8.0;
    let idx = (t_scaled as usize).min(7);
    let frac = t_scaled - idx as f64;

    let c1 = STOPS[idx];
    let c2 = STOPS[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}

pub fn render_height_map(height_map: &HeightMap) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(height_map.width() as u32, height_map.height() as u32);
    for (x, y, &h) in height_map.tiles().iter() {
        img.put_pixel(x as u32, y as u32, Rgb(height_colormap(h)));
    }
    img
}

/// Height map render with a 3x3 marker, in the asset's own colour, at
/// every asset position.
pub fn render_asset_overlay(height_map: &HeightMap, manifest: &WorldAssetManifest) -> RgbImage {
    let mut img = render_height_map(height_map);
    let (w, h) = (img.width() as i64, img.height() as i64);

    for asset in &manifest.assets {
        let color = asset.color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
        let (ax, ay) = (asset.position.x as i64, asset.position.y as i64);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (px, py) = (ax + dx, ay + dy);
                if px >= 0 && px < w && py >= 0 && py < h {
                    img.put_pixel(px as u32, py as u32, Rgb(color));
                }
            }
        }
    }
    img
}

pub fn export_height_map_png(height_map: &HeightMap, path: &Path) -> Result<()> {
    render_height_map(height_map).save(path)?;
    Ok(())
}

pub fn export_asset_overlay_png(height_map: &HeightMap, manifest: &WorldAssetManifest, path: &Path) -> Result<()> {
    render_asset_overlay(height_map, manifest).save(path)?;
    Ok(())
}
