use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use fractal_world::assets::CategoryRegistry;
use fractal_world::export;
use fractal_world::logging::init_logging;
use fractal_world::params::WorldParams;
use fractal_world::world::{generate_world, WorldData};
use fractal_world::Result;

#[derive(Parser, Debug)]
#[command(name = "fractal_world")]
#[command(about = "Generate fractal terrain and scatter assets across it")]
struct Args {
    /// Parameter record (JSON). Flags below override its fields.
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Width of the height map in cells
    #[arg(short = 'W', long)]
    width: Option<i64>,

    /// Height of the height map in cells
    #[arg(short = 'H', long)]
    height: Option<i64>,

    /// Real part of the window centre
    #[arg(long, allow_negative_numbers = true)]
    center_x: Option<f64>,

    /// Imaginary part of the window centre
    #[arg(long, allow_negative_numbers = true)]
    center_y: Option<f64>,

    /// Window zoom (window is 3/zoom wide, 2/zoom tall)
    #[arg(short, long)]
    zoom: Option<f64>,

    /// Iteration cap for the escape-time field
    #[arg(short = 'i', long)]
    max_iterations: Option<i64>,

    /// Discretise heights into 0.1 bands
    #[arg(short, long)]
    quantize: bool,

    /// Asset categories to place, comma separated (default: chosen from the window centre)
    #[arg(short, long, value_delimiter = ',')]
    entities: Vec<String>,

    /// Asset density multiplier
    #[arg(short, long)]
    density: Option<f64>,

    /// Master seed (a fresh one is drawn and reported if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory of custom category definitions (*.json)
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Write every registered category definition to this directory and exit
    #[arg(long)]
    dump_categories: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "world_output")]
    output: PathBuf,

    /// Skip PNG renders
    #[arg(long)]
    no_images: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn world_params(&self) -> Result<WorldParams> {
        let mut params = match &self.params {
            Some(path) => WorldParams::load(path)?,
            None => WorldParams::default(),
        };
        if let Some(v) = self.width { params.width = v; }
        if let Some(v) = self.height { params.height = v; }
        if let Some(v) = self.center_x { params.center_x = v; }
        if let Some(v) = self.center_y { params.center_y = v; }
        if let Some(v) = self.zoom { params.zoom = v; }
        if let Some(v) = self.max_iterations { params.max_iterations = v; }
        if let Some(v) = self.density { params.entity_density = v; }
        if self.seed.is_some() { params.seed = self.seed; }
        if self.quantize { params.quantize = true; }
        if !self.entities.is_empty() { params.entities = self.entities.clone(); }
        Ok(params)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let registry = match &args.assets_dir {
        Some(dir) => CategoryRegistry::load_from(dir)?,
        None => CategoryRegistry::defaults(),
    };
    info!(categories = registry.len(), "category registry ready");

    if let Some(dir) = &args.dump_categories {
        registry.save_dir(dir)?;
        info!(dir = %dir.display(), "wrote category definitions");
        return Ok(());
    }

    let params = args.world_params()?;
    let world = generate_world(&params, &registry)?;
    write_outputs(&world, &args.output, !args.no_images)?;

    info!(
        seed = world.seed(),
        assets = world.manifest.count(),
        categories = ?world.categories,
        output = %args.output.display(),
        "world generated"
    );
    Ok(())
}

fn write_outputs(world: &WorldData, dir: &Path, images: bool) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    export::save_height_map(&world.height_map, &dir.join("height_map.bin"))?;
    export::export_mesh_json(&world.mesh, &dir.join("terrain_mesh.json"))?;
    export::export_manifest_json(&world.manifest, &dir.join("assets.json"))?;

    if images {
        export::export_height_map_png(&world.height_map, &dir.join("height_map.png"))?;
        export::export_asset_overlay_png(&world.height_map, &world.manifest, &dir.join("asset_placement.png"))?;
    }
    Ok(())
}
