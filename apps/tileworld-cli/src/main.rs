use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::{Mat4, Vec3};
use std::path::PathBuf;
use std::time::Duration;
use tileworld_assets::TextureStore;
use tileworld_kernel::{Level, World};
use tileworld_render::{
    CameraMatrices, DebugTextRenderer, GridMesh, Renderer, SceneRenderer, TerrainTextureMapping,
    draw_count,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tileworld-cli", about = "CLI tool for tileworld inspection")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build a grid mesh and report its buffer sizes
    Mesh {
        #[arg(long, default_value = "16")]
        width: u32,
        #[arg(long, default_value = "16")]
        height: u32,
    },
    /// Plan one frame and print it
    Frame {
        /// Level file (YAML); the built-in demo level when omitted
        #[arg(long)]
        level: Option<PathBuf>,
        /// Terrain texture mapping (YAML: cell type -> texture name)
        #[arg(long)]
        mapping: Option<PathBuf>,
        /// Print the draw-command plan as JSON instead of a summary
        #[arg(long)]
        json: bool,
        /// Time since start, in milliseconds
        #[arg(long, default_value = "0")]
        elapsed_ms: u64,
    },
}

/// Camera above and behind the player, looking at it.
fn player_camera(world: &World) -> CameraMatrices {
    let p = world.player().position;
    let target = Vec3::new(p.x, 0.0, p.y);
    CameraMatrices {
        view: Mat4::look_at_rh(target + Vec3::new(0.0, 7.0, 9.0), target, Vec3::Y),
        projection: Mat4::perspective_rh(60.0_f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0),
    }
}

fn frame(
    level: Option<PathBuf>,
    mapping: Option<PathBuf>,
    json: bool,
    elapsed: Duration,
) -> anyhow::Result<()> {
    let level = match level {
        Some(path) => Level::load(&path)
            .with_context(|| format!("loading level {}", path.display()))?,
        None => Level::demo(),
    };
    let mapping = match mapping {
        Some(path) => {
            let src = std::fs::read_to_string(&path)
                .with_context(|| format!("reading mapping {}", path.display()))?;
            TerrainTextureMapping::from_yaml(&src)?
        }
        None => TerrainTextureMapping::default(),
    };

    let world = level.into_world()?;
    let textures = TextureStore::with_builtin();
    let camera = player_camera(&world);
    let scene = SceneRenderer::load(world.grid(), &textures, &mapping, &camera)?;
    let plan = scene.render(&world, &camera, elapsed);
    tracing::debug!(commands = plan.len(), "frame planned");

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", DebugTextRenderer::new().render(&world, &camera, elapsed));
        println!("Commands: {} ({} draws)", plan.len(), draw_count(&plan));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("tileworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", tileworld_common::crate_info());
            println!("kernel: {}", tileworld_kernel::crate_info());
            println!("assets: {}", tileworld_assets::crate_info());
            println!("render: {}", tileworld_render::crate_info());
        }
        Commands::Mesh { width, height } => {
            let mesh = GridMesh::build(width, height)?;
            println!("Grid mesh {width}x{height}");
            println!("  vertices: {}", mesh.vertices().len());
            println!("  indices:  {}", mesh.indices().len());
            println!(
                "  bytes:    {}",
                std::mem::size_of_val(mesh.vertices()) + std::mem::size_of_val(mesh.indices())
            );
            if let (Some(first), Some(last)) = (
                mesh.cell_index_range(0, 0),
                mesh.cell_index_range(width.saturating_sub(1), height.saturating_sub(1)),
            ) {
                println!("  cell (0,0) indices: {first:?}");
                println!(
                    "  cell ({},{}) indices: {last:?}",
                    width - 1,
                    height - 1
                );
            }
        }
        Commands::Frame {
            level,
            mapping,
            json,
            elapsed_ms,
        } => frame(level, mapping, json, Duration::from_millis(elapsed_ms))?,
    }

    Ok(())
}
