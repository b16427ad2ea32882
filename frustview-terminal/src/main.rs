/// frustview - render an OBJ mesh and a camera frustum in the terminal
///
/// Controls:
///   - WASD / Arrow Keys: Rotate the model
///   - L: Toggle wireframe
///   - F: Toggle the frustum overlay
///   - Q/ESC: Quit

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use frustview_core::MeshBuffer;
use frustview_terminal::{AppError, TerminalApp, ViewerConfig};
use tracing::info;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

#[derive(Parser)]
#[command(name = "frustview")]
#[command(version, about = "Render an OBJ mesh and a camera frustum in the terminal")]
struct Cli {
    /// Path to the OBJ model.
    model: PathBuf,

    /// Path to a viewer config (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the target frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Start with the wireframe pass enabled.
    #[arg(long)]
    wireframe: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Load and validate the model, print its statistics, and exit.
    #[arg(long)]
    check: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    init_logging(cli.log_file.as_deref(), cli.check)?;

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(fps) = cli.fps {
        config.render.target_fps = fps;
    }
    if cli.wireframe {
        config.render.wireframe = true;
    }

    let mesh = MeshBuffer::load(&cli.model)?;

    if cli.check {
        print_summary(&cli.model, &mesh, &config)?;
        return Ok(());
    }

    info!("Starting terminal renderer (press Q to quit)");
    let mut app = TerminalApp::new(mesh, config)?;
    app.run()?;
    Ok(())
}

/// Logs go to `log_file` when given. Without one, the interactive viewer
/// only lets warnings through to stderr so the frame stays readable.
fn init_logging(log_file: Option<&Path>, check: bool) -> Result<(), AppError> {
    let default_level = if check || log_file.is_some() { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (writer, ansi) = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| AppError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .init();
    Ok(())
}

fn print_summary(path: &Path, mesh: &MeshBuffer, config: &ViewerConfig) -> Result<(), AppError> {
    let layout = mesh.layout();
    println!("Model: {}", path.display());
    println!("  triangles: {}", mesh.triangle_count());
    println!("  vertices:  {}", mesh.vertex_count());
    println!(
        "  layout:    stride {} B, position @{} B x{}, normal @{} B x{}",
        layout.stride_bytes(),
        layout.position_offset_bytes(),
        layout.position_size,
        layout.normal_offset_bytes(),
        layout.normal_size
    );
    if let Some((min, max)) = mesh.bounds() {
        println!("  bounds:    [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]", min.x, min.y, min.z, max.x, max.y, max.z);
    }

    let frustum = config.prop_camera.camera().frustum()?;
    println!("Prop camera frustum:");
    for (slot, corner) in frustum.corners().iter().enumerate() {
        println!("  {slot}: [{:.3}, {:.3}, {:.3}]", corner.x, corner.y, corner.z);
    }
    Ok(())
}
