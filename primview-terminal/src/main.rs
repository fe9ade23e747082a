/// primview - demo gallery in the terminal
///
/// Renders a gallery page (or an STL model) with the software renderer.
/// Controls:
///   - WASD / Arrow Keys: Orbit
///   - +/-: Zoom, HJKL: Pan
///   - R: Toggle auto-rotation
///   - Q/ESC: Quit
use anyhow::{bail, Context, Result};
use clap::Parser;
use primview_core::{bootstrap, demos, load_config, stl};
use primview_terminal::{CellMode, TerminalApp, TerminalContainer};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "primview")]
#[command(about = "Geometry and helper demos rendered in the terminal")]
#[command(version)]
struct Args {
    /// Demo path, e.g. geometry/box or helper/grid
    #[arg(default_value = "geometry/overview")]
    demo: String,

    /// Show an STL model instead of a demo
    #[arg(long)]
    stl: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "primview.toml")]
    config: PathBuf,

    /// Draw with ASCII characters instead of coloured blocks
    #[arg(long)]
    ascii: bool,

    /// Target frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// List the available demos and exit
    #[arg(long)]
    list: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        for demo in demos::catalog() {
            println!("{:<28} {}", demo.path, demo.title);
        }
        return Ok(());
    }

    // Initialize logging; stdout belongs to the renderer
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let mut config = load_config(&args.config)?;

    // Command line overrides
    if args.ascii {
        config.terminal.ascii = true;
    }
    if let Some(fps) = args.fps {
        if fps == 0 {
            bail!("--fps must be at least 1");
        }
        config.terminal.fps = fps;
    }

    let mode = if config.terminal.ascii {
        CellMode::Ascii
    } else {
        CellMode::HalfBlock
    };
    let mut container = TerminalContainer::stdout(mode)?;

    let (instances, title) = match &args.stl {
        Some(path) => {
            let geometry = stl::load_stl(path)
                .with_context(|| format!("failed to load STL file {}", path.display()))?;
            info!(triangles = geometry.triangle_count(), "STL model loaded");

            let mut instances = bootstrap(&mut container, &config.scene)?;
            demos::show_model(&mut instances.scene, geometry);
            let title = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            (instances, title)
        }
        None => {
            let Some(demo) = demos::find(&args.demo) else {
                bail!("unknown demo '{}', run with --list to see all demos", args.demo);
            };
            (demo.bootstrap(&mut container)?, demo.title.to_string())
        }
    };

    TerminalApp::new(instances, title, config.terminal.fps).run()
}
