/// Skyline Terminal Viewer - orbiting painter's-algorithm city view
///
/// Controls:
///   - Space: Start / stop the orbit
///   - Left/Right: Orbit by hand
///   - Up/Down: Zoom
///   - Q/ESC: Quit
use clap::Parser;
use env_logger::Env;
use skyline_core::geojson::read_feature_collection;
use skyline_core::{GeometryClass, Layer, PlaneCollection, ViewerConfig};
use skyline_terminal::demo::demo_layers;
use skyline_terminal::TerminalApp;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_LOGGING_LEVEL: &str = "warn";
const PROJECTION_TRACE_LEVEL: &str = "warn,skyline_terminal=trace,skyline_core::projection=trace";

#[derive(Parser, Debug)]
#[command(author, version, about = "Orbiting view of 3D building geometry in the terminal")]
struct Args {
    /// GeoJSON FeatureCollection of building bodies (stroked)
    #[arg(long)]
    buildings: Option<PathBuf>,

    /// GeoJSON FeatureCollection of roofs (filled and stroked)
    #[arg(long)]
    roofs: Option<PathBuf>,

    /// JSON viewer configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log the projection stages of one vertex per frame (redirect stderr)
    #[arg(long)]
    trace_projection: bool,
}

fn invalid_data(e: skyline_core::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

fn load_layer(path: &Path, class: GeometryClass, config: &ViewerConfig) -> io::Result<Layer> {
    let geometries = read_feature_collection(path).map_err(invalid_data)?;
    let planes = PlaneCollection::extract(&geometries);
    println!("Loaded {} rings from {}", planes.len(), path.display());

    let layer_config = match class {
        GeometryClass::Building => &config.building,
        GeometryClass::Roof => &config.roof,
    };
    Ok(layer_config.layer(class, planes))
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let level = if args.trace_projection {
        PROJECTION_TRACE_LEVEL
    } else {
        DEFAULT_LOGGING_LEVEL
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    println!("Skyline Terminal Viewer - Loading...");

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path).map_err(invalid_data)?,
        None => ViewerConfig::default(),
    };

    let mut layers = Vec::new();
    if let Some(path) = &args.buildings {
        layers.push(load_layer(path, GeometryClass::Building, &config)?);
    }
    if let Some(path) = &args.roofs {
        layers.push(load_layer(path, GeometryClass::Roof, &config)?);
    }
    if layers.is_empty() {
        println!("No geometry given, using the demo city block...");
        layers = demo_layers(&config);
    }

    println!("Starting terminal viewer (Space to orbit, Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(layers, &config)?.with_projection_trace(args.trace_projection);
    app.run()?;

    println!("Thank you for using Skyline!");
    Ok(())
}
