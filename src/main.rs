mod app;
mod config;
mod dataset;
mod util;

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::{SettingsFile, ViewerConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Entities JSON file to load at startup.
    #[arg(long)]
    entities: Option<PathBuf>,

    /// Relationships JSON file to load at startup.
    #[arg(long)]
    relationships: Option<PathBuf>,

    /// Settings JSON with `palette` and `forces` overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start in dark mode.
    #[arg(long)]
    dark: bool,

    /// Folder the export dialog opens in.
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => SettingsFile::load(path)?,
        None => SettingsFile::default(),
    };
    let config = ViewerConfig {
        palette: settings.palette,
        forces: settings.forces,
        dark_mode: args.dark,
        export_dir: args.export_dir,
        entities: args.entities,
        relationships: args.relationships,
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    info!("starting viewer");
    eframe::run_native(
        "Entity Graph Viewer",
        options,
        Box::new(move |cc| Ok(Box::new(app::GraphViewerApp::new(cc, config)))),
    )
    .map_err(|error| anyhow!("failed to start the viewer window: {error}"))
}
