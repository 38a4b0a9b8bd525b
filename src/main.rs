//! cord19-explorer - CORD-19 metadata analysis
//!
//! Runs the batch report (charts + word cloud) or opens the interactive
//! dashboard over the same cleaned table.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cord19_explorer::config::Config;
use cord19_explorer::gui::ExplorerApp;
use cord19_explorer::{logging, report};
use eframe::egui;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cord19-explorer")]
#[command(about = "Exploratory analysis of the CORD-19 metadata table")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file path (default: ./cord19-explorer.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Metadata CSV, overrides [data].path
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Default)]
enum Command {
    /// Write the analysis chart and word cloud images
    #[default]
    Report,
    /// Open the interactive dashboard
    Explore,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.quiet, cli.debug);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.data {
        config.data.path = path;
    }

    match cli.command.unwrap_or_default() {
        Command::Report => {
            let outputs = report::run(&config)?;
            log::info!("Chart: {}", outputs.chart.display());
            if let Some(path) = outputs.wordcloud {
                log::info!("Word cloud: {}", path.display());
            }
            Ok(())
        }
        Command::Explore => run_dashboard(config),
    }
}

fn run_dashboard(config: Config) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("CORD-19 Data Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "CORD-19 Data Explorer",
        options,
        Box::new(|cc| Ok(Box::new(ExplorerApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Dashboard failed: {}", e))
}
