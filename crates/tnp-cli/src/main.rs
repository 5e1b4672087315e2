//! Tag-and-Probe plotter CLI

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tnp_plot::RunOptions;
use tnp_render::config::RenderConfig;

#[derive(Parser)]
#[command(name = "tnp-plotter")]
#[command(about = "Overlay Tag-and-Probe efficiencies, graphs and histograms from ROOT files")]
#[command(version)]
struct Cli {
    /// JSON plot configuration
    input_json_config: PathBuf,

    /// Skip the per-input canvases under `<directory>/inputs`
    #[arg(short, long, action = ArgAction::Count)]
    fast: u8,

    /// 0 = warnings only, 1 = progress, 2 or more = debug
    #[arg(short, long, default_value_t = 1)]
    verbosity: u8,

    /// Raster resolution of PNG output
    #[arg(long, default_value_t = 72)]
    dpi: u32,
}

fn log_level(verbosity: u8) -> tracing::Level {
    match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(log_level(cli.verbosity)).with_target(false).init();

    let options = RunOptions {
        fast: cli.fast > 0,
        render: RenderConfig { dpi: cli.dpi, ..RenderConfig::default() },
        ..RunOptions::default()
    };
    let summary = tnp_plot::run(&cli.input_json_config, &options)
        .with_context(|| format!("plotting {}", cli.input_json_config.display()))?;
    tracing::info!(
        plots = summary.plots,
        groups = summary.groups,
        files = summary.files.len(),
        "done"
    );
    Ok(())
}
