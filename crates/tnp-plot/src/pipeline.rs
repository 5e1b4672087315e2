//! The end-to-end run: config → groups → canvases → files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tnp_render::canvas::Canvas;
use tnp_render::config::RenderConfig;
use tnp_render::font::FontHandle;
use tnp_render::render_to_file;
use tracing::{info, warn};

use crate::config::{self, Config, PlotConfig};
use crate::error::{PlotterError, Result};
use crate::render::render_group;
use crate::resolve::{Group, resolve_inputs};
use crate::style::RootStyle;

/// Subdirectory of the per-input canvases.
pub const INPUTS_DIR: &str = "inputs";

/// Run-wide options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip the per-input canvases.
    pub fast: bool,
    /// Export settings.
    pub render: RenderConfig,
    /// Canvas style.
    pub style: RootStyle,
}

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Plots processed.
    pub plots: usize,
    /// Groups drawn.
    pub groups: usize,
    /// Files written, in write order.
    pub files: Vec<PathBuf>,
}

/// Load a config file and run every plot in it.
pub fn run(config_path: &Path, options: &RunOptions) -> Result<RunSummary> {
    let config = config::load(config_path)?;
    run_config(&config, options)
}

/// Run every plot of a parsed config, in plot-name order.
///
/// The first error aborts the run; files written by earlier plots stay.
pub fn run_config(config: &Config, options: &RunOptions) -> Result<RunSummary> {
    let fonts = Arc::new(FontHandle::system());
    if !fonts.has_faces() {
        warn!("no sans-serif system font found, text layout uses estimated widths");
    }
    let mut summary = RunSummary::default();
    for (name, plot) in config {
        run_plot(name, plot, options, &fonts, &mut summary)?;
        summary.plots += 1;
    }
    Ok(summary)
}

/// Check that a style map covers every input.
pub fn check_style_map(plot: &str, map: &'static str, have: usize, need: usize) -> Result<()> {
    if have < need {
        return Err(PlotterError::InsufficientStyleMap { plot: plot.to_string(), map, have, need });
    }
    Ok(())
}

fn run_plot(
    name: &str,
    plot: &PlotConfig,
    options: &RunOptions,
    fonts: &Arc<FontHandle>,
    summary: &mut RunSummary,
) -> Result<()> {
    info!("Plot: {name}");
    if !plot.comment.is_empty() {
        info!("  {}", plot.comment);
    }
    info!("  colorMap: {:?}", plot.plot.color_map);
    info!("  markerMap: {:?}", plot.plot.marker_map);

    let groups = resolve_inputs(plot)?;
    let need = plot.inputs.len();
    check_style_map(name, "colorMap", plot.plot.color_map.len(), need)?;
    check_style_map(name, "markerMap", plot.plot.marker_map.len(), need)?;
    // every fileType must be known before anything is written
    plot.output.formats()?;
    let types = &plot.output.file_type;

    if groups.is_empty() {
        warn!(plot = %name, "no objects matched, nothing to draw");
        return Ok(());
    }

    let dir = &plot.output.directory;
    std::fs::create_dir_all(dir)?;
    info!("Output directory: {}", dir.display());
    for group in &groups {
        let stem = plot.output.stem(&group.key);
        let canvas = render_group(group, plot, &options.style, Arc::clone(fonts), &options.render)?;
        write_all(&canvas, dir, stem, types, options, summary)?;

        if !options.fast {
            let inputs_dir = dir.join(INPUTS_DIR);
            std::fs::create_dir_all(&inputs_dir)?;
            for obj in &group.objects {
                let single = Group { key: group.key.clone(), objects: vec![obj.clone()] };
                let canvas =
                    render_group(&single, plot, &options.style, Arc::clone(fonts), &options.render)?;
                let stem = format!("{stem}_{}", obj.input_key);
                write_all(&canvas, &inputs_dir, &stem, types, options, summary)?;
            }
        }
        summary.groups += 1;
    }
    Ok(())
}

fn write_all(
    canvas: &Canvas,
    dir: &Path,
    stem: &str,
    types: &[String],
    options: &RunOptions,
    summary: &mut RunSummary,
) -> Result<()> {
    for ext in types {
        let path = dir.join(format!("{stem}.{ext}"));
        render_to_file(canvas, &path, &options.render)?;
        info!("Saved {}", path.display());
        summary.files.push(path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_map_must_cover_inputs() {
        assert!(check_style_map("p", "colorMap", 2, 2).is_ok());
        assert!(check_style_map("p", "colorMap", 3, 2).is_ok());
        let err = check_style_map("p", "markerMap", 1, 2).unwrap_err();
        assert!(matches!(
            err,
            PlotterError::InsufficientStyleMap { map: "markerMap", have: 1, need: 2, .. }
        ));
        assert!(err.to_string().contains("markerMap has 1 entries but 2 inputs"));
    }
}
