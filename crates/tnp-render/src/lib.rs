pub mod axes_draw;
pub mod canvas;
pub mod color;
pub mod config;
pub mod font;
pub mod latex;
pub mod layout;
pub mod output;
pub mod primitives;
pub mod text;

use std::path::Path;

use canvas::Canvas;
use config::RenderConfig;
pub use output::ImageFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unsupported output format: '{0}' (expected svg, png or pdf)")]
    UnsupportedFormat(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Encode a finished canvas in the given format.
pub fn render_to_bytes(
    canvas: &Canvas,
    format: ImageFormat,
    config: &RenderConfig,
) -> Result<Vec<u8>> {
    let svg = canvas.finish_svg();
    match format {
        ImageFormat::Svg => Ok(svg.into_bytes()),
        #[cfg(feature = "png")]
        ImageFormat::Png => output::png::svg_to_png(&svg, config, canvas.fonts()),
        #[cfg(feature = "pdf")]
        ImageFormat::Pdf => output::pdf::svg_to_pdf(&svg, canvas.fonts()),
        #[allow(unreachable_patterns)]
        other => {
            let _ = config;
            Err(RenderError::UnsupportedFormat(format!(
                "{} (support not compiled in)",
                other.extension()
            )))
        }
    }
}

/// Write a canvas to `path`; the format is inferred from the extension.
pub fn render_to_file(canvas: &Canvas, path: &Path, config: &RenderConfig) -> Result<()> {
    let format = ImageFormat::from_path(path)?;
    let bytes = render_to_bytes(canvas, format, config)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "writing image");
    std::fs::write(path, bytes)?;
    Ok(())
}
