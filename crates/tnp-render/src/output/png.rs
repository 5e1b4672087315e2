use crate::RenderError;
use crate::config::RenderConfig;
use crate::font::FontHandle;

/// Rasterise an SVG string to PNG bytes at the configured DPI.
pub fn svg_to_png(svg: &str, config: &RenderConfig, fonts: &FontHandle) -> crate::Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.fontdb = fonts.database();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| RenderError::Png(e.to_string()))?;

    let scale = config.scale();
    let size = tree.size();
    let w = (size.width() * scale).round() as u32;
    let h = (size.height() * scale).round() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| RenderError::Png(format!("cannot allocate a {w}x{h} pixmap")))?;
    let bg = config.background;
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));

    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| RenderError::Png(e.to_string()))
}
