use crate::RenderError;
use crate::font::FontHandle;

/// Convert an SVG string to PDF bytes, text kept as text.
pub fn svg_to_pdf(svg: &str, fonts: &FontHandle) -> crate::Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.fontdb = fonts.database();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| RenderError::Pdf(e.to_string()))?;

    svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), svg2pdf::PageOptions::default())
        .map_err(|e| RenderError::Pdf(e.to_string()))
}
