use ab_glyph::{Font, FontVec, ScaleFont};

use crate::font::FontHandle;
use crate::latex::{Shift, TextRun};
use crate::primitives::TextStyle;

/// Font-size factor for sub/superscript runs.
pub const SCRIPT_SCALE: f64 = 0.7;

/// Average advance as a fraction of the font size, used without a face.
const ESTIMATED_ADVANCE: f64 = 0.55;

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Measure text width and height in pixels.
pub fn measure_text(font: Option<&FontVec>, text: &str, size_px: f64) -> TextMetrics {
    let Some(font) = font else {
        return TextMetrics {
            width: text.chars().count() as f64 * size_px * ESTIMATED_ADVANCE,
            height: size_px * 1.15,
            ascent: size_px * 0.9,
        };
    };
    let scale = ab_glyph::PxScale::from(size_px as f32);
    let scaled = font.as_scaled(scale);

    let mut width: f32 = 0.0;
    let mut prev_glyph_id = None;
    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = prev_glyph_id {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph_id = Some(glyph_id);
    }

    let ascent = scaled.ascent();
    let descent = scaled.descent();
    TextMetrics { width: width as f64, height: (ascent - descent) as f64, ascent: ascent as f64 }
}

/// Measure TLatex runs, honouring per-run font overrides and script scaling.
pub fn measure_runs(fonts: &FontHandle, runs: &[TextRun], style: &TextStyle) -> TextMetrics {
    let base = measure_text(fonts.select(style.weight, style.style), "", style.size);
    let width = runs
        .iter()
        .map(|run| {
            let size = match run.shift {
                Shift::Normal => style.size,
                Shift::Sub | Shift::Super => style.size * SCRIPT_SCALE,
            };
            let font = fonts.select(
                run.weight.unwrap_or(style.weight),
                run.style.unwrap_or(style.style),
            );
            measure_text(font, &run.text, size).width
        })
        .sum();
    TextMetrics { width, ..base }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex;
    use crate::primitives::{FontStyle, FontWeight};

    #[test]
    fn estimate_without_faces() {
        let m = measure_text(None, "Hello", 20.0);
        assert!((m.width - 55.0).abs() < 1e-9);
        assert!(m.ascent > 0.0);
    }

    #[test]
    fn scripts_are_narrower() {
        let fonts = FontHandle::empty();
        let style = TextStyle::default();
        let flat = measure_runs(&fonts, &latex::parse("pT"), &style);
        let scripted = measure_runs(&fonts, &latex::parse("p_{T}"), &style);
        assert!(scripted.width < flat.width);
    }

    #[test]
    fn system_faces_measure_positive_widths() {
        let fonts = FontHandle::system();
        let m = measure_text(fonts.select(FontWeight::Regular, FontStyle::Normal), "Hello", 12.0);
        assert!(m.width > 0.0);
    }
}
