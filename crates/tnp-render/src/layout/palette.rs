use crate::canvas::Canvas;
use crate::color;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Number of color bands in a drawn palette (ROOT `gStyle->SetNumberContours`).
pub const CONTOURS: usize = 50;

/// Color of `value` on the kBird scale over `[zmin, zmax]`, quantised to
/// [`CONTOURS`] bands like ROOT's colz. `None` outside the range.
pub fn z_color(value: f64, zmin: f64, zmax: f64) -> Option<color::Color> {
    if !(zmax > zmin) || value < zmin || value > zmax {
        return None;
    }
    let band = (((value - zmin) / (zmax - zmin)) * CONTOURS as f64).floor() as usize;
    let band = band.min(CONTOURS - 1);
    Some(color::bird((band as f64 + 0.5) / CONTOURS as f64))
}

/// Draw a vertical color bar (TPaletteAxis) with ticks on its right side.
pub fn draw_color_bar(canvas: &mut Canvas, bar: &PlotArea, zmin: f64, zmax: f64, label_size: f64) {
    let band_h = bar.height / CONTOURS as f64;
    for i in 0..CONTOURS {
        let c = color::bird((i as f64 + 0.5) / CONTOURS as f64);
        let y = bar.bottom() - (i + 1) as f64 * band_h;
        // overlap by half a pixel to avoid hairline seams
        canvas.rect(bar.left, y, bar.width, band_h + 0.5, &Style::filled(c));
    }
    canvas.rect(bar.left, bar.top, bar.width, bar.height, &Style::stroked(color::Color::BLACK, 1.0));

    let axis = Axis::linear(zmin, zmax, 10);
    let tick = LineStyle::solid(color::Color::BLACK, 1.0);
    let label_style = TextStyle {
        size: label_size,
        anchor: TextAnchor::Start,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    let tick_len = bar.width * 0.3;
    for (v, label) in axis.tick_positions.iter().zip(&axis.tick_labels) {
        let y = axis.data_to_pixel(*v, bar.bottom(), bar.top);
        canvas.line(bar.right() - tick_len, y, bar.right(), y, &tick);
        canvas.text(bar.right() + 4.0, y, label, &label_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontHandle;
    use std::sync::Arc;

    #[test]
    fn z_color_clamps_and_quantises() {
        assert!(z_color(-0.1, 0.0, 1.0).is_none());
        assert!(z_color(1.1, 0.0, 1.0).is_none());
        assert!(z_color(0.5, 1.0, 1.0).is_none());
        assert_eq!(z_color(1.0, 0.0, 1.0), z_color(0.999, 0.0, 1.0));
        assert_eq!(z_color(0.0, 0.0, 1.0), Some(color::bird(0.01)));
    }

    #[test]
    fn color_bar_has_all_bands() {
        let mut canvas = Canvas::with_fonts(800.0, 800.0, Arc::new(FontHandle::empty()));
        draw_color_bar(&mut canvas, &PlotArea::manual(724.0, 80.0, 32.0, 640.0), 0.0, 1.0, 16.0);
        let svg = canvas.finish_svg();
        assert_eq!(svg.matches("<rect").count(), CONTOURS + 2);
        assert!(svg.contains(">1.0</text>"));
    }
}
