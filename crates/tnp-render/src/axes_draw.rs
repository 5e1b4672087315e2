use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Pixel sizes and offsets of a ROOT-style frame.
#[derive(Debug, Clone)]
pub struct FrameStyle {
    pub label_size: f64,
    pub title_size: f64,
    pub title_weight: FontWeight,
    pub x_title_offset: f64,
    pub y_title_offset: f64,
    /// Tick length as a fraction of the frame size.
    pub tick_length: f64,
    pub grid: bool,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            label_size: 20.0,
            title_size: 22.0,
            title_weight: FontWeight::Regular,
            x_title_offset: 1.0,
            y_title_offset: 1.0,
            tick_length: 0.03,
            grid: false,
        }
    }
}

/// Draw the frame box, inward ticks on all four sides, grid, tick labels and
/// axis titles (x right-aligned at the axis end, y top-aligned and rotated).
pub fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    x_title: &str,
    y_title: &str,
    style: &FrameStyle,
) {
    let black = Color::BLACK;
    let frame_style = LineStyle::solid(black, 1.0);
    let grid_style = LineStyle::dotted(black, 1.0);
    let tl_x = style.tick_length * area.height;
    let tl_y = style.tick_length * area.width;

    let label_style = TextStyle {
        size: style.label_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
        ..Default::default()
    };

    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }
        if style.grid {
            canvas.line(px, area.top, px, area.bottom(), &grid_style);
        }
        canvas.line(px, area.bottom(), px, area.bottom() - tl_x, &frame_style);
        canvas.line(px, area.top, px, area.top + tl_x, &frame_style);
        if let Some(label) = x_axis.tick_labels.get(i) {
            canvas.text(px, area.bottom() + 0.25 * style.label_size, label, &label_style);
        }
    }
    for &val in &x_axis.minor_ticks {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }
        canvas.line(px, area.bottom(), px, area.bottom() - tl_x / 2.0, &frame_style);
        canvas.line(px, area.top, px, area.top + tl_x / 2.0, &frame_style);
    }

    let y_label_style = TextStyle {
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..label_style.clone()
    };
    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        if style.grid {
            canvas.line(area.left, py, area.right(), py, &grid_style);
        }
        canvas.line(area.left, py, area.left + tl_y, py, &frame_style);
        canvas.line(area.right(), py, area.right() - tl_y, py, &frame_style);
        if let Some(label) = y_axis.tick_labels.get(i) {
            canvas.text(area.left - 0.4 * style.label_size, py, label, &y_label_style);
        }
    }
    for &val in &y_axis.minor_ticks {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        canvas.line(area.left, py, area.left + tl_y / 2.0, py, &frame_style);
        canvas.line(area.right(), py, area.right() - tl_y / 2.0, py, &frame_style);
    }

    draw_frame(canvas, area);

    let title_style = TextStyle {
        size: style.title_size,
        weight: style.title_weight,
        anchor: TextAnchor::End,
        ..Default::default()
    };
    if !x_title.is_empty() {
        let y = area.bottom() + style.x_title_offset * 1.6 * style.title_size;
        canvas.latex(area.right(), y, x_title, &title_style);
    }
    if !y_title.is_empty() {
        let x = area.left - style.y_title_offset * 1.6 * style.title_size;
        canvas.latex_rotated(x, area.top, y_title, &title_style, -90.0);
    }
}

/// Frame box only.
pub fn draw_frame(canvas: &mut Canvas, area: &PlotArea) {
    canvas.rect(
        area.left,
        area.top,
        area.width,
        area.height,
        &Style::stroked(Color::BLACK, 1.0),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontHandle;
    use std::sync::Arc;

    #[test]
    fn frame_has_ticks_labels_and_titles() {
        let mut canvas = Canvas::with_fonts(800.0, 800.0, Arc::new(FontHandle::empty()));
        let area = PlotArea::manual(80.0, 80.0, 640.0, 640.0);
        let x = Axis::linear(0.0, 100.0, 10);
        let y = Axis::linear(0.0, 1.05, 10);
        let style = FrameStyle { grid: true, ..Default::default() };
        draw_axes(&mut canvas, &area, &x, &y, "p_{T} [GeV]", "Efficiency", &style);
        let svg = canvas.finish_svg();
        assert!(svg.contains(">100</text>"));
        assert!(svg.contains(">1.0</text>"));
        assert!(svg.contains(r#"transform="rotate(-90.0,"#));
        assert!(svg.contains(r#"stroke-dasharray="1 3""#));
        assert!(svg.contains(r#"baseline-shift="sub""#));
    }
}
