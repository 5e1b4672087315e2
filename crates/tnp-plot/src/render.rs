//! Drawing one group of objects onto a ROOT-style canvas.
//!
//! The first object of a group fixes the frame (ranges and axis titles);
//! every further object is overlaid on it. Objects are painted inside a clip
//! to the frame, then the grid, ticks and titles go on top, then the legend
//! and the fixed texts in canvas NDC.

use std::sync::Arc;

use tnp_render::axes_draw::{FrameStyle, draw_axes};
use tnp_render::canvas::Canvas;
use tnp_render::color::Color;
use tnp_render::config::RenderConfig;
use tnp_render::font::FontHandle;
use tnp_render::layout::axes::Axis;
use tnp_render::layout::legend::{Legend, LegendEntry};
use tnp_render::layout::margins::{Pad, PlotArea};
use tnp_render::layout::palette::{draw_color_bar, z_color};
use tnp_render::primitives::{
    FontStyle, FontWeight, LineStyle, MarkerStyle, Style, TextAnchor, TextStyle,
};
use tnp_root::{Graph, Histogram, Histogram2D, RootObject};
use tracing::debug;

use crate::config::{AxisSpec, PlotConfig};
use crate::error::{PlotterError, Result};
use crate::resolve::{Group, ResolvedObject};
use crate::style::{Ndc, RootStyle};

/// Ranges and titles of a frame.
#[derive(Debug, Clone)]
pub struct FrameSpec {
    /// X range and ticks.
    pub x: Axis,
    /// Y range and ticks.
    pub y: Axis,
    /// X title (TLatex).
    pub x_title: String,
    /// Y title (TLatex).
    pub y_title: String,
    /// Color scale range, for heat maps.
    pub z: Option<(f64, f64)>,
}

/// What an object looks like once painted.
enum Painted<'a> {
    Hist(&'a Histogram),
    Points(Graph),
    Map(Histogram2D),
}

fn painted(object: &RootObject) -> Option<Painted<'_>> {
    match object {
        RootObject::Hist1D(h) => Some(Painted::Hist(h)),
        RootObject::Graph(g) => Some(Painted::Points(g.clone())),
        RootObject::Hist2D(h) => Some(Painted::Map(h.clone())),
        RootObject::Efficiency(e) => match e.dimension() {
            1 => e.painted_graph().map(Painted::Points),
            _ => e.painted_histogram().map(Painted::Map),
        },
    }
}

/// Largest bin content over the 1D histograms of a group.
pub fn group_hist_max(group: &Group) -> f64 {
    group
        .objects
        .iter()
        .filter_map(|o| match &o.object {
            RootObject::Hist1D(h) => Some(h.max_content()),
            _ => None,
        })
        .fold(0.0, f64::max)
}

/// Frame of a group, fixed by its first object.
pub fn frame_spec(group: &Group, plot: &PlotConfig, style: &RootStyle) -> Result<FrameSpec> {
    let first = group.objects.first().ok_or_else(|| {
        PlotterError::ConfigValidation(format!("group '{}' has no objects", group.key))
    })?;
    let x_cfg = plot.plot.x_axis()?;
    let y_cfg = plot.plot.y_axis()?;
    let from_config = |z: Option<(f64, f64)>| FrameSpec {
        x: Axis::linear(x_cfg.min, x_cfg.max, style.divisions),
        y: Axis::linear(y_cfg.min, y_cfg.max, style.divisions),
        x_title: x_cfg.title.clone(),
        y_title: y_cfg.title.clone(),
        z,
    };

    Ok(match &first.object {
        RootObject::Hist1D(h) => FrameSpec {
            x: Axis::linear(h.x_axis.min(), h.x_axis.max(), style.divisions),
            y: Axis::linear(0.0, group_hist_max(group) * style.y_headroom, style.divisions),
            x_title: group.key.clone(),
            y_title: y_cfg.title.clone(),
            z: None,
        },
        RootObject::Hist2D(_) => {
            let z = plot.plot.z_axis()?;
            from_config(Some((z.min, z.max)))
        }
        RootObject::Efficiency(e) if e.dimension() == 2 => {
            let AxisSpec { min, max, .. } = plot.plot.z_axis()?;
            from_config(Some((min, max)))
        }
        RootObject::Graph(_) | RootObject::Efficiency(_) => from_config(None),
    })
}

/// Draw a group and return the finished canvas.
pub fn render_group(
    group: &Group,
    plot: &PlotConfig,
    style: &RootStyle,
    fonts: Arc<FontHandle>,
    render: &RenderConfig,
) -> Result<Canvas> {
    let spec = frame_spec(group, plot, style)?;
    let colors = plot.plot.colors()?;

    let mut canvas = Canvas::with_fonts(style.canvas_width, style.canvas_height, fonts);
    canvas.set_background(render.background);
    let [x1, y1, x2, y2] = style.pad;
    let pad = Pad::from_ndc(style.canvas_width, style.canvas_height, x1, y1, x2, y2);
    let frame = pad.frame(&style.margins);

    canvas.push_clip(frame.left, frame.top, frame.width, frame.height);
    for obj in &group.objects {
        let color = colors.get(obj.input_index).copied().unwrap_or(Color::BLACK);
        let marker_code = plot.plot.marker_map.get(obj.input_index).copied().unwrap_or(20);
        draw_object(&mut canvas, &frame, &spec, obj, color, marker_code, style);
    }
    canvas.pop_clip();

    if let Some((zmin, zmax)) = spec.z {
        let bar = PlotArea::manual(
            frame.right() + style.palette_gap * pad.area.width,
            frame.top,
            style.palette_width * pad.area.width,
            frame.height,
        );
        draw_color_bar(&mut canvas, &bar, zmin, zmax, style.label_px);
    }

    let frame_style = FrameStyle {
        label_size: style.label_px,
        title_size: style.title_px,
        title_weight: FontWeight::Bold,
        x_title_offset: style.x_title_offset,
        y_title_offset: style.y_title_offset,
        grid: style.grid,
        ..FrameStyle::default()
    };
    draw_axes(&mut canvas, &frame, &spec.x, &spec.y, &spec.x_title, &spec.y_title, &frame_style);

    if group.objects.len() > 1 {
        draw_legend(&mut canvas, group, plot, &colors, style);
    }
    draw_labels(&mut canvas, plot, style);
    Ok(canvas)
}

fn draw_object(
    canvas: &mut Canvas,
    frame: &PlotArea,
    spec: &FrameSpec,
    obj: &ResolvedObject,
    color: Color,
    marker_code: i32,
    style: &RootStyle,
) {
    let line = LineStyle::solid(color, style.line_width);
    let marker = MarkerStyle::root(marker_code, color, style.marker_size);
    let px = |x: f64| spec.x.data_to_pixel(x, frame.left, frame.right());
    let py = |y: f64| spec.y.data_to_pixel(y, frame.bottom(), frame.top);

    match painted(&obj.object) {
        Some(Painted::Hist(h)) => {
            for i in 0..h.n_bins() {
                let (x, y) = (h.x_axis.center(i), h.bin_content[i]);
                let (half, err) = (0.5 * h.x_axis.width(i), h.bin_error(i));
                canvas.error_bar_h(px(x - half), px(x + half), py(y), 0.0, &line);
                canvas.error_bar(px(x), py(y - err), py(y + err), 0.0, &line);
                canvas.marker(px(x), py(y), &marker);
            }
        }
        Some(Painted::Points(g)) => {
            for i in 0..g.len() {
                let (x, y) = (g.x[i], g.y[i]);
                let at = |v: &[f64]| v.get(i).copied().unwrap_or(0.0);
                canvas.error_bar_h(px(x - at(&g.ex_low)), px(x + at(&g.ex_high)), py(y), 0.0, &line);
                canvas.error_bar(px(x), py(y - at(&g.ey_low)), py(y + at(&g.ey_high)), 0.0, &line);
                canvas.marker(px(x), py(y), &marker);
            }
        }
        Some(Painted::Map(h)) => match spec.z {
            Some((zmin, zmax)) => draw_heat_map(canvas, &h, zmin, zmax, &px, &py),
            None => debug!(object = %obj.object.name(), "2D object overlaid on a 1D frame, skipped"),
        },
        None => debug!(object = %obj.object.name(), "nothing to paint"),
    }
}

/// Colz: cells at 0 or below the minimum stay empty, cells above the maximum
/// take the top color.
fn draw_heat_map(
    canvas: &mut Canvas,
    h: &Histogram2D,
    zmin: f64,
    zmax: f64,
    px: &dyn Fn(f64) -> f64,
    py: &dyn Fn(f64) -> f64,
) {
    for iy in 0..h.ny() {
        let (y_lo, y_hi) = (py(h.y_axis.edges[iy]), py(h.y_axis.edges[iy + 1]));
        for ix in 0..h.nx() {
            let v = h.at(ix, iy);
            if v == 0.0 || v < zmin {
                continue;
            }
            let Some(color) = z_color(v.min(zmax), zmin, zmax) else {
                continue;
            };
            let (x_lo, x_hi) = (px(h.x_axis.edges[ix]), px(h.x_axis.edges[ix + 1]));
            canvas.rect(x_lo, y_hi, x_hi - x_lo, y_lo - y_hi, &Style::filled(color));
        }
    }
}

fn draw_legend(
    canvas: &mut Canvas,
    group: &Group,
    plot: &PlotConfig,
    colors: &[Color],
    style: &RootStyle,
) {
    let [x1, y1, x2, y2] = style.legend;
    let box_area = Pad::from_ndc(style.canvas_width, style.canvas_height, x1, y1, x2, y2).area;
    let mut legend = Legend::new(box_area);
    legend.text_size = Some(style.legend_text_px);
    for obj in &group.objects {
        let color = colors.get(obj.input_index).copied().unwrap_or(Color::BLACK);
        let code = plot.plot.marker_map.get(obj.input_index).copied().unwrap_or(20);
        let label = plot
            .inputs
            .get(&obj.input_key)
            .map(|i| i.legend_entry.clone())
            .unwrap_or_default();
        legend.add(LegendEntry::line_marker(
            label,
            LineStyle::solid(color, style.line_width),
            MarkerStyle::root(code, color, style.marker_size),
        ));
    }
    legend.draw(canvas);
}

/// Logo, sub-logo, caption and legend title, in canvas NDC.
fn draw_labels(canvas: &mut Canvas, plot: &PlotConfig, style: &RootStyle) {
    let page = Pad::from_ndc(style.canvas_width, style.canvas_height, 0.0, 0.0, 1.0, 1.0);
    let mut put = |pos: Ndc, text: &str, ts: TextStyle| {
        let (x, y) = page.ndc(pos.0, pos.1);
        canvas.latex(x, y, text, &ts);
    };

    let logo = &plot.plot.logo;
    if let Some(main) = logo.first() {
        let ts = TextStyle { size: page.text_px(style.logo_size), weight: FontWeight::Bold, ..Default::default() };
        put(style.logo_pos, main, ts);
    }
    if let Some(sub) = logo.get(1) {
        let ts = TextStyle { size: page.text_px(style.sublogo_size), style: FontStyle::Italic, ..Default::default() };
        put(style.sublogo_pos, sub, ts);
    }
    let caption = TextStyle { size: page.text_px(style.caption_size), anchor: TextAnchor::End, ..Default::default() };
    put(style.caption_pos, &plot.plot.caption, caption);
    let title = TextStyle { size: style.legend_title_px, ..Default::default() };
    put(style.legend_title_pos, &plot.plot.legend_title, title);
}
