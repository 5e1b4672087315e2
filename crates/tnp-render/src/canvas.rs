use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use crate::color::Color;
use crate::font::{FONT_FAMILY, FontHandle};
use crate::latex::{self, Shift, TextRun};
use crate::primitives::*;
use crate::text::{SCRIPT_SCALE, TextMetrics, measure_runs};

/// An SVG element stored for deferred rendering.
#[derive(Debug, Clone)]
enum SvgElement {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        style: Style,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: LineStyle,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        style: LineStyle,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        style: Style,
    },
    Text {
        x: f64,
        y: f64,
        runs: Vec<TextRun>,
        style: TextStyle,
        rotate: Option<f64>,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        style: Style,
    },
    Group {
        clip_id: String,
        children: Vec<SvgElement>,
    },
}

/// Immediate-mode SVG canvas. Coordinates in pixels, origin top-left.
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    background: Color,
    elements: Vec<SvgElement>,
    defs: Vec<String>,
    /// Open clip groups: (clip id, elements drawn while it is active).
    clip_stack: Vec<(String, Vec<SvgElement>)>,
    next_clip_id: usize,
    fonts: Arc<FontHandle>,
}

impl Canvas {
    /// Canvas measuring text with the system fonts.
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_fonts(width, height, Arc::new(FontHandle::system()))
    }

    pub fn with_fonts(width: f64, height: f64, fonts: Arc<FontHandle>) -> Self {
        Self {
            width,
            height,
            background: Color::WHITE,
            elements: Vec::new(),
            defs: Vec::new(),
            clip_stack: Vec::new(),
            next_clip_id: 0,
            fonts,
        }
    }

    pub fn fonts(&self) -> &FontHandle {
        &self.fonts
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    // --- Drawing primitives ---

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &Style) {
        self.push(SvgElement::Rect { x, y, w, h, style: style.clone() });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.push(SvgElement::Line { x1, y1, x2, y2, style: style.clone() });
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], style: &LineStyle) {
        if points.len() < 2 {
            return;
        }
        self.push(SvgElement::Polyline { points: points.to_vec(), style: style.clone() });
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], style: &Style) {
        self.push(SvgElement::Polygon { points: points.to_vec(), style: style.clone() });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, style: &Style) {
        self.push(SvgElement::Circle { cx, cy, r, style: style.clone() });
    }

    /// Plain text, drawn verbatim.
    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        let runs = vec![TextRun {
            text: content.to_string(),
            shift: Shift::Normal,
            weight: None,
            style: None,
        }];
        self.push_text(x, y, runs, style, None);
    }

    /// Text with TLatex markup.
    pub fn latex(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        self.push_text(x, y, latex::parse(content), style, None);
    }

    /// TLatex text rotated by `angle` degrees around its anchor.
    pub fn latex_rotated(&mut self, x: f64, y: f64, content: &str, style: &TextStyle, angle: f64) {
        self.push_text(x, y, latex::parse(content), style, Some(angle));
    }

    fn push_text(
        &mut self,
        x: f64,
        y: f64,
        runs: Vec<TextRun>,
        style: &TextStyle,
        rotate: Option<f64>,
    ) {
        if runs.is_empty() {
            return;
        }
        self.push(SvgElement::Text { x, y, runs, style: style.clone(), rotate });
    }

    /// Error bar: vertical line + optional horizontal caps.
    pub fn error_bar(&mut self, x: f64, y_lo: f64, y_hi: f64, cap_width: f64, style: &LineStyle) {
        self.line(x, y_lo, x, y_hi, style);
        if cap_width > 0.0 {
            let half = cap_width / 2.0;
            self.line(x - half, y_lo, x + half, y_lo, style);
            self.line(x - half, y_hi, x + half, y_hi, style);
        }
    }

    /// Horizontal error bar.
    pub fn error_bar_h(
        &mut self,
        x_lo: f64,
        x_hi: f64,
        y: f64,
        cap_height: f64,
        style: &LineStyle,
    ) {
        self.line(x_lo, y, x_hi, y, style);
        if cap_height > 0.0 {
            let half = cap_height / 2.0;
            self.line(x_lo, y - half, x_lo, y + half, style);
            self.line(x_hi, y - half, x_hi, y + half, style);
        }
    }

    /// Data marker in one of the ROOT marker shapes.
    pub fn marker(&mut self, x: f64, y: f64, marker: &MarkerStyle) {
        let s = marker.size;
        let area = if marker.fill {
            Style::filled(marker.color)
        } else {
            Style { fill: Some(Color::WHITE), ..Style::stroked(marker.color, 1.0) }
        };
        let stroke = LineStyle::solid(marker.color, 1.0);
        match marker.shape {
            MarkerShape::Dot => self.circle(x, y, s, &Style::filled(marker.color)),
            MarkerShape::Circle => self.circle(x, y, s, &area),
            MarkerShape::Square => self.rect(x - s, y - s, 2.0 * s, 2.0 * s, &area),
            MarkerShape::TriangleUp => {
                self.polygon(&[(x - s, y + s), (x + s, y + s), (x, y - s)], &area)
            }
            MarkerShape::TriangleDown => {
                self.polygon(&[(x - s, y - s), (x + s, y - s), (x, y + s)], &area)
            }
            MarkerShape::Diamond => {
                let w = 0.7 * s;
                self.polygon(&[(x, y - s), (x + w, y), (x, y + s), (x - w, y)], &area)
            }
            MarkerShape::Plus => {
                self.line(x - s, y, x + s, y, &stroke);
                self.line(x, y - s, x, y + s, &stroke);
            }
            MarkerShape::Cross => {
                self.line(x - s, y - s, x + s, y + s, &stroke);
                self.line(x - s, y + s, x + s, y - s, &stroke);
            }
            MarkerShape::Asterisk => {
                self.line(x - s, y, x + s, y, &stroke);
                self.line(x, y - s, x, y + s, &stroke);
                let d = 0.7 * s;
                self.line(x - d, y - d, x + d, y + d, &stroke);
                self.line(x - d, y + d, x + d, y - d, &stroke);
            }
            MarkerShape::ThickCross => {
                let t = s / 3.0;
                let points = [
                    (x - t, y - s),
                    (x + t, y - s),
                    (x + t, y - t),
                    (x + s, y - t),
                    (x + s, y + t),
                    (x + t, y + t),
                    (x + t, y + s),
                    (x - t, y + s),
                    (x - t, y + t),
                    (x - s, y + t),
                    (x - s, y - t),
                    (x - t, y - t),
                ];
                self.polygon(&points, &area);
            }
            MarkerShape::Star => {
                let points: Vec<(f64, f64)> = (0..10)
                    .map(|i| {
                        let r = if i % 2 == 0 { s } else { 0.4 * s };
                        let a = std::f64::consts::PI * (i as f64 / 5.0 - 0.5);
                        (x + r * a.cos(), y + r * a.sin())
                    })
                    .collect();
                self.polygon(&points, &area);
            }
        }
    }

    // --- Clip paths ---

    /// Start clipping subsequent drawing to a rectangle, until [`Canvas::pop_clip`].
    pub fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) -> String {
        let id = format!("clip{}", self.next_clip_id);
        self.next_clip_id += 1;
        self.defs.push(format!(
            r#"<clipPath id="{id}"><rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" /></clipPath>"#
        ));
        self.clip_stack.push((id.clone(), Vec::new()));
        id
    }

    pub fn pop_clip(&mut self) {
        if let Some((clip_id, children)) = self.clip_stack.pop() {
            self.push(SvgElement::Group { clip_id, children });
        }
    }

    // --- Text measurement ---

    /// Width/height of `content` (TLatex) in pixels.
    pub fn measure_latex(&self, content: &str, style: &TextStyle) -> TextMetrics {
        measure_runs(&self.fonts, &latex::parse(content), style)
    }

    // --- SVG output ---

    fn push(&mut self, elem: SvgElement) {
        match self.clip_stack.last_mut() {
            Some((_, children)) => children.push(elem),
            None => self.elements.push(elem),
        }
    }

    pub fn finish_svg(&self) -> String {
        let mut out = String::with_capacity(32 * 1024);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );

        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            for d in &self.defs {
                out.push_str(d);
                out.push('\n');
            }
            out.push_str("</defs>\n");
        }

        let _ = writeln!(
            out,
            r#"<rect width="{}" height="{}" fill="{}" />"#,
            self.width,
            self.height,
            self.background.to_svg_fill()
        );

        for elem in &self.elements {
            render_element(&mut out, elem);
        }
        // Clip groups left open are closed in order.
        for (clip_id, children) in &self.clip_stack {
            let _ = writeln!(out, r#"<g clip-path="url(#{clip_id})">"#);
            for child in children {
                render_element(&mut out, child);
            }
        }
        for _ in &self.clip_stack {
            out.push_str("</g>\n");
        }

        out.push_str("</svg>\n");
        out
    }
}

fn render_element(out: &mut String, elem: &SvgElement) {
    match elem {
        SvgElement::Rect { x, y, w, h, style } => {
            let _ = write!(out, r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}""#);
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Line { x1, y1, x2, y2, style } => {
            let _ = write!(out, r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#);
            write_line_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Polyline { points, style } => {
            out.push_str(r#"<polyline points=""#);
            write_points(out, points);
            out.push_str(r#"" fill="none""#);
            write_line_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Polygon { points, style } => {
            out.push_str(r#"<polygon points=""#);
            write_points(out, points);
            out.push('"');
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Text { x, y, runs, style, rotate } => {
            let _ = write!(out, r#"<text x="{x:.2}" y="{y:.2}""#);
            let _ = write!(out, r#" font-family="{FONT_FAMILY}" font-size="{:.1}""#, style.size);
            let _ = write!(out, r#" fill="{}""#, style.color.to_svg_fill());
            let _ = write!(out, r#" text-anchor="{}""#, style.anchor.as_str());
            let _ = write!(out, r#" dominant-baseline="{}""#, style.baseline.as_str());
            if style.weight == FontWeight::Bold {
                out.push_str(r#" font-weight="bold""#);
            }
            if style.style == FontStyle::Italic {
                out.push_str(r#" font-style="italic""#);
            }
            if let Some(angle) = rotate {
                let _ = write!(out, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#);
            }
            out.push('>');
            write_runs(out, runs, style);
            out.push_str("</text>\n");
        }
        SvgElement::Circle { cx, cy, r, style } => {
            let _ = write!(out, r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}""#);
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Group { clip_id, children } => {
            let _ = writeln!(out, r#"<g clip-path="url(#{clip_id})">"#);
            for child in children {
                render_element(out, child);
            }
            out.push_str("</g>\n");
        }
    }
}

fn write_runs(out: &mut String, runs: &[TextRun], style: &TextStyle) {
    // A single unstyled run needs no tspan.
    if let [run] = runs
        && run.shift == Shift::Normal
        && run.weight.is_none()
        && run.style.is_none()
    {
        escape_into(out, &run.text);
        return;
    }
    for run in runs {
        out.push_str("<tspan");
        match run.shift {
            Shift::Normal => {}
            Shift::Sub => {
                let _ = write!(
                    out,
                    r#" baseline-shift="sub" font-size="{:.1}""#,
                    style.size * SCRIPT_SCALE
                );
            }
            Shift::Super => {
                let _ = write!(
                    out,
                    r#" baseline-shift="super" font-size="{:.1}""#,
                    style.size * SCRIPT_SCALE
                );
            }
        }
        match run.weight {
            Some(FontWeight::Bold) => out.push_str(r#" font-weight="bold""#),
            Some(FontWeight::Regular) => out.push_str(r#" font-weight="normal""#),
            None => {}
        }
        match run.style {
            Some(FontStyle::Italic) => out.push_str(r#" font-style="italic""#),
            Some(FontStyle::Normal) => out.push_str(r#" font-style="normal""#),
            None => {}
        }
        out.push('>');
        escape_into(out, &run.text);
        out.push_str("</tspan>");
    }
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn write_points(out: &mut String, points: &[(f64, f64)]) {
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{x:.2},{y:.2}");
    }
}

fn write_style_attrs(out: &mut String, style: &Style) {
    match &style.fill {
        Some(fill) => {
            let _ = write!(out, r#" fill="{}""#, fill.to_svg_fill());
        }
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = &style.stroke {
        let _ = write!(out, r#" stroke="{}""#, stroke.to_svg_fill());
        let _ = write!(out, r#" stroke-width="{:.2}""#, style.stroke_width);
    }
    if (style.opacity - 1.0).abs() > 1e-4 {
        let _ = write!(out, r#" opacity="{:.3}""#, style.opacity);
    }
}

fn write_line_attrs(out: &mut String, style: &LineStyle) {
    let _ = write!(out, r#" stroke="{}""#, style.color.to_svg_fill());
    let _ = write!(out, r#" stroke-width="{:.2}""#, style.width);
    if let Some(dash) = &style.dash {
        let _ = write!(out, r#" stroke-dasharray="{dash}""#);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(w: f64, h: f64) -> Canvas {
        Canvas::with_fonts(w, h, Arc::new(FontHandle::empty()))
    }

    #[test]
    fn empty_canvas() {
        let svg = canvas(100.0, 50.0).finish_svg();
        assert!(svg.contains("width=\"100\""));
        assert!(svg.contains("height=\"50\""));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn rect_rendering() {
        let mut c = canvas(200.0, 100.0);
        c.rect(10.0, 20.0, 50.0, 30.0, &Style::filled(Color::rgb(255, 0, 0)));
        let svg = c.finish_svg();
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains("width=\"50.00\""));
    }

    #[test]
    fn latex_text_becomes_tspans() {
        let mut c = canvas(200.0, 100.0);
        c.latex(10.0, 20.0, "p_{T} & #eta", &TextStyle::default());
        let svg = c.finish_svg();
        assert!(svg.contains(r#"<tspan baseline-shift="sub" font-size="14.0">T</tspan>"#));
        assert!(svg.contains("&amp; \u{03B7}"));
    }

    #[test]
    fn plain_text_is_escaped_verbatim() {
        let mut c = canvas(200.0, 100.0);
        c.text(10.0, 20.0, "a_{b} <c>", &TextStyle::default());
        let svg = c.finish_svg();
        assert!(svg.contains(">a_{b} &lt;c&gt;</text>"));
    }

    #[test]
    fn clip_groups_wrap_their_elements() {
        let mut c = canvas(100.0, 100.0);
        let id = c.push_clip(10.0, 10.0, 80.0, 80.0);
        c.line(0.0, 0.0, 100.0, 100.0, &LineStyle::default());
        c.pop_clip();
        c.line(0.0, 100.0, 100.0, 0.0, &LineStyle::default());
        let svg = c.finish_svg();
        let group = svg.find(&format!(r#"<g clip-path="url(#{id})">"#)).unwrap();
        let inner = svg.find(r#"<line x1="0.00" y1="0.00""#).unwrap();
        let close = svg.find("</g>").unwrap();
        let outer = svg.find(r#"<line x1="0.00" y1="100.00""#).unwrap();
        assert!(group < inner && inner < close && close < outer);
        assert!(svg.contains(r#"<clipPath id="clip0">"#));
    }

    #[test]
    fn open_markers_are_white_filled() {
        let mut c = canvas(100.0, 100.0);
        c.marker(50.0, 50.0, &MarkerStyle::root(25, Color::rgb(0, 0, 255), 1.0));
        let svg = c.finish_svg();
        assert!(svg.contains(r##"fill="#ffffff" stroke="#0000ff""##));
    }
}
