use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// One legend row. Options follow TLegend: `line` for "L", `marker` for "P",
/// `fill` for "F".
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub line: Option<LineStyle>,
    pub marker: Option<MarkerStyle>,
    pub fill: Option<Color>,
}

impl LegendEntry {
    /// Line + marker entry ("LP").
    pub fn line_marker(label: impl Into<String>, line: LineStyle, marker: MarkerStyle) -> Self {
        Self { label: label.into(), line: Some(line), marker: Some(marker), fill: None }
    }
}

/// A TLegend-like box at a fixed position.
#[derive(Debug, Clone)]
pub struct Legend {
    pub area: PlotArea,
    pub entries: Vec<LegendEntry>,
    pub border: bool,
    /// Text size in pixels; `None` fits the row height.
    pub text_size: Option<f64>,
    /// Fraction of the width reserved for the symbol column.
    pub margin: f64,
}

impl Legend {
    pub fn new(area: PlotArea) -> Self {
        Self { area, entries: Vec::new(), border: true, text_size: None, margin: 0.25 }
    }

    pub fn add(&mut self, entry: LegendEntry) {
        self.entries.push(entry);
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        if self.entries.is_empty() {
            return;
        }
        let a = &self.area;
        let bg = Style {
            fill: Some(Color::WHITE),
            stroke: self.border.then_some(Color::BLACK),
            stroke_width: 1.0,
            opacity: 1.0,
        };
        canvas.rect(a.left, a.top, a.width, a.height, &bg);

        let row_h = a.height / self.entries.len() as f64;
        let symbol_w = a.width * self.margin;
        let text_size = self.text_size.unwrap_or(row_h * 0.75).min(row_h * 0.9);
        let mut text_style = TextStyle {
            size: text_size,
            baseline: TextBaseline::Central,
            ..Default::default()
        };
        // labels wider than the text column shrink together
        let avail = (a.width - symbol_w) * 0.95;
        let widest = self
            .entries
            .iter()
            .map(|e| canvas.measure_latex(&e.label, &text_style).width)
            .fold(0.0_f64, f64::max);
        if widest > avail && avail > 0.0 {
            text_style.size *= avail / widest;
        }

        for (i, entry) in self.entries.iter().enumerate() {
            let cy = a.top + (i as f64 + 0.5) * row_h;
            let cx = a.left + symbol_w / 2.0;

            if let Some(fill) = entry.fill {
                canvas.rect(
                    a.left + symbol_w * 0.15,
                    cy - row_h * 0.35,
                    symbol_w * 0.7,
                    row_h * 0.7,
                    &Style { fill: Some(fill), ..Style::stroked(Color::BLACK, 1.0) },
                );
            }
            if let Some(line) = &entry.line {
                canvas.line(a.left + symbol_w * 0.15, cy, a.left + symbol_w * 0.85, cy, line);
            }
            if let Some(marker) = &entry.marker {
                canvas.marker(cx, cy, marker);
            }
            canvas.latex(a.left + symbol_w, cy, &entry.label, &text_style);
        }
    }
}
