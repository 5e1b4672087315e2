//! Fixed ROOT drawing style of the plots.

use tnp_render::layout::margins::Margins;

/// Position in canvas NDC (origin bottom-left).
pub type Ndc = (f64, f64);

/// Canvas geometry, fonts and label placement.
///
/// Sizes ending in `_px` are pixels (ROOT precision-3 fonts such as 43/63);
/// the others are fractions of the canvas (precision-2 fonts such as 42/61).
#[derive(Debug, Clone)]
pub struct RootStyle {
    /// Canvas width in pixels.
    pub canvas_width: f64,
    /// Canvas height in pixels.
    pub canvas_height: f64,
    /// Pad box in canvas NDC: x1, y1, x2, y2.
    pub pad: [f64; 4],
    /// Pad margins.
    pub margins: Margins,
    /// Dotted grid at the primary ticks.
    pub grid: bool,
    /// Maximum primary tick divisions per axis (ROOT 510 → 10).
    pub divisions: usize,
    /// Line width of drawn objects.
    pub line_width: f64,
    /// Marker size multiplier.
    pub marker_size: f64,
    /// Axis label size (font 43).
    pub label_px: f64,
    /// Axis title size (font 63).
    pub title_px: f64,
    /// X title offset.
    pub x_title_offset: f64,
    /// Y title offset.
    pub y_title_offset: f64,
    /// Histogram y range is `[0, max * y_headroom]`.
    pub y_headroom: f64,
    /// Legend box in canvas NDC: x1, y1, x2, y2.
    pub legend: [f64; 4],
    /// Legend text size (font 43).
    pub legend_text_px: f64,
    /// Logo line 1 (font 61).
    pub logo_pos: Ndc,
    /// Logo line 1 size.
    pub logo_size: f64,
    /// Logo line 2 (font 52).
    pub sublogo_pos: Ndc,
    /// Logo line 2 size.
    pub sublogo_size: f64,
    /// Caption, right aligned (font 42).
    pub caption_pos: Ndc,
    /// Caption size.
    pub caption_size: f64,
    /// Legend title (font 43).
    pub legend_title_pos: Ndc,
    /// Legend title size.
    pub legend_title_px: f64,
    /// Color bar gap from the frame, as a fraction of the pad width.
    pub palette_gap: f64,
    /// Color bar width, as a fraction of the pad width.
    pub palette_width: f64,
}

impl Default for RootStyle {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 800.0,
            pad: [0.01, 0.0, 1.0, 1.0],
            margins: Margins::default(),
            grid: true,
            divisions: 10,
            line_width: 2.0,
            marker_size: 1.0,
            label_px: 20.0,
            title_px: 22.0,
            x_title_offset: 1.2,
            y_title_offset: 1.5,
            y_headroom: 1.5,
            legend: [0.49, 0.67, 0.85, 0.80],
            legend_text_px: 20.0,
            logo_pos: (0.16, 0.82),
            logo_size: 0.06,
            sublogo_pos: (0.16, 0.77),
            sublogo_size: 0.04,
            caption_pos: (0.90, 0.91),
            caption_size: 0.038,
            legend_title_pos: (0.49, 0.82),
            legend_title_px: 20.0,
            palette_gap: 0.005,
            palette_width: 0.04,
        }
    }
}
