use crate::color::Color;

/// Fill + stroke style for rectangles and polygons.
#[derive(Debug, Clone)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self { fill: None, stroke: None, stroke_width: 1.0, opacity: 1.0 }
    }
}

impl Style {
    pub fn filled(color: Color) -> Self {
        Self { fill: Some(color), ..Default::default() }
    }

    pub fn stroked(color: Color, width: f64) -> Self {
        Self { stroke: Some(color), stroke_width: width, ..Default::default() }
    }
}

/// Line style.
#[derive(Debug, Clone)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
    pub dash: Option<String>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self { color: Color::BLACK, width: 1.0, dash: None }
    }
}

impl LineStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dash: None }
    }

    pub fn dotted(color: Color, width: f64) -> Self {
        Self { color, width, dash: Some("1 3".into()) }
    }
}

/// Text style. `size` is the font size in pixels.
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub size: f64,
    pub color: Color,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub anchor: TextAnchor,
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 20.0,
            color: Color::BLACK,
            weight: FontWeight::Regular,
            style: FontStyle::Normal,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Alphabetic,
    Central,
    Hanging,
}

impl TextBaseline {
    pub fn as_str(&self) -> &str {
        match self {
            TextBaseline::Alphabetic => "auto",
            TextBaseline::Central => "central",
            TextBaseline::Hanging => "hanging",
        }
    }
}

/// Marker style for data points. `size` is the half-extent in pixels.
#[derive(Debug, Clone)]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    pub size: f64,
    pub color: Color,
    pub fill: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Dot,
    Plus,
    Asterisk,
    Circle,
    Cross,
    Square,
    TriangleUp,
    TriangleDown,
    Diamond,
    ThickCross,
    Star,
}

/// Pixel half-extent of a ROOT marker of size 1.
pub const MARKER_UNIT: f64 = 4.0;

impl MarkerStyle {
    /// Marker for a ROOT `EMarkerStyle` code (20 = full circle, 21 = full
    /// square, ...). Unknown codes draw a full circle.
    pub fn root(code: i32, color: Color, size: f64) -> Self {
        let (shape, fill) = match code {
            1 | 6 | 7 => (MarkerShape::Dot, true),
            2 => (MarkerShape::Plus, false),
            3 | 31 => (MarkerShape::Asterisk, false),
            4 | 24 => (MarkerShape::Circle, false),
            5 => (MarkerShape::Cross, false),
            8 | 20 => (MarkerShape::Circle, true),
            21 => (MarkerShape::Square, true),
            22 => (MarkerShape::TriangleUp, true),
            23 => (MarkerShape::TriangleDown, true),
            25 => (MarkerShape::Square, false),
            26 => (MarkerShape::TriangleUp, false),
            27 => (MarkerShape::Diamond, false),
            28 => (MarkerShape::ThickCross, false),
            29 => (MarkerShape::Star, true),
            30 => (MarkerShape::Star, false),
            32 => (MarkerShape::TriangleDown, false),
            33 => (MarkerShape::Diamond, true),
            34 => (MarkerShape::ThickCross, true),
            _ => (MarkerShape::Circle, true),
        };
        let size = if shape == MarkerShape::Dot { 1.0 } else { size * MARKER_UNIT };
        Self { shape, size, color, fill }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self { shape: MarkerShape::Circle, size: MARKER_UNIT, color: Color::BLACK, fill: true }
    }
}
