/// Rectangular plot area within the canvas (pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// Pad margins as fractions of the pad size (ROOT `SetLeftMargin`, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self { left: 0.1, right: 0.1, top: 0.1, bottom: 0.1 }
    }
}

/// A pad: a sub-rectangle of the canvas with its own NDC system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pad {
    pub area: PlotArea,
}

impl Pad {
    /// Pad spanning canvas NDC `(x1, y1)`-`(x2, y2)`; NDC origin is bottom-left.
    pub fn from_ndc(canvas_w: f64, canvas_h: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            area: PlotArea {
                left: x1 * canvas_w,
                top: (1.0 - y2) * canvas_h,
                width: (x2 - x1) * canvas_w,
                height: (y2 - y1) * canvas_h,
            },
        }
    }

    /// Pixel position of pad NDC `(x, y)`.
    pub fn ndc(&self, x: f64, y: f64) -> (f64, f64) {
        (self.area.left + x * self.area.width, self.area.top + (1.0 - y) * self.area.height)
    }

    /// Pixel size of a text size given as a fraction of the pad (ROOT
    /// precision-2 fonts scale with the smaller pad dimension).
    pub fn text_px(&self, fraction: f64) -> f64 {
        fraction * self.area.width.min(self.area.height)
    }

    /// The frame inside the margins.
    pub fn frame(&self, margins: &Margins) -> PlotArea {
        let a = &self.area;
        PlotArea {
            left: a.left + margins.left * a.width,
            top: a.top + margins.top * a.height,
            width: (1.0 - margins.left - margins.right) * a.width,
            height: (1.0 - margins.top - margins.bottom) * a.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pad_ndc_maps_bottom_left_origin() {
        let pad = Pad::from_ndc(800.0, 800.0, 0.01, 0.0, 1.0, 1.0);
        assert_relative_eq!(pad.area.left, 8.0);
        assert_relative_eq!(pad.area.width, 792.0);
        let (x, y) = pad.ndc(0.0, 1.0);
        assert_relative_eq!(x, 8.0);
        assert_relative_eq!(y, 0.0);
        let (_, y) = pad.ndc(0.5, 0.25);
        assert_relative_eq!(y, 600.0);
        assert_relative_eq!(pad.text_px(0.05), 39.6);
    }

    #[test]
    fn frame_respects_margins() {
        let pad = Pad::from_ndc(800.0, 800.0, 0.0, 0.0, 1.0, 1.0);
        let f = pad.frame(&Margins::default());
        assert_relative_eq!(f.left, 80.0);
        assert_relative_eq!(f.right(), 720.0);
        assert_relative_eq!(f.top, 80.0);
        assert_relative_eq!(f.bottom(), 720.0);
    }
}
