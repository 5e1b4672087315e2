use crate::color::Color;

/// Export settings shared by every canvas of a run.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Raster resolution; canvas pixels are 1/72 inch, so 72 keeps the
    /// canvas size.
    pub dpi: u32,
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { dpi: 72, background: Color::WHITE }
    }
}

impl RenderConfig {
    /// Raster scale factor relative to canvas pixels.
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_canvas_size() {
        let c = RenderConfig::default();
        assert_eq!(c.scale(), 1.0);
        assert_eq!(c.background, Color::WHITE);
    }
}
