//! Point graphs with asymmetric errors (TGraph family).

/// A graph read from a `TGraph`, `TGraphErrors` or `TGraphAsymmErrors`.
///
/// Symmetric errors are stored twice (low = high); a plain `TGraph` has all
/// errors zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    /// Graph name.
    pub name: String,
    /// Graph title.
    pub title: String,
    /// X axis title (from the attached frame histogram, if any).
    pub x_title: String,
    /// Y axis title (from the attached frame histogram, if any).
    pub y_title: String,
    /// Point x coordinates.
    pub x: Vec<f64>,
    /// Point y coordinates.
    pub y: Vec<f64>,
    /// Lower x errors.
    pub ex_low: Vec<f64>,
    /// Upper x errors.
    pub ex_high: Vec<f64>,
    /// Lower y errors.
    pub ey_low: Vec<f64>,
    /// Upper y errors.
    pub ey_high: Vec<f64>,
}

impl Graph {
    /// Graph from points without errors.
    pub fn from_points(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        let n = x.len();
        Self {
            name: name.into(),
            x,
            y,
            ex_low: vec![0.0; n],
            ex_high: vec![0.0; n],
            ey_low: vec![0.0; n],
            ey_high: vec![0.0; n],
            ..Self::default()
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the graph has no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Bounding box including error bars: `(xmin, xmax, ymin, ymax)`.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let mut b = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for i in 0..self.len() {
            b.0 = b.0.min(self.x[i] - self.ex_low[i]);
            b.1 = b.1.max(self.x[i] + self.ex_high[i]);
            b.2 = b.2.min(self.y[i] - self.ey_low[i]);
            b.3 = b.3.max(self.y[i] + self.ey_high[i]);
        }
        Some(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_include_errors() {
        let mut g = Graph::from_points("g", vec![1.0, 2.0], vec![0.5, 1.0]);
        g.ey_high[1] = 0.25;
        g.ex_low[0] = 0.5;
        assert_eq!(g.bounds(), Some((0.5, 2.0, 0.5, 1.25)));
        assert!(Graph::default().bounds().is_none());
    }
}
