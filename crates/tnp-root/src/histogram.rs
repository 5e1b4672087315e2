//! Public histogram types returned by [`RootFile::read_object`](crate::RootFile::read_object).

/// One histogram axis: binning plus its title.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// Bin edges (length = number of bins + 1).
    pub edges: Vec<f64>,
    /// Axis title (the `TAxis` title, may contain TLatex markup).
    pub title: String,
}

impl Axis {
    /// Uniform binning of `n_bins` bins over `[min, max]`.
    pub fn uniform(n_bins: usize, min: f64, max: f64, title: impl Into<String>) -> Self {
        let width = (max - min) / n_bins.max(1) as f64;
        let edges = (0..=n_bins)
            .map(|i| if i == n_bins { max } else { min + i as f64 * width })
            .collect();
        Self { edges, title: title.into() }
    }

    /// Variable binning from explicit edges.
    pub fn variable(edges: Vec<f64>, title: impl Into<String>) -> Self {
        Self { edges, title: title.into() }
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Lower edge of the first bin.
    pub fn min(&self) -> f64 {
        self.edges.first().copied().unwrap_or(0.0)
    }

    /// Upper edge of the last bin.
    pub fn max(&self) -> f64 {
        self.edges.last().copied().unwrap_or(0.0)
    }

    /// Whether the bins all have the same width.
    pub fn is_uniform(&self) -> bool {
        let n = self.n_bins();
        if n < 2 {
            return true;
        }
        let w0 = self.edges[1] - self.edges[0];
        self.edges.windows(2).all(|w| ((w[1] - w[0]) - w0).abs() <= 1e-9 * w0.abs().max(1.0))
    }

    /// Center of bin `i` (0-based, excluding underflow).
    pub fn center(&self, i: usize) -> f64 {
        0.5 * (self.edges[i] + self.edges[i + 1])
    }

    /// Width of bin `i` (0-based, excluding underflow).
    pub fn width(&self, i: usize) -> f64 {
        self.edges[i + 1] - self.edges[i]
    }
}

/// A 1D histogram extracted from a ROOT file.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Histogram name.
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// X axis (binning and title).
    pub x_axis: Axis,
    /// Title of the (unbinned) Y axis.
    pub y_title: String,
    /// Bin contents (length = n_bins, excluding under/overflow).
    pub bin_content: Vec<f64>,
    /// Sum of weights squared per bin, if stored.
    pub sumw2: Option<Vec<f64>>,
    /// Underflow bin content.
    pub underflow: f64,
    /// Overflow bin content.
    pub overflow: f64,
    /// Number of entries recorded by ROOT (`fEntries`).
    pub entries: f64,
}

impl Histogram {
    /// Create an empty histogram with the given binning.
    pub fn new(name: impl Into<String>, title: impl Into<String>, x_axis: Axis) -> Self {
        let n = x_axis.n_bins();
        Self {
            name: name.into(),
            title: title.into(),
            x_axis,
            y_title: String::new(),
            bin_content: vec![0.0; n],
            sumw2: None,
            underflow: 0.0,
            overflow: 0.0,
            entries: 0.0,
        }
    }

    /// Number of bins (excluding under/overflow).
    pub fn n_bins(&self) -> usize {
        self.bin_content.len()
    }

    /// Statistical error of bin `i`: `sqrt(sumw2)` if stored, else `sqrt(|content|)`.
    pub fn bin_error(&self, i: usize) -> f64 {
        match &self.sumw2 {
            Some(w2) if i < w2.len() => w2[i].max(0.0).sqrt(),
            _ => self.bin_content[i].abs().sqrt(),
        }
    }

    /// Largest bin content (0 for an empty histogram).
    pub fn max_content(&self) -> f64 {
        self.bin_content.iter().copied().fold(0.0, f64::max)
    }

    /// Add `weight` at `x`, tracking under/overflow and sumw2.
    pub fn fill(&mut self, x: f64, weight: f64) {
        self.entries += 1.0;
        let edges = &self.x_axis.edges;
        if x < self.x_axis.min() {
            self.underflow += weight;
            return;
        }
        if x >= self.x_axis.max() {
            self.overflow += weight;
            return;
        }
        let bin = edges.partition_point(|&e| e <= x).saturating_sub(1);
        self.bin_content[bin] += weight;
        if let Some(w2) = &mut self.sumw2 {
            w2[bin] += weight * weight;
        }
    }
}

/// A 2D histogram extracted from a ROOT file.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2D {
    /// Histogram name.
    pub name: String,
    /// Histogram title.
    pub title: String,
    /// X axis.
    pub x_axis: Axis,
    /// Y axis.
    pub y_axis: Axis,
    /// Title of the Z (content) axis.
    pub z_title: String,
    /// Cell contents, row-major by y: `content[iy * nx + ix]`, flows excluded.
    pub content: Vec<f64>,
    /// Sum of weights squared per cell, same layout as `content`.
    pub sumw2: Option<Vec<f64>>,
    /// Number of entries recorded by ROOT.
    pub entries: f64,
}

impl Histogram2D {
    /// Create an empty 2D histogram with the given binning.
    pub fn new(name: impl Into<String>, title: impl Into<String>, x_axis: Axis, y_axis: Axis) -> Self {
        let n = x_axis.n_bins() * y_axis.n_bins();
        Self {
            name: name.into(),
            title: title.into(),
            x_axis,
            y_axis,
            z_title: String::new(),
            content: vec![0.0; n],
            sumw2: None,
            entries: 0.0,
        }
    }

    /// Number of X bins.
    pub fn nx(&self) -> usize {
        self.x_axis.n_bins()
    }

    /// Number of Y bins.
    pub fn ny(&self) -> usize {
        self.y_axis.n_bins()
    }

    /// Content of cell `(ix, iy)` (0-based).
    pub fn at(&self, ix: usize, iy: usize) -> f64 {
        self.content[iy * self.nx() + ix]
    }

    /// Mutable content of cell `(ix, iy)`.
    pub fn at_mut(&mut self, ix: usize, iy: usize) -> &mut f64 {
        let nx = self.nx();
        &mut self.content[iy * nx + ix]
    }

    /// Smallest and largest cell content.
    pub fn content_range(&self) -> (f64, f64) {
        self.content
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_axis_geometry() {
        let a = Axis::uniform(4, 0.0, 2.0, "p_{T}");
        assert_eq!(a.n_bins(), 4);
        assert_eq!(a.edges, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert!((a.center(1) - 0.75).abs() < 1e-12);
        assert!((a.width(3) - 0.5).abs() < 1e-12);
        assert!(a.is_uniform());
        assert!(!Axis::variable(vec![0.0, 1.0, 3.0], "").is_uniform());
    }

    #[test]
    fn fill_tracks_flows_and_errors() {
        let mut h = Histogram::new("h", "", Axis::variable(vec![0.0, 1.0, 3.0], "x"));
        h.sumw2 = Some(vec![0.0; 2]);
        h.fill(-1.0, 1.0);
        h.fill(0.5, 2.0);
        h.fill(2.9, 1.0);
        h.fill(3.0, 1.0);
        assert_eq!(h.bin_content, vec![2.0, 1.0]);
        assert_eq!(h.underflow, 1.0);
        assert_eq!(h.overflow, 1.0);
        assert_eq!(h.entries, 4.0);
        assert!((h.bin_error(0) - 2.0).abs() < 1e-12);
        assert_eq!(h.max_content(), 2.0);
    }

    #[test]
    fn error_falls_back_to_sqrt_content() {
        let mut h = Histogram::new("h", "", Axis::uniform(1, 0.0, 1.0, ""));
        h.bin_content[0] = 9.0;
        assert!((h.bin_error(0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn cell_indexing_is_row_major() {
        let mut h = Histogram2D::new("h", "", Axis::uniform(3, 0.0, 3.0, ""), Axis::uniform(2, 0.0, 2.0, ""));
        *h.at_mut(2, 1) = 5.0;
        assert_eq!(h.content[5], 5.0);
        assert_eq!(h.at(2, 1), 5.0);
        assert_eq!(h.content_range(), (0.0, 5.0));
    }
}
