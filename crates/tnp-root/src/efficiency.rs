//! `TEfficiency` contents and their painted representations.
//!
//! A `TEfficiency` stores a passed and a total histogram; what ROOT actually
//! draws is derived from them. In 1D that is a graph with one point per
//! non-empty bin and asymmetric confidence-interval errors, in 2D a histogram
//! of per-cell efficiencies.

use statrs::distribution::{Beta, ContinuousCDF};

use crate::graph::Graph;
use crate::histogram::{Histogram, Histogram2D};

/// Confidence-interval method (`TEfficiency::EStatOption`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatOption {
    /// Clopper–Pearson exact interval.
    #[default]
    ClopperPearson,
    /// Normal approximation.
    Normal,
    /// Wilson score interval.
    Wilson,
    /// Agresti–Coull interval.
    AgrestiCoull,
    /// Feldman–Cousins (computed as Clopper–Pearson here).
    FeldmanCousins,
    /// Bayesian with Jeffrey's prior Beta(0.5, 0.5).
    Jeffrey,
    /// Bayesian with a uniform prior Beta(1, 1).
    Uniform,
    /// Bayesian with the stored beta prior.
    Bayesian,
    /// Mid-P Lancaster (computed as Clopper–Pearson here).
    MidP,
}

impl StatOption {
    /// Decode the integer stored in `fStatisticOption`.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::ClopperPearson,
            1 => Self::Normal,
            2 => Self::Wilson,
            3 => Self::AgrestiCoull,
            4 => Self::FeldmanCousins,
            5 => Self::Jeffrey,
            6 => Self::Uniform,
            7 => Self::Bayesian,
            8 => Self::MidP,
            _ => return None,
        })
    }

    /// Integer code as stored on disk.
    pub fn code(self) -> i32 {
        match self {
            Self::ClopperPearson => 0,
            Self::Normal => 1,
            Self::Wilson => 2,
            Self::AgrestiCoull => 3,
            Self::FeldmanCousins => 4,
            Self::Jeffrey => 5,
            Self::Uniform => 6,
            Self::Bayesian => 7,
            Self::MidP => 8,
        }
    }

    fn is_bayesian(self) -> bool {
        matches!(self, Self::Jeffrey | Self::Uniform | Self::Bayesian)
    }
}

/// Passed/total histograms of an efficiency, 1D or 2D.
#[derive(Debug, Clone, PartialEq)]
pub enum EfficiencyHistograms {
    /// One-dimensional efficiency.
    OneD {
        /// Passed histogram.
        passed: Histogram,
        /// Total histogram.
        total: Histogram,
    },
    /// Two-dimensional efficiency.
    TwoD {
        /// Passed histogram.
        passed: Histogram2D,
        /// Total histogram.
        total: Histogram2D,
    },
}

/// A `TEfficiency` read from a ROOT file.
#[derive(Debug, Clone, PartialEq)]
pub struct Efficiency {
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
    /// Passed and total histograms.
    pub histograms: EfficiencyHistograms,
    /// Interval method.
    pub statistic: StatOption,
    /// Confidence level of the intervals (ROOT default 0.683).
    pub conf_level: f64,
    /// Global beta prior alpha.
    pub beta_alpha: f64,
    /// Global beta prior beta.
    pub beta_beta: f64,
    /// Per-bin beta priors, indexed by ROOT global bin number.
    pub bin_priors: Vec<(f64, f64)>,
    /// Event weight.
    pub weight: f64,
}

/// Point estimate and interval bounds for one bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Efficiency point estimate.
    pub value: f64,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl Efficiency {
    /// New 1D efficiency with ROOT's defaults (Clopper–Pearson, 68.3 %).
    pub fn new_1d(name: impl Into<String>, title: impl Into<String>, passed: Histogram, total: Histogram) -> Self {
        Self::with_histograms(name, title, EfficiencyHistograms::OneD { passed, total })
    }

    /// New 2D efficiency with ROOT's defaults.
    pub fn new_2d(
        name: impl Into<String>,
        title: impl Into<String>,
        passed: Histogram2D,
        total: Histogram2D,
    ) -> Self {
        Self::with_histograms(name, title, EfficiencyHistograms::TwoD { passed, total })
    }

    fn with_histograms(name: impl Into<String>, title: impl Into<String>, histograms: EfficiencyHistograms) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            histograms,
            statistic: StatOption::default(),
            conf_level: 0.682689492137,
            beta_alpha: 1.0,
            beta_beta: 1.0,
            bin_priors: Vec::new(),
            weight: 1.0,
        }
    }

    /// Dimension of the underlying histograms (1 or 2).
    pub fn dimension(&self) -> usize {
        match self.histograms {
            EfficiencyHistograms::OneD { .. } => 1,
            EfficiencyHistograms::TwoD { .. } => 2,
        }
    }

    /// Efficiency and interval for `passed` out of `total`, using the prior of `global_bin`.
    pub fn interval(&self, passed: f64, total: f64, global_bin: usize) -> Interval {
        if total <= 0.0 {
            return Interval { value: 0.0, lower: 0.0, upper: 0.0 };
        }
        let level = self.conf_level;
        let passed = passed.clamp(0.0, total);
        let ratio = passed / total;

        match self.statistic {
            StatOption::Normal => {
                let delta = normal_quantile(0.5 * (1.0 + level)) * (ratio * (1.0 - ratio) / total).sqrt();
                Interval { value: ratio, lower: (ratio - delta).max(0.0), upper: (ratio + delta).min(1.0) }
            }
            StatOption::Wilson => {
                let kappa = normal_quantile(0.5 * (1.0 + level));
                let k2 = kappa * kappa;
                let mode = (passed + 0.5 * k2) / (total + k2);
                let delta = kappa / (total + k2) * (total * ratio * (1.0 - ratio) + k2 / 4.0).sqrt();
                Interval { value: ratio, lower: (mode - delta).max(0.0), upper: (mode + delta).min(1.0) }
            }
            StatOption::AgrestiCoull => {
                let kappa = normal_quantile(0.5 * (1.0 + level));
                let k2 = kappa * kappa;
                let mode = (passed + 0.5 * k2) / (total + k2);
                let delta = kappa * (mode * (1.0 - mode) / (total + k2)).sqrt();
                Interval { value: ratio, lower: (mode - delta).max(0.0), upper: (mode + delta).min(1.0) }
            }
            opt if opt.is_bayesian() => {
                let (alpha, beta) = self.prior(global_bin);
                let a = passed + alpha;
                let b = total - passed + beta;
                Interval {
                    value: a / (a + b),
                    lower: beta_quantile(0.5 * (1.0 - level), a, b).unwrap_or(0.0),
                    upper: beta_quantile(0.5 * (1.0 + level), a, b).unwrap_or(1.0),
                }
            }
            opt => {
                if matches!(opt, StatOption::FeldmanCousins | StatOption::MidP) {
                    tracing::debug!(name = %self.name, ?opt, "interval computed as Clopper-Pearson");
                }
                clopper_pearson(passed, total, level)
            }
        }
    }

    /// Beta prior used for `global_bin`.
    fn prior(&self, global_bin: usize) -> (f64, f64) {
        match self.statistic {
            StatOption::Jeffrey => (0.5, 0.5),
            StatOption::Uniform => (1.0, 1.0),
            _ => self.bin_priors.get(global_bin).copied().unwrap_or((self.beta_alpha, self.beta_beta)),
        }
    }

    /// The graph ROOT paints for a 1D efficiency; `None` for 2D.
    ///
    /// Bins with an empty total are skipped. Each point sits at the bin center
    /// with half-bin x errors and the interval as asymmetric y errors.
    pub fn painted_graph(&self) -> Option<Graph> {
        let EfficiencyHistograms::OneD { passed, total } = &self.histograms else {
            return None;
        };
        let axis = &total.x_axis;
        let mut g = Graph {
            name: self.name.clone(),
            title: self.title.clone(),
            x_title: axis.title.clone(),
            y_title: total.y_title.clone(),
            ..Graph::default()
        };
        for i in 0..total.n_bins() {
            let t = total.bin_content[i];
            if t <= 0.0 {
                continue;
            }
            let p = passed.bin_content.get(i).copied().unwrap_or(0.0);
            let iv = self.interval(p, t, i + 1);
            let half = 0.5 * axis.width(i);
            g.x.push(axis.center(i));
            g.y.push(iv.value);
            g.ex_low.push(half);
            g.ex_high.push(half);
            g.ey_low.push(iv.value - iv.lower);
            g.ey_high.push(iv.upper - iv.value);
        }
        Some(g)
    }

    /// The histogram ROOT paints for a 2D efficiency; `None` for 1D.
    ///
    /// Empty cells are 0.
    pub fn painted_histogram(&self) -> Option<Histogram2D> {
        let EfficiencyHistograms::TwoD { passed, total } = &self.histograms else {
            return None;
        };
        let mut h = Histogram2D::new(&self.name, &self.title, total.x_axis.clone(), total.y_axis.clone());
        h.z_title = total.z_title.clone();
        let row = total.nx() + 2;
        for iy in 0..total.ny() {
            for ix in 0..total.nx() {
                let t = total.at(ix, iy);
                if t <= 0.0 {
                    continue;
                }
                let global = (iy + 1) * row + ix + 1;
                *h.at_mut(ix, iy) = self.interval(passed.at(ix, iy), t, global).value;
            }
        }
        Some(h)
    }
}

/// Clopper–Pearson interval from beta quantiles.
fn clopper_pearson(passed: f64, total: f64, level: f64) -> Interval {
    let alpha = 0.5 * (1.0 - level);
    let lower = if passed <= 0.0 { 0.0 } else { beta_quantile(alpha, passed, total - passed + 1.0).unwrap_or(0.0) };
    let upper = if passed >= total { 1.0 } else { beta_quantile(1.0 - alpha, passed + 1.0, total - passed).unwrap_or(1.0) };
    Interval { value: passed / total, lower, upper }
}

fn beta_quantile(p: f64, a: f64, b: f64) -> Option<f64> {
    Beta::new(a, b).ok().map(|d| d.inverse_cdf(p))
}

/// Standard normal quantile.
fn normal_quantile(p: f64) -> f64 {
    std::f64::consts::SQRT_2 * statrs::function::erf::erf_inv(2.0 * p - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::Axis;
    use approx::assert_relative_eq;

    fn eff_1d(passed: &[f64], total: &[f64]) -> Efficiency {
        let axis = Axis::uniform(passed.len(), 0.0, passed.len() as f64, "p_{T}");
        let mut p = Histogram::new("p", "", axis.clone());
        let mut t = Histogram::new("t", "", axis);
        p.bin_content = passed.to_vec();
        t.bin_content = total.to_vec();
        Efficiency::new_1d("eff", "efficiency", p, t)
    }

    #[test]
    fn stat_option_codes_round_trip() {
        for code in 0..=8 {
            assert_eq!(StatOption::from_code(code).unwrap().code(), code);
        }
        assert!(StatOption::from_code(9).is_none());
    }

    #[test]
    fn clopper_pearson_known_values() {
        let e = eff_1d(&[0.0], &[1.0]);
        // 5 of 10 at 68.27 %.
        let iv = e.interval(5.0, 10.0, 1);
        assert_relative_eq!(iv.value, 0.5);
        assert_relative_eq!(iv.lower, 0.3048, epsilon = 1e-3);
        assert_relative_eq!(iv.upper, 0.6952, epsilon = 1e-3);

        // Boundaries pin to 0 and 1.
        let iv = e.interval(0.0, 10.0, 1);
        assert_eq!(iv.lower, 0.0);
        assert_relative_eq!(iv.upper, 1.0 - (0.5 * (1.0 - e.conf_level)).powf(0.1), epsilon = 1e-6);
        let iv = e.interval(10.0, 10.0, 1);
        assert_eq!(iv.upper, 1.0);
    }

    #[test]
    fn normal_and_wilson_intervals() {
        let mut e = eff_1d(&[0.0], &[1.0]);
        e.statistic = StatOption::Normal;
        let iv = e.interval(50.0, 100.0, 1);
        assert_relative_eq!(iv.upper - iv.value, 0.05, epsilon = 1e-4);

        e.statistic = StatOption::Wilson;
        let iv = e.interval(0.0, 4.0, 1);
        assert!(iv.lower < 1e-12);
        assert!(iv.upper > 0.0 && iv.upper < 1.0);
    }

    #[test]
    fn bayesian_uniform_uses_posterior_mean() {
        let mut e = eff_1d(&[0.0], &[1.0]);
        e.statistic = StatOption::Uniform;
        let iv = e.interval(3.0, 4.0, 1);
        assert_relative_eq!(iv.value, 4.0 / 6.0);
        assert!(iv.lower < iv.value && iv.value < iv.upper);
    }

    #[test]
    fn painted_graph_skips_empty_bins() {
        let e = eff_1d(&[1.0, 0.0, 4.0], &[2.0, 0.0, 4.0]);
        let g = e.painted_graph().unwrap();
        assert_eq!(g.x, vec![0.5, 2.5]);
        assert_eq!(g.y, vec![0.5, 1.0]);
        assert_eq!(g.ex_low, vec![0.5, 0.5]);
        assert_eq!(g.ey_high[1], 0.0);
        assert_eq!(g.x_title, "p_{T}");
        assert!(e.painted_histogram().is_none());
    }

    #[test]
    fn painted_histogram_divides_cells() {
        let ax = Axis::uniform(2, 0.0, 2.0, "");
        let mut p = Histogram2D::new("p", "", ax.clone(), ax.clone());
        let mut t = Histogram2D::new("t", "", ax.clone(), ax);
        *t.at_mut(0, 0) = 4.0;
        *p.at_mut(0, 0) = 1.0;
        *t.at_mut(1, 1) = 2.0;
        *p.at_mut(1, 1) = 2.0;
        let e = Efficiency::new_2d("e2", "", p, t);
        assert_eq!(e.dimension(), 2);
        let h = e.painted_histogram().unwrap();
        assert_eq!(h.content, vec![0.25, 0.0, 0.0, 1.0]);
        assert!(e.painted_graph().is_none());
    }
}
