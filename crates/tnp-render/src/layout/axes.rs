/// Axis range with tick generation and data→pixel mapping.
///
/// Unlike auto-scaled plots the range is kept exactly as given (ROOT
/// `SetRangeUser` semantics); ticks are the "nice" multiples inside it.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
}

impl Axis {
    /// Linear axis over `[min, max]` with at most `max_divisions` primary
    /// divisions and 5 minor subdivisions each (ROOT `510`).
    pub fn linear(min: f64, max: f64, max_divisions: usize) -> Self {
        let widen = (min.abs() * 1e-9).max(1.0);
        let max = if max - min > 1e-15 { max } else { min + widen };
        let step = nice_step((max - min) / max_divisions.max(1) as f64);

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut minor = Vec::new();
        for (k, v) in multiples(min, max, step / 5.0) {
            if k % 5 == 0 {
                ticks.push(v);
                labels.push(format_tick(v, step));
            } else {
                minor.push(v);
            }
        }

        Self { min, max, tick_positions: ticks, tick_labels: labels, minor_ticks: minor }
    }

    /// Map a data value to pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = (value - self.min) / (self.max - self.min);
        px_min + frac * (px_max - px_min)
    }

    /// Map pixel coordinate to data value (inverse).
    pub fn pixel_to_data(&self, px: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = (px - px_min) / (px_max - px_min);
        self.min + frac * (self.max - self.min)
    }
}

/// Largest number of minor positions an axis will generate.
const MAX_POSITIONS: f64 = 10_000.0;

/// `(k, k * step)` for every multiple of `step` in `[min, max]`.
///
/// Empty when the step is not a positive finite number or the multiples
/// cannot be counted exactly (ranges near the `f64` limits).
fn multiples(min: f64, max: f64, step: f64) -> Vec<(i64, f64)> {
    if !(step.is_finite() && step > 0.0) {
        return Vec::new();
    }
    let first = (min / step - 1e-9).ceil();
    let last = (max / step + 1e-6).floor();
    if !(first.is_finite() && last.is_finite())
        || first.abs() > 1e15
        || last.abs() > 1e15
        || last - first > MAX_POSITIONS
    {
        return Vec::new();
    }
    (first as i64..=last as i64).map(|k| (k, k as f64 * step)).collect()
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.0 {
        1.0
    } else if frac <= 2.0 {
        2.0
    } else if frac <= 2.5 {
        2.5
    } else if frac <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 && step.fract().abs() < 1e-9 {
        0
    } else {
        let mut d = (-step.log10().floor()).max(0.0) as usize;
        // 2.5, 0.25, ... need one more digit
        let scaled = step * 10f64.powi(d as i32);
        if (scaled - scaled.round()).abs() > 1e-6 {
            d += 1;
        }
        d
    };
    let v = if value.abs() < step * 1e-6 { 0.0 } else { value };
    if decimals == 0 { format!("{}", v.round() as i64) } else { format!("{v:.decimals$}") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_keeps_exact_range() {
        let ax = Axis::linear(0.0, 1.05, 10);
        assert_eq!(ax.min, 0.0);
        assert_eq!(ax.max, 1.05);
        assert_eq!(ax.tick_labels.first().map(String::as_str), Some("0.0"));
        assert!(ax.tick_positions.iter().all(|&t| t <= 1.05 + 1e-9));
        assert_eq!(ax.tick_labels[1], "0.2");
    }

    #[test]
    fn ticks_start_inside_offset_range() {
        let ax = Axis::linear(-2.4, 2.4, 10);
        assert_relative_eq!(ax.tick_positions[0], -2.0);
        assert_eq!(ax.tick_labels[0], "-2.0");
        assert!(ax.minor_ticks.iter().all(|&m| m >= -2.4 - 1e-9));
    }

    #[test]
    fn data_to_pixel_linear() {
        let ax = Axis::linear(0.0, 100.0, 5);
        assert_relative_eq!(ax.data_to_pixel(50.0, 0.0, 500.0), 250.0);
        assert_relative_eq!(ax.pixel_to_data(250.0, 0.0, 500.0), 50.0);
        // inverted pixel direction for y axes
        assert_relative_eq!(ax.data_to_pixel(100.0, 500.0, 0.0), 0.0);
    }

    #[test]
    fn degenerate_range_is_widened() {
        let ax = Axis::linear(3.0, 3.0, 10);
        assert_eq!((ax.min, ax.max), (3.0, 4.0));
    }

    #[test]
    fn degenerate_range_far_from_zero_is_widened_relatively() {
        // min + 1.0 == min at this magnitude
        let ax = Axis::linear(1e17, 1e17, 10);
        assert!(ax.max > ax.min);
        assert!(!ax.tick_positions.is_empty());
        assert_eq!(ax.tick_positions.len(), ax.tick_labels.len());
        assert!(ax.tick_positions.iter().all(|&t| t >= ax.min && t <= ax.max));
    }

    #[test]
    fn overflowing_range_has_no_ticks() {
        let ax = Axis::linear(-1.7e308, 1.7e308, 10);
        assert_eq!((ax.min, ax.max), (-1.7e308, 1.7e308));
        assert!(ax.tick_positions.is_empty());
        assert!(ax.minor_ticks.is_empty());
    }

    #[test]
    fn multiples_are_bounded() {
        assert!(multiples(0.0, 1.0, 0.0).is_empty());
        assert!(multiples(0.0, 1.0, f64::INFINITY).is_empty());
        assert!(multiples(0.0, 1.0, 1e-9).is_empty());
        let m = multiples(-0.5, 1.0, 0.5);
        assert_eq!(m.iter().map(|&(k, _)| k).collect::<Vec<_>>(), vec![-1, 0, 1, 2]);
    }

    #[test]
    fn nice_step_values() {
        assert_relative_eq!(nice_step(3.2), 5.0);
        assert_relative_eq!(nice_step(0.105), 0.2);
        assert_relative_eq!(nice_step(15.0), 20.0);
        assert_relative_eq!(nice_step(2.3), 2.5);
        assert_relative_eq!(nice_step(1.0), 1.0);
    }

    #[test]
    fn tick_formatting() {
        assert_eq!(format_tick(10.0, 10.0), "10");
        assert_eq!(format_tick(0.25, 0.25), "0.25");
        assert_eq!(format_tick(-0.0000001, 0.5), "0.0");
        assert_eq!(format_tick(7.5, 2.5), "7.5");
    }
}
