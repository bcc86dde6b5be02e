//// # Sampled curves
////
//// A curve is an ordered sequence of samples, ascending in `x`, covering the
//// plotted range with a fixed step. The right endpoint is always included, even
//// when the range is not a multiple of the step: the last step is then shorter.
////
//// Two kinds of curves exist. The density curve sweeps the evaluation point `x`
//// for a fixed distribution. The likelihood curve sweeps candidate means for a
//// fixed observation, so its `x` axis is the mean.

use crate::stats::pdf;

/// Samples closer than this to the target are used as-is, without interpolating.
pub const SNAP_DISTANCE: f64 = 1e-4;

/// Upper bound on the regular samples of one curve. Wider ranges get a
/// coarser step.
pub const MAX_SAMPLES: usize = 10_000;

/// Tolerance when deciding whether the last regular sample already is the
/// right endpoint.
const ENDPOINT_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    pub x: f64,
    pub y: f64,
}

impl CurveSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a curve is a function of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveKind {
    /// `pdf(x, mean, sd)` as a function of `x`.
    Density { mean: f64, sd: f64 },
    /// `pdf(fixed_x, mean, sd)` as a function of `mean`.
    Likelihood { fixed_x: f64, sd: f64 },
}

impl CurveKind {
    /// Evaluates the curve exactly at `at`, which is an `x` for density curves
    /// and a mean for likelihood curves.
    pub fn eval(&self, at: f64) -> f64 {
        match *self {
            CurveKind::Density { mean, sd } => pdf(at, mean, sd),
            CurveKind::Likelihood { fixed_x, sd } => pdf(fixed_x, at, sd),
        }
    }
}

/// Samples `kind` over `[start, end]` with the given step.
///
/// Sample positions are computed as `start + i * step` rather than by repeated
/// addition, so long ranges do not accumulate drift. The step is coarsened so
/// that no more than [`MAX_SAMPLES`] regular samples are produced. An empty
/// vector is returned for an inverted or non-finite range or a non-positive
/// step.
pub fn generate_curve(kind: CurveKind, start: f64, end: f64, step: f64) -> Vec<CurveSample> {
    if !(step > 0.0) || !(start <= end) || !start.is_finite() || !end.is_finite() {
        return Vec::new();
    }
    if start == end {
        return vec![CurveSample::new(start, kind.eval(start))];
    }
    let step = capped_step(start, end, step);
    let n = ((end - start) / step + ENDPOINT_EPS).floor();
    let n = if n.is_finite() {
        (n as usize).min(MAX_SAMPLES)
    } else {
        MAX_SAMPLES
    };
    let mut samples = Vec::with_capacity(n.saturating_add(2));
    let overflows = !(end - start).is_finite();
    // near f64::MAX the last regular sample could round past `end`, leave it to
    // the endpoint below
    let last_regular = if overflows { n - 1 } else { n };
    for i in 0..=last_regular {
        let x = if overflows {
            // two halves, so the offset from `start` stays representable
            let half = i as f64 * (step / 2.0);
            start + half + half
        } else {
            start + i as f64 * step
        };
        samples.push(CurveSample::new(x, kind.eval(x)));
    }
    // `samples` is never empty here: `n >= 0` always yields the first sample
    let last = samples[samples.len() - 1].x;
    if end - last > ENDPOINT_EPS * step.max(1.0) {
        samples.push(CurveSample::new(end, kind.eval(end)));
    }
    samples
}

fn capped_step(start: f64, end: f64, step: f64) -> f64 {
    let max = MAX_SAMPLES as f64;
    let span = end - start;
    // the span itself overflows for bounds near f64::MAX
    let finest = if span.is_finite() {
        span / max
    } else {
        end / max - start / max
    };
    if step.is_finite() {
        step.max(finest)
    } else {
        finest
    }
}

/// Index of the sample whose `x` is closest to `x`, first one on ties.
pub fn nearest_by_x(samples: &[CurveSample], x: f64) -> Option<usize> {
    nearest_by(samples, |s| (s.x - x).abs())
}

/// Index of the sample whose `y` is closest to `y`, first one on ties.
pub fn nearest_by_y(samples: &[CurveSample], y: f64) -> Option<usize> {
    nearest_by(samples, |s| (s.y - y).abs())
}

fn nearest_by<F: Fn(&CurveSample) -> f64>(samples: &[CurveSample], dist: F) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, s) in samples.iter().enumerate() {
        let d = dist(s);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Approximates the curve at `x` from its two nearest samples.
///
/// When the nearest sample is within [`SNAP_DISTANCE`] its `y` is returned
/// directly, which also avoids dividing by a vanishing distance. Otherwise the
/// value is linearly interpolated (or extrapolated, outside the sampled range)
/// along the line through the two nearest samples.
pub fn interpolate(samples: &[CurveSample], x: f64) -> Option<f64> {
    let (first, second) = two_nearest(samples, x)?;
    let p1 = samples[first];
    if (p1.x - x).abs() < SNAP_DISTANCE {
        return Some(p1.y);
    }
    let Some(second) = second else {
        return Some(p1.y);
    };
    let p2 = samples[second];
    let t = (x - p1.x) / (p2.x - p1.x);
    Some(p1.y + t * (p2.y - p1.y))
}

fn two_nearest(samples: &[CurveSample], x: f64) -> Option<(usize, Option<usize>)> {
    let first = nearest_by_x(samples, x)?;
    let mut second: Option<(usize, f64)> = None;
    for (i, s) in samples.iter().enumerate() {
        if i == first {
            continue;
        }
        let d = (s.x - x).abs();
        match second {
            Some((_, bd)) if d >= bd => {}
            _ => second = Some((i, d)),
        }
    }
    Some((first, second.map(|(i, _)| i)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stats::DEFAULT_STEP;
    use pretty_assertions::assert_eq;

    const STD: CurveKind = CurveKind::Density { mean: 0.0, sd: 1.0 };

    #[test]
    fn test_generate_includes_both_endpoints() {
        let samples = generate_curve(STD, -3.0, 3.0, DEFAULT_STEP);
        assert_eq!(samples.len(), 61);
        assert_eq!(samples[0].x, -3.0);
        assert!((samples[60].x - 3.0).abs() < 1e-12);
        assert!(samples.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn test_generate_accepts_partial_last_step() {
        let samples = generate_curve(STD, 0.0, 1.05, DEFAULT_STEP);
        assert_eq!(samples.len(), 12);
        let last = samples[samples.len() - 1];
        assert_eq!(last.x, 1.05);
        assert_eq!(last.y, pdf(1.05, 0.0, 1.0));
        let before = samples[samples.len() - 2];
        assert!((before.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_generate_degenerate_inputs() {
        assert!(generate_curve(STD, 1.0, 0.0, 0.1).is_empty());
        assert!(generate_curve(STD, 0.0, 1.0, 0.0).is_empty());
        assert!(generate_curve(STD, 0.0, 1.0, f64::NAN).is_empty());
        assert_eq!(generate_curve(STD, 2.0, 2.0, 0.1).len(), 1);
    }

    #[test]
    fn test_generate_caps_wide_ranges() {
        for (start, end) in [(0.0, 1e9), (-3.0, 1e300), (-f64::MAX, f64::MAX)] {
            let samples = generate_curve(STD, start, end, DEFAULT_STEP);
            assert!(samples.len() >= 2 && samples.len() <= MAX_SAMPLES + 2);
            assert_eq!(samples[0].x, start);
            assert!(samples.iter().all(|s| s.x.is_finite() && s.y.is_finite()));
            assert!(samples.windows(2).all(|w| w[0].x < w[1].x));
        }
        assert!(generate_curve(STD, 0.0, f64::INFINITY, DEFAULT_STEP).is_empty());
        assert_eq!(generate_curve(STD, 0.0, 1.0, f64::INFINITY).len(), 2);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate_curve(STD, -7.3, 12.9, 0.1);
        let b = generate_curve(STD, -7.3, 12.9, 0.1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_likelihood_sweeps_the_mean() {
        let kind = CurveKind::Likelihood { fixed_x: 1.0, sd: 0.5 };
        let samples = generate_curve(kind, -2.0, 3.0, DEFAULT_STEP);
        for s in &samples {
            assert_eq!(s.y, pdf(1.0, s.x, 0.5));
        }
        let peak = nearest_by_y(&samples, pdf(1.0, 1.0, 0.5)).unwrap();
        assert!((samples[peak].x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_snaps_to_close_sample() {
        let samples = generate_curve(STD, -3.0, 3.0, DEFAULT_STEP);
        let at = samples[30].x + 5e-5;
        assert_eq!(interpolate(&samples, at), Some(samples[30].y));
    }

    #[test]
    fn test_interpolate_between_samples() {
        let samples = vec![CurveSample::new(0.0, 1.0), CurveSample::new(1.0, 3.0)];
        assert_eq!(interpolate(&samples, 0.25), Some(1.5));
        assert_eq!(interpolate(&samples, 0.75), Some(2.5));
        assert_eq!(interpolate(&[], 0.5), None);
        assert_eq!(interpolate(&samples[..1], 0.5), Some(1.0));
    }

    #[test]
    fn test_interpolation_close_to_exact() {
        let samples = generate_curve(STD, -3.0, 3.0, DEFAULT_STEP);
        for i in 0..600 {
            let x = -3.0 + i as f64 * 0.01;
            let approx = interpolate(&samples, x).unwrap();
            assert!((approx - STD.eval(x)).abs() < 2e-3, "x = {}", x);
        }
    }

    #[test]
    fn test_nearest_prefers_first_on_ties() {
        let samples = vec![
            CurveSample::new(0.0, 0.2),
            CurveSample::new(1.0, 0.4),
            CurveSample::new(2.0, 0.2),
        ];
        assert_eq!(nearest_by_y(&samples, 0.2), Some(0));
        assert_eq!(nearest_by_x(&samples, 0.5), Some(0));
        assert_eq!(nearest_by_x(&samples, 1.6), Some(2));
    }
}
