//// # Normal distribution numerics
////
//// Everything in this module is a pure function of its arguments: density,
//// cumulative distribution, and the probit function built on top of the
//// approximations of `erf` and its inverse found in the `erf` submodule.

mod erf;

pub use erf::{erf, erfinv};

use crate::error::DomainError;
use std::f64::consts::{PI, SQRT_2};

/// Sampling step used for curves unless an adaptive step is requested.
pub const DEFAULT_STEP: f64 = 0.1;

/// Upper bound on the number of samples an adaptive step aims for.
const ADAPTIVE_SAMPLES: f64 = 200.0;

/// Gaussian density at `x`. NaN when `sd <= 0`.
pub fn pdf(x: f64, mean: f64, sd: f64) -> f64 {
    if !(sd > 0.0) {
        return f64::NAN;
    }
    let z = x - mean;
    (-(z * z) / (2.0 * sd * sd)).exp() / (sd * (2.0 * PI).sqrt())
}

/// Cumulative distribution `P(X <= x)` for `X ~ N(mean, sd^2)`.
pub fn cdf(x: f64, mean: f64, sd: f64) -> f64 {
    0.5 * (1.0 + erf((x - mean) / (sd * SQRT_2)))
}

/// The probit function: the `x` such that `cdf(x, mean, sd) == p`.
///
/// Probabilities of exactly 0 or 1 would require an infinite `x`, so the
/// domain is the open interval `(0, 1)`. NaN is rejected as well.
pub fn inverse_cdf(p: f64, mean: f64, sd: f64) -> Result<f64, DomainError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(DomainError::ProbabilityOutOfRange { p });
    }
    Ok(mean + sd * SQRT_2 * erfinv(2.0 * p - 1.0))
}

/// Sampling step that keeps a curve over `[start, end]` to roughly 200
/// samples, never finer than [`DEFAULT_STEP`].
pub fn adjust_step(start: f64, end: f64) -> f64 {
    let range = (end - start).abs();
    DEFAULT_STEP.max(range / ADAPTIVE_SAMPLES)
}

/// A normal distribution with validated parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    mean: f64,
    std_dev: f64,
}

impl Default for Normal {
    fn default() -> Self {
        Self {
            mean: 0.0,
            std_dev: 1.0,
        }
    }
}

impl Normal {
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, DomainError> {
        if !(std_dev > 0.0) {
            return Err(DomainError::NonPositiveStdDev { sd: std_dev });
        }
        Ok(Self { mean, std_dev })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn pdf(&self, x: f64) -> f64 {
        pdf(x, self.mean, self.std_dev)
    }

    pub fn cdf(&self, x: f64) -> f64 {
        cdf(x, self.mean, self.std_dev)
    }

    pub fn inverse_cdf(&self, p: f64) -> Result<f64, DomainError> {
        inverse_cdf(p, self.mean, self.std_dev)
    }
}
