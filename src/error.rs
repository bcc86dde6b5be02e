use thiserror::Error;

use crate::params::Mode;

/// Inputs that an operation refuses to act on.
///
/// Every operation returning this error leaves the controller untouched, so
/// callers are free to drop it: a rejected edit is simply an edit that did not
/// happen.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DomainError {
    #[error("probability {p} is outside the open interval (0, 1)")]
    ProbabilityOutOfRange { p: f64 },
    #[error("standard deviation must be positive, got {sd}")]
    NonPositiveStdDev { sd: f64 },
    #[error("probability density must be non-negative, got {density}")]
    NegativeDensity { density: f64 },
    #[error("operation is only available in {expected} mode")]
    ModeMismatch { expected: Mode },
    #[error("no curve has been generated")]
    NoCurve,
}
