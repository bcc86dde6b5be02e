//// # Error function and its inverse
////
//// Both functions are odd, so the approximations are evaluated on `|x|` and the
//// sign is restored at the end.

use std::f64::consts::PI;

// Abramowitz & Stegun 7.1.26, maximum absolute error 1.5e-7
const P: f64 = 0.3275911;
const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;

/// Rational approximation of the error function.
///
/// The result is exactly zero at zero and exactly antisymmetric:
/// `erf(-x) == -erf(x)`.
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    let ax = x.abs();
    let t = 1.0 / (1.0 + P * ax);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    let y = 1.0 - poly * (-ax * ax).exp();
    if x < 0.0 {
        -y
    } else {
        y
    }
}

//// The inverse uses the classic split at `|y| = 0.7`: a rational function in `y^2`
//// for the central region and a rational function in `sqrt(-ln((1-|y|)/2))` for
//// the tails. Two Newton steps against [`erf`] then make the result the inverse of
//// *this* `erf`, which is what round trips through `cdf` need.

const CENTRAL: f64 = 0.7;

const CA: [f64; 4] = [0.886226899, -1.645349621, 0.914624893, -0.140543331];
const CB: [f64; 4] = [-2.118377725, 1.442710462, -0.329097515, 0.012229801];
const TC: [f64; 4] = [-1.970840454, -1.624906493, 3.429567803, 1.641345311];
const TD: [f64; 2] = [3.543889200, 1.637067800];

const NEWTON_STEPS: usize = 2;

/// Inverse of [`erf`] on the open interval `(-1, 1)`.
///
/// Returns `±inf` at `±1` and NaN outside `[-1, 1]`. Callers working with
/// probabilities go through [`super::inverse_cdf`], which rejects the closed
/// endpoints before getting here.
pub fn erfinv(y: f64) -> f64 {
    if y.is_nan() || y.abs() > 1.0 {
        return f64::NAN;
    }
    if y == 1.0 {
        return f64::INFINITY;
    }
    if y == -1.0 {
        return f64::NEG_INFINITY;
    }
    if y == 0.0 {
        return 0.0;
    }

    let ay = y.abs();
    let mut x = if ay <= CENTRAL {
        let z = y * y;
        let num = ((CA[3] * z + CA[2]) * z + CA[1]) * z + CA[0];
        let den = (((CB[3] * z + CB[2]) * z + CB[1]) * z + CB[0]) * z + 1.0;
        y * num / den
    } else {
        let z = (-((1.0 - ay) / 2.0).ln()).sqrt();
        let num = ((TC[3] * z + TC[2]) * z + TC[1]) * z + TC[0];
        let den = (TD[1] * z + TD[0]) * z + 1.0;
        y.signum() * num / den
    };

    let two_over_sqrt_pi = 2.0 / PI.sqrt();
    for _ in 0..NEWTON_STEPS {
        let slope = two_over_sqrt_pi * (-x * x).exp();
        if slope == 0.0 {
            break;
        }
        x -= (erf(x) - y) / slope;
    }
    x
}
