//// # The distribution controller
////
//// `DistributionState` owns the authoritative inputs (the parameters, the
//// evaluation point, the observation captured when entering likelihood mode,
//// and the mode itself) and derives everything else from them: the sampled
//// curve, the handle position and the numeric readouts. It is the only writer
//// of derived values and the only caller into the renderer.
////
//// Every external stimulus (a field edit, a drag sample, a mode toggle, a click
//// on the curve) runs to completion inside one method call. Each such call
//// first updates one authoritative input, then brings the derived state up to
//// date: the curve is regenerated only if the inputs it was generated from
//// changed, while the handle is always recomputed.

use log::{debug, trace};
use std::sync::{Arc, Mutex, PoisonError};

use crate::curve::{generate_curve, interpolate, nearest_by_x, nearest_by_y, CurveKind, CurveSample};
use crate::error::DomainError;
use crate::observe::observe;
use crate::params::{DistributionParams, Mode, Param, ParamsSnapshot, RepairPolicy, SD_FLOOR};
use crate::renderer::Renderer;
use crate::stats::{adjust_step, cdf, inverse_cdf, DEFAULT_STEP};

/// How far apart curve samples are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepPolicy {
    Fixed(f64),
    /// Coarsens the step on wide ranges, see [`adjust_step`].
    Adaptive,
}

impl Default for StepPolicy {
    fn default() -> Self {
        StepPolicy::Fixed(DEFAULT_STEP)
    }
}

impl StepPolicy {
    pub fn step(&self, start: f64, end: f64) -> f64 {
        match *self {
            StepPolicy::Fixed(step) => step,
            StepPolicy::Adaptive => adjust_step(start, end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateConfig {
    pub step: StepPolicy,
    pub repair: RepairPolicy,
}

/// How the handle's `y` is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleStrategy {
    /// Evaluate the density directly.
    Exact,
    /// Interpolate over the cached curve samples.
    Interpolated,
}

/// Which cumulative probability a percentage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    LessThan,
    GreaterThan,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandlePosition {
    pub x: f64,
    pub y: f64,
}

/// The numbers shown next to the plot for the active mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Readout {
    /// Cumulative probabilities, as percentages, left and right of the
    /// evaluation point.
    Probability { less_than: f64, greater_than: f64 },
    /// Density of the observation under the current mean.
    Likelihood { density: f64 },
}

struct CurveCache {
    kind: CurveKind,
    snapshot: ParamsSnapshot,
    samples: Vec<CurveSample>,
}

pub struct DistributionState<R: Renderer> {
    params: DistributionParams,
    mode: Mode,
    /// Evaluation point, the free variable in probability mode.
    x: f64,
    /// Observation captured when entering likelihood mode.
    fixed_x: f64,
    cache: Option<CurveCache>,
    handle: Option<HandlePosition>,
    config: StateConfig,
    generations: usize,
    renderer: R,
}

impl<R: Renderer> DistributionState<R> {
    /// Creates the controller in probability mode and draws the initial curve
    /// and handle.
    pub fn new(params: DistributionParams, x: f64, config: StateConfig, renderer: R) -> Self {
        let mut params = DistributionParams::new(params.mean, params.sd, params.range_min, params.range_max);
        let x = if x.is_finite() { x } else { params.mean };
        params.repair_bounds(x, config.repair);
        params.clamp_mean();
        let mut state = Self {
            params,
            mode: Mode::Probability,
            x,
            fixed_x: x,
            cache: None,
            handle: None,
            config,
            generations: 0,
            renderer,
        };
        state.renderer.toggle_y_axis_labels(false);
        state.renderer.set_likelihood_mode(false);
        state.refresh(HandleStrategy::Interpolated);
        state
    }

    pub fn with_defaults(renderer: R) -> Self {
        Self::new(DistributionParams::default(), 0.0, StateConfig::default(), renderer)
    }

    pub fn params(&self) -> &DistributionParams {
        &self.params
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    /// The evaluation point of probability mode. In likelihood mode this keeps
    /// the value it had when the mode was entered.
    pub fn evaluation_point(&self) -> f64 {
        self.x
    }

    pub fn fixed_x(&self) -> f64 {
        self.fixed_x
    }

    /// Where the handle sits on the horizontal axis: the evaluation point in
    /// probability mode, the mean in likelihood mode.
    pub fn handle_x(&self) -> f64 {
        match self.mode {
            Mode::Probability => self.x,
            Mode::Likelihood => self.params.mean,
        }
    }

    pub fn handle(&self) -> Option<HandlePosition> {
        self.handle
    }

    pub fn curve(&self) -> Option<&[CurveSample]> {
        self.cache.as_ref().map(|c| c.samples.as_slice())
    }

    /// How many times a curve has been generated so far.
    pub fn curve_generations(&self) -> usize {
        self.generations
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn curve_kind(&self) -> CurveKind {
        match self.mode {
            Mode::Probability => CurveKind::Density {
                mean: self.params.mean,
                sd: self.params.sd,
            },
            Mode::Likelihood => CurveKind::Likelihood {
                fixed_x: self.fixed_x,
                sd: self.params.sd,
            },
        }
    }

    pub fn readout(&self) -> Readout {
        let DistributionParams { mean, sd, .. } = self.params;
        match self.mode {
            Mode::Probability => {
                let left = cdf(self.x, mean, sd);
                Readout::Probability {
                    less_than: left * 100.0,
                    greater_than: (1.0 - left) * 100.0,
                }
            }
            Mode::Likelihood => Readout::Likelihood {
                density: crate::stats::pdf(self.fixed_x, mean, sd),
            },
        }
    }

    /// Whether the cached curve is missing or was generated from inputs that
    /// no longer match the current ones.
    pub fn should_regenerate(&self) -> bool {
        match &self.cache {
            None => true,
            Some(cache) => {
                cache.snapshot != self.params.snapshot() || cache.kind != self.curve_kind()
            }
        }
    }

    /// Applies an edit of one of the parameters.
    ///
    /// Non-finite values are ignored, as is a non-positive `sd` (an edit in
    /// progress); otherwise `sd` is floored, the mean is clamped into the range
    /// and the bounds are repaired around the handle. Returns whether the edit
    /// was applied.
    pub fn set_param(&mut self, param: Param, value: f64) -> bool {
        if !value.is_finite() {
            observe!("rejected_input", 1);
            return false;
        }
        let value = match param {
            Param::Sd if value <= 0.0 => {
                debug!("ignoring non-positive standard deviation {}", value);
                observe!("rejected_input", 1);
                return false;
            }
            Param::Sd => value.max(SD_FLOOR),
            Param::Mean => self.params.clamp_to_range(value),
            Param::RangeMin | Param::RangeMax => value,
        };
        self.params.set(param, value);

        let point = self.handle_x();
        let repairs = self.params.repair_bounds(point, self.config.repair);
        if !repairs.is_empty() {
            debug!(
                "repaired bounds around {} with {:?}: [{}, {}]",
                point, repairs, self.params.range_min, self.params.range_max
            );
            observe!("bounds_repair", repairs.len());
        }
        if self.params.clamp_mean() {
            debug!("mean clamped into range: {}", self.params.mean);
        }
        self.refresh(HandleStrategy::Interpolated);
        true
    }

    /// Switches between probability and likelihood mode.
    ///
    /// Entering likelihood mode captures the evaluation point as the fixed
    /// observation. The curve is always regenerated, since the meaning of the
    /// horizontal axis changes.
    pub fn set_mode(&mut self, is_likelihood: bool) {
        let mode = Mode::from_likelihood(is_likelihood);
        if mode != self.mode {
            if mode.is_likelihood() {
                self.fixed_x = self.x;
            }
            debug!("mode {} -> {} (observation {})", self.mode, mode, self.fixed_x);
            self.mode = mode;
        }
        self.renderer.toggle_y_axis_labels(is_likelihood);
        self.renderer.set_likelihood_mode(is_likelihood);
        self.cache = None;
        self.refresh(HandleStrategy::Interpolated);
    }

    /// Moves the free variable: the evaluation point in probability mode, the
    /// mean in likelihood mode. The evaluation point is not clamped, it may
    /// leave the plotted range; the mean stays inside it. Returns whether the
    /// value was applied.
    pub fn set_evaluation_point(&mut self, x: f64) -> bool {
        if !x.is_finite() {
            observe!("rejected_input", 1);
            return false;
        }
        match self.mode {
            Mode::Probability => self.x = x,
            Mode::Likelihood => self.params.mean = self.params.clamp_to_range(x),
        }
        self.refresh(HandleStrategy::Interpolated);
        true
    }

    /// Entry point for the renderer's drag gesture, `x` already in data space.
    pub fn on_drag(&mut self, x: f64) -> bool {
        self.set_evaluation_point(x)
    }

    /// Moves the handle to the curve sample nearest to a click at `x`.
    pub fn on_curve_click(&mut self, x: f64) -> Result<f64, DomainError> {
        self.regenerate_if_needed();
        let samples = self.curve().ok_or(DomainError::NoCurve)?;
        let i = nearest_by_x(samples, x).ok_or(DomainError::NoCurve)?;
        let snapped = samples[i].x;
        self.set_evaluation_point(snapped);
        Ok(snapped)
    }

    /// Moves the evaluation point to where the given cumulative percentage is
    /// reached. Only meaningful in probability mode.
    ///
    /// Percentages mapping to a probability of 0 or 1 (or beyond) have no
    /// finite evaluation point and are rejected without touching any state.
    pub fn set_from_probability(&mut self, percentage: f64, tail: Tail) -> Result<f64, DomainError> {
        if self.mode != Mode::Probability {
            return Err(DomainError::ModeMismatch {
                expected: Mode::Probability,
            });
        }
        let p = match tail {
            Tail::LessThan => percentage / 100.0,
            Tail::GreaterThan => 1.0 - percentage / 100.0,
        };
        let x = inverse_cdf(p, self.params.mean, self.params.sd).map_err(|e| {
            debug!("ignoring {:?} percentage {}: {}", tail, percentage, e);
            observe!("rejected_input", 1);
            e
        })?;
        self.x = x;
        self.refresh(HandleStrategy::Exact);
        Ok(x)
    }

    /// Adopts as mean the likelihood curve sample whose density is closest to
    /// `target`. Only meaningful in likelihood mode.
    ///
    /// This is a search over the cached samples, not a numeric inversion: the
    /// likelihood is symmetric around the observation, and ties go to the
    /// first sample in generation order, i.e. the smaller mean.
    pub fn set_from_likelihood(&mut self, target: f64) -> Result<f64, DomainError> {
        if self.mode != Mode::Likelihood {
            return Err(DomainError::ModeMismatch {
                expected: Mode::Likelihood,
            });
        }
        if !(target >= 0.0) {
            observe!("rejected_input", 1);
            return Err(DomainError::NegativeDensity { density: target });
        }
        self.regenerate_if_needed();
        let samples = self.curve().ok_or(DomainError::NoCurve)?;
        let i = nearest_by_y(samples, target).ok_or(DomainError::NoCurve)?;
        let mean = samples[i].x;
        self.set_param(Param::Mean, mean);
        Ok(mean)
    }

    fn regenerate_if_needed(&mut self) -> bool {
        if !self.should_regenerate() {
            return false;
        }
        let kind = self.curve_kind();
        let DistributionParams {
            range_min,
            range_max,
            ..
        } = self.params;
        let step = self.config.step.step(range_min, range_max);
        let samples = generate_curve(kind, range_min, range_max, step);
        self.generations += 1;
        debug!(
            "generated {:?} curve over [{}, {}] with {} samples",
            kind,
            range_min,
            range_max,
            samples.len()
        );
        observe!("curve_generated", samples.len());
        self.renderer.update_curve(&samples);
        self.cache = Some(CurveCache {
            kind,
            snapshot: self.params.snapshot(),
            samples,
        });
        true
    }

    fn refresh(&mut self, strategy: HandleStrategy) {
        self.regenerate_if_needed();
        self.update_handle(strategy);
    }

    fn update_handle(&mut self, strategy: HandleStrategy) {
        let x = self.handle_x();
        // outside the sampled span interpolation would extrapolate
        let y = match strategy {
            HandleStrategy::Interpolated if self.params.contains(x) => {
                self.curve().and_then(|s| interpolate(s, x))
            }
            _ => None,
        }
        .unwrap_or_else(|| self.curve_kind().eval(x));
        trace!("handle at ({}, {}) via {:?}", x, y, strategy);
        observe!("handle_update", x);
        self.handle = Some(HandlePosition { x, y });
        self.renderer.update_handle(x, y);
    }
}

/// A controller shared between threads.
///
/// An edit is a read-modify-write sequence over the parameters, the cache and
/// the handle, so every operation takes the lock once and runs to completion
/// under it.
pub struct SharedState<R: Renderer> {
    inner: Arc<Mutex<DistributionState<R>>>,
}

impl<R: Renderer> Clone for SharedState<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Renderer> SharedState<R> {
    pub fn new(state: DistributionState<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Runs `f` with exclusive access to the controller.
    pub fn with<T, F: FnOnce(&mut DistributionState<R>) -> T>(&self, f: F) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn set_param(&self, param: Param, value: f64) -> bool {
        self.with(|s| s.set_param(param, value))
    }

    pub fn set_mode(&self, is_likelihood: bool) {
        self.with(|s| s.set_mode(is_likelihood))
    }

    pub fn on_drag(&self, x: f64) -> bool {
        self.with(|s| s.on_drag(x))
    }

    pub fn set_from_probability(&self, percentage: f64, tail: Tail) -> Result<f64, DomainError> {
        self.with(|s| s.set_from_probability(percentage, tail))
    }

    pub fn set_from_likelihood(&self, target: f64) -> Result<f64, DomainError> {
        self.with(|s| s.set_from_likelihood(target))
    }

    pub fn readout(&self) -> Readout {
        self.with(|s| s.readout())
    }

    pub fn handle(&self) -> Option<HandlePosition> {
        self.with(|s| s.handle())
    }
}
