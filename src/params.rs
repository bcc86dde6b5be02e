use std::fmt::Display;
use std::str::FromStr;

/// Smallest standard deviation the controller accepts.
pub const SD_FLOOR: f64 = 0.1;

/// Minimum width of the plotted range.
pub const MIN_RANGE_WIDTH: f64 = 1.0;

/// Which variable the curve sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// `mean` and `sd` are fixed, the evaluation point moves.
    #[default]
    Probability,
    /// The observation is fixed, `mean` moves.
    Likelihood,
}

impl Mode {
    pub fn from_likelihood(is_likelihood: bool) -> Self {
        if is_likelihood {
            Mode::Likelihood
        } else {
            Mode::Probability
        }
    }

    pub fn is_likelihood(&self) -> bool {
        matches!(self, Mode::Likelihood)
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Probability => write!(f, "probability"),
            Mode::Likelihood => write!(f, "likelihood"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "probability" | "p" => Ok(Mode::Probability),
            "likelihood" | "l" => Ok(Mode::Likelihood),
            other => Err(format!("unknown mode `{}`", other)),
        }
    }
}

/// The authoritative parameters a user can edit directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Mean,
    Sd,
    RangeMin,
    RangeMax,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionParams {
    pub mean: f64,
    pub sd: f64,
    pub range_min: f64,
    pub range_max: f64,
}

impl Default for DistributionParams {
    fn default() -> Self {
        Self {
            mean: 0.0,
            sd: 1.0,
            range_min: -3.0,
            range_max: 3.0,
        }
    }
}

impl DistributionParams {
    /// Builds a parameter set, repairing whatever violates the invariants:
    /// `sd` is floored, the range is widened to at least one unit and the mean
    /// is clamped into it.
    pub fn new(mean: f64, sd: f64, range_min: f64, range_max: f64) -> Self {
        let mut params = Self {
            mean,
            sd: sd.max(SD_FLOOR),
            range_min,
            range_max,
        };
        if params.range_min > params.range_max - MIN_RANGE_WIDTH {
            params.range_max = (params.range_min + MIN_RANGE_WIDTH).ceil();
        }
        params.clamp_mean();
        params
    }

    pub fn get(&self, param: Param) -> f64 {
        match param {
            Param::Mean => self.mean,
            Param::Sd => self.sd,
            Param::RangeMin => self.range_min,
            Param::RangeMax => self.range_max,
        }
    }

    pub(crate) fn set(&mut self, param: Param, value: f64) {
        match param {
            Param::Mean => self.mean = value,
            Param::Sd => self.sd = value,
            Param::RangeMin => self.range_min = value,
            Param::RangeMax => self.range_max = value,
        }
    }

    /// Clamps `v` into `[range_min, range_max]`. Unlike `f64::clamp` this never
    /// panics when the bounds are transiently inverted; the lower bound wins.
    pub fn clamp_to_range(&self, v: f64) -> f64 {
        v.min(self.range_max).max(self.range_min)
    }

    pub(crate) fn clamp_mean(&mut self) -> bool {
        let clamped = self.clamp_to_range(self.mean);
        let changed = clamped != self.mean;
        self.mean = clamped;
        changed
    }

    pub fn contains(&self, v: f64) -> bool {
        self.range_min <= v && v <= self.range_max
    }

    pub fn snapshot(&self) -> ParamsSnapshot {
        ParamsSnapshot {
            mean: self.mean,
            sd: self.sd,
            range_min: self.range_min,
            range_max: self.range_max,
        }
    }

    /// Enforces the ordering `min <= point <= max` and `min + 1 <= max` by
    /// snapping the offending bound, returning the rules that fired.
    ///
    /// With [`RepairPolicy::FirstMatch`] at most one rule fires per call, even
    /// when its snap leaves the bounds unchanged. With
    /// [`RepairPolicy::FixedPoint`] rules are applied until none changes the
    /// bounds; since rules only ever lower `min` or raise `max` this takes at
    /// most three passes.
    pub fn repair_bounds(&mut self, point: f64, policy: RepairPolicy) -> Vec<BoundsRepair> {
        let mut fired = Vec::new();
        match policy {
            RepairPolicy::FirstMatch => {
                if let Some(repair) = BoundsRepair::ALL.iter().find(|r| r.applies(self, point)) {
                    repair.apply(self, point);
                    fired.push(*repair);
                }
            }
            RepairPolicy::FixedPoint => {
                for _ in 0..BoundsRepair::ALL.len() + 1 {
                    let mut changed = false;
                    for repair in BoundsRepair::ALL {
                        if repair.applies(self, point) {
                            let before = (self.range_min, self.range_max);
                            repair.apply(self, point);
                            if before != (self.range_min, self.range_max) {
                                fired.push(repair);
                                changed = true;
                            }
                        }
                    }
                    if !changed {
                        break;
                    }
                }
            }
        }
        fired
    }
}

/// The rules of bounds repair, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsRepair {
    /// `min` was above the point and dropped to `floor(point)`.
    LowerMin,
    /// `max` was below the point and raised to `ceil(point)`.
    RaiseMax,
    /// The range was narrower than one unit; `max` became `ceil(min + 1)`.
    WidenMax,
}

impl BoundsRepair {
    const ALL: [BoundsRepair; 3] = [
        BoundsRepair::LowerMin,
        BoundsRepair::RaiseMax,
        BoundsRepair::WidenMax,
    ];

    fn applies(&self, params: &DistributionParams, point: f64) -> bool {
        match self {
            BoundsRepair::LowerMin => params.range_min > point,
            BoundsRepair::RaiseMax => params.range_max < point,
            BoundsRepair::WidenMax => params.range_min >= params.range_max - MIN_RANGE_WIDTH,
        }
    }

    fn apply(&self, params: &mut DistributionParams, point: f64) {
        match self {
            BoundsRepair::LowerMin => params.range_min = point.floor(),
            BoundsRepair::RaiseMax => params.range_max = point.ceil(),
            BoundsRepair::WidenMax => {
                params.range_max = (params.range_min + MIN_RANGE_WIDTH).ceil()
            }
        }
    }
}

/// How many bounds-repair rules run per edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepairPolicy {
    #[default]
    FirstMatch,
    FixedPoint,
}

impl FromStr for RepairPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-match" => Ok(RepairPolicy::FirstMatch),
            "fixed-point" => Ok(RepairPolicy::FixedPoint),
            other => Err(format!(
                "unknown repair policy `{}`, expected `first-match` or `fixed-point`",
                other
            )),
        }
    }
}

/// The parameters a cached curve was generated from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamsSnapshot {
    pub mean: f64,
    pub sd: f64,
    pub range_min: f64,
    pub range_max: f64,
}
