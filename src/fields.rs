//// # Field binding
////
//// The numeric fields next to the plot are a view over the controller: their
//// text is always rendered from the authoritative state, and edits are proxied
//// through the controller's operations. Two kinds of events reach a field:
////
////  - `input`, fired on every keystroke. Text that does not parse yet (`""`,
////    `"-"`, `"1e"`) is an edit in progress and is ignored. Parameter fields and
////    the x-value apply immediately; the probability and density fields wait for
////    the commit, since intermediate values like `9` on the way to `97.5` would
////    jump the handle around.
////  - `blur`, fired when the field loses focus. It commits the pending text,
////    clamps it where the field has a natural domain, and reformats it with the
////    field's fixed number of decimals.

use std::fmt::Display;
use std::str::FromStr;

use log::debug;

use crate::error::DomainError;
use crate::params::{Mode, Param, SD_FLOOR};
use crate::renderer::Renderer;
use crate::state::{DistributionState, Tail};
use crate::stats::{cdf, pdf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Mean,
    Sd,
    RangeMin,
    RangeMax,
    X,
    LessThan,
    GreaterThan,
    Density,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Mean,
        Field::Sd,
        Field::RangeMin,
        Field::RangeMax,
        Field::X,
        Field::LessThan,
        Field::GreaterThan,
        Field::Density,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Mean => "mean",
            Field::Sd => "sd",
            Field::RangeMin => "min",
            Field::RangeMax => "max",
            Field::X => "x",
            Field::LessThan => "less",
            Field::GreaterThan => "greater",
            Field::Density => "density",
        }
    }

    pub fn decimals(&self) -> usize {
        match self {
            Field::Density => 4,
            _ => 2,
        }
    }

    pub fn param(&self) -> Option<Param> {
        match self {
            Field::Mean => Some(Param::Mean),
            Field::Sd => Some(Param::Sd),
            Field::RangeMin => Some(Param::RangeMin),
            Field::RangeMax => Some(Param::RangeMax),
            _ => None,
        }
    }

    /// Whether the field is shown in the given mode: the probability fields
    /// only in probability mode, the density only in likelihood mode.
    pub fn visible_in(&self, mode: Mode) -> bool {
        match self {
            Field::LessThan | Field::GreaterThan => mode == Mode::Probability,
            Field::Density => mode == Mode::Likelihood,
            _ => true,
        }
    }

    /// Whether keystrokes apply immediately or only on commit.
    pub fn applies_on_input(&self) -> bool {
        !matches!(self, Field::LessThan | Field::GreaterThan | Field::Density)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .find(|f| f.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown field `{}`", s))
    }
}

/// Parses the text of a field, `None` while the input is still in progress.
pub fn parse_input(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text == "-" {
        return None;
    }
    match fast_float::parse::<f64, _>(text) {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

pub fn format_value(field: Field, value: f64) -> String {
    format!("{:.*}", field.decimals(), value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOutcome {
    Applied,
    /// Nothing changed: the text is in progress, or the field waits for a
    /// commit.
    Ignored,
    /// The value parsed but lies outside the domain of the operation.
    Rejected(DomainError),
}

impl EditOutcome {
    fn from_applied(applied: bool) -> Self {
        if applied {
            EditOutcome::Applied
        } else {
            EditOutcome::Ignored
        }
    }

    fn from_result<T>(result: Result<T, DomainError>) -> Self {
        match result {
            Ok(_) => EditOutcome::Applied,
            Err(e) => EditOutcome::Rejected(e),
        }
    }
}

/// A keystroke in `field`, the field now reading `text`.
pub fn input<R: Renderer>(state: &mut DistributionState<R>, field: Field, text: &str) -> EditOutcome {
    if !field.applies_on_input() {
        return EditOutcome::Ignored;
    }
    apply(state, field, text)
}

/// Applies `text` to `field` regardless of whether the field applies on input.
pub fn commit<R: Renderer>(state: &mut DistributionState<R>, field: Field, text: &str) -> EditOutcome {
    apply(state, field, text)
}

fn apply<R: Renderer>(state: &mut DistributionState<R>, field: Field, text: &str) -> EditOutcome {
    let Some(value) = parse_input(text) else {
        return EditOutcome::Ignored;
    };
    match field {
        Field::Mean | Field::Sd | Field::RangeMin | Field::RangeMax => {
            let param = match field.param() {
                Some(p) => p,
                None => return EditOutcome::Ignored,
            };
            EditOutcome::from_applied(state.set_param(param, value))
        }
        Field::X => EditOutcome::from_applied(state.set_evaluation_point(value)),
        Field::LessThan => EditOutcome::from_result(state.set_from_probability(value, Tail::LessThan)),
        Field::GreaterThan => {
            EditOutcome::from_result(state.set_from_probability(value, Tail::GreaterThan))
        }
        Field::Density => {
            if state.mode() != Mode::Likelihood {
                return EditOutcome::Ignored;
            }
            EditOutcome::from_result(state.set_from_likelihood(value))
        }
    }
}

/// The field loses focus with `text` in it. Returns the text the field shows
/// afterwards.
pub fn blur<R: Renderer>(state: &mut DistributionState<R>, field: Field, text: &str) -> String {
    let parsed = parse_input(text);
    match field {
        Field::Mean => {
            if let Some(v) = parsed {
                let bounded = state.params().clamp_to_range(v);
                state.set_param(Param::Mean, bounded);
            }
        }
        Field::Sd => {
            if let Some(v) = parsed {
                state.set_param(Param::Sd, v.max(SD_FLOOR));
            }
        }
        Field::X if text.trim().is_empty() => {
            debug!("empty x-value committed as zero");
            state.set_evaluation_point(0.0);
        }
        Field::Density => {
            if let (Some(v), Mode::Likelihood) = (parsed, state.mode()) {
                if let Err(e) = state.set_from_likelihood(v.max(0.0)) {
                    debug!("density {} not applied: {}", v, e);
                }
            }
        }
        _ => {
            commit(state, field, text);
        }
    }
    FieldValues::from_state(state).get(field).to_owned()
}

/// The display text of every field, rendered from the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues {
    texts: [String; 8],
}

impl FieldValues {
    pub fn from_state<R: Renderer>(state: &DistributionState<R>) -> Self {
        let params = state.params();
        let x = state.handle_x();
        let point = state.evaluation_point();
        let left = cdf(point, params.mean, params.sd) * 100.0;
        let density = match state.mode() {
            Mode::Probability => pdf(point, params.mean, params.sd),
            Mode::Likelihood => pdf(state.fixed_x(), params.mean, params.sd),
        };
        let texts = Field::ALL.map(|field| {
            let value = match field {
                Field::Mean => params.mean,
                Field::Sd => params.sd,
                Field::RangeMin => params.range_min,
                Field::RangeMax => params.range_max,
                Field::X => x,
                Field::LessThan => left,
                Field::GreaterThan => 100.0 - left,
                Field::Density => density,
            };
            format_value(field, value)
        });
        Self { texts }
    }

    pub fn get(&self, field: Field) -> &str {
        &self.texts[field.index()]
    }

    pub fn set(&mut self, field: Field, text: String) {
        self.texts[field.index()] = text;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::renderer::NullRenderer;
    use pretty_assertions::assert_eq;

    fn state() -> DistributionState<NullRenderer> {
        DistributionState::with_defaults(NullRenderer)
    }

    #[test]
    fn test_parse_in_progress() {
        for text in ["", "  ", "-", ".", "-.", "1e", "abc", "nan", "inf", "-inf"] {
            assert_eq!(parse_input(text), None, "{:?}", text);
        }
        assert_eq!(parse_input("-1.5"), Some(-1.5));
        assert_eq!(parse_input(" 2 "), Some(2.0));
        assert_eq!(parse_input("1e2"), Some(100.0));
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.name().parse::<Field>(), Ok(field));
        }
        assert!("mu".parse::<Field>().is_err());
    }

    #[test]
    fn test_initial_values() {
        let values = FieldValues::from_state(&state());
        let texts: Vec<(Field, &str)> = values.iter().collect();
        assert_eq!(
            texts,
            vec![
                (Field::Mean, "0.00"),
                (Field::Sd, "1.00"),
                (Field::RangeMin, "-3.00"),
                (Field::RangeMax, "3.00"),
                (Field::X, "0.00"),
                (Field::LessThan, "50.00"),
                (Field::GreaterThan, "50.00"),
                (Field::Density, "0.3989"),
            ]
        );
    }

    #[test]
    fn test_typing_a_negative_mean() {
        let mut s = state();
        assert_eq!(input(&mut s, Field::Mean, "-"), EditOutcome::Ignored);
        assert_eq!(s.params().mean, 0.0);
        assert_eq!(input(&mut s, Field::Mean, "-1"), EditOutcome::Applied);
        assert_eq!(s.params().mean, -1.0);
        // typed beyond the range, clamped while typing
        assert_eq!(input(&mut s, Field::Mean, "-10"), EditOutcome::Applied);
        assert_eq!(s.params().mean, -3.0);
    }

    #[test]
    fn test_typing_sd_through_zero() {
        let mut s = state();
        assert_eq!(input(&mut s, Field::Sd, "0"), EditOutcome::Ignored);
        assert_eq!(input(&mut s, Field::Sd, "0."), EditOutcome::Ignored);
        assert_eq!(s.params().sd, 1.0);
        assert_eq!(input(&mut s, Field::Sd, "0.5"), EditOutcome::Applied);
        assert_eq!(s.params().sd, 0.5);
        assert_eq!(blur(&mut s, Field::Sd, "0"), "0.10");
        assert_eq!(s.params().sd, SD_FLOOR);
    }

    #[test]
    fn test_probabilities_wait_for_commit() {
        let mut s = state();
        assert_eq!(input(&mut s, Field::LessThan, "97.5"), EditOutcome::Ignored);
        assert_eq!(s.evaluation_point(), 0.0);
        assert_eq!(commit(&mut s, Field::LessThan, "97.5"), EditOutcome::Applied);
        let values = FieldValues::from_state(&s);
        assert_eq!(values.get(Field::X), "1.96");
        assert_eq!(values.get(Field::GreaterThan), "2.50");
    }

    #[test]
    fn test_rejected_probability() {
        let mut s = state();
        let outcome = commit(&mut s, Field::GreaterThan, "100");
        assert!(matches!(
            outcome,
            EditOutcome::Rejected(DomainError::ProbabilityOutOfRange { .. })
        ));
        assert_eq!(FieldValues::from_state(&s).get(Field::LessThan), "50.00");
    }

    #[test]
    fn test_blur_formats_and_clamps() {
        let mut s = state();
        assert_eq!(blur(&mut s, Field::Mean, "7"), "3.00");
        assert_eq!(s.params().mean, 3.0);
        assert_eq!(blur(&mut s, Field::X, "1.234"), "1.23");
        assert_eq!(s.evaluation_point(), 1.234);
        assert_eq!(blur(&mut s, Field::X, ""), "0.00");
        assert_eq!(s.evaluation_point(), 0.0);
        assert_eq!(FieldValues::from_state(&s).get(Field::X), "0.00");
        // hidden in probability mode, shows the density at the point
        assert_eq!(s.params().mean, 3.0);
        assert_eq!(blur(&mut s, Field::Density, "-0.2"), "0.0044");
    }

    #[test]
    fn test_density_blur_shows_the_adopted_mean() {
        let mut s = state();
        s.set_mode(true);
        let shown = blur(&mut s, Field::Density, "-0.2");
        // floored to zero, the search lands on an end of the range
        assert!((s.params().mean.abs() - 3.0).abs() < 1e-9);
        assert_eq!(shown, FieldValues::from_state(&s).get(Field::Density));
        assert_eq!(shown, format_value(Field::Density, pdf(0.0, s.params().mean, 1.0)));

        let shown = blur(&mut s, Field::Density, "0.3");
        assert_eq!(shown, FieldValues::from_state(&s).get(Field::Density));
        assert_ne!(shown, "0.3000");
    }

    #[test]
    fn test_density_field_in_likelihood_mode() {
        let mut s = state();
        s.set_evaluation_point(2.0);
        s.set_mode(true);
        assert!(!Field::LessThan.visible_in(s.mode()));
        assert!(Field::Density.visible_in(s.mode()));
        assert_eq!(input(&mut s, Field::Mean, "2"), EditOutcome::Applied);
        assert_eq!(FieldValues::from_state(&s).get(Field::Density), "0.3989");

        assert_eq!(commit(&mut s, Field::Density, "0.3989"), EditOutcome::Applied);
        assert!((s.params().mean - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_density_field_ignored_in_probability_mode() {
        let mut s = state();
        assert_eq!(commit(&mut s, Field::Density, "0.2"), EditOutcome::Ignored);
        assert_eq!(s.params().mean, 0.0);
    }
}
