use crate::curve::CurveSample;

/// The drawing surface driven by [`crate::state::DistributionState`].
///
/// A renderer is a pure sink: it receives curves, handle positions and
/// presentation toggles, and never feeds values back into the controller other
/// than by calling the controller's drag entry point with a data-space `x`.
pub trait Renderer {
    /// Replaces the drawn curve (and its shaded regions) with `points`.
    fn update_curve(&mut self, points: &[CurveSample]);

    /// Moves the handle and its guide lines.
    fn update_handle(&mut self, x: f64, y: f64);

    fn toggle_y_axis_labels(&mut self, show: bool);

    fn set_likelihood_mode(&mut self, likelihood: bool);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn update_curve(&mut self, points: &[CurveSample]) {
        (**self).update_curve(points)
    }

    fn update_handle(&mut self, x: f64, y: f64) {
        (**self).update_handle(x, y)
    }

    fn toggle_y_axis_labels(&mut self, show: bool) {
        (**self).toggle_y_axis_labels(show)
    }

    fn set_likelihood_mode(&mut self, likelihood: bool) {
        (**self).set_likelihood_mode(likelihood)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn update_curve(&mut self, _points: &[CurveSample]) {}
    fn update_handle(&mut self, _x: f64, _y: f64) {}
    fn toggle_y_axis_labels(&mut self, _show: bool) {}
    fn set_likelihood_mode(&mut self, _likelihood: bool) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Curve(Vec<CurveSample>),
    Handle { x: f64, y: f64 },
    YAxisLabels(bool),
    LikelihoodMode(bool),
}

/// Keeps every call it receives, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn curve_updates(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RenderCall::Curve(_)))
            .count()
    }

    pub fn last_curve(&self) -> Option<&[CurveSample]> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::Curve(points) => Some(points.as_slice()),
            _ => None,
        })
    }

    pub fn last_handle(&self) -> Option<(f64, f64)> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::Handle { x, y } => Some((*x, *y)),
            _ => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn update_curve(&mut self, points: &[CurveSample]) {
        self.calls.push(RenderCall::Curve(points.to_vec()));
    }

    fn update_handle(&mut self, x: f64, y: f64) {
        self.calls.push(RenderCall::Handle { x, y });
    }

    fn toggle_y_axis_labels(&mut self, show: bool) {
        self.calls.push(RenderCall::YAxisLabels(show));
    }

    fn set_likelihood_mode(&mut self, likelihood: bool) {
        self.calls.push(RenderCall::LikelihoodMode(likelihood));
    }
}
