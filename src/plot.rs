//// # Text plot
////
//// A [`Renderer`] drawing on a character grid, for terminals and for golden
//// tests. The horizontal domain is the span of the last curve received, the
//// vertical domain is `[0, 1.1 * max(y)]` so the peak never touches the top
//// edge. Cells are filled as follows:
////
////  - `*` the curve,
////  - `.` and `:` the areas left and right of the handle (probability mode only),
////  - `|` the vertical guide under the handle, `-` the horizontal guide to the
////    y axis (likelihood mode only),
////  - `o` the handle itself.

use std::fmt::{Display, Write};

use crate::curve::{interpolate, CurveSample};
use crate::renderer::Renderer;

/// Samples within this distance of the handle belong to both shaded regions,
/// so that the two areas meet without a gap.
pub const SHADE_BUFFER: f64 = 0.04;

/// Headroom above the highest sample.
const Y_HEADROOM: f64 = 1.1;

const MIN_WIDTH: usize = 10;
const MIN_HEIGHT: usize = 4;
const LABEL_WIDTH: usize = 8;

#[derive(Debug, Clone)]
pub struct TextPlot {
    width: usize,
    height: usize,
    curve: Vec<CurveSample>,
    handle: Option<(f64, f64)>,
    show_y_labels: bool,
    likelihood: bool,
}

impl TextPlot {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
            height: height.max(MIN_HEIGHT),
            curve: Vec::new(),
            handle: None,
            show_y_labels: false,
            likelihood: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn x_domain(&self) -> Option<(f64, f64)> {
        let first = self.curve.first()?;
        let last = self.curve.last()?;
        Some((first.x, last.x))
    }

    fn y_max(&self) -> f64 {
        let max = self.curve.iter().map(|s| s.y).fold(0.0, f64::max);
        if max > 0.0 {
            max * Y_HEADROOM
        } else {
            1.0
        }
    }

    /// Data-space `x` of a column, the inverse of the horizontal scale. This is
    /// how a drag on the plot is turned into a value for the controller.
    pub fn invert(&self, col: usize) -> Option<f64> {
        let (x0, x1) = self.x_domain()?;
        let col = col.min(self.width - 1) as f64;
        Some(x0 + col / (self.width - 1) as f64 * (x1 - x0))
    }

    fn col(&self, x: f64) -> Option<usize> {
        let (x0, x1) = self.x_domain()?;
        if x1 <= x0 {
            return Some(0);
        }
        let t = (x - x0) / (x1 - x0);
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some((t * (self.width - 1) as f64).round() as usize)
    }

    fn row(&self, y: f64) -> usize {
        let t = (y / self.y_max()).clamp(0.0, 1.0);
        ((1.0 - t) * (self.height - 1) as f64).round() as usize
    }

    pub fn render(&self) -> String {
        let mut grid = vec![vec![' '; self.width]; self.height];
        let Some((x0, x1)) = self.x_domain() else {
            return String::from("(no curve)\n");
        };

        for col in 0..self.width {
            let Some(x) = self.invert(col) else { continue };
            let Some(y) = interpolate(&self.curve, x) else { continue };
            let top = self.row(y);
            match self.handle {
                Some((hx, _)) if !self.likelihood => {
                    let fill = if x <= hx + SHADE_BUFFER { '.' } else { ':' };
                    for row in grid.iter_mut().skip(top + 1) {
                        row[col] = fill;
                    }
                }
                _ => {}
            }
            grid[top][col] = '*';
        }

        if let Some((hx, hy)) = self.handle {
            if let Some(col) = self.col(hx) {
                let top = self.row(hy);
                for row in grid.iter_mut().skip(top + 1) {
                    row[col] = '|';
                }
                if self.likelihood {
                    for cell in grid[top].iter_mut().take(col) {
                        *cell = '-';
                    }
                }
                grid[top][col] = 'o';
            }
        }

        let mut out = String::new();
        let y_max = self.y_max();
        for (i, row) in grid.iter().enumerate() {
            if self.show_y_labels {
                let label = if i == 0 {
                    format!("{:.4}", y_max)
                } else if i == self.height - 1 {
                    format!("{:.4}", 0.0)
                } else if i == (self.height - 1) / 2 {
                    format!("{:.4}", y_max / 2.0)
                } else {
                    String::new()
                };
                let _ = write!(out, "{:>width$} ", label, width = LABEL_WIDTH - 1);
            }
            out.extend(row.iter());
            out.push('\n');
        }

        let indent = if self.show_y_labels { LABEL_WIDTH } else { 0 };
        out.push_str(&" ".repeat(indent));
        out.push_str(&"-".repeat(self.width));
        out.push('\n');
        let left = format!("{:.2}", x0);
        let right = format!("{:.2}", x1);
        let mid = format!("{:.2}", (x0 + x1) / 2.0);
        let mut axis = vec![' '; self.width];
        place(&mut axis, 0, &left);
        place(&mut axis, self.width.saturating_sub(mid.len()) / 2, &mid);
        place(&mut axis, self.width.saturating_sub(right.len()), &right);
        out.push_str(&" ".repeat(indent));
        out.extend(axis.iter());
        out.push('\n');
        out
    }
}

fn place(line: &mut [char], at: usize, text: &str) {
    for (cell, c) in line.iter_mut().skip(at).zip(text.chars()) {
        *cell = c;
    }
}

impl Display for TextPlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

impl Renderer for TextPlot {
    fn update_curve(&mut self, points: &[CurveSample]) {
        self.curve.clear();
        self.curve.extend_from_slice(points);
    }

    fn update_handle(&mut self, x: f64, y: f64) {
        self.handle = Some((x, y));
    }

    fn toggle_y_axis_labels(&mut self, show: bool) {
        self.show_y_labels = show;
    }

    fn set_likelihood_mode(&mut self, likelihood: bool) {
        self.likelihood = likelihood;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state::DistributionState;

    fn plot_state() -> DistributionState<TextPlot> {
        DistributionState::with_defaults(TextPlot::new(61, 12))
    }

    #[test]
    fn test_empty_plot() {
        let plot = TextPlot::new(20, 5);
        assert_eq!(plot.render(), "(no curve)\n");
        assert_eq!(plot.invert(3), None);
    }

    #[test]
    fn test_invert_spans_the_curve() {
        let state = plot_state();
        let plot = state.renderer();
        assert_eq!(plot.invert(0), Some(-3.0));
        assert!((plot.invert(60).unwrap() - 3.0).abs() < 1e-12);
        assert!((plot.invert(30).unwrap()).abs() < 1e-12);
        // past the right edge sticks to it
        assert_eq!(plot.invert(500), plot.invert(60));
    }

    #[test]
    fn test_handle_and_shading() {
        let state = plot_state();
        let text = state.renderer().render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 12 + 2);
        let handle_row = lines.iter().position(|l| l.contains('o')).unwrap();
        // handle at the peak, in the middle column
        assert_eq!(lines[handle_row].find('o'), Some(30));
        assert!(handle_row <= 1);
        let bottom = lines[11];
        assert_eq!(bottom.chars().nth(30), Some('|'));
        assert_eq!(bottom.chars().nth(10), Some('.'));
        assert_eq!(bottom.chars().nth(50), Some(':'));
        assert!(lines[13].starts_with("-3.00"));
        assert!(lines[13].ends_with("3.00"));
    }

    #[test]
    fn test_likelihood_presentation() {
        let mut state = plot_state();
        state.set_evaluation_point(1.0);
        state.set_mode(true);
        state.on_drag(-1.0);
        let text = state.renderer().render();
        let lines: Vec<&str> = text.lines().collect();
        assert!(!text.contains(':'));
        assert!(!lines[11][LABEL_WIDTH..].contains('.'));
        // horizontal guide from the axis to the handle
        assert!(text.contains("-o"));
        // labels occupy the left margin
        assert!(lines[0].trim_start().starts_with("0."));
        assert!(lines[11].trim_start().starts_with("0.0000"));
    }

    #[test]
    fn test_wide_range_labels_do_not_fit() {
        use crate::params::{DistributionParams, Param};
        use crate::state::{StateConfig, StepPolicy};

        let config = StateConfig {
            step: StepPolicy::Adaptive,
            ..Default::default()
        };
        let mut state = DistributionState::new(
            DistributionParams::default(),
            0.0,
            config,
            TextPlot::new(61, 12),
        );
        state.set_param(Param::RangeMax, 1e80);
        let text = state.renderer().render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 12 + 2);
        assert!(lines[13].chars().count() <= 61);

        let mut narrow = DistributionState::with_defaults(TextPlot::new(10, 4));
        narrow.set_param(Param::RangeMax, 1e9);
        narrow.set_mode(true);
        let text = narrow.renderer().render();
        // labels overlap on a narrow plot but stay inside the axis line
        let axis = text.lines().last().unwrap();
        assert_eq!(axis.chars().count(), LABEL_WIDTH + 10);
    }

    #[test]
    fn test_drag_through_inverted_columns() {
        let mut state = plot_state();
        for col in [0, 15, 45, 60] {
            let x = state.renderer().invert(col).unwrap();
            state.on_drag(x);
            assert_eq!(state.handle().unwrap().x, x);
        }
        assert_eq!(state.curve_generations(), 1);
    }
}
