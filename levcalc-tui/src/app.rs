//! Application state for the chart viewer.

use levcalc_runner::BatchResult;

use crate::theme::Theme;

/// One plotted scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// `"{leverage:.2}X, {fee:.2}%"`.
    pub label: String,
    /// (fractional year, price) pairs in date order.
    pub points: Vec<(f64, f64)>,
    pub visible: bool,
}

impl ChartSeries {
    pub fn new(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
            visible: true,
        }
    }

    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|&(_, v)| v)
    }
}

/// Axis ranges of the plotted data, in plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

#[derive(Debug)]
pub struct App {
    pub series: Vec<ChartSeries>,
    /// Index into `series` of the legend cursor.
    pub selected: usize,
    /// Plot ln(price) instead of price.
    pub log_scale: bool,
    pub show_help: bool,
    pub running: bool,
    pub has_synthetic: bool,
    pub warnings: Vec<String>,
    pub theme: Theme,
}

impl App {
    pub fn new(series: Vec<ChartSeries>) -> Self {
        Self {
            series,
            selected: 0,
            log_scale: false,
            show_help: false,
            running: true,
            has_synthetic: false,
            warnings: Vec::new(),
            theme: Theme::default(),
        }
    }

    /// Build the viewer state from a batch run. Empty scenarios are not plotted.
    pub fn from_result(result: &BatchResult) -> Self {
        let series = result
            .scenarios
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| ChartSeries::new(s.label.clone(), s.points.xy()))
            .collect();
        let mut app = Self::new(series);
        app.has_synthetic = result.has_synthetic;
        app.warnings = result.warnings.clone();
        app
    }

    // ── Navigation ──

    pub fn select_next(&mut self) {
        if !self.series.is_empty() {
            self.selected = (self.selected + 1) % self.series.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.series.is_empty() {
            self.selected = (self.selected + self.series.len() - 1) % self.series.len();
        }
    }

    pub fn toggle_selected(&mut self) {
        if let Some(s) = self.series.get_mut(self.selected) {
            s.visible = !s.visible;
        }
    }

    pub fn toggle_log_scale(&mut self) {
        self.log_scale = !self.log_scale;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    // ── Plot data ──

    /// Points of a series in plot coordinates. On the log axis, non-positive
    /// prices have no position and are dropped.
    pub fn plot_points(&self, series: &ChartSeries) -> Vec<(f64, f64)> {
        if self.log_scale {
            series
                .points
                .iter()
                .filter(|&&(_, y)| y > 0.0)
                .map(|&(x, y)| (x, y.ln()))
                .collect()
        } else {
            series.points.clone()
        }
    }

    /// Visible series with their palette index, in request order.
    pub fn visible_series(&self) -> impl Iterator<Item = (usize, &ChartSeries)> {
        self.series.iter().enumerate().filter(|(_, s)| s.visible)
    }

    /// Bounds over every visible point, with 5% vertical padding.
    /// `None` when nothing is visible.
    pub fn plot_bounds(&self) -> Option<PlotBounds> {
        let mut x = [f64::INFINITY, f64::NEG_INFINITY];
        let mut y = [f64::INFINITY, f64::NEG_INFINITY];
        for (_, series) in self.visible_series() {
            for (px, py) in self.plot_points(series) {
                x = [x[0].min(px), x[1].max(px)];
                y = [y[0].min(py), y[1].max(py)];
            }
        }
        if !x[0].is_finite() || !y[0].is_finite() {
            return None;
        }

        let pad = match (y[1] - y[0]).abs() * 0.05 {
            p if p > 0.0 => p,
            _ => 1.0,
        };
        if x[1] <= x[0] {
            x[1] = x[0] + 1.0;
        }
        Some(PlotBounds {
            x,
            y: [y[0] - pad, y[1] + pad],
        })
    }

    /// Convert a plot-space y value back to a price for axis labels.
    pub fn axis_value(&self, y: f64) -> f64 {
        if self.log_scale {
            y.exp()
        } else {
            y
        }
    }
}
