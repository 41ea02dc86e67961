//! Visualization utilities for grid_navigation
//!
//! Draws grids, raw and smoothed waypoint paths and agent trajectories
//! with gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{GridQuery, Path2D, PathStep, Point2D};
use crate::utils::GridMap;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const CYAN: &str = "#00FFFF";
    pub const ORANGE: &str = "#FFA500";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const BLOCKED: &str = BLACK;
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const RAW_PATH: &str = GRAY;
    pub const SMOOTHED_PATH: &str = RED;
    pub const TRAJECTORY: &str = CYAN;
    pub const WAYPOINT: &str = ORANGE;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::SMOOTHED_PATH, "Path")
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

pub struct Visualizer {
    figure: Figure,
    title: String,
    x_label: String,
    y_label: String,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: String::new(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
            aspect_ratio: Some(1.0),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Blocked cells drawn as squares at their centers
    pub fn plot_grid(&mut self, grid: &GridMap) -> &mut Self {
        let centers: Vec<Point2D> = grid.blocked_cells().map(|c| grid.position_for_cell(c)).collect();
        let style = PointStyle::new(colors::BLOCKED, "Blocked").with_symbol('S').with_size(1.0);
        self.plot_points(&centers, &style)
    }

    pub fn plot_path(&mut self, path: &Path2D, style: &PathStyle) -> &mut Self {
        self.figure.axes2d()
            .lines(&path.x_coords(), &path.y_coords(), &[
                Caption(&style.caption),
                Color(&style.color),
                LineWidth(style.line_width),
            ]);
        self
    }

    /// Polyline from `start` through every waypoint, with waypoint markers
    pub fn plot_steps(&mut self, start: Point2D, steps: &[PathStep], style: &PathStyle) -> &mut Self {
        self.plot_path(&Path2D::from_steps(start, steps), style);
        let points: Vec<Point2D> = steps.iter().map(|s| s.point).collect();
        self.plot_points(&points, &PointStyle::new(colors::WAYPOINT, "").with_size(0.8))
    }

    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();

        self.figure.axes2d()
            .points(&x, &y, &[
                Caption(&style.caption),
                Color(&style.color),
                PointSymbol(style.symbol),
                PointSize(style.size),
            ]);
        self
    }

    pub fn plot_start(&mut self, point: Point2D) -> &mut Self {
        self.plot_points(&[point], &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    pub fn plot_goal(&mut self, point: Point2D) -> &mut Self {
        self.plot_points(&[point], &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    pub fn show(&mut self) -> Result<(), String> {
        self.apply_settings();
        self.figure.show().map_err(|e| e.to_string()).map(|_| ())
    }

    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> Result<(), String> {
        self.apply_settings();
        self.figure.save_to_png(path, width, height).map_err(|e| e.to_string())
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
