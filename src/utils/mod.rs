//! Utility modules for grid_navigation

pub mod grid_map;
pub mod grid_handle;
pub mod visualization;

pub use grid_map::*;
pub use grid_handle::*;
pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
