// Path planning algorithms module

pub mod frontier;
pub mod a_star;
pub mod dijkstra;
pub mod reconstruction;
pub mod line_of_sight;
pub mod smoothing;
pub mod strategy;

pub use a_star::*;
pub use dijkstra::*;
pub use reconstruction::*;
pub use line_of_sight::*;
pub use smoothing::*;
pub use strategy::*;
