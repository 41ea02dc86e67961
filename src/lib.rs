//! grid_navigation - grid path planning for moving agents
//!
//! Plans 4-connected routes over a traversal grid with A* or a Dijkstra
//! distance field, pulls them taut with a sampled line-of-sight test, and
//! steers an agent along the result one tick at a time.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod path_planning;
pub mod mission_planning;

// Re-export common types for convenience
pub use common::{CellFlags, CellRef, DistanceField, PathStep, PlanningState, Point2D};
pub use common::{Agent, GridLocator, GridPathPlanner, GridQuery, MovementExecutor};
pub use common::{NavResult, NavigationError};
pub use mission_planning::{PathComponent, PathFollowingConfig};
pub use path_planning::SearchStrategy;
pub use utils::GridMap;
