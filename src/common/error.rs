//! Error types for grid_navigation

use thiserror::Error;

use crate::common::types::{CellRef, PlanningState, Point2D};

/// Main error type for grid navigation
///
/// None of these are fatal: the path component folds every variant into
/// [`PlanningState::Invalid`] and keeps ticking.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    /// No grid could be located for the query
    #[error("grid unavailable")]
    GridUnavailable,
    /// Destination does not map onto an in-bounds cell
    #[error("destination {0:?} does not resolve to a grid cell")]
    DestinationUnresolved(Point2D),
    /// Search origin is off the grid or not traversable
    #[error("start cell {0:?} is out of bounds or blocked")]
    StartBlocked(CellRef),
    /// Search target is not traversable
    #[error("goal cell {0:?} is blocked")]
    GoalBlocked(CellRef),
    /// Frontier emptied without reaching the goal
    #[error("no path found from {start:?} to {goal:?}")]
    SearchExhausted { start: CellRef, goal: CellRef },
    /// Downhill walk over a distance field hit a local minimum
    #[error("distance field descent stuck at {at:?} before reaching {start:?}")]
    ReconstructionBroken { at: CellRef, start: CellRef },
    /// Smoother was handed no waypoints
    #[error("cannot smooth an empty path")]
    DegenerateSmoothingInput,
    /// Invalid parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl NavigationError {
    /// Planning state this failure degrades to
    pub fn planning_state(&self) -> PlanningState {
        PlanningState::Invalid
    }
}

impl From<NavigationError> for PlanningState {
    fn from(e: NavigationError) -> Self {
        e.planning_state()
    }
}

/// Result type alias for navigation operations
pub type NavResult<T> = Result<T, NavigationError>;
