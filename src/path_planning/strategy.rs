//! Selection between the two grid searches

use serde::{Deserialize, Serialize};

use crate::common::{CellRef, GridPathPlanner, GridQuery, NavResult, PathStep, Point2D};
use crate::path_planning::a_star::AStarPlanner;
use crate::path_planning::dijkstra::DijkstraPlanner;
use crate::path_planning::reconstruction::cells_to_steps;

/// Which search a path component replans with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Heuristic search, stops at the goal
    #[default]
    AStar,
    /// Full distance field, then downhill reconstruction
    Dijkstra,
}

impl SearchStrategy {
    pub fn planner(&self) -> &'static dyn GridPathPlanner {
        match self {
            SearchStrategy::AStar => &AStarPlanner,
            SearchStrategy::Dijkstra => &DijkstraPlanner,
        }
    }

    /// Unsmoothed waypoints from `start` to `goal`
    pub fn plan_steps<G>(&self, grid: &G, start: Point2D, goal: CellRef) -> NavResult<Vec<PathStep>>
    where
        G: GridQuery,
    {
        let start_cell = grid.cell_ref_for_position(start);
        let cells = self.planner().plan_cells(grid, start_cell, goal)?;
        Ok(cells_to_steps(grid, &cells))
    }
}
