//! A* search over the 4-connected traversal grid
//!
//! Unit step cost, Manhattan heuristic (admissible and consistent on this
//! graph). Cells with equal `f` are expanded in the order they were queued;
//! neighbors are queued in `+x, -x, +y, -y` order.

use std::collections::HashMap;

use log::{debug, trace};

use crate::common::{CellRef, GridPathPlanner, GridQuery, NavResult, NavigationError, PathStep, Point2D};
use crate::path_planning::frontier::Frontier;
use crate::path_planning::reconstruction::{cells_to_steps, reconstruct_from_predecessors};

/// A* path planner
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarPlanner;

impl AStarPlanner {
    pub fn new() -> Self {
        AStarPlanner
    }

    fn calc_heuristic(a: CellRef, b: CellRef) -> f64 {
        a.manhattan_distance(&b) as f64
    }

    /// Cells from `start` to `goal`, both inclusive
    pub fn find_cell_path<G>(&self, grid: &G, start: CellRef, goal: CellRef) -> NavResult<Vec<CellRef>>
    where
        G: GridQuery + ?Sized,
    {
        trace!("[AStar] find_path: start=({},{}) goal=({},{})", start.x, start.y, goal.x, goal.y);

        if !grid.is_traversable(start) {
            debug!("[AStar] FAILED: start {:?} is off the grid or blocked", start);
            return Err(NavigationError::StartBlocked(start));
        }
        if !grid.is_traversable(goal) {
            debug!("[AStar] FAILED: goal {:?} is off the grid or blocked", goal);
            return Err(NavigationError::GoalBlocked(goal));
        }

        let mut open_set = Frontier::new();
        let mut came_from: HashMap<CellRef, CellRef> = HashMap::new();
        let mut g_scores: HashMap<CellRef, f64> = HashMap::new();
        let mut f_scores: HashMap<CellRef, f64> = HashMap::new();

        let h_start = Self::calc_heuristic(start, goal);
        g_scores.insert(start, 0.0);
        f_scores.insert(start, h_start);
        open_set.push(start, h_start);

        let mut nodes_expanded = 0usize;

        while let Some((current, _)) = open_set.pop_current(|cell| f_scores.get(cell).copied()) {
            nodes_expanded += 1;

            if current == goal {
                let cells = reconstruct_from_predecessors(&came_from, goal);
                debug!(
                    "[AStar] SUCCESS: {} steps, {} nodes expanded",
                    cells.len() - 1,
                    nodes_expanded
                );
                return Ok(cells);
            }

            let current_g = g_scores.get(&current).copied().unwrap_or(f64::INFINITY);

            for neighbor in current.neighbors_4() {
                if !grid.is_traversable(neighbor) {
                    continue;
                }

                let tentative_g = current_g + 1.0;
                let improves = g_scores.get(&neighbor).map_or(true, |&g| tentative_g < g);
                if improves {
                    let f = tentative_g + Self::calc_heuristic(neighbor, goal);
                    came_from.insert(neighbor, current);
                    g_scores.insert(neighbor, tentative_g);
                    f_scores.insert(neighbor, f);
                    open_set.push(neighbor, f);
                }
            }
        }

        debug!("[AStar] FAILED: open set exhausted after {} nodes", nodes_expanded);
        Err(NavigationError::SearchExhausted { start, goal })
    }

    /// Waypoints from a world position to `goal`, excluding the start cell
    pub fn plan_steps<G>(&self, grid: &G, start: Point2D, goal: CellRef) -> NavResult<Vec<PathStep>>
    where
        G: GridQuery + ?Sized,
    {
        let start_cell = grid.cell_ref_for_position(start);
        let cells = self.find_cell_path(grid, start_cell, goal)?;
        Ok(cells_to_steps(grid, &cells))
    }
}

impl GridPathPlanner for AStarPlanner {
    fn plan_cells(&self, grid: &dyn GridQuery, start: CellRef, goal: CellRef) -> NavResult<Vec<CellRef>> {
        self.find_cell_path(grid, start, goal)
    }
}
