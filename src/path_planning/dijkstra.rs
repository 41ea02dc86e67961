// Dijkstra distance field over the traversal grid
//
// Unlike A* there is no target: the frontier is drained completely and
// every reachable cell gets its unit-cost distance from the source. A path
// is then read off the field by walking downhill from the target.

use log::{debug, trace};

use crate::common::{CellRef, DistanceField, GridPathPlanner, GridQuery, NavResult, NavigationError, Point2D};
use crate::path_planning::frontier::Frontier;
use crate::path_planning::reconstruction::reconstruct_downhill;

/// Uniform-cost planner
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraPlanner;

impl DijkstraPlanner {
    pub fn new() -> Self {
        DijkstraPlanner
    }

    /// Distances from `source` to every cell reachable from it
    pub fn distance_field<G>(&self, grid: &G, source: CellRef) -> NavResult<DistanceField>
    where
        G: GridQuery + ?Sized,
    {
        if !grid.is_traversable(source) {
            debug!("[Dijkstra] FAILED: source {:?} is off the grid or blocked", source);
            return Err(NavigationError::StartBlocked(source));
        }

        let mut field = DistanceField::new(source);
        let mut open_set = Frontier::new();

        field.set(source, 0.0);
        open_set.push(source, 0.0);

        while let Some((current, current_distance)) = open_set.pop_current(|cell| Some(field.get(*cell))) {
            for neighbor in current.neighbors_4() {
                if !grid.is_traversable(neighbor) {
                    continue;
                }

                let new_distance = current_distance + 1.0;
                if new_distance < field.get(neighbor) {
                    field.set(neighbor, new_distance);
                    open_set.push(neighbor, new_distance);
                }
            }
        }

        trace!("[Dijkstra] field from {:?} covers {} cells", source, field.len());
        Ok(field)
    }

    /// Distance field rooted at the cell containing `source`
    pub fn distance_field_from_position<G>(&self, grid: &G, source: Point2D) -> NavResult<DistanceField>
    where
        G: GridQuery + ?Sized,
    {
        self.distance_field(grid, grid.cell_ref_for_position(source))
    }

    /// Cells from `start` to `goal`, both inclusive
    pub fn find_cell_path<G>(&self, grid: &G, start: CellRef, goal: CellRef) -> NavResult<Vec<CellRef>>
    where
        G: GridQuery + ?Sized,
    {
        let field = self.distance_field(grid, start)?;
        if !field.is_reachable(goal) {
            debug!("[Dijkstra] FAILED: {:?} not reachable from {:?}", goal, start);
            return Err(NavigationError::SearchExhausted { start, goal });
        }
        reconstruct_downhill(grid, &field, start, goal)
    }
}

impl GridPathPlanner for DijkstraPlanner {
    fn plan_cells(&self, grid: &dyn GridQuery, start: CellRef, goal: CellRef) -> NavResult<Vec<CellRef>> {
        self.find_cell_path(grid, start, goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::strategy::SearchStrategy;
    use crate::utils::GridMap;
    use approx::assert_relative_eq;

    #[test]
    fn test_field_on_open_grid() {
        let grid = GridMap::new(5, 5, 1.0, Point2D::origin());
        let field = DijkstraPlanner::new().distance_field(&grid, CellRef::new(0, 0)).unwrap();
        assert_eq!(field.len(), 25);
        assert_relative_eq!(field.get(CellRef::new(4, 4)), 8.0);
        assert_relative_eq!(field.get(CellRef::new(2, 3)), 5.0);
        assert_eq!(field.source(), CellRef::new(0, 0));
    }

    #[test]
    fn test_field_respects_walls() {
        let grid = GridMap::from_ascii(
            &[
                "....",
                "###.",
                "....",
            ],
            1.0,
        )
        .unwrap();
        let field = DijkstraPlanner::new().distance_field(&grid, CellRef::new(0, 0)).unwrap();
        // around the wall through (3, 1)
        assert_relative_eq!(field.get(CellRef::new(0, 2)), 8.0);
        assert!(!field.is_reachable(CellRef::new(1, 1)));
        assert!(field.get(CellRef::new(1, 1)).is_infinite());
    }

    #[test]
    fn test_field_stops_at_disconnected_region() {
        let grid = GridMap::from_ascii(&["..#..", "..#.."], 1.0).unwrap();
        let field = DijkstraPlanner::new().distance_field(&grid, CellRef::new(0, 0)).unwrap();
        assert_eq!(field.len(), 4);
        assert!(!field.is_reachable(CellRef::new(4, 1)));
    }

    #[test]
    fn test_blocked_source() {
        let grid = GridMap::from_ascii(&["#."], 1.0).unwrap();
        assert_eq!(
            DijkstraPlanner::new().distance_field(&grid, CellRef::new(0, 0)).unwrap_err(),
            NavigationError::StartBlocked(CellRef::new(0, 0))
        );
        assert!(DijkstraPlanner::new()
            .distance_field_from_position(&grid, Point2D::new(-3.0, 0.5))
            .is_err());
    }

    #[test]
    fn test_path_length_matches_field() {
        let grid = GridMap::from_ascii(
            &[
                "......",
                ".####.",
                "......",
                "####..",
                "......",
            ],
            1.0,
        )
        .unwrap();
        let planner = DijkstraPlanner::new();
        let start = CellRef::new(0, 0);
        let field = planner.distance_field(&grid, start).unwrap();
        for (&cell, &distance) in field.iter() {
            let cells = reconstruct_downhill(&grid, &field, start, cell).unwrap();
            assert_eq!((cells.len() - 1) as f64, distance);
        }
    }

    #[test]
    fn test_unreachable_goal_is_exhausted() {
        let grid = GridMap::from_ascii(&["..#.."], 1.0).unwrap();
        let result = DijkstraPlanner::new().find_cell_path(&grid, CellRef::new(0, 0), CellRef::new(4, 0));
        assert_eq!(
            result,
            Err(NavigationError::SearchExhausted { start: CellRef::new(0, 0), goal: CellRef::new(4, 0) })
        );
    }

    #[test]
    fn test_strategy_steps_match_a_star_length() {
        let grid = GridMap::new(5, 5, 1.0, Point2D::origin());
        let steps = SearchStrategy::Dijkstra
            .plan_steps(&grid, Point2D::new(0.5, 0.5), CellRef::new(4, 4))
            .unwrap();
        assert_eq!(steps.len(), 8);
        assert_eq!(steps.last().unwrap().cell, CellRef::new(4, 4));
    }
}
