//! Path smoothing by string pulling.
//!
//! Collapses a cell-by-cell path into waypoints that can be driven in
//! straight lines, using the sampled line-of-sight test.

use log::{debug, trace};

use crate::common::{GridQuery, NavResult, NavigationError, PathStep, Point2D};
use crate::path_planning::line_of_sight::{has_line_of_sight, DEFAULT_LOS_STEP_SIZE};

/// Greedy pull-taut smoother
pub struct PathSmoother<'a, G: ?Sized> {
    grid: &'a G,
    los_step_size: f64,
}

impl<'a, G> PathSmoother<'a, G>
where
    G: GridQuery + ?Sized,
{
    pub fn new(grid: &'a G, los_step_size: f64) -> Self {
        Self { grid, los_step_size }
    }

    /// Create with the default sampling step
    pub fn with_defaults(grid: &'a G) -> Self {
        Self::new(grid, DEFAULT_LOS_STEP_SIZE)
    }

    fn visible(&self, from: Point2D, to: Point2D) -> bool {
        has_line_of_sight(self.grid, from, to, self.los_step_size)
    }

    fn step_at(&self, step: &PathStep) -> PathStep {
        PathStep::new(self.grid.position_for_cell(step.cell), step.cell)
    }

    /// Smooth `steps`, travelled from `start`.
    ///
    /// If the final waypoint is visible from `start` the result is that
    /// waypoint alone. Otherwise, from the current anchor (initially
    /// `start`), every remaining candidate is tested and the furthest
    /// visible one is emitted and becomes the anchor. When none is visible
    /// the next candidate is emitted anyway so the scan always advances.
    ///
    /// Picking the furthest visible candidate makes the result a fixed
    /// point: smoothing it again returns the same waypoints.
    pub fn smooth(&self, start: Point2D, steps: &[PathStep]) -> NavResult<Vec<PathStep>> {
        let last = match steps.last() {
            Some(last) => self.step_at(last),
            None => return Err(NavigationError::DegenerateSmoothingInput),
        };

        if self.visible(start, last.point) {
            trace!("[Smooth] direct line of sight to {:?}", last.cell);
            return Ok(vec![last]);
        }

        let mut smoothed = Vec::new();
        let mut anchor_point = start;
        let mut next_index = 0;

        while next_index < steps.len() {
            let furthest = steps
                .iter()
                .enumerate()
                .skip(next_index)
                .rev()
                .find(|(_, candidate)| self.visible(anchor_point, self.grid.position_for_cell(candidate.cell)))
                .map_or(next_index, |(i, _)| i);

            let anchor = self.step_at(&steps[furthest]);
            smoothed.push(anchor);
            if anchor.cell == last.cell {
                break;
            }

            anchor_point = anchor.point;
            next_index = furthest + 1;
        }

        debug!("[Smooth] {} waypoints reduced to {}", steps.len(), smoothed.len());
        Ok(smoothed)
    }
}
