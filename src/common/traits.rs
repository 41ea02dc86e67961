//! Common traits defining the collaborators of the planning core

use std::sync::Arc;

use nalgebra::Vector2;

use crate::common::error::NavResult;
use crate::common::types::*;

/// Read-only view of a traversal grid
pub trait GridQuery {
    /// Project a world position onto a cell. Must be deterministic.
    fn cell_ref_for_position(&self, position: Point2D) -> CellRef;

    /// World position representing a cell; maps back to the same cell
    fn position_for_cell(&self, cell: CellRef) -> Point2D;

    fn flags_for_cell(&self, cell: CellRef) -> CellFlags;

    fn is_in_bounds(&self, cell: CellRef) -> bool;

    fn is_traversable(&self, cell: CellRef) -> bool {
        self.is_in_bounds(cell) && self.flags_for_cell(cell).contains(CellFlags::TRAVERSABLE)
    }
}

impl<G: GridQuery + ?Sized> GridQuery for Arc<G> {
    fn cell_ref_for_position(&self, position: Point2D) -> CellRef {
        (**self).cell_ref_for_position(position)
    }

    fn position_for_cell(&self, cell: CellRef) -> Point2D {
        (**self).position_for_cell(cell)
    }

    fn flags_for_cell(&self, cell: CellRef) -> CellFlags {
        (**self).flags_for_cell(cell)
    }

    fn is_in_bounds(&self, cell: CellRef) -> bool {
        (**self).is_in_bounds(cell)
    }
}

/// Finds the grid a path component should plan on
pub trait GridLocator<G> {
    fn locate(&self) -> Option<Arc<G>>;
}

/// A host that already owns the grid hands it out directly
impl<G> GridLocator<G> for Arc<G> {
    fn locate(&self) -> Option<Arc<G>> {
        Some(Arc::clone(self))
    }
}

/// The agent a path component steers
pub trait Agent {
    /// Current world position, `None` while the owner has no body to move
    fn position(&self) -> Option<Point2D>;
}

/// Turns a requested direction into motion
pub trait MovementExecutor {
    /// `direction` is a unit vector
    fn request_move(&mut self, direction: Vector2<f64>);
}

impl<F> MovementExecutor for F
where
    F: FnMut(Vector2<f64>),
{
    fn request_move(&mut self, direction: Vector2<f64>) {
        self(direction)
    }
}

/// Trait for grid-based shortest path searches
pub trait GridPathPlanner {
    /// Cell sequence from `start` to `goal`, both inclusive
    fn plan_cells(&self, grid: &dyn GridQuery, start: CellRef, goal: CellRef) -> NavResult<Vec<CellRef>>;
}
