// Uniform traversal grid
// Obstacle inflation follows the PythonRobotics grid map

use itertools::iproduct;
use log::debug;
use na::DMatrix;
extern crate nalgebra as na;

use crate::common::{CellFlags, CellRef, GridQuery, NavResult, NavigationError, Point2D};

/// Axis-aligned grid of square cells.
///
/// Cell `(0, 0)` has its lower-left corner at `origin`; cells are stored
/// row-major with `x` varying fastest.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: i32,
    height: i32,
    resolution: f64,
    origin: Point2D,
    cells: Vec<CellFlags>,
}

impl GridMap {
    /// Fully traversable grid
    pub fn new(width: usize, height: usize, resolution: f64, origin: Point2D) -> Self {
        let width = width.min(i32::MAX as usize) as i32;
        let height = height.min(i32::MAX as usize) as i32;
        let cells = vec![CellFlags::TRAVERSABLE; width as usize * height as usize];
        GridMap {
            width,
            height,
            resolution,
            origin,
            cells,
        }
    }

    /// Grid spanning the bounding box of the obstacle points.
    ///
    /// Cell centers land on multiples of `resolution` from the smallest
    /// obstacle coordinate; every cell whose center lies within
    /// `robot_radius` of an obstacle point is blocked.
    pub fn from_obstacles(ox: &[f64], oy: &[f64], resolution: f64, robot_radius: f64) -> NavResult<Self> {
        if ox.len() != oy.len() || ox.is_empty() {
            return Err(NavigationError::InvalidParameter(
                "obstacle coordinate lists must be non-empty and of equal length".to_string(),
            ));
        }
        if !(resolution > 0.0) {
            return Err(NavigationError::InvalidParameter(format!("resolution {} must be positive", resolution)));
        }

        let min_x = ox.iter().fold(f64::INFINITY, |a, &b| a.min(b)).round();
        let min_y = oy.iter().fold(f64::INFINITY, |a, &b| a.min(b)).round();
        let max_x = ox.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)).round();
        let max_y = oy.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)).round();

        debug!("min_x: {}, min_y: {}, max_x: {}, max_y: {}", min_x, min_y, max_x, max_y);

        let x_width = ((max_x - min_x) / resolution).round() as usize + 1;
        let y_width = ((max_y - min_y) / resolution).round() as usize + 1;

        debug!("x_width: {}, y_width: {}", x_width, y_width);

        let origin = Point2D::new(min_x - resolution / 2.0, min_y - resolution / 2.0);
        let mut grid = GridMap::new(x_width, y_width, resolution, origin);

        for (ix, iy) in iproduct!(0..grid.width, 0..grid.height) {
            let cell = CellRef::new(ix, iy);
            let center = grid.position_for_cell(cell);
            let blocked = ox.iter().zip(oy.iter()).any(|(&iox, &ioy)| {
                ((iox - center.x).powi(2) + (ioy - center.y).powi(2)).sqrt() <= robot_radius
            });
            if blocked {
                grid.set_traversable(cell, false);
            }
        }

        Ok(grid)
    }

    /// Grid from an occupancy matrix (1 = blocked), each entry upscaled to
    /// a `scale` x `scale` block of cells. Column index is `x`, row index is `y`.
    pub fn from_matrix(original_matrix: &DMatrix<i32>, scale: usize, resolution: f64) -> NavResult<Self> {
        if scale < 1 {
            return Err(NavigationError::InvalidParameter("scale must be >= 1".to_string()));
        }
        let matrix = original_matrix.kronecker(&DMatrix::<i32>::repeat(scale, scale, 1));
        let (nrows, ncols) = matrix.shape();

        let mut grid = GridMap::new(ncols, nrows, resolution, Point2D::origin());
        for (r, c) in iproduct!(0..nrows, 0..ncols) {
            if matrix[(r, c)] == 1 {
                grid.set_traversable(CellRef::new(c as i32, r as i32), false);
            }
        }
        Ok(grid)
    }

    /// Grid from text rows, `#` blocked and anything else free.
    ///
    /// The first row is the top of the map (largest `y`).
    pub fn from_ascii(rows: &[&str], resolution: f64) -> NavResult<Self> {
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if rows.iter().any(|r| r.chars().count() != width) {
            return Err(NavigationError::InvalidParameter("ragged ascii map".to_string()));
        }

        let height = rows.len();
        let mut grid = GridMap::new(width, height, resolution, Point2D::origin());
        for (r, row) in rows.iter().enumerate() {
            let y = (height - 1 - r) as i32;
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.set_traversable(CellRef::new(x as i32, y), false);
                }
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn origin(&self) -> Point2D {
        self.origin
    }

    fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0 || !(self.resolution > 0.0)
    }

    fn calc_index(&self, cell: CellRef) -> Option<usize> {
        if !self.is_in_bounds(cell) {
            return None;
        }
        Some(cell.y as usize * self.width as usize + cell.x as usize)
    }

    pub fn set_flags(&mut self, cell: CellRef, flags: CellFlags) {
        if let Some(index) = self.calc_index(cell) {
            self.cells[index] = flags;
        }
    }

    pub fn set_traversable(&mut self, cell: CellRef, traversable: bool) {
        if let Some(index) = self.calc_index(cell) {
            self.cells[index].set(CellFlags::TRAVERSABLE, traversable);
        }
    }

    /// Iterate every cell that is not traversable
    pub fn blocked_cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        iproduct!(0..self.height, 0..self.width)
            .map(|(y, x)| CellRef::new(x, y))
            .filter(move |&cell| !self.is_traversable(cell))
    }
}

impl GridQuery for GridMap {
    fn cell_ref_for_position(&self, position: Point2D) -> CellRef {
        if self.is_degenerate() || !position.x.is_finite() || !position.y.is_finite() {
            return CellRef::INVALID;
        }

        let fx = ((position.x - self.origin.x) / self.resolution).floor();
        let fy = ((position.y - self.origin.y) / self.resolution).floor();
        if fx < 0.0 || fy < 0.0 || fx >= self.width as f64 || fy >= self.height as f64 {
            return CellRef::INVALID;
        }
        CellRef::new(fx as i32, fy as i32)
    }

    fn position_for_cell(&self, cell: CellRef) -> Point2D {
        Point2D::new(
            self.origin.x + (cell.x as f64 + 0.5) * self.resolution,
            self.origin.y + (cell.y as f64 + 0.5) * self.resolution,
        )
    }

    fn flags_for_cell(&self, cell: CellRef) -> CellFlags {
        self.calc_index(cell)
            .map(|index| self.cells[index])
            .unwrap_or_else(CellFlags::empty)
    }

    fn is_in_bounds(&self, cell: CellRef) -> bool {
        !self.is_degenerate()
            && cell.x >= 0
            && cell.y >= 0
            && cell.x < self.width
            && cell.y < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_position_round_trip() {
        let grid = GridMap::new(5, 4, 100.0, Point2D::new(-50.0, 20.0));
        for (x, y) in iproduct!(0..5, 0..4) {
            let cell = CellRef::new(x, y);
            let p = grid.position_for_cell(cell);
            assert_eq!(grid.cell_ref_for_position(p), cell);
        }
        assert_relative_eq!(grid.position_for_cell(CellRef::new(0, 0)).x, 0.0);
        assert_relative_eq!(grid.position_for_cell(CellRef::new(0, 0)).y, 70.0);
    }

    #[test]
    fn test_outside_points_are_invalid() {
        let grid = GridMap::new(3, 3, 1.0, Point2D::origin());
        assert_eq!(grid.cell_ref_for_position(Point2D::new(-0.01, 1.0)), CellRef::INVALID);
        assert_eq!(grid.cell_ref_for_position(Point2D::new(3.0, 1.0)), CellRef::INVALID);
        assert_eq!(grid.cell_ref_for_position(Point2D::new(f64::NAN, 1.0)), CellRef::INVALID);
        assert_eq!(grid.cell_ref_for_position(Point2D::new(2.99, 0.0)), CellRef::new(2, 0));
    }

    #[test]
    fn test_degenerate_grid() {
        let grid = GridMap::new(0, 0, 1.0, Point2D::origin());
        assert_eq!(grid.cell_ref_for_position(Point2D::origin()), CellRef::INVALID);
        assert!(!grid.is_in_bounds(CellRef::new(0, 0)));
        assert_eq!(grid.flags_for_cell(CellRef::new(0, 0)), CellFlags::empty());

        let zero_res = GridMap::new(3, 3, 0.0, Point2D::origin());
        assert_eq!(zero_res.cell_ref_for_position(Point2D::new(0.5, 0.5)), CellRef::INVALID);
    }

    #[test]
    fn test_from_ascii_orientation() {
        let grid = GridMap::from_ascii(&["#..", "...", "..#"], 1.0).unwrap();
        assert!(!grid.is_traversable(CellRef::new(0, 2)));
        assert!(!grid.is_traversable(CellRef::new(2, 0)));
        assert!(grid.is_traversable(CellRef::new(0, 0)));
        assert_eq!(grid.blocked_cells().count(), 2);

        assert!(GridMap::from_ascii(&["..", "..."], 1.0).is_err());
    }

    #[test]
    fn test_from_matrix_scales() {
        let m = DMatrix::from_row_slice(2, 2, &[0, 1, 0, 0]);
        let grid = GridMap::from_matrix(&m, 2, 1.0).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.blocked_cells().count(), 4);
        assert!(!grid.is_traversable(CellRef::new(3, 1)));
        assert!(grid.is_traversable(CellRef::new(1, 1)));

        assert!(GridMap::from_matrix(&m, 0, 1.0).is_err());
    }

    #[test]
    fn test_from_obstacles_blocks_boundary() {
        let mut ox = Vec::new();
        let mut oy = Vec::new();
        for i in 0..11 {
            ox.push(i as f64); oy.push(0.0);
            ox.push(i as f64); oy.push(10.0);
            ox.push(0.0); oy.push(i as f64);
            ox.push(10.0); oy.push(i as f64);
        }
        let grid = GridMap::from_obstacles(&ox, &oy, 1.0, 0.5).unwrap();
        assert_eq!(grid.width(), 11);
        assert_eq!(grid.height(), 11);

        let wall = grid.cell_ref_for_position(Point2D::new(0.0, 5.0));
        assert!(!grid.is_traversable(wall));
        let inside = grid.cell_ref_for_position(Point2D::new(5.0, 5.0));
        assert!(grid.is_traversable(inside));
        assert_relative_eq!(grid.position_for_cell(inside).x, 5.0);
    }
}
