//! Common types used throughout grid_navigation

use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;
use nalgebra::Vector2;

/// 2D world position (elevation is projected away before it reaches the grid)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// Discrete grid cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub x: i32,
    pub y: i32,
}

impl CellRef {
    /// Produced for points outside the grid or for a degenerate grid
    pub const INVALID: CellRef = CellRef { x: i32::MIN, y: i32::MIN };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Sum of absolute coordinate deltas
    pub fn manhattan_distance(&self, other: &CellRef) -> i64 {
        (self.x as i64 - other.x as i64).abs() + (self.y as i64 - other.y as i64).abs()
    }

    /// 4-connected neighbors in +x, -x, +y, -y order.
    ///
    /// The order is fixed; searches rely on it for reproducible tie-breaking.
    pub fn neighbors_4(&self) -> [CellRef; 4] {
        [
            CellRef::new(self.x.saturating_add(1), self.y),
            CellRef::new(self.x.saturating_sub(1), self.y),
            CellRef::new(self.x, self.y.saturating_add(1)),
            CellRef::new(self.x, self.y.saturating_sub(1)),
        ]
    }
}

impl Default for CellRef {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<(i32, i32)> for CellRef {
    fn from(tuple: (i32, i32)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

bitflags! {
    /// Per-cell flags owned by the grid
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        const TRAVERSABLE = 1 << 0;
    }
}

/// A waypoint: world position plus the cell it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub point: Point2D,
    pub cell: CellRef,
}

impl PathStep {
    pub fn new(point: Point2D, cell: CellRef) -> Self {
        Self { point, cell }
    }
}

/// Lifecycle of a path component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlanningState {
    #[default]
    None,
    Invalid,
    Active,
    Finished,
}

impl fmt::Display for PlanningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanningState::None => "none",
            PlanningState::Invalid => "invalid",
            PlanningState::Active => "active",
            PlanningState::Finished => "finished",
        };
        write!(f, "{}", name)
    }
}

/// Shortest unit-cost distance from a source cell to every reachable cell
#[derive(Debug, Clone)]
pub struct DistanceField {
    source: CellRef,
    distances: HashMap<CellRef, f64>,
}

impl DistanceField {
    pub fn new(source: CellRef) -> Self {
        Self {
            source,
            distances: HashMap::new(),
        }
    }

    pub fn source(&self) -> CellRef {
        self.source
    }

    /// Recorded distance, `f64::INFINITY` for cells never reached
    pub fn get(&self, cell: CellRef) -> f64 {
        self.distances.get(&cell).copied().unwrap_or(f64::INFINITY)
    }

    pub fn set(&mut self, cell: CellRef, distance: f64) {
        self.distances.insert(cell, distance);
    }

    pub fn is_reachable(&self, cell: CellRef) -> bool {
        self.distances.contains_key(&cell)
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellRef, &f64)> {
        self.distances.iter()
    }
}

/// Path represented as a sequence of 2D points
#[derive(Debug, Clone)]
pub struct Path2D {
    pub points: Vec<Point2D>,
}

impl Path2D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// Polyline through the given start and each waypoint
    pub fn from_steps(start: Point2D, steps: &[PathStep]) -> Self {
        let mut points = Vec::with_capacity(steps.len() + 1);
        points.push(start);
        points.extend(steps.iter().map(|s| s.point));
        Self { points }
    }

    pub fn push(&mut self, point: Point2D) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn total_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points.windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }
}

impl Default for Path2D {
    fn default() -> Self {
        Self::new()
    }
}
