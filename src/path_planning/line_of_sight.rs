//! Sampled line-of-sight test between world points
//!
//! The segment is sampled at `n = ceil(length / step_size)` evenly spaced
//! intervals, both endpoints included, so the spacing never exceeds
//! `step_size`. Sample `i` is computed as `(a * (n - i) + b * i) / n`,
//! which yields bit-identical samples when the endpoints are swapped.

use log::warn;

use crate::common::{GridQuery, Point2D};

/// Default sampling step in world units
pub const DEFAULT_LOS_STEP_SIZE: f64 = 10.0;

/// Upper bound on samples per segment. A step this fine relative to the
/// segment is treated like an invalid step.
pub const MAX_LOS_SAMPLES: u64 = 1 << 20;

/// True when the segment `a`-`b` touches a non-traversable cell or either
/// endpoint lies outside the grid.
pub fn segment_blocked<G>(grid: &G, a: Point2D, b: Point2D, step_size: f64) -> bool
where
    G: GridQuery + ?Sized,
{
    if !(step_size > 0.0) || !step_size.is_finite() {
        warn!("line-of-sight step size {} rejected, treating segment as blocked", step_size);
        return true;
    }

    if !grid.is_in_bounds(grid.cell_ref_for_position(a)) || !grid.is_in_bounds(grid.cell_ref_for_position(b)) {
        return true;
    }

    let length = a.distance(&b);
    let intervals = (length / step_size).ceil();
    if intervals > MAX_LOS_SAMPLES as f64 {
        warn!(
            "line-of-sight step size {} needs {} samples over {}, treating segment as blocked",
            step_size, intervals, length
        );
        return true;
    }
    let n = intervals as u64;
    let nf = n as f64;

    (0..=n).any(|i| {
        let sample = if n == 0 {
            a
        } else {
            let wa = (n - i) as f64;
            let wb = i as f64;
            Point2D::new((a.x * wa + b.x * wb) / nf, (a.y * wa + b.y * wb) / nf)
        };
        !grid.is_traversable(grid.cell_ref_for_position(sample))
    })
}

/// Inverse of [`segment_blocked`]
pub fn has_line_of_sight<G>(grid: &G, a: Point2D, b: Point2D, step_size: f64) -> bool
where
    G: GridQuery + ?Sized,
{
    !segment_blocked(grid, a, b, step_size)
}
