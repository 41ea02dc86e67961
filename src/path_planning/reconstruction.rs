//! Turning search bookkeeping into ordered waypoints

use std::collections::HashMap;

use log::warn;

use crate::common::{CellRef, DistanceField, GridQuery, NavResult, NavigationError, PathStep};

/// Follow predecessor links back from `goal`.
///
/// Returns the cells from the search origin to `goal`, both inclusive.
pub fn reconstruct_from_predecessors(came_from: &HashMap<CellRef, CellRef>, goal: CellRef) -> Vec<CellRef> {
    let mut cells = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        current = previous;
        cells.push(current);
    }
    cells.reverse();
    cells
}

/// Walk a distance field downhill from `target` to `start`.
///
/// Every step moves to the traversable neighbor with the strictly smallest
/// finite distance. Reaching a cell with no such neighbor before `start`
/// means the field does not connect the two cells. Returns the cells from
/// `start` to `target`, both inclusive.
pub fn reconstruct_downhill<G>(
    grid: &G,
    field: &DistanceField,
    start: CellRef,
    target: CellRef,
) -> NavResult<Vec<CellRef>>
where
    G: GridQuery + ?Sized,
{
    let broken = |at: CellRef| {
        warn!("[Dijkstra] no downhill neighbor at {:?} on the way to {:?}", at, start);
        NavigationError::ReconstructionBroken { at, start }
    };

    if !start.is_valid() || !target.is_valid() || !field.get(target).is_finite() {
        return Err(broken(target));
    }

    let mut cells = vec![target];
    let mut current = target;

    while current != start {
        let mut min_distance = field.get(current);
        let mut next = None;

        for neighbor in current.neighbors_4() {
            if !grid.is_traversable(neighbor) {
                continue;
            }
            let distance = field.get(neighbor);
            if distance < min_distance {
                min_distance = distance;
                next = Some(neighbor);
            }
        }

        current = next.ok_or_else(|| broken(current))?;
        cells.push(current);
    }

    cells.reverse();
    Ok(cells)
}

/// Waypoints for a cell path that begins at the agent's own cell.
///
/// The first cell is dropped since the agent already occupies it, unless it
/// is the only one.
pub fn cells_to_steps<G>(grid: &G, cells: &[CellRef]) -> Vec<PathStep>
where
    G: GridQuery + ?Sized,
{
    let skip = if cells.len() > 1 { 1 } else { 0 };
    cells
        .iter()
        .skip(skip)
        .map(|&cell| PathStep::new(grid.position_for_cell(cell), cell))
        .collect()
}
