/*!
 * Path following state machine
 *
 * A `PathComponent` is attached to one agent. Once a destination is set it
 * replans from the agent's position on every tick (search, reconstruct,
 * smooth) and hands the direction towards the first waypoint to the
 * movement executor, until the agent is within the arrival distance.
 *
 *   None --set_destination--> Invalid --path found--> Active --arrived--> Finished
 *                                ^                       |
 *                                +----- replan failed ---+
 */

use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::common::{
    Agent, CellRef, GridLocator, GridQuery, MovementExecutor, NavResult, NavigationError, PathStep, PlanningState,
    Point2D,
};
use crate::path_planning::{PathSmoother, SearchStrategy, DEFAULT_LOS_STEP_SIZE};
use crate::utils::GridHandle;

/// Configuration for a path component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathFollowingConfig {
    /// Distance to the destination at which the agent counts as arrived
    pub arrival_distance: f64,
    /// Sampling step of the line-of-sight test used for smoothing
    pub los_step_size: f64,
    /// Search used for replanning
    pub strategy: SearchStrategy,
}

impl Default for PathFollowingConfig {
    fn default() -> Self {
        Self {
            arrival_distance: 100.0,
            los_step_size: DEFAULT_LOS_STEP_SIZE,
            strategy: SearchStrategy::AStar,
        }
    }
}

/// Per-agent planning state machine
pub struct PathComponent<G, L, A, M> {
    grid: GridHandle<G, L>,
    agent: A,
    mover: Option<M>,
    config: PathFollowingConfig,
    state: PlanningState,
    destination: Point2D,
    destination_cell: CellRef,
    destination_valid: bool,
    steps: Vec<PathStep>,
}

impl<G, L, A, M> PathComponent<G, L, A, M>
where
    G: GridQuery,
    L: GridLocator<G>,
    A: Agent,
    M: MovementExecutor,
{
    pub fn new(locator: L, agent: A, mover: Option<M>, config: PathFollowingConfig) -> Self {
        PathComponent {
            grid: GridHandle::new(locator),
            agent,
            mover,
            config,
            state: PlanningState::None,
            destination: Point2D::origin(),
            destination_cell: CellRef::INVALID,
            destination_valid: false,
            steps: Vec::new(),
        }
    }

    pub fn state(&self) -> PlanningState {
        self.state
    }

    /// Current waypoints, first one is being steered towards
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn destination(&self) -> Option<Point2D> {
        if self.destination_valid {
            Some(self.destination)
        } else {
            None
        }
    }

    pub fn destination_cell(&self) -> CellRef {
        self.destination_cell
    }

    pub fn config(&self) -> &PathFollowingConfig {
        &self.config
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Grid this component plans on, located on first use
    pub fn grid(&self) -> Option<Arc<G>> {
        self.grid.grid()
    }

    /// Replace the waypoints; an empty list is ignored
    pub fn set_steps(&mut self, steps: Vec<PathStep>) {
        if !steps.is_empty() {
            self.steps = steps;
        }
    }

    /// Drop the destination and go back to `None`
    pub fn clear_destination(&mut self) {
        self.destination_valid = false;
        self.destination_cell = CellRef::INVALID;
        self.steps.clear();
        self.state = PlanningState::None;
    }

    /// Set a new destination and plan towards it immediately
    pub fn set_destination(&mut self, destination: Point2D) -> PlanningState {
        self.destination = destination;
        self.destination_valid = false;
        self.destination_cell = CellRef::INVALID;
        self.steps.clear();
        self.state = PlanningState::Invalid;

        match self.resolve_destination(destination) {
            Ok(cell) => {
                self.destination_cell = cell;
                self.destination_valid = true;
                self.refresh_path()
            }
            Err(e) => {
                warn!("[PathComponent] destination ignored: {}", e);
                self.state
            }
        }
    }

    fn resolve_destination(&self, destination: Point2D) -> NavResult<CellRef> {
        let grid = self.grid.grid().ok_or(NavigationError::GridUnavailable)?;
        let cell = grid.cell_ref_for_position(destination);
        if !cell.is_valid() || !grid.is_in_bounds(cell) {
            return Err(NavigationError::DestinationUnresolved(destination));
        }
        Ok(cell)
    }

    /// Advance one simulation step
    pub fn tick(&mut self, _delta_time: f64) {
        if !self.destination_valid {
            return;
        }

        self.refresh_path();

        if self.state == PlanningState::Active {
            self.follow_path();
        }
    }

    /// Check for arrival, otherwise replan from the agent's position
    pub fn refresh_path(&mut self) -> PlanningState {
        if !self.destination_valid {
            return self.state;
        }

        let position = match self.agent.position() {
            Some(position) => position,
            None => {
                debug!("[PathComponent] agent has no position, skipping refresh");
                return self.state;
            }
        };

        if position.distance(&self.destination) <= self.config.arrival_distance {
            debug!("[PathComponent] arrived at {:?}", self.destination);
            self.state = PlanningState::Finished;
            self.destination_valid = false;
            self.steps.clear();
            return self.state;
        }

        match self.replan(position) {
            Ok(steps) => {
                self.steps = steps;
                self.state = PlanningState::Active;
            }
            Err(e) => {
                debug!("[PathComponent] replan failed: {}", e);
                self.steps.clear();
                self.state = e.planning_state();
            }
        }
        self.state
    }

    fn replan(&self, start: Point2D) -> NavResult<Vec<PathStep>> {
        let grid = self.grid.grid().ok_or(NavigationError::GridUnavailable)?;
        let raw = self.config.strategy.plan_steps(grid.as_ref(), start, self.destination_cell)?;
        PathSmoother::new(grid.as_ref(), self.config.los_step_size).smooth(start, &raw)
    }

    /// Steer towards the first waypoint
    pub fn follow_path(&mut self) {
        if self.state != PlanningState::Active {
            return;
        }
        let (position, target) = match (self.agent.position(), self.steps.first()) {
            (Some(position), Some(step)) => (position, step.point),
            _ => return,
        };

        let direction = match (target.to_vector() - position.to_vector()).try_normalize(f64::EPSILON) {
            Some(direction) => direction,
            None => return,
        };

        if let Some(mover) = self.mover.as_mut() {
            mover.request_move(direction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::GridMap;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct SimAgent {
        position: Rc<Cell<Option<Point2D>>>,
    }

    impl Agent for SimAgent {
        fn position(&self) -> Option<Point2D> {
            self.position.get()
        }
    }

    struct NoGrid;

    impl GridLocator<GridMap> for NoGrid {
        fn locate(&self) -> Option<Arc<GridMap>> {
            None
        }
    }

    type Moves = Rc<RefCell<Vec<Vector2<f64>>>>;

    fn component(
        grid: GridMap,
        start: Point2D,
        config: PathFollowingConfig,
    ) -> (
        PathComponent<GridMap, Arc<GridMap>, SimAgent, impl FnMut(Vector2<f64>)>,
        Rc<Cell<Option<Point2D>>>,
        Moves,
    ) {
        let position = Rc::new(Cell::new(Some(start)));
        let moves: Moves = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&moves);
        let mover = move |direction: Vector2<f64>| recorded.borrow_mut().push(direction);
        let agent = SimAgent { position: Rc::clone(&position) };
        (PathComponent::new(Arc::new(grid), agent, Some(mover), config), position, moves)
    }

    fn corridor() -> GridMap {
        GridMap::from_ascii(
            &[
                ".....",
                ".####",
                ".####",
                ".####",
                ".....",
            ],
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn test_initial_state() {
        let (pc, _, _) = component(corridor(), Point2D::new(450.0, 50.0), PathFollowingConfig::default());
        assert_eq!(pc.state(), PlanningState::None);
        assert!(pc.steps().is_empty());
        assert!(pc.destination().is_none());
    }

    #[test]
    fn test_set_destination_plans_immediately() {
        let config = PathFollowingConfig { arrival_distance: 10.0, ..Default::default() };
        let (mut pc, _, moves) = component(corridor(), Point2D::new(450.0, 50.0), config);

        let state = pc.set_destination(Point2D::new(450.0, 450.0));
        assert_eq!(state, PlanningState::Active);
        assert_eq!(pc.destination_cell(), CellRef::new(4, 4));
        let cells: Vec<CellRef> = pc.steps().iter().map(|s| s.cell).collect();
        assert_eq!(cells, vec![CellRef::new(0, 0), CellRef::new(0, 4), CellRef::new(4, 4)]);
        // no movement until the first tick
        assert!(moves.borrow().is_empty());
    }

    #[test]
    fn test_tick_emits_unit_direction() {
        let config = PathFollowingConfig { arrival_distance: 10.0, ..Default::default() };
        let (mut pc, _, moves) = component(corridor(), Point2D::new(450.0, 50.0), config);
        pc.set_destination(Point2D::new(450.0, 450.0));

        pc.tick(0.016);
        let moves = moves.borrow();
        assert_eq!(moves.len(), 1);
        assert_relative_eq!(moves[0].norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(moves[0].x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_destination_off_grid_is_invalid() {
        let (mut pc, _, moves) = component(corridor(), Point2D::new(450.0, 50.0), PathFollowingConfig::default());
        assert_eq!(pc.set_destination(Point2D::new(-500.0, 50.0)), PlanningState::Invalid);
        assert!(pc.destination().is_none());
        pc.tick(0.016);
        assert_eq!(pc.state(), PlanningState::Invalid);
        assert!(moves.borrow().is_empty());
    }

    #[test]
    fn test_without_grid() {
        let agent = SimAgent { position: Rc::new(Cell::new(Some(Point2D::origin()))) };
        let mut pc: PathComponent<GridMap, _, _, fn(Vector2<f64>)> =
            PathComponent::new(NoGrid, agent, None, PathFollowingConfig::default());
        assert_eq!(pc.set_destination(Point2D::new(500.0, 500.0)), PlanningState::Invalid);
        pc.tick(0.016);
        assert_eq!(pc.state(), PlanningState::Invalid);
        assert!(pc.grid().is_none());
    }

    #[test]
    fn test_unreachable_destination() {
        let grid = GridMap::from_ascii(&["..#..", "..#.."], 100.0).unwrap();
        let config = PathFollowingConfig { arrival_distance: 10.0, ..Default::default() };
        let (mut pc, _, moves) = component(grid, Point2D::new(50.0, 50.0), config);

        assert_eq!(pc.set_destination(Point2D::new(450.0, 50.0)), PlanningState::Invalid);
        // the destination stays actionable, later ticks keep retrying
        assert!(pc.destination().is_some());
        pc.tick(0.016);
        assert_eq!(pc.state(), PlanningState::Invalid);
        assert!(pc.steps().is_empty());
        assert!(moves.borrow().is_empty());
    }

    #[test]
    fn test_arrival_finishes_and_stops_emitting() {
        let (mut pc, position, moves) =
            component(corridor(), Point2D::new(450.0, 50.0), PathFollowingConfig::default());
        assert_eq!(pc.set_destination(Point2D::new(50.0, 450.0)), PlanningState::Active);

        position.set(Some(Point2D::new(60.0, 400.0)));
        pc.tick(0.016);
        assert_eq!(pc.state(), PlanningState::Finished);
        assert!(pc.steps().is_empty());

        position.set(Some(Point2D::new(450.0, 50.0)));
        pc.tick(0.016);
        assert_eq!(pc.state(), PlanningState::Finished);
        assert!(moves.borrow().is_empty());
    }

    #[test]
    fn test_destination_within_arrival_distance() {
        let (mut pc, _, _) = component(corridor(), Point2D::new(450.0, 50.0), PathFollowingConfig::default());
        assert_eq!(pc.set_destination(Point2D::new(400.0, 60.0)), PlanningState::Finished);
    }

    #[test]
    fn test_arrival_near_blocked_destination() {
        // Destination inside a wall cell; no path exists, but the agent is close enough
        let grid = GridMap::from_ascii(&["..#..", "..#.."], 100.0).unwrap();
        let (mut pc, _, moves) = component(grid, Point2D::new(150.0, 50.0), PathFollowingConfig::default());

        assert_eq!(pc.set_destination(Point2D::new(210.0, 50.0)), PlanningState::Finished);
        assert_eq!(pc.destination_cell(), CellRef::new(2, 0));
        assert!(pc.steps().is_empty());
        pc.tick(0.016);
        assert_eq!(pc.state(), PlanningState::Finished);
        assert!(moves.borrow().is_empty());
    }

    #[test]
    fn test_agent_without_position_skips_tick() {
        let config = PathFollowingConfig { arrival_distance: 10.0, ..Default::default() };
        let (mut pc, position, moves) = component(corridor(), Point2D::new(450.0, 50.0), config);
        pc.set_destination(Point2D::new(450.0, 450.0));
        position.set(None);
        pc.tick(0.016);
        assert_eq!(pc.state(), PlanningState::Active);
        assert!(moves.borrow().is_empty());
    }

    #[test]
    fn test_dijkstra_strategy_matches() {
        let config = PathFollowingConfig {
            arrival_distance: 10.0,
            strategy: SearchStrategy::Dijkstra,
            ..Default::default()
        };
        let (mut pc, _, _) = component(corridor(), Point2D::new(450.0, 50.0), config);
        assert_eq!(pc.set_destination(Point2D::new(450.0, 450.0)), PlanningState::Active);
        assert_eq!(pc.steps().len(), 3);
    }

    #[test]
    fn test_walks_to_destination() {
        let config = PathFollowingConfig { arrival_distance: 20.0, ..Default::default() };
        let (mut pc, position, moves) = component(corridor(), Point2D::new(450.0, 50.0), config);
        pc.set_destination(Point2D::new(450.0, 450.0));

        let mut ticks = 0;
        while pc.state() == PlanningState::Active && ticks < 10 {
            pc.tick(0.1);
            ticks += 1;
            if let Some(step) = pc.steps().first() {
                // jump straight onto the waypoint being steered towards
                position.set(Some(step.point));
            }
        }
        assert_eq!(pc.state(), PlanningState::Finished);
        assert_eq!(ticks, 4);
        assert_eq!(moves.borrow().len(), 3);
    }

    #[test]
    fn test_set_steps_ignores_empty() {
        let config = PathFollowingConfig { arrival_distance: 10.0, ..Default::default() };
        let (mut pc, _, _) = component(corridor(), Point2D::new(450.0, 50.0), config);
        pc.set_destination(Point2D::new(450.0, 450.0));
        pc.set_steps(Vec::new());
        assert_eq!(pc.steps().len(), 3);

        pc.clear_destination();
        assert_eq!(pc.state(), PlanningState::None);
        assert!(pc.destination().is_none());
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: PathFollowingConfig = serde_json::from_str(r#"{ "strategy": "dijkstra" }"#).unwrap();
        assert_eq!(config.strategy, SearchStrategy::Dijkstra);
        assert_relative_eq!(config.arrival_distance, 100.0);
        assert_relative_eq!(config.los_step_size, 10.0);
    }
}
