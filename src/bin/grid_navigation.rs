// Grid navigation demo
//
// Walks a simulated agent through a walled map with a PathComponent and
// plots the raw search path, the smoothed path and the driven trajectory.
// Set RUST_LOG=debug to see the planner output.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use grid_navigation::common::Path2D;
use grid_navigation::path_planning::{AStarPlanner, DijkstraPlanner, PathSmoother};
use grid_navigation::utils::{colors, PathStyle, Visualizer};
use grid_navigation::{
    Agent, GridMap, GridQuery, PathComponent, PathFollowingConfig, PlanningState, Point2D,
};

const SAVE_PLOT: bool = true;
const MAX_TICKS: usize = 2000;
const PILLARS: usize = 12;
const SEED: u64 = 7;

struct DemoAgent {
    position: Rc<Cell<Point2D>>,
}

impl Agent for DemoAgent {
    fn position(&self) -> Option<Point2D> {
        Some(self.position.get())
    }
}

fn build_obstacles(start: Point2D, goal: Point2D) -> (Vec<f64>, Vec<f64>) {
    let mut ox = Vec::new();
    let mut oy = Vec::new();

    // Create boundary obstacles
    for i in 0..41 {
        ox.push(i as f64);
        oy.push(0.0);
        ox.push(i as f64);
        oy.push(40.0);
        ox.push(0.0);
        oy.push(i as f64);
        ox.push(40.0);
        oy.push(i as f64);
    }

    // Two staggered walls
    for i in 0..28 {
        ox.push(13.0);
        oy.push(i as f64);
        ox.push(27.0);
        oy.push(40.0 - i as f64);
    }

    // Scattered pillars, kept clear of the start and goal
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut placed = 0;
    while placed < PILLARS {
        let p = Point2D::new(rng.gen_range(3.0..37.0_f64).round(), rng.gen_range(3.0..37.0_f64).round());
        if p.distance(&start) < 4.0 || p.distance(&goal) < 4.0 {
            continue;
        }
        ox.push(p.x);
        oy.push(p.y);
        placed += 1;
    }

    (ox, oy)
}

fn main() {
    env_logger::init();
    println!("Grid navigation start!!");

    let start = Point2D::new(5.0, 5.0);
    let goal = Point2D::new(35.0, 35.0);
    let speed = 0.25;

    let (ox, oy) = build_obstacles(start, goal);
    let grid = match GridMap::from_obstacles(&ox, &oy, 1.0, 1.0) {
        Ok(grid) => Arc::new(grid),
        Err(e) => {
            println!("Could not build grid: {}", e);
            return;
        }
    };
    println!(
        "Grid {} x {}, {} blocked cells",
        grid.width(),
        grid.height(),
        grid.blocked_cells().count()
    );

    match DijkstraPlanner::new().distance_field_from_position(grid.as_ref(), start) {
        Ok(field) => println!(
            "Distance field reaches {} cells, goal is {} cells away",
            field.len(),
            field.get(grid.cell_ref_for_position(goal))
        ),
        Err(e) => println!("No distance field from start: {}", e),
    }

    let config = PathFollowingConfig {
        arrival_distance: 0.5,
        los_step_size: 0.1,
        ..Default::default()
    };

    let position = Rc::new(Cell::new(start));
    let agent = DemoAgent {
        position: Rc::clone(&position),
    };
    let driven = Rc::clone(&position);
    let mover = move |direction: Vector2<f64>| {
        let p = driven.get();
        driven.set(Point2D::new(p.x + direction.x * speed, p.y + direction.y * speed));
    };

    let mut component = PathComponent::new(Arc::clone(&grid), agent, Some(mover), config.clone());
    let state = component.set_destination(goal);
    println!("Initial state: {}, {} waypoints", state, component.steps().len());

    let mut trajectory = Path2D::new();
    trajectory.push(start);
    let mut ticks = 0;
    while component.state() == PlanningState::Active && ticks < MAX_TICKS {
        component.tick(0.1);
        trajectory.push(position.get());
        ticks += 1;
        if ticks % 20 == 0 {
            let p = position.get();
            println!(
                "tick {:4}: ({:.2}, {:.2}) {} waypoints left, {:.2} to go",
                ticks,
                p.x,
                p.y,
                component.steps().len(),
                p.distance(&goal)
            );
        }
    }
    println!(
        "Final state: {} after {} ticks, travelled {:.2}",
        component.state(),
        ticks,
        trajectory.total_length()
    );

    if !SAVE_PLOT {
        return;
    }

    let raw = match AStarPlanner::new().plan_steps(grid.as_ref(), start, grid.cell_ref_for_position(goal)) {
        Ok(raw) => raw,
        Err(e) => {
            println!("No path found: {}", e);
            return;
        }
    };
    let smoothed = match PathSmoother::new(grid.as_ref(), config.los_step_size).smooth(start, &raw) {
        Ok(smoothed) => smoothed,
        Err(e) => {
            println!("Smoothing failed: {}", e);
            return;
        }
    };
    println!("Raw path {} waypoints, smoothed {}", raw.len(), smoothed.len());

    let mut vis = Visualizer::new();
    vis.set_title("Grid Navigation")
        .plot_grid(&grid)
        .plot_steps(start, &raw, &PathStyle::new(colors::RAW_PATH, "A*").with_line_width(1.0))
        .plot_steps(start, &smoothed, &PathStyle::new(colors::SMOOTHED_PATH, "Smoothed"))
        .plot_path(
            &trajectory,
            &PathStyle::new(colors::TRAJECTORY, "Trajectory"),
        )
        .plot_start(start)
        .plot_goal(goal);

    if let Err(e) = std::fs::create_dir_all("img") {
        println!("Could not create output directory: {}", e);
        return;
    }
    let output_path = "img/grid_navigation.png";
    match vis.save_png(output_path, 800, 800) {
        Ok(()) => println!("Plot saved to: {}", output_path),
        Err(e) => println!("Could not save plot: {}", e),
    }

    println!("Grid navigation finish!!");
}
