//! Planner and executor properties over the default operating area.
//!
//! Run with: cargo test -p courier-core --test planning_test

use courier_core::{
    grid::cell_is_walkable, Coordinate, FlightConfig, FlightExecutor, Heading, NoFlyIndex,
    NoFlyZone, PathPlanner, PlanError,
};

fn building() -> NoFlyZone {
    NoFlyZone::rectangle(
        Coordinate::new(-3.1895, 55.9435),
        Coordinate::new(-3.1875, 55.9451),
    )
}

fn planner_with(zones: Vec<NoFlyZone>) -> PathPlanner {
    let zones = NoFlyIndex::new(zones).expect("zones should be valid");
    PathPlanner::from_config(&FlightConfig::default(), zones).expect("default config is valid")
}

fn path_length(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|pair| pair[0].distance_to(&pair[1])).sum()
}

/// Walkability is a pure function of the cell centre, area and zones.
#[test]
fn test_walkability_matches_corner_rule() {
    let config = FlightConfig::default();
    let zones = NoFlyIndex::new(vec![building()]).unwrap();
    let planner = PathPlanner::from_config(&config, zones.clone()).unwrap();
    let grid = planner.grid();

    let mut blocked = 0;
    for cell in grid.cells() {
        let expected = cell_is_walkable(&cell.center, grid.resolution(), &config.area, &zones);
        assert_eq!(cell.walkable, expected, "cell {:?}", cell.index);
        if !cell.walkable {
            blocked += 1;
        }
    }
    assert!(blocked > 0, "the building should block some cells");
}

/// Every step has the configured length; hovering stays put.
#[test]
fn test_step_length_and_hover() {
    let config = FlightConfig::default();
    let p = config.base;
    for angle in (0..360).step_by(10) {
        let next = p.step(Heading::new(angle).unwrap(), config.step_distance);
        assert!((p.distance_to(&next) - config.step_distance).abs() < 1e-12);
    }
    assert_eq!(p.step(Heading::Hover, config.step_distance), p);
}

#[test]
fn test_closeness_is_symmetric() {
    let close = FlightConfig::default().close_distance;
    let points = [
        Coordinate::new(-3.1880, 55.9440),
        Coordinate::new(-3.18815, 55.9440),
        Coordinate::new(-3.1880, 55.94416),
        Coordinate::new(-3.18811, 55.94411),
    ];
    for a in &points {
        for b in &points {
            assert_eq!(a.is_close_to(b, close), b.is_close_to(a, close));
        }
    }
}

/// Clear line of sight gives the two-point path.
#[test]
fn test_open_space_path_is_straight() {
    let mut planner = planner_with(Vec::new());
    let start = Coordinate::new(-3.1915, 55.9430);
    let goal = Coordinate::new(-3.1850, 55.9458);
    let path = planner.find_path(start, goal).unwrap();
    assert_eq!(path, vec![start, goal]);
}

/// A building between start and goal forces a taut detour around one corner.
#[test]
fn test_path_around_building() {
    let mut planner = planner_with(vec![building()]);
    let start = Coordinate::new(-3.1915, 55.9443);
    let goal = Coordinate::new(-3.1855, 55.9443);

    let path = planner.find_path(start, goal).unwrap();
    assert!(path.len() > 2, "expected a detour, got {:?}", path);
    assert_eq!(path[0], start);
    assert_eq!(path[path.len() - 1], goal);
    for pair in path.windows(2) {
        assert!(
            !planner.zones().blocks_segment(&pair[0], &pair[1]),
            "segment {} -> {} crosses the building",
            pair[0],
            pair[1]
        );
    }

    let corner_a = Coordinate::new(-3.1895, 55.9451);
    let corner_b = Coordinate::new(-3.1875, 55.9451);
    let around = start.distance_to(&corner_a) + corner_a.distance_to(&corner_b) + corner_b.distance_to(&goal);
    let length = path_length(&path);
    assert!(length < around * 1.2, "path length {} vs {}", length, around);
}

#[test]
fn test_replanning_after_reset_is_identical() {
    let mut planner = planner_with(vec![building()]);
    let start = Coordinate::new(-3.1915, 55.9443);
    let goal = Coordinate::new(-3.1855, 55.9440);

    let first = planner.find_path(start, goal).unwrap();
    planner.reset_search_state();
    let second = planner.find_path(start, goal).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_goal_inside_building_is_unreachable() {
    let mut planner = planner_with(vec![building()]);
    let err = planner
        .find_path(Coordinate::new(-3.1915, 55.9443), Coordinate::new(-3.1885, 55.9443))
        .unwrap_err();
    assert!(matches!(err, PlanError::Unreachable { .. }), "got {:?}", err);
}

/// Flying a planned path ends within the proximity threshold of its goal.
#[test]
fn test_executor_reaches_planned_goal() {
    let config = FlightConfig::default();
    let mut planner = planner_with(vec![building()]);
    let start = config.base;
    let goal = Coordinate::new(-3.1915, 55.9443);

    let path = planner.find_path(start, goal).unwrap();
    let executor = FlightExecutor::new(&planner, &config);
    let leg = executor
        .fly_path("test", start, &path, config.move_budget)
        .expect("leg should be flyable");

    assert!(leg.end.is_close_to(&goal, config.close_distance));
    for step in &leg.moves {
        assert!(!step.heading.is_hover());
        assert_eq!(step.heading.angle() % 10, 0);
        assert!(
            !planner.zones().blocks_segment(&step.origin, &step.destination),
            "move from {} crossed a zone edge",
            step.origin
        );
    }
}

#[test]
fn test_heading_rounding() {
    let origin = Coordinate::new(0.0, 0.0);
    let rad = 47f64.to_radians();
    let target = Coordinate::new(rad.cos(), rad.sin());
    assert_eq!(Heading::toward(&origin, &target), Heading::Degrees(50));
}
