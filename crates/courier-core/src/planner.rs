//! Theta* any-angle route planner over the grid.
//!
//! A* where a relaxed neighbour may take the current node's parent as its own
//! parent whenever the two can see each other. Waypoints are therefore taut
//! corner-to-corner segments rather than a staircase of grid moves.
//!
//! The planner owns its grid and reuses the grid's search scratch across
//! calls, so it is not reentrant: one planner per thread of planning.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::config::FlightConfig;
use crate::error::{ConfigError, PlanError};
use crate::geometry::{Coordinate, OperatingArea};
use crate::grid::Grid;
use crate::no_fly::NoFlyIndex;

// Stale-entry slack when comparing a popped score against the best known one.
const SCORE_EPS: f64 = 1e-15;

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    id: usize,
    f_score: FloatOrd,
    g_score: FloatOrd,
    /// Insertion counter; equal scores pop first-in first-out.
    seq: u64,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Any-angle planner bound to one obstacle set and one grid.
#[derive(Debug, Clone)]
pub struct PathPlanner {
    zones: NoFlyIndex,
    grid: Grid,
    nodes_expanded: usize,
}

impl PathPlanner {
    pub fn new(
        area: OperatingArea,
        zones: NoFlyIndex,
        resolution: f64,
    ) -> Result<Self, ConfigError> {
        let grid = Grid::new(area, &zones, resolution)?;
        Ok(Self {
            zones,
            grid,
            nodes_expanded: 0,
        })
    }

    pub fn from_config(config: &FlightConfig, zones: NoFlyIndex) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(config.area, zones, config.grid_resolution())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn zones(&self) -> &NoFlyIndex {
        &self.zones
    }

    /// Cells popped from the open set by the last search.
    pub fn nodes_expanded(&self) -> usize {
        self.nodes_expanded
    }

    pub fn line_of_sight(&self, a: &Coordinate, b: &Coordinate) -> bool {
        self.zones.line_of_sight(a, b)
    }

    /// Reset the grid's search scratch. Every search does this itself.
    pub fn reset_search_state(&mut self) {
        self.grid.reset_search_state();
    }

    /// Plan an obstacle-free waypoint list from `start` to `goal`.
    ///
    /// The list begins with `start` and ends with `goal`; every consecutive
    /// pair has line of sight.
    pub fn find_path(
        &mut self,
        start: Coordinate,
        goal: Coordinate,
    ) -> Result<Vec<Coordinate>, PlanError> {
        let start_index = self
            .grid
            .cell_at(&start)
            .ok_or(PlanError::OutsideArea(start))?;
        let goal_index = self
            .grid
            .cell_at(&goal)
            .ok_or(PlanError::OutsideArea(goal))?;

        self.grid.reset_search_state();
        self.nodes_expanded = 0;

        let start_id = self.grid.id(start_index);
        let goal_id = self.grid.id(goal_index);
        let unreachable = PlanError::Unreachable {
            from: start,
            to: goal,
        };

        let goal_walkable = self
            .grid
            .cell(goal_index)
            .is_some_and(|cell| cell.walkable);
        if !goal_walkable && start_id != goal_id {
            return Err(unreachable);
        }

        if !self.search(start_id, goal_id) {
            return Err(unreachable);
        }
        let centers = self.reconstruct(goal_id)?;
        let path = self.anchor_endpoints(start, goal, centers)?;

        tracing::debug!(
            "Planned {} -> {}: {} waypoints, {} nodes expanded",
            start,
            goal,
            path.len(),
            self.nodes_expanded
        );
        Ok(path)
    }

    /// Run Theta* between two cell ids. True once the goal is popped; parent
    /// links in the grid scratch then describe the path.
    fn search(&mut self, start_id: usize, goal_id: usize) -> bool {
        let goal_center = self.grid.center_by_id(goal_id);
        let mut closed = vec![false; self.grid.len()];
        let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
        let mut seq = 0u64;

        let start_h = self.grid.center_by_id(start_id).distance_to(&goal_center);
        {
            let state = self.grid.search_mut(start_id);
            state.g_score = 0.0;
            state.f_score = start_h;
        }
        open_set.push(Reverse(OpenNode {
            id: start_id,
            f_score: FloatOrd(start_h),
            g_score: FloatOrd(0.0),
            seq,
        }));

        while let Some(Reverse(current)) = open_set.pop() {
            if closed[current.id] {
                continue;
            }
            let best_g = self.grid.search(current.id).g_score;
            if current.g_score.0 > best_g + SCORE_EPS {
                continue;
            }
            self.nodes_expanded += 1;

            if current.id == goal_id {
                return true;
            }
            closed[current.id] = true;

            let current_center = self.grid.center_by_id(current.id);
            let grandparent = self.grid.search(current.id).parent;

            for neighbor in self.grid.neighbors(self.grid.index_of(current.id)) {
                let neighbor_id = self.grid.id(neighbor);
                if closed[neighbor_id] {
                    continue;
                }
                let neighbor_center = self.grid.center_by_id(neighbor_id);
                if !self.zones.line_of_sight(&current_center, &neighbor_center) {
                    continue;
                }

                // Any-angle shortcut: skip the current node when its parent sees the neighbour.
                let (parent_id, tentative_g) = match grandparent {
                    Some(parent_id) => {
                        let parent_center = self.grid.center_by_id(parent_id);
                        if self.zones.line_of_sight(&parent_center, &neighbor_center) {
                            (
                                parent_id,
                                self.grid.search(parent_id).g_score
                                    + parent_center.distance_to(&neighbor_center),
                            )
                        } else {
                            (current.id, best_g + current_center.distance_to(&neighbor_center))
                        }
                    }
                    None => (current.id, best_g + current_center.distance_to(&neighbor_center)),
                };

                if tentative_g < self.grid.search(neighbor_id).g_score {
                    let f_score = tentative_g + neighbor_center.distance_to(&goal_center);
                    let state = self.grid.search_mut(neighbor_id);
                    state.parent = Some(parent_id);
                    state.g_score = tentative_g;
                    state.f_score = f_score;

                    seq += 1;
                    open_set.push(Reverse(OpenNode {
                        id: neighbor_id,
                        f_score: FloatOrd(f_score),
                        g_score: FloatOrd(tentative_g),
                        seq,
                    }));
                }
            }
        }

        false
    }

    /// Follow parent links back from `goal_id`; a revisited cell is a corrupt chain.
    fn reconstruct(&self, goal_id: usize) -> Result<Vec<Coordinate>, PlanError> {
        let mut visited = vec![false; self.grid.len()];
        let mut path = Vec::new();
        let mut current = Some(goal_id);

        while let Some(id) = current {
            if visited[id] {
                tracing::error!("Parent cycle at cell {:?}", self.grid.index_of(id));
                return Err(PlanError::CorruptPath { cells: path.len() });
            }
            visited[id] = true;
            path.push(self.grid.center_by_id(id));
            current = self.grid.search(id).parent;
        }

        path.reverse();
        Ok(path)
    }

    /// Replace the first and last cell centres by the exact endpoints where
    /// line of sight allows, otherwise keep the centre and add the endpoint.
    fn anchor_endpoints(
        &self,
        start: Coordinate,
        goal: Coordinate,
        centers: Vec<Coordinate>,
    ) -> Result<Vec<Coordinate>, PlanError> {
        let unreachable = PlanError::Unreachable {
            from: start,
            to: goal,
        };
        let mut path = centers;

        if path.len() == 1 {
            if self.line_of_sight(&start, &goal) {
                return Ok(vec![start, goal]);
            }
            let center = path[0];
            if self.line_of_sight(&start, &center) && self.line_of_sight(&center, &goal) {
                return Ok(vec![start, center, goal]);
            }
            return Err(unreachable);
        }

        if self.line_of_sight(&start, &path[1]) {
            path[0] = start;
        } else if self.line_of_sight(&start, &path[0]) {
            path.insert(0, start);
        } else {
            return Err(unreachable);
        }

        let last = path.len() - 1;
        if self.line_of_sight(&path[last - 1], &goal) {
            path[last] = goal;
        } else if self.line_of_sight(&path[last], &goal) {
            path.push(goal);
        } else {
            return Err(unreachable);
        }

        Ok(path)
    }
}
