//! Turns planner waypoints into fixed-length, quantized-heading moves.

use crate::config::FlightConfig;
use crate::error::FlightError;
use crate::geometry::{Coordinate, Heading, HEADING_MULTIPLE};
use crate::models::FlightMove;
use crate::planner::PathPlanner;

/// Widest deviation from the ideal heading tried when it is blocked.
const MAX_DEVIATION: i32 = 90;

/// Moves flown for one leg and where they ended.
#[derive(Debug, Clone, PartialEq)]
pub struct LegFlight {
    pub moves: Vec<FlightMove>,
    pub end: Coordinate,
}

impl LegFlight {
    pub fn move_count(&self) -> u32 {
        self.moves.len() as u32
    }
}

/// Steps the drone along a waypoint list, re-validating every move against
/// the planner's grid and obstacle set.
#[derive(Debug, Clone, Copy)]
pub struct FlightExecutor<'a> {
    planner: &'a PathPlanner,
    step_distance: f64,
    close_distance: f64,
}

impl<'a> FlightExecutor<'a> {
    pub fn new(planner: &'a PathPlanner, config: &FlightConfig) -> Self {
        Self {
            planner,
            step_distance: config.step_distance,
            close_distance: config.close_distance,
        }
    }

    /// Destination of one step along `heading` if it lands on a walkable cell
    /// and the step itself crosses no zone edge.
    pub fn can_move(&self, from: &Coordinate, heading: Heading) -> Option<Coordinate> {
        let next = from.step(heading, self.step_distance);
        let walkable = self.planner.grid().is_walkable_at(&next);
        (walkable && self.planner.line_of_sight(from, &next)).then_some(next)
    }

    /// Fallback headings, fanning out from `ideal` in both directions up to
    /// a quarter turn. The clockwise-positive side is tried first.
    pub fn candidate_headings(ideal: Heading) -> Vec<Heading> {
        (1..=MAX_DEVIATION / HEADING_MULTIPLE)
            .flat_map(|k| {
                let delta = k * HEADING_MULTIPLE;
                [ideal.rotated(delta), ideal.rotated(-delta)]
            })
            .collect()
    }

    /// Heading for the next step from `from` toward `target`.
    pub fn choose_heading(
        &self,
        from: &Coordinate,
        target: &Coordinate,
    ) -> Result<Heading, FlightError> {
        let ideal = Heading::toward(from, target);
        if self.can_move(from, ideal).is_some() {
            return Ok(ideal);
        }

        for candidate in Self::candidate_headings(ideal) {
            let Some(next) = self.can_move(from, candidate) else {
                continue;
            };
            if self.planner.line_of_sight(&next, target) {
                tracing::trace!("Heading {} blocked at {}, using {}", ideal, from, candidate);
                return Ok(candidate);
            }
        }

        Err(FlightError::NoValidHeading {
            from: *from,
            target: *target,
        })
    }

    /// Fly from `from` through every waypoint of `path` until close to its
    /// last point, spending at most `budget` moves.
    ///
    /// A waypoint the drone is already close to costs nothing. Exceeding the
    /// budget fails the whole leg; no partial moves are returned.
    pub fn fly_path(
        &self,
        order_no: &str,
        from: Coordinate,
        path: &[Coordinate],
        budget: u32,
    ) -> Result<LegFlight, FlightError> {
        let mut position = from;
        let mut moves = Vec::new();

        for waypoint in path {
            while !position.is_close_to(waypoint, self.close_distance) {
                if moves.len() as u32 >= budget {
                    return Err(FlightError::BudgetExhausted { remaining: budget });
                }
                let heading = self.choose_heading(&position, waypoint)?;
                let next = position.step(heading, self.step_distance);
                moves.push(FlightMove::new(order_no, position, next, heading));
                position = next;
            }
        }

        Ok(LegFlight {
            moves,
            end: position,
        })
    }
}
