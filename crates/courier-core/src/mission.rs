//! Per-order mission control.
//!
//! One order is flown as a sequence of legs (pickups, then the drop-off).
//! Moves are buffered until every stop has been reached and a return to base
//! still fits in the budget; only then are they committed to the flight log.
//! Any failure restores the state captured before the order started.

use crate::catalog::MAX_SHOPS_PER_ORDER;
use crate::config::FlightConfig;
use crate::error::{CatalogError, ConfigError, FlightError, MissionError};
use crate::executor::FlightExecutor;
use crate::geometry::Coordinate;
use crate::models::FlightMove;
use crate::no_fly::NoFlyIndex;
use crate::orders::MissionOrder;
use crate::planner::PathPlanner;

/// Drone state carried from one order to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionState {
    pub position: Coordinate,
    pub moves_remaining: u32,
    pub log: Vec<FlightMove>,
}

/// Snapshot taken before an order attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    position: Coordinate,
    moves_remaining: u32,
    log_len: usize,
}

impl MissionState {
    pub fn new(position: Coordinate, moves_remaining: u32) -> Self {
        Self {
            position,
            moves_remaining,
            log: Vec::new(),
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            moves_remaining: self.moves_remaining,
            log_len: self.log.len(),
        }
    }

    pub fn restore(&mut self, checkpoint: &Checkpoint) {
        self.position = checkpoint.position;
        self.moves_remaining = checkpoint.moves_remaining;
        self.log.truncate(checkpoint.log_len);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopAction {
    Pickup,
    Deliver,
}

/// A location the drone must reach for one order, hovering on arrival.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub location: Coordinate,
    pub action: StopAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionPhase {
    Idle,
    PlanningLeg { stop: usize },
    ExecutingLeg { stop: usize },
    LegComplete { stop: usize },
    LegFailed { stop: usize },
    AllStopsComplete,
    Committed,
    RolledBack,
}

/// Flies orders one at a time and owns the drone's state between them.
#[derive(Debug)]
pub struct MissionController {
    planner: PathPlanner,
    config: FlightConfig,
    state: MissionState,
    phase: MissionPhase,
}

impl MissionController {
    /// Build the planner for `zones` and place the drone at base with a full budget.
    pub fn new(config: FlightConfig, zones: NoFlyIndex) -> Result<Self, ConfigError> {
        let planner = PathPlanner::from_config(&config, zones)?;
        let state = MissionState::new(config.base, config.move_budget);
        Ok(Self {
            planner,
            config,
            state,
            phase: MissionPhase::Idle,
        })
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn planner(&self) -> &PathPlanner {
        &self.planner
    }

    pub fn state(&self) -> &MissionState {
        &self.state
    }

    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    pub fn position(&self) -> Coordinate {
        self.state.position
    }

    pub fn moves_remaining(&self) -> u32 {
        self.state.moves_remaining
    }

    pub fn flight_log(&self) -> &[FlightMove] {
        &self.state.log
    }

    pub fn into_flight_log(self) -> Vec<FlightMove> {
        self.state.log
    }

    pub fn is_at_base(&self) -> bool {
        self.state
            .position
            .is_close_to(&self.config.base, self.config.close_distance)
    }

    /// Stops for `order` from the current position: pickups first, then the drop-off.
    ///
    /// With two pickups, the one giving the shorter `here -> first` plus
    /// `second -> drop-off` distance is visited first.
    pub fn plan_stops(&self, order: &MissionOrder) -> Result<Vec<Stop>, CatalogError> {
        if order.pickups.len() > MAX_SHOPS_PER_ORDER {
            return Err(CatalogError::TooManyShops {
                order_no: order.order_id.clone(),
                count: order.pickups.len(),
            });
        }

        let here = self.state.position;
        let mut pickups = order.pickups.clone();
        if let &[a, b] = pickups.as_slice() {
            let a_first = here.distance_to(&a) + b.distance_to(&order.drop_off);
            let b_first = here.distance_to(&b) + a.distance_to(&order.drop_off);
            if b_first < a_first {
                pickups.swap(0, 1);
            }
        }

        let mut stops: Vec<Stop> = pickups
            .into_iter()
            .map(|location| Stop {
                location,
                action: StopAction::Pickup,
            })
            .collect();
        stops.push(Stop {
            location: order.drop_off,
            action: StopAction::Deliver,
        });
        Ok(stops)
    }

    /// Fly one order. On success the moves are committed and their count is
    /// returned; on failure the state is exactly what it was before the call.
    pub fn execute(&mut self, order: &MissionOrder) -> Result<u32, MissionError> {
        self.phase = MissionPhase::Idle;
        let checkpoint = self.state.checkpoint();

        match self.fly_stops(order) {
            Ok((moves, end)) => {
                let count = moves.len() as u32;
                self.state.log.extend(moves);
                self.state.position = end;
                self.state.moves_remaining -= count;
                self.phase = MissionPhase::Committed;
                tracing::info!(
                    "Order {} committed: {} moves, {} remaining",
                    order.order_id,
                    count,
                    self.state.moves_remaining
                );
                Ok(count)
            }
            Err(e) => {
                match self.phase {
                    MissionPhase::LegFailed { stop } => {
                        tracing::debug!("Order {} failed on leg {}: {}", order.order_id, stop, e)
                    }
                    _ => tracing::debug!("Order {} failed: {}", order.order_id, e),
                }
                self.state.restore(&checkpoint);
                self.phase = MissionPhase::RolledBack;
                Err(e)
            }
        }
    }

    /// Fly every stop into a pending buffer and check the way home.
    fn fly_stops(
        &mut self,
        order: &MissionOrder,
    ) -> Result<(Vec<FlightMove>, Coordinate), MissionError> {
        let stops = self.plan_stops(order)?;
        let mut position = self.state.position;
        let mut remaining = self.state.moves_remaining;
        let mut pending = Vec::new();

        for (index, stop) in stops.iter().enumerate() {
            self.phase = MissionPhase::PlanningLeg { stop: index };
            let path = match self.planner.find_path(position, stop.location) {
                Ok(path) => path,
                Err(e) => {
                    self.phase = MissionPhase::LegFailed { stop: index };
                    return Err(e.into());
                }
            };

            self.phase = MissionPhase::ExecutingLeg { stop: index };
            let executor = FlightExecutor::new(&self.planner, &self.config);
            let leg = match executor.fly_path(&order.order_id, position, &path, remaining) {
                Ok(leg) => leg,
                Err(e) => {
                    self.phase = MissionPhase::LegFailed { stop: index };
                    return Err(e.into());
                }
            };
            remaining -= leg.move_count();
            position = leg.end;
            pending.extend(leg.moves);

            if remaining == 0 {
                self.phase = MissionPhase::LegFailed { stop: index };
                return Err(FlightError::BudgetExhausted { remaining }.into());
            }
            pending.push(FlightMove::hover(order.order_id.as_str(), position));
            remaining -= 1;
            self.phase = MissionPhase::LegComplete { stop: index };
        }

        self.phase = MissionPhase::AllStopsComplete;
        let needed = self.moves_to_base(position, remaining)?;
        if needed > remaining {
            return Err(MissionError::NoReturn { needed, remaining });
        }
        Ok((pending, position))
    }

    /// Simulated return: moves needed to reach base from `from`. Nothing is logged.
    fn moves_to_base(&mut self, from: Coordinate, remaining: u32) -> Result<u32, MissionError> {
        let path = self.planner.find_path(from, self.config.base)?;
        let cap = self.config.move_budget.max(remaining);
        let executor = FlightExecutor::new(&self.planner, &self.config);
        match executor.fly_path("", from, &path, cap) {
            Ok(leg) => Ok(leg.move_count()),
            Err(FlightError::BudgetExhausted { .. }) => Ok(cap.saturating_add(1)),
            Err(e) => Err(e.into()),
        }
    }

    /// Fly home and commit the moves under `order_no`. Fails without
    /// touching the state if the return does not fit in the budget.
    pub fn return_to_base(&mut self, order_no: &str) -> Result<u32, MissionError> {
        let from = self.state.position;
        let path = self.planner.find_path(from, self.config.base)?;
        let executor = FlightExecutor::new(&self.planner, &self.config);
        let leg = executor.fly_path(order_no, from, &path, self.state.moves_remaining)?;

        let count = leg.move_count();
        self.state.moves_remaining -= count;
        self.state.position = leg.end;
        self.state.log.extend(leg.moves);
        tracing::info!(
            "Returned to base: {} moves, {} remaining",
            count,
            self.state.moves_remaining
        );
        Ok(count)
    }
}
