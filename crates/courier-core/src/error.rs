//! Error types for the courier engine.

use thiserror::Error;

use crate::geometry::Coordinate;

/// Invalid static inputs. Fatal for a run and never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Degenerate operating area: {reason}")]
    DegenerateArea { reason: String },
    #[error("Invalid flight parameter '{field}': {reason}")]
    InvalidParameter { field: String, reason: String },
    #[error("Invalid no-fly zone #{index}: {reason}")]
    InvalidZone { index: usize, reason: String },
    #[error("No-fly zone set is empty")]
    EmptyObstacles,
    #[error("Shop catalog is empty")]
    EmptyCatalog,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Heading {angle} is not a multiple of {multiple}")]
    InvalidHeading { angle: i32, multiple: i32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("Coordinate {0} lies outside the operating area")]
    OutsideArea(Coordinate),
    #[error("No obstacle-free path from {from} to {to}")]
    Unreachable { from: Coordinate, to: Coordinate },
    #[error("Parent chain revisited a cell after {cells} steps")]
    CorruptPath { cells: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlightError {
    #[error("No valid heading from {from} toward {target}")]
    NoValidHeading { from: Coordinate, target: Coordinate },
    #[error("Move budget exhausted: {remaining} moves left, more needed")]
    BudgetExhausted { remaining: u32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Item '{0}' is not sold by any shop")]
    UnknownItem(String),
    #[error("Order {order_no} needs {count} shops, at most 2 are allowed")]
    TooManyShops { order_no: String, count: usize },
    #[error("Location '{0}' could not be resolved")]
    UnknownLocation(String),
}

/// Why a single order could not be flown.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MissionError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Flight(#[from] FlightError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Return to base needs {needed} moves, only {remaining} left")]
    NoReturn { needed: u32, remaining: u32 },
}

/// Failure classes used to decide how loudly to report an order failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unreachable,
    BudgetExhausted,
    InvariantViolation,
    Precondition,
}

impl MissionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            MissionError::Plan(PlanError::CorruptPath { .. }) => FailureKind::InvariantViolation,
            MissionError::Plan(_) => FailureKind::Unreachable,
            MissionError::Flight(FlightError::NoValidHeading { .. }) => {
                FailureKind::InvariantViolation
            }
            MissionError::Flight(FlightError::BudgetExhausted { .. })
            | MissionError::NoReturn { .. } => FailureKind::BudgetExhausted,
            MissionError::Catalog(_) => FailureKind::Precondition,
        }
    }

    /// True for planner/executor disagreements that indicate a bug rather than a hard order.
    pub fn is_invariant_violation(&self) -> bool {
        self.kind() == FailureKind::InvariantViolation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mission_errors_map_to_failure_kinds() {
        let here = Coordinate::new(0.0, 0.0);
        let unreachable = MissionError::from(PlanError::Unreachable {
            from: here,
            to: here,
        });
        assert_eq!(unreachable.kind(), FailureKind::Unreachable);

        let no_heading = MissionError::from(FlightError::NoValidHeading {
            from: here,
            target: here,
        });
        assert!(no_heading.is_invariant_violation());

        let no_return = MissionError::NoReturn {
            needed: 6,
            remaining: 5,
        };
        assert_eq!(no_return.kind(), FailureKind::BudgetExhausted);

        let shops = MissionError::from(CatalogError::TooManyShops {
            order_no: "abc".into(),
            count: 3,
        });
        assert_eq!(shops.kind(), FailureKind::Precondition);
    }
}
