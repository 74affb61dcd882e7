pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod geometry;
pub mod grid;
pub mod mission;
pub mod models;
pub mod no_fly;
pub mod orders;
pub mod planner;
pub mod run;

pub use catalog::{Catalog, MAX_SHOPS_PER_ORDER};
pub use config::FlightConfig;
pub use error::{
    CatalogError, ConfigError, FailureKind, FlightError, GeometryError, MissionError, PlanError,
};
pub use executor::{FlightExecutor, LegFlight};
pub use geometry::{Coordinate, Heading, OperatingArea, HEADING_MULTIPLE, HOVER_ANGLE};
pub use grid::{CellIndex, Grid, GridCell};
pub use mission::{MissionController, MissionPhase, MissionState, Stop, StopAction};
pub use models::{Delivery, FlightMove, MenuItem, Order, Shop};
pub use no_fly::{NoFlyIndex, NoFlyZone};
pub use orders::{resolve_order, LocationResolver, MissionOrder};
pub use planner::PathPlanner;
pub use run::{DeliveryRun, OrderOutcome, RunReport};
