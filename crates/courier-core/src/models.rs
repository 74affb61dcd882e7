//! Core data models for the delivery run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geometry::{Coordinate, Heading};

/// One executed step of the drone. Append-only log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "FlightMoveRecord", from = "FlightMoveRecord")]
pub struct FlightMove {
    pub order_no: String,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub heading: Heading,
}

impl FlightMove {
    pub fn new(
        order_no: impl Into<String>,
        origin: Coordinate,
        destination: Coordinate,
        heading: Heading,
    ) -> Self {
        Self {
            order_no: order_no.into(),
            origin,
            destination,
            heading,
        }
    }

    /// Zero-displacement pickup/drop-off move.
    pub fn hover(order_no: impl Into<String>, at: Coordinate) -> Self {
        Self::new(order_no, at, at, Heading::Hover)
    }
}

/// Flat wire shape of a [`FlightMove`], one row of the flight-path table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlightMoveRecord {
    order_no: String,
    from_longitude: f64,
    from_latitude: f64,
    angle: Heading,
    to_longitude: f64,
    to_latitude: f64,
}

impl From<FlightMove> for FlightMoveRecord {
    fn from(step: FlightMove) -> Self {
        Self {
            order_no: step.order_no,
            from_longitude: step.origin.lng,
            from_latitude: step.origin.lat,
            angle: step.heading,
            to_longitude: step.destination.lng,
            to_latitude: step.destination.lat,
        }
    }
}

impl From<FlightMoveRecord> for FlightMove {
    fn from(record: FlightMoveRecord) -> Self {
        Self {
            order_no: record.order_no,
            origin: Coordinate::new(record.from_longitude, record.from_latitude),
            destination: Coordinate::new(record.to_longitude, record.to_latitude),
            heading: record.angle,
        }
    }
}

/// A completed delivery, one row of the deliveries table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub order_no: String,
    pub delivered_to: String,
    pub cost_in_pence: u32,
}

/// An item on a shop's menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub item: String,
    pub pence: u32,
}

/// A pickup location and what it sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub name: String,
    /// Three-word location token
    pub location: String,
    pub menu: Vec<MenuItem>,
}

/// A customer order as stored for the delivery day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(alias = "orderNo")]
    pub order_no: String,
    #[serde(alias = "deliveryDate")]
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub customer: Option<String>,
    /// Three-word drop-off token
    #[serde(alias = "deliverTo")]
    pub deliver_to: String,
    pub items: Vec<String>,
}
