//! Flight parameters shared by the planner, executor and mission controller.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{Coordinate, OperatingArea};

/// Fixed configuration for one delivery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Confinement rectangle
    pub area: OperatingArea,
    /// Launch and landing point
    pub base: Coordinate,
    /// Length of one move in degrees
    pub step_distance: f64,
    /// Two points within this distance are "close"
    pub close_distance: f64,
    /// Moves available for the whole run
    pub move_budget: u32,
    /// Flat charge added to every non-empty order
    pub delivery_charge_pence: u32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            area: OperatingArea::new(-3.192473, -3.184319, 55.942617, 55.946233),
            base: Coordinate::new(-3.186874, 55.944494),
            step_distance: 0.00015,
            close_distance: 0.00015,
            move_budget: 1500,
            delivery_charge_pence: 50,
        }
    }
}

impl FlightConfig {
    /// Grid cell edge length. Always a quarter of the proximity threshold.
    pub fn grid_resolution(&self) -> f64 {
        self.close_distance / 4.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.area.validate()?;
        for (field, value) in [
            ("step_distance", self.step_distance),
            ("close_distance", self.close_distance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    field: field.to_string(),
                    reason: format!("must be positive, got {}", value),
                });
            }
        }
        if !self.area.contains(&self.base) {
            return Err(ConfigError::InvalidParameter {
                field: "base".to_string(),
                reason: format!("{} lies outside the operating area", self.base),
            });
        }
        Ok(())
    }
}
