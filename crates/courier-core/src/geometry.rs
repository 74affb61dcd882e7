//! Planar coordinate math for the operating area.
//!
//! Coordinates are longitude/latitude pairs treated as a flat plane: the
//! operating area is small enough that Euclidean distance in degrees is the
//! distance the drone is budgeted against.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConfigError, GeometryError};

/// Headings must be a multiple of this many degrees.
pub const HEADING_MULTIPLE: i32 = 10;

/// Wire value of the hover heading.
pub const HOVER_ANGLE: i32 = -999;

/// Distances closer than this are treated as equal when testing proximity.
pub const DISTANCE_TOLERANCE: f64 = 1e-12;

/// A longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Euclidean distance in degrees.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        (self.lng - other.lng).hypot(self.lat - other.lat)
    }

    /// True when `other` lies within `close_distance` of this point.
    ///
    /// Symmetric in its two coordinates.
    pub fn is_close_to(&self, other: &Coordinate, close_distance: f64) -> bool {
        self.distance_to(other) - DISTANCE_TOLERANCE <= close_distance
    }

    /// Position after one step of `step_distance` along `heading`.
    ///
    /// Hovering leaves the position unchanged.
    pub fn step(&self, heading: Heading, step_distance: f64) -> Coordinate {
        match heading {
            Heading::Hover => *self,
            Heading::Degrees(deg) => {
                let rad = f64::from(deg).to_radians();
                Coordinate {
                    lng: self.lng + step_distance * rad.cos(),
                    lat: self.lat + step_distance * rad.sin(),
                }
            }
        }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lng, self.lat)
    }
}

/// A quantized travel direction.
///
/// Degrees are measured counter-clockwise from east (0 = east, 90 = north),
/// always in `[0, 360)` and a multiple of [`HEADING_MULTIPLE`]. Serialises to
/// the integer angle, with hover encoded as [`HOVER_ANGLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Heading {
    Hover,
    Degrees(u16),
}

impl Heading {
    /// Build a heading from an integer angle, normalising into `[0, 360)`.
    pub fn new(angle: i32) -> Result<Self, GeometryError> {
        if angle == HOVER_ANGLE {
            return Ok(Heading::Hover);
        }
        if angle % HEADING_MULTIPLE != 0 {
            return Err(GeometryError::InvalidHeading {
                angle,
                multiple: HEADING_MULTIPLE,
            });
        }
        Ok(Heading::Degrees(angle.rem_euclid(360) as u16))
    }

    /// Ideal heading from `from` to `to`, rounded to the nearest allowed multiple.
    pub fn toward(from: &Coordinate, to: &Coordinate) -> Heading {
        let exact = (to.lat - from.lat).atan2(to.lng - from.lng).to_degrees();
        let multiple = f64::from(HEADING_MULTIPLE);
        let rounded = ((exact / multiple).round() * multiple) as i32;
        Heading::Degrees(rounded.rem_euclid(360) as u16)
    }

    /// Rotate by `delta` degrees. Hover has no direction and is returned as-is.
    pub fn rotated(self, delta: i32) -> Heading {
        match self {
            Heading::Hover => Heading::Hover,
            Heading::Degrees(deg) => {
                Heading::Degrees((i32::from(deg) + delta).rem_euclid(360) as u16)
            }
        }
    }

    pub fn is_hover(self) -> bool {
        matches!(self, Heading::Hover)
    }

    /// Integer wire angle.
    pub fn angle(self) -> i32 {
        match self {
            Heading::Hover => HOVER_ANGLE,
            Heading::Degrees(deg) => i32::from(deg),
        }
    }
}

impl TryFrom<i32> for Heading {
    type Error = GeometryError;

    fn try_from(angle: i32) -> Result<Self, Self::Error> {
        Heading::new(angle)
    }
}

impl From<Heading> for i32 {
    fn from(heading: Heading) -> Self {
        heading.angle()
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heading::Hover => write!(f, "hover"),
            Heading::Degrees(deg) => write!(f, "{}°", deg),
        }
    }
}

/// Axis-aligned rectangle the drone is confined to. Bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingArea {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl OperatingArea {
    pub fn new(min_lng: f64, max_lng: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            max_lng,
            min_lat,
            max_lat,
        }
    }

    /// Strict containment: a point on the boundary is outside.
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.lng > self.min_lng
            && point.lng < self.max_lng
            && point.lat > self.min_lat
            && point.lat < self.max_lat
    }

    pub fn width(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [self.min_lng, self.max_lng, self.min_lat, self.max_lat];
        if bounds.iter().any(|value| !value.is_finite()) {
            return Err(ConfigError::DegenerateArea {
                reason: "bounds must be finite".to_string(),
            });
        }
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return Err(ConfigError::DegenerateArea {
                reason: format!(
                    "empty rectangle (width {}, height {})",
                    self.width(),
                    self.height()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f64 = 0.00015;

    #[test]
    fn step_moves_exactly_one_step_length() {
        let origin = Coordinate::new(-3.186874, 55.944494);
        for angle in (0..360).step_by(10) {
            let heading = Heading::new(angle).unwrap();
            let next = origin.step(heading, STEP);
            assert!(
                (origin.distance_to(&next) - STEP).abs() < 1e-12,
                "heading {angle} moved {}",
                origin.distance_to(&next)
            );
        }
    }

    #[test]
    fn hover_does_not_move() {
        let origin = Coordinate::new(-3.19, 55.943);
        assert_eq!(origin.step(Heading::Hover, STEP), origin);
    }

    #[test]
    fn closeness_is_symmetric() {
        let a = Coordinate::new(-3.19, 55.943);
        let b = Coordinate::new(-3.19 + STEP, 55.943);
        let c = Coordinate::new(-3.19 + STEP * 1.01, 55.943);
        assert!(a.is_close_to(&b, STEP));
        assert!(b.is_close_to(&a, STEP));
        assert!(!a.is_close_to(&c, STEP));
        assert!(!c.is_close_to(&a, STEP));
    }

    #[test]
    fn heading_rounds_to_nearest_multiple() {
        let origin = Coordinate::new(0.0, 0.0);
        let rad = 47f64.to_radians();
        let target = Coordinate::new(rad.cos(), rad.sin());
        assert_eq!(Heading::toward(&origin, &target), Heading::Degrees(50));

        let rad = (-93f64).to_radians();
        let target = Coordinate::new(rad.cos(), rad.sin());
        assert_eq!(Heading::toward(&origin, &target), Heading::Degrees(270));
    }

    #[test]
    fn heading_rejects_non_multiples() {
        assert!(Heading::new(45).is_err());
        assert_eq!(Heading::new(-10).unwrap(), Heading::Degrees(350));
        assert_eq!(Heading::new(360).unwrap(), Heading::Degrees(0));
        assert_eq!(Heading::new(HOVER_ANGLE).unwrap(), Heading::Hover);
    }

    #[test]
    fn heading_serialises_as_wire_angle() {
        let json = serde_json::to_string(&Heading::Hover).unwrap();
        assert_eq!(json, "-999");
        let parsed: Heading = serde_json::from_str("190").unwrap();
        assert_eq!(parsed, Heading::Degrees(190));
        assert!(serde_json::from_str::<Heading>("15").is_err());
    }

    #[test]
    fn area_bounds_are_exclusive() {
        let area = OperatingArea::new(0.0, 1.0, 0.0, 1.0);
        assert!(area.contains(&Coordinate::new(0.5, 0.5)));
        assert!(!area.contains(&Coordinate::new(0.0, 0.5)));
        assert!(!area.contains(&Coordinate::new(0.5, 1.0)));
    }

    #[test]
    fn degenerate_area_is_rejected() {
        assert!(OperatingArea::new(1.0, 1.0, 0.0, 1.0).validate().is_err());
        assert!(OperatingArea::new(0.0, 1.0, 2.0, 1.0).validate().is_err());
        assert!(OperatingArea::new(0.0, f64::NAN, 0.0, 1.0).validate().is_err());
        assert!(OperatingArea::new(0.0, 1.0, 0.0, 1.0).validate().is_ok());
    }
}
