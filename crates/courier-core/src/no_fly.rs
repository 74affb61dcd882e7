//! No-fly-zone storage with point and segment queries.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Coordinate;

// Orientation tolerance in squared degrees. Well below the smallest cross
// product two non-collinear edges of the operating area can produce.
const ORIENT_EPS: f64 = 1e-18;
// Bounding-box slack for collinear overlap checks, in degrees.
const BOX_EPS: f64 = 1e-12;

/// A closed polygon the drone must not enter or cross.
///
/// The last vertex implicitly connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoFlyZone {
    #[serde(default)]
    pub name: Option<String>,
    pub vertices: Vec<Coordinate>,
}

impl NoFlyZone {
    /// Build a zone from a ring. A repeated closing vertex is dropped.
    pub fn new(name: Option<String>, mut vertices: Vec<Coordinate>) -> Self {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        Self { name, vertices }
    }

    /// Axis-aligned rectangle as a zone, mostly useful in tests and fixtures.
    pub fn rectangle(min: Coordinate, max: Coordinate) -> Self {
        Self::new(
            None,
            vec![
                Coordinate::new(min.lng, min.lat),
                Coordinate::new(max.lng, min.lat),
                Coordinate::new(max.lng, max.lat),
                Coordinate::new(min.lng, max.lat),
            ],
        )
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.vertices.iter().any(|vertex| !vertex.is_finite()) {
            return Err(ConfigError::InvalidZone {
                index,
                reason: "vertex is not finite".to_string(),
            });
        }
        if self.vertices.len() < 3 {
            return Err(ConfigError::InvalidZone {
                index,
                reason: format!("ring has {} vertices, need at least 3", self.vertices.len()),
            });
        }
        Ok(())
    }

    /// Ray-casting containment test.
    pub fn contains(&self, point: &Coordinate) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = &self.vertices[i];
            let vj = &self.vertices[j];
            if (vi.lat > point.lat) != (vj.lat > point.lat)
                && point.lng < (vj.lng - vi.lng) * (point.lat - vi.lat) / (vj.lat - vi.lat) + vi.lng
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Ring edges, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Obstacle set answering containment and line-of-sight queries.
///
/// Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct NoFlyIndex {
    zones: Vec<NoFlyZone>,
    edges: Vec<(Coordinate, Coordinate)>,
}

impl NoFlyIndex {
    pub fn new(zones: Vec<NoFlyZone>) -> Result<Self, ConfigError> {
        for (index, zone) in zones.iter().enumerate() {
            zone.validate(index)?;
        }
        let edges = zones.iter().flat_map(|zone| zone.edges()).collect();
        Ok(Self { zones, edges })
    }

    pub fn zones(&self) -> &[NoFlyZone] {
        &self.zones
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True if `point` is inside any zone.
    pub fn contains(&self, point: &Coordinate) -> bool {
        self.zones.iter().any(|zone| zone.contains(point))
    }

    /// True if segment `a`–`b` touches or crosses any zone edge.
    pub fn blocks_segment(&self, a: &Coordinate, b: &Coordinate) -> bool {
        self.edges
            .iter()
            .any(|(p, q)| segments_intersect(a, b, p, q))
    }

    /// Line of sight: no zone edge between `a` and `b`.
    pub fn line_of_sight(&self, a: &Coordinate, b: &Coordinate) -> bool {
        !self.blocks_segment(a, b)
    }
}

pub(crate) fn segments_intersect(
    a1: &Coordinate,
    a2: &Coordinate,
    b1: &Coordinate,
    b2: &Coordinate,
) -> bool {
    fn orient(p: &Coordinate, q: &Coordinate, r: &Coordinate) -> f64 {
        (q.lng - p.lng) * (r.lat - p.lat) - (q.lat - p.lat) * (r.lng - p.lng)
    }

    fn within(a: f64, b: f64, value: f64) -> bool {
        value >= a.min(b) - BOX_EPS && value <= a.max(b) + BOX_EPS
    }

    fn on_segment(p: &Coordinate, q: &Coordinate, r: &Coordinate) -> bool {
        within(p.lng, q.lng, r.lng) && within(p.lat, q.lat, r.lat)
    }

    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= ORIENT_EPS && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= ORIENT_EPS && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= ORIENT_EPS && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= ORIENT_EPS && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > ORIENT_EPS && o2 < -ORIENT_EPS) || (o1 < -ORIENT_EPS && o2 > ORIENT_EPS);
    let b_crosses = (o3 > ORIENT_EPS && o4 < -ORIENT_EPS) || (o3 < -ORIENT_EPS && o4 > ORIENT_EPS);
    a_crosses && b_crosses
}
