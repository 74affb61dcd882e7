//! Fixed-resolution lattice over the operating area.
//!
//! Walkability is computed once at construction. Per-search scratch
//! (parent links and scores) lives in a separate buffer indexed by cell id
//! and must be cleared with [`Grid::reset_search_state`] before every search.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{Coordinate, OperatingArea};
use crate::no_fly::NoFlyIndex;

/// 8-connected neighbourhood, in the order neighbours are expanded.
const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, 0),
    (0, -1),
    (1, 0),
    (0, 1),
    (1, -1),
    (-1, 1),
    (1, 1),
    (-1, -1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    pub row: usize,
    pub col: usize,
}

impl CellIndex {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCell {
    pub index: CellIndex,
    pub center: Coordinate,
    pub walkable: bool,
}

/// Search scratch for one cell.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchState {
    pub parent: Option<usize>,
    pub g_score: f64,
    pub f_score: f64,
}

impl SearchState {
    const CLEAR: SearchState = SearchState {
        parent: None,
        g_score: f64::INFINITY,
        f_score: f64::INFINITY,
    };
}

#[derive(Debug, Clone)]
pub struct Grid {
    area: OperatingArea,
    resolution: f64,
    rows: usize,
    cols: usize,
    cells: Vec<GridCell>,
    search: Vec<SearchState>,
}

impl Grid {
    /// Discretise `area` into square cells of edge `resolution`.
    pub fn new(
        area: OperatingArea,
        zones: &NoFlyIndex,
        resolution: f64,
    ) -> Result<Self, ConfigError> {
        area.validate()?;
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                field: "grid_resolution".to_string(),
                reason: format!("must be positive, got {}", resolution),
            });
        }

        let rows = (area.height() / resolution).round() as usize;
        let cols = (area.width() / resolution).round() as usize;
        if rows == 0 || cols == 0 {
            return Err(ConfigError::DegenerateArea {
                reason: format!("area is smaller than one {} cell", resolution),
            });
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let center = cell_center(&area, resolution, row, col);
                cells.push(GridCell {
                    index: CellIndex::new(row, col),
                    center,
                    walkable: cell_is_walkable(&center, resolution, &area, zones),
                });
            }
        }

        let grid = Self {
            area,
            resolution,
            rows,
            cols,
            search: vec![SearchState::CLEAR; cells.len()],
            cells,
        };
        tracing::info!(
            "Grid built: {}x{} cells, {} walkable",
            grid.rows,
            grid.cols,
            grid.walkable_count()
        );
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn area(&self) -> &OperatingArea {
        &self.area
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.walkable).count()
    }

    /// Cell enclosing `coord`, or `None` outside the operating area.
    ///
    /// Inverse of the centre formula: `cell_at(cell(i).center) == Some(i)`.
    /// Points in the sliver past the last full row/column clamp onto it.
    pub fn cell_at(&self, coord: &Coordinate) -> Option<CellIndex> {
        if !self.area.contains(coord) {
            return None;
        }
        let half = self.resolution / 2.0;
        let row = ((coord.lat - self.area.min_lat - half) / self.resolution).round();
        let col = ((coord.lng - self.area.min_lng - half) / self.resolution).round();
        Some(CellIndex::new(
            (row.max(0.0) as usize).min(self.rows - 1),
            (col.max(0.0) as usize).min(self.cols - 1),
        ))
    }

    pub fn cell(&self, index: CellIndex) -> Option<&GridCell> {
        if index.row >= self.rows || index.col >= self.cols {
            return None;
        }
        self.cells.get(self.id(index))
    }

    /// True if `coord` is inside the area and its cell is walkable.
    pub fn is_walkable_at(&self, coord: &Coordinate) -> bool {
        self.cell_at(coord)
            .and_then(|index| self.cell(index))
            .is_some_and(|cell| cell.walkable)
    }

    /// In-range walkable neighbours of `index`, in a fixed order.
    pub fn neighbors(&self, index: CellIndex) -> Vec<CellIndex> {
        DISPLACEMENTS
            .iter()
            .filter_map(|(dr, dc)| {
                let row = index.row.checked_add_signed(*dr)?;
                let col = index.col.checked_add_signed(*dc)?;
                let cell = self.cell(CellIndex::new(row, col))?;
                cell.walkable.then_some(cell.index)
            })
            .collect()
    }

    /// Clear parent links and scores on every cell.
    pub fn reset_search_state(&mut self) {
        self.search.fill(SearchState::CLEAR);
    }

    pub(crate) fn id(&self, index: CellIndex) -> usize {
        index.row * self.cols + index.col
    }

    pub(crate) fn index_of(&self, id: usize) -> CellIndex {
        CellIndex::new(id / self.cols, id % self.cols)
    }

    pub(crate) fn center_by_id(&self, id: usize) -> Coordinate {
        self.cells[id].center
    }

    pub(crate) fn search(&self, id: usize) -> &SearchState {
        &self.search[id]
    }

    pub(crate) fn search_mut(&mut self, id: usize) -> &mut SearchState {
        &mut self.search[id]
    }

    /// Parent of a cell from the last search, if any.
    pub fn parent_of(&self, index: CellIndex) -> Option<CellIndex> {
        let id = self.id(index);
        self.search
            .get(id)
            .and_then(|state| state.parent)
            .map(|parent| self.index_of(parent))
    }

    /// Estimated total cost of a cell from the last search.
    pub fn f_score_of(&self, index: CellIndex) -> f64 {
        self.search
            .get(self.id(index))
            .map_or(f64::INFINITY, |state| state.f_score)
    }

    /// Cost-so-far of a cell from the last search.
    pub fn g_score_of(&self, index: CellIndex) -> f64 {
        self.search
            .get(self.id(index))
            .map_or(f64::INFINITY, |state| state.g_score)
    }
}

/// Centre of cell `(row, col)`.
pub fn cell_center(area: &OperatingArea, resolution: f64, row: usize, col: usize) -> Coordinate {
    Coordinate::new(
        area.min_lng + col as f64 * resolution + resolution / 2.0,
        area.min_lat + row as f64 * resolution + resolution / 2.0,
    )
}

/// A cell is walkable iff none of its four corners is inside a zone and its
/// centre is strictly inside the area.
pub fn cell_is_walkable(
    center: &Coordinate,
    resolution: f64,
    area: &OperatingArea,
    zones: &NoFlyIndex,
) -> bool {
    if !area.contains(center) {
        return false;
    }
    let half = resolution / 2.0;
    let corners = [
        Coordinate::new(center.lng + half, center.lat + half),
        Coordinate::new(center.lng + half, center.lat - half),
        Coordinate::new(center.lng - half, center.lat + half),
        Coordinate::new(center.lng - half, center.lat - half),
    ];
    !corners.iter().any(|corner| zones.contains(corner))
}
