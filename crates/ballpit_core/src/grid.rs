//! Uniform spatial grid for free-body neighbor queries.
//!
//! The grid is rebuilt from scratch every frame. Only free bodies are
//! inserted; held and contained bodies are resolved elsewhere. Entries are
//! indices into the body slice passed to [`Grid::rebuild`] and are only
//! valid until the body list changes.

use crate::body::Body;
use crate::math::Vec2;
use std::collections::HashMap;

/// Grid cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The 3x3 block centered on this cell, row by row from the top left.
    pub fn neighborhood(&self) -> [CellCoord; 9] {
        [
            CellCoord::new(self.x - 1, self.y - 1),
            CellCoord::new(self.x, self.y - 1),
            CellCoord::new(self.x + 1, self.y - 1),
            CellCoord::new(self.x - 1, self.y),
            CellCoord::new(self.x, self.y),
            CellCoord::new(self.x + 1, self.y),
            CellCoord::new(self.x - 1, self.y + 1),
            CellCoord::new(self.x, self.y + 1),
            CellCoord::new(self.x + 1, self.y + 1),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    cell_size: i32,
    /// Map from cell coordinates to body indices, in insertion order.
    cells: HashMap<CellCoord, Vec<usize>>,
    /// Cell of each body at rebuild time; `None` for bodies not in the grid.
    body_cells: Vec<Option<CellCoord>>,
}

impl Grid {
    pub fn new(cell_size: i32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            cells: HashMap::new(),
            body_cells: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// Convert a position to a cell coordinate.
    pub fn cell_of(&self, position: Vec2) -> CellCoord {
        let size = self.cell_size as f32;
        CellCoord::new(
            (position.x / size).floor() as i32,
            (position.y / size).floor() as i32,
        )
    }

    /// Clear and re-insert every free body, in slice order.
    pub fn rebuild(&mut self, bodies: &[Body]) {
        self.clear();
        self.body_cells.reserve(bodies.len());
        for (index, body) in bodies.iter().enumerate() {
            if body.is_free() {
                let cell = self.cell_of(body.position);
                self.cells.entry(cell).or_default().push(index);
                self.body_cells.push(Some(cell));
            } else {
                self.body_cells.push(None);
            }
        }
    }

    /// Cell a body was filed under at the last rebuild.
    pub fn body_cell(&self, index: usize) -> Option<CellCoord> {
        self.body_cells.get(index).copied().flatten()
    }

    /// Bodies in `cell` and its 8 neighbors, in a fixed order.
    pub fn neighbors_of(&self, cell: CellCoord) -> Vec<usize> {
        let mut result = Vec::new();
        for coord in &cell.neighborhood() {
            if let Some(entries) = self.cells.get(coord) {
                result.extend_from_slice(entries);
            }
        }
        result
    }

    /// Number of bodies in the 3x3 block around `cell`.
    pub fn neighbor_count(&self, cell: CellCoord) -> usize {
        cell.neighborhood()
            .iter()
            .filter_map(|coord| self.cells.get(coord))
            .map(Vec::len)
            .sum()
    }

    /// Total number of bodies filed in the grid.
    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.body_cells.clear();
    }
}
