use crate::generators::NoiseField;
use crate::generators::range::remap;

use super::session::{Override, SessionData};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Generated,
    ForcedOn,
    ForcedOff,
}

impl Cell {
    /// Generated and forced-on cells strike; empty and forced-off are silent
    pub fn is_sounding(self) -> bool {
        matches!(self, Cell::Generated | Cell::ForcedOn)
    }
}

/// Performance matrix, `columns` beats by `rows` pitches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    columns: usize,
    rows: usize,
    cells: Vec<Cell>, // column-major
}

impl Matrix {
    pub fn empty(columns: usize, rows: usize) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            cells: vec![Cell::Empty; columns * rows],
        }
    }

    /// Full rebuild: one noise-contour cell per column, then the user's
    /// overrides on top.
    pub fn compose(state: &SessionData, noise: &dyn NoiseField) -> Self {
        let mut matrix = Self::empty(state.x_steps as usize, state.y_steps as usize);
        let shape = state.noise_shape();

        for x in 0..matrix.columns {
            let value = noise.sample(x as f64 + state.offset as f64, 0.0, &shape);
            let y = contour_row(value, matrix.rows);
            matrix.set(x, y, Cell::Generated);
        }

        for x in 0..matrix.columns {
            for y in 0..matrix.rows {
                match state.user_matrix.get(x, y) {
                    Override::None => {}
                    Override::On => matrix.set(x, y, Cell::ForcedOn),
                    Override::Off => matrix.set(x, y, Cell::ForcedOff),
                }
            }
        }
        matrix
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, x: usize, y: usize) -> Cell {
        if x >= self.columns || y >= self.rows {
            return Cell::Empty;
        }
        self.cells[x * self.rows + y]
    }

    pub fn column(&self, x: usize) -> &[Cell] {
        let start = (x % self.columns) * self.rows;
        &self.cells[start..start + self.rows]
    }

    /// Rows that should strike on column `x`
    pub fn sounding_rows(&self, x: usize) -> impl Iterator<Item = usize> + '_ {
        self.column(x)
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_sounding())
            .map(|(y, _)| y)
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[x * self.rows + y] = cell;
    }
}

// noise value in [-1, 1] to the nearest row
pub fn contour_row(value: f64, rows: usize) -> usize {
    let top = rows.saturating_sub(1) as f64;
    remap(value, -1.0, 1.0, 0.0, top).round() as usize
}
