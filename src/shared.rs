// Types shared between the owner thread and the terminal front end.
//
// The idea of the rendering process:
//   - Only the middle layer holds sequencer state. After every event it
//     writes a `DisplayState` snapshot into the shared lock.
//   - Each frame the TUI clones the snapshot and draws it: the matrix from
//     `cells`, the open gates above it, the playhead column, the row labels
//     down the left edge and the parameter values in the side panel.
//   - Keys become `InputEvent`s in tui::input; everything except Quit is a
//     `Control` forwarded to the owner thread untouched.

use crate::control::{Control, Param};
use crate::generators::ScaleFamily;
use crate::pipeline::Cell;

pub const MAX_X_STEPS: usize = 64;
pub const MAX_Y_STEPS: usize = 48;
pub const NOTE_COUNT: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Control(Control),
    Quit,
}

/// Last persistence outcome, shown in the status line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Saved,
    Loaded,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowLabel {
    pub note: u8,
    pub name: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub columns: usize,
    pub rows: usize,
    pub cells: Vec<Cell>, // column-major, same as the matrix
    pub gates: Vec<bool>, // one per column, wrapped from the euclidean pattern
    pub row_labels: Vec<RowLabel>,
    pub playhead: usize,
    pub playing: bool,
    pub params: Vec<(Param, f64)>,
    pub scale: ScaleFamily,
    pub status: Option<Status>,
}

impl DisplayState {
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        if x >= self.columns || y >= self.rows {
            return Cell::Empty;
        }
        self.cells[x * self.rows + y]
    }

    pub fn param(&self, param: Param) -> f64 {
        self.params
            .iter()
            .find(|(p, _)| *p == param)
            .map(|&(_, value)| value)
            .unwrap_or_default()
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            columns: 1,
            rows: 1,
            cells: vec![Cell::Empty],
            gates: vec![false],
            row_labels: Vec::new(),
            playhead: 0,
            playing: false,
            params: Vec::new(),
            scale: ScaleFamily::default(),
            status: None,
        }
    }
}
