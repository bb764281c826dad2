use crate::control::Param;
use crate::shared::DisplayState;

// state local to the tui: where the edit cursor is and which parameter the
// nudge keys act on. Grid size and parameter values are synced from
// DisplayState every frame.
#[derive(Clone, Debug)]
pub struct TuiState {
    pub cursor_x: usize,
    pub cursor_y: usize, // 0 is the bottom row
    pub selected: usize, // index into Param::ALL
    // synced from DisplayState each frame
    pub columns: usize,
    pub rows: usize,
    pub values: Vec<(Param, f64)>,
}

impl Default for TuiState {
    fn default() -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
            selected: 0,
            columns: 1,
            rows: 1,
            values: Vec::new(),
        }
    }
}

impl TuiState {
    pub fn sync(&mut self, ds: &DisplayState) {
        self.columns = ds.columns.max(1);
        self.rows = ds.rows.max(1);
        self.values.clone_from(&ds.params);
        self.cursor_x = self.cursor_x.min(self.columns - 1);
        self.cursor_y = self.cursor_y.min(self.rows - 1);
    }

    pub fn selected_param(&self) -> Param {
        Param::ALL[self.selected % Param::ALL.len()]
    }

    pub fn value(&self, param: Param) -> f64 {
        self.values
            .iter()
            .find(|(p, _)| *p == param)
            .map(|&(_, value)| value)
            .unwrap_or_default()
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % Param::ALL.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + Param::ALL.len() - 1) % Param::ALL.len();
    }
}
