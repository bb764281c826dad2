// The middle layer is the only owner of sequencer state. The runtime thread
// feeds it controls and ticks one at a time; it answers with MIDI commands
// and a fresh `DisplayState` for the front end.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::control::{Control, Param, Transport};
use crate::generators::{EuclidPattern, NoiseField, ScaleTable};
use crate::midi_api::MidiCommand;
use crate::pipeline::persistence::{load_session, save_session};
use crate::pipeline::{Matrix, SessionData};
use crate::playback::{GatePolicy, Scheduler, Score};
use crate::shared::{DisplayState, RowLabel, Status};

pub struct Middle {
    state: SessionData,
    pattern: EuclidPattern,
    scale: ScaleTable,
    matrix: Matrix,
    scheduler: Scheduler,
    noise: Box<dyn NoiseField>,
    rng: fastrand::Rng,
    session_path: PathBuf,
    status: Option<Status>,
}

impl Middle {
    pub fn new(
        state: SessionData,
        noise: Box<dyn NoiseField>,
        gate: GatePolicy,
        mut rng: fastrand::Rng,
        session_path: PathBuf,
    ) -> Self {
        let scheduler = Scheduler::new(gate, rng.fork());
        let pattern = EuclidPattern::new(state.n, state.k, state.rotation, state.groove);
        let scale = ScaleTable::new(state.scale, state.low);
        let matrix = Matrix::compose(&state, noise.as_ref());
        Self {
            state,
            pattern,
            scale,
            matrix,
            scheduler,
            noise,
            rng,
            session_path,
            status: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &SessionData {
        &self.state
    }

    #[cfg(test)]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    #[cfg(test)]
    pub fn pattern(&self) -> &EuclidPattern {
        &self.pattern
    }

    pub fn bpm(&self) -> u32 {
        self.state.bpm
    }

    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn handle_control(&mut self, control: Control) -> Vec<MidiCommand> {
        match control {
            Control::Transport(Transport::Play) => {
                self.scheduler.play();
                Vec::new()
            }
            Control::Transport(Transport::Stop) => self.scheduler.stop(),
            Control::Transport(Transport::Toggle) => self.scheduler.toggle(),
            Control::Reset => {
                debug!("session reset to defaults");
                self.replace_state(SessionData::default());
                self.status = None;
                Vec::new()
            }
            Control::Randomize => {
                let state = SessionData::randomized(&mut self.rng);
                debug!(x = state.x_steps, y = state.y_steps, offset = state.offset, "session randomized");
                self.replace_state(state);
                self.status = None;
                Vec::new()
            }
            Control::Scale(family) => {
                self.state.scale = family;
                self.scale = ScaleTable::new(family, self.state.low);
                Vec::new()
            }
            Control::Set(param, value) => {
                self.set_param(param, value);
                Vec::new()
            }
            Control::Paint { x, y, kind } => {
                self.state.paint(x, y, kind);
                self.recompose();
                Vec::new()
            }
            Control::Save => {
                self.save();
                Vec::new()
            }
            Control::Load => {
                self.load();
                Vec::new()
            }
        }
    }

    pub fn tick(&mut self, increment: u32) -> Vec<MidiCommand> {
        let score = Score {
            pattern: &self.pattern,
            matrix: &self.matrix,
            scale: &self.scale,
            release: self.state.release,
        };
        self.scheduler.tick(increment, &score)
    }

    /// Rebuild the performance matrix from noise and overrides
    pub fn recompose(&mut self) {
        self.matrix = Matrix::compose(&self.state, self.noise.as_ref());
    }

    pub fn display_state(&self) -> DisplayState {
        let columns = self.matrix.columns();
        let rows = self.matrix.rows();
        DisplayState {
            columns,
            rows,
            cells: self.matrix.cells().to_vec(),
            gates: (0..columns).map(|x| self.pattern.is_open(x)).collect(),
            row_labels: (0..rows)
                .map(|row| RowLabel {
                    note: self.scale.note_for_row(row),
                    name: self.scale.note_name(row),
                })
                .collect(),
            playhead: self.scheduler.playhead(),
            playing: self.scheduler.is_playing(),
            params: Param::ALL
                .into_iter()
                .map(|param| (param, self.state.get(param)))
                .collect(),
            scale: self.state.scale,
            status: self.status,
        }
    }

    fn set_param(&mut self, param: Param, value: f64) {
        self.state.apply(param, value);
        match param {
            Param::Pulses | Param::Steps | Param::Rotation | Param::Groove => {
                self.regenerate_pattern();
            }
            Param::Low => self.scale = ScaleTable::new(self.state.scale, self.state.low),
            Param::Bpm | Param::Release => {}
            Param::Frequency
            | Param::Lacunarity
            | Param::Gain
            | Param::Octaves
            | Param::XSteps
            | Param::YSteps
            | Param::Offset => self.recompose(),
        }
    }

    fn regenerate_pattern(&mut self) {
        let s = &self.state;
        self.pattern = EuclidPattern::new(s.n, s.k, s.rotation, s.groove);
    }

    // wholesale replacement; the transport keeps running
    fn replace_state(&mut self, state: SessionData) {
        self.state = state;
        self.scale = ScaleTable::new(self.state.scale, self.state.low);
        self.regenerate_pattern();
        self.recompose();
    }

    fn save(&mut self) {
        match save_session(&self.session_path, &self.state) {
            Ok(()) => {
                info!(path = %self.session_path.display(), "session saved");
                self.status = Some(Status::Saved);
            }
            Err(e) => warn!("save failed: {e}"),
        }
    }

    fn load(&mut self) {
        match load_session(&self.session_path) {
            Ok(state) => {
                info!(path = %self.session_path.display(), "session loaded");
                self.replace_state(state);
                self.status = Some(Status::Loaded);
            }
            Err(e) => warn!("load failed, keeping current session: {e}"),
        }
    }
}
