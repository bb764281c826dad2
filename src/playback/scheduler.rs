use tracing::debug;

use crate::generators::{EuclidPattern, ScaleTable};
use crate::midi_api::MidiCommand;
use crate::pipeline::Matrix;

use super::voice::VoiceBank;

const MIN_VELOCITY: u8 = 51;
const MAX_VELOCITY: u8 = 100;

/// What a closed Euclidean gate suppresses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GatePolicy {
    /// No new strikes; sounding notes keep ageing toward release
    #[default]
    StrikesOnly,
    /// Neither strikes nor ageing; only the cursor moves
    WholeTick,
}

/// Everything a tick reads, borrowed from the middle layer
pub struct Score<'a> {
    pub pattern: &'a EuclidPattern,
    pub matrix: &'a Matrix,
    pub scale: &'a ScaleTable,
    pub release: u8,
}

/// Beat cursor plus voice tracking. Turns ticks into MIDI commands.
pub struct Scheduler {
    playing: bool,
    cursor: usize,
    playhead: usize,
    gate: GatePolicy,
    voices: VoiceBank,
    pending: Vec<u8>,
    rng: fastrand::Rng,
}

impl Scheduler {
    pub fn new(gate: GatePolicy, rng: fastrand::Rng) -> Self {
        Self {
            playing: false,
            cursor: 0,
            playhead: 0,
            gate,
            voices: VoiceBank::default(),
            pending: Vec::new(),
            rng,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Column of the most recently played beat
    pub fn playhead(&self) -> usize {
        self.playhead
    }

    #[cfg(test)]
    pub fn voices(&self) -> &VoiceBank {
        &self.voices
    }

    pub fn play(&mut self) {
        if !self.playing {
            debug!("transport: play");
        }
        self.playing = true;
    }

    /// Stop, silence every note and rewind
    pub fn stop(&mut self) -> Vec<MidiCommand> {
        debug!("transport: stop");
        self.playing = false;
        self.cursor = 0;
        self.playhead = 0;
        let mut out = Vec::with_capacity(crate::shared::NOTE_COUNT);
        self.voices.silence(&mut out);
        out
    }

    pub fn toggle(&mut self) -> Vec<MidiCommand> {
        if self.playing {
            self.stop()
        } else {
            self.play();
            Vec::new()
        }
    }

    pub fn tick(&mut self, increment: u32, score: &Score) -> Vec<MidiCommand> {
        let mut out = Vec::new();
        if !self.playing {
            return out;
        }

        let length = score.matrix.columns().max(1);
        let column = self.cursor % length;
        let open = score.pattern.is_open(column);

        self.pending.clear();
        if open {
            for row in score.matrix.sounding_rows(column) {
                let note = score.scale.note_for_row(row);
                if !self.pending.contains(&note) {
                    self.pending.push(note);
                }
            }
        }

        if open || self.gate == GatePolicy::StrikesOnly {
            self.voices.age(score.release, &mut out);
        }

        for &note in &self.pending {
            let velocity = self.rng.u8(MIN_VELOCITY..=MAX_VELOCITY);
            self.voices.strike(note, velocity, &mut out);
        }

        self.playhead = column;
        self.cursor = (column + increment as usize) % length;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::PaintKind;
    use crate::generators::{NoiseField, NoiseShape, ScaleFamily};
    use crate::pipeline::SessionData;

    // always the bottom row
    struct Floor;

    impl NoiseField for Floor {
        fn sample(&self, _x: f64, _y: f64, _shape: &NoiseShape) -> f64 {
            -1.0
        }
    }

    struct Fixture {
        pattern: EuclidPattern,
        matrix: Matrix,
        scale: ScaleTable,
        release: u8,
    }

    impl Fixture {
        fn new(state: &SessionData) -> Self {
            Self {
                pattern: EuclidPattern::new(state.n, state.k, state.rotation, state.groove),
                matrix: Matrix::compose(state, &Floor),
                scale: ScaleTable::new(ScaleFamily::Chromatic, state.low),
                release: state.release,
            }
        }

        fn score(&self) -> Score<'_> {
            Score {
                pattern: &self.pattern,
                matrix: &self.matrix,
                scale: &self.scale,
                release: self.release,
            }
        }
    }

    fn session(x_steps: u32, n: u8, k: u8, release: u8) -> SessionData {
        SessionData {
            x_steps,
            y_steps: 4,
            n,
            k,
            release,
            low: 60,
            ..SessionData::default()
        }
    }

    fn scheduler(gate: GatePolicy) -> Scheduler {
        let mut scheduler = Scheduler::new(gate, fastrand::Rng::with_seed(3));
        scheduler.play();
        scheduler
    }

    fn note_ons(out: &[MidiCommand]) -> Vec<u8> {
        out.iter()
            .filter_map(|cmd| match cmd {
                MidiCommand::NoteOn { note, .. } => Some(*note),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn stopped_transport_ignores_ticks() {
        let fixture = Fixture::new(&session(4, 4, 4, 1));
        let mut scheduler = Scheduler::new(GatePolicy::StrikesOnly, fastrand::Rng::with_seed(1));
        assert!(scheduler.tick(1, &fixture.score()).is_empty());
        assert_eq!(scheduler.cursor(), 0);
    }

    #[test]
    fn open_gate_strikes_sounding_rows() {
        let mut state = session(4, 4, 4, 1);
        state.paint(0, 2, PaintKind::On);
        let fixture = Fixture::new(&state);
        let mut scheduler = scheduler(GatePolicy::StrikesOnly);

        let out = scheduler.tick(1, &fixture.score());
        assert_eq!(note_ons(&out), vec![60, 62]);
        assert_eq!(scheduler.cursor(), 1);
        assert_eq!(scheduler.playhead(), 0);
    }

    #[test]
    fn velocity_stays_in_humanized_range() {
        let fixture = Fixture::new(&session(16, 16, 16, 1));
        let mut scheduler = scheduler(GatePolicy::StrikesOnly);
        for _ in 0..200 {
            for cmd in scheduler.tick(1, &fixture.score()) {
                if let MidiCommand::NoteOn { velocity, .. } = cmd {
                    assert!((51..=100).contains(&velocity));
                }
            }
        }
    }

    #[test]
    fn cursor_wraps_modulo_pattern_length() {
        let fixture = Fixture::new(&session(3, 3, 3, 1));
        let mut scheduler = scheduler(GatePolicy::StrikesOnly);
        for expected in [1, 2, 0, 1] {
            scheduler.tick(1, &fixture.score());
            assert_eq!(scheduler.cursor(), expected);
        }
        scheduler.tick(5, &fixture.score());
        assert_eq!(scheduler.cursor(), 0); // (1 + 5) % 3
    }

    #[test]
    fn closed_gate_skips_strikes() {
        // E(1,4): only column 0 is open
        let fixture = Fixture::new(&session(4, 1, 4, 8));
        let mut scheduler = scheduler(GatePolicy::StrikesOnly);
        assert_eq!(note_ons(&scheduler.tick(1, &fixture.score())), vec![60]);
        for _ in 0..3 {
            assert!(note_ons(&scheduler.tick(1, &fixture.score())).is_empty());
        }
    }

    #[test]
    fn strikes_only_policy_keeps_ageing_under_a_closed_gate() {
        let fixture = Fixture::new(&session(4, 1, 4, 2));
        let mut scheduler = scheduler(GatePolicy::StrikesOnly);
        scheduler.tick(1, &fixture.score()); // strike on column 0
        assert!(scheduler.tick(1, &fixture.score()).is_empty()); // beat 1
        let out = scheduler.tick(1, &fixture.score()); // beat 2 -> release
        assert_eq!(out, vec![MidiCommand::NoteOff { note: 60 }]);
        assert!(!scheduler.voices().is_playing(60));
    }

    #[test]
    fn whole_tick_policy_freezes_voices_under_a_closed_gate() {
        let fixture = Fixture::new(&session(4, 1, 4, 2));
        let mut scheduler = scheduler(GatePolicy::WholeTick);
        scheduler.tick(1, &fixture.score());
        for _ in 0..3 {
            assert!(scheduler.tick(1, &fixture.score()).is_empty());
        }
        assert!(scheduler.voices().is_playing(60));
        assert_eq!(scheduler.cursor(), 0);

        // back on the open column: aged once, then retriggered
        let out = scheduler.tick(1, &fixture.score());
        assert_eq!(
            out.iter().filter(|c| matches!(c, MidiCommand::NoteOff { .. })).count(),
            1
        );
        assert_eq!(note_ons(&out), vec![60]);
    }

    #[test]
    fn retrigger_never_doubles_note_on() {
        let fixture = Fixture::new(&session(8, 8, 8, 4));
        let mut scheduler = scheduler(GatePolicy::StrikesOnly);
        let mut sounding = [false; 128];
        for _ in 0..64 {
            for cmd in scheduler.tick(1, &fixture.score()) {
                match cmd {
                    MidiCommand::NoteOn { note, .. } => {
                        assert!(!sounding[note as usize], "double note-on for {note}");
                        sounding[note as usize] = true;
                    }
                    MidiCommand::NoteOff { note } => sounding[note as usize] = false,
                }
            }
        }
    }

    #[test]
    fn duplicate_notes_strike_once() {
        let mut state = session(1, 1, 1, 1);
        state.low = 127;
        state.paint(0, 1, PaintKind::On);
        state.paint(0, 2, PaintKind::On);
        let fixture = Fixture::new(&state);
        let mut scheduler = scheduler(GatePolicy::StrikesOnly);
        assert_eq!(note_ons(&scheduler.tick(1, &fixture.score())), vec![127]);
    }

    #[test]
    fn stop_releases_every_playing_note_and_rewinds() {
        let mut state = session(4, 4, 4, 8);
        state.paint(0, 3, PaintKind::On);
        let fixture = Fixture::new(&state);
        let mut scheduler = scheduler(GatePolicy::StrikesOnly);
        scheduler.tick(1, &fixture.score());
        scheduler.tick(1, &fixture.score());
        let before: Vec<u8> = scheduler.voices().playing_notes().collect();
        assert!(!before.is_empty());

        let out = scheduler.stop();
        for note in before {
            assert!(out.contains(&MidiCommand::NoteOff { note }));
        }
        assert_eq!(out.len(), 128);
        assert!(!scheduler.is_playing());
        assert_eq!(scheduler.cursor(), 0);
        assert_eq!(scheduler.playhead(), 0);
        assert!(scheduler.tick(1, &fixture.score()).is_empty());
    }

    #[test]
    fn toggle_flips_transport() {
        let mut scheduler = Scheduler::new(GatePolicy::StrikesOnly, fastrand::Rng::with_seed(0));
        assert!(scheduler.toggle().is_empty());
        assert!(scheduler.is_playing());
        assert_eq!(scheduler.toggle().len(), 128);
        assert!(!scheduler.is_playing());
    }

    #[test]
    fn shrinking_the_grid_keeps_cursor_in_range() {
        let wide = Fixture::new(&session(16, 16, 16, 1));
        let narrow = Fixture::new(&session(4, 4, 4, 1));
        let mut scheduler = scheduler(GatePolicy::StrikesOnly);
        for _ in 0..10 {
            scheduler.tick(1, &wide.score());
        }
        scheduler.tick(1, &narrow.score());
        assert_eq!(scheduler.playhead(), 10 % 4);
        assert!(scheduler.cursor() < 4);
    }
}
