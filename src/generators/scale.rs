use serde::{Deserialize, Serialize};

use super::range::clamp_note;

pub const NOTE_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleFamily {
    #[default]
    Chromatic,
    Major,
    NaturalMinor,
    HarmonicMinor,
    MelodicMinor,
    Pentatonic,
}

impl ScaleFamily {
    pub const ALL: [ScaleFamily; 6] = [
        ScaleFamily::Chromatic,
        ScaleFamily::Major,
        ScaleFamily::NaturalMinor,
        ScaleFamily::HarmonicMinor,
        ScaleFamily::MelodicMinor,
        ScaleFamily::Pentatonic,
    ];

    // semitone offsets within one octave
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleFamily::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            ScaleFamily::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleFamily::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleFamily::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleFamily::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            ScaleFamily::Pentatonic => &[0, 2, 4, 7, 9],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScaleFamily::Chromatic => "12 tone",
            ScaleFamily::Major => "major",
            ScaleFamily::NaturalMinor => "natural",
            ScaleFamily::HarmonicMinor => "harmonic",
            ScaleFamily::MelodicMinor => "melodic",
            ScaleFamily::Pentatonic => "pentatonic",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.label() == label)
    }
}

/// Row index -> MIDI note lookup for one scale family rooted at `low`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaleTable {
    low: u8,
    // semitones above `low`, walking octaves up until the MIDI range is covered
    offsets: Vec<u8>,
}

impl ScaleTable {
    pub fn new(family: ScaleFamily, low: u8) -> Self {
        let mut offsets = Vec::new();
        let mut octave = 0u8;
        let mut last = 0u8;
        while last < 127 {
            for &interval in family.intervals() {
                last = 12 * octave + interval;
                offsets.push(last);
            }
            octave += 1;
        }
        Self { low, offsets }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// `low + table[row]`, clamped to the MIDI range. Rows past the end of
    /// the table clamp to the top note.
    pub fn note_for_row(&self, row: usize) -> u8 {
        match self.offsets.get(row) {
            Some(&offset) => clamp_note(self.low as i32 + offset as i32),
            None => 127,
        }
    }

    pub fn note_name(&self, row: usize) -> &'static str {
        NOTE_NAMES[self.note_for_row(row) as usize % 12]
    }
}
