use crate::midi_api::MidiCommand;
use crate::shared::NOTE_COUNT;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Voice {
    pub beats_played: u32,
    pub playing: bool,
}

/// One voice per MIDI note number; a note is never on twice at once.
#[derive(Clone, Debug)]
pub struct VoiceBank {
    voices: [Voice; NOTE_COUNT],
}

impl Default for VoiceBank {
    fn default() -> Self {
        Self {
            voices: [Voice::default(); NOTE_COUNT],
        }
    }
}

impl VoiceBank {
    #[cfg(test)]
    pub fn voice(&self, note: u8) -> Voice {
        self.voices[note as usize % NOTE_COUNT]
    }

    #[cfg(test)]
    pub fn is_playing(&self, note: u8) -> bool {
        self.voice(note).playing
    }

    #[cfg(test)]
    pub fn playing_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.voices
            .iter()
            .enumerate()
            .filter(|(_, voice)| voice.playing)
            .map(|(note, _)| note as u8)
    }

    /// Count one more beat on every sounding voice and release those that
    /// reached `release` beats.
    pub fn age(&mut self, release: u8, out: &mut Vec<MidiCommand>) {
        for (note, voice) in self.voices.iter_mut().enumerate() {
            if !voice.playing {
                continue;
            }
            voice.beats_played += 1;
            if voice.beats_played >= release as u32 {
                out.push(MidiCommand::NoteOff { note: note as u8 });
                *voice = Voice::default();
            }
        }
    }

    // retrigger: a sounding note gets its note-off before the new note-on
    pub fn strike(&mut self, note: u8, velocity: u8, out: &mut Vec<MidiCommand>) {
        let note = note.min(127);
        let voice = &mut self.voices[note as usize];
        if voice.playing {
            out.push(MidiCommand::NoteOff { note });
        }
        out.push(MidiCommand::NoteOn { note, velocity });
        *voice = Voice {
            beats_played: 0,
            playing: true,
        };
    }

    /// Note-off for all 128 notes, tracked or not
    pub fn silence(&mut self, out: &mut Vec<MidiCommand>) {
        for note in 0..NOTE_COUNT {
            out.push(MidiCommand::NoteOff { note: note as u8 });
        }
        self.voices = [Voice::default(); NOTE_COUNT];
    }
}
