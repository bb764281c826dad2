// What the sequencer asks the MIDI output thread to do.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiCommand {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
}

impl MidiCommand {
    /// Raw channel-voice bytes; `channel` is zero based
    pub fn to_bytes(self, channel: u8) -> [u8; 3] {
        let channel = channel & 0x0F;
        match self {
            MidiCommand::NoteOn { note, velocity } => [0x90 | channel, note & 0x7F, velocity & 0x7F],
            MidiCommand::NoteOff { note } => [0x80 | channel, note & 0x7F, 0],
        }
    }
}
