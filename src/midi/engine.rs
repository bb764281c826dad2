use crossbeam_channel::Receiver;
use tracing::{debug, warn};

use crate::midi_api::MidiCommand;

/// Anything that accepts raw MIDI bytes
pub trait MidiSink: Send {
    fn send(&mut self, message: &[u8]) -> anyhow::Result<()>;
}

impl MidiSink for midir::MidiOutputConnection {
    fn send(&mut self, message: &[u8]) -> anyhow::Result<()> {
        midir::MidiOutputConnection::send(self, message)?;
        Ok(())
    }
}

/// Encodes commands on one channel and writes them to the sink
pub struct Engine<S: MidiSink> {
    sink: S,
    channel: u8,
    failures: u64,
}

impl<S: MidiSink> Engine<S> {
    pub fn new(sink: S, channel: u8) -> Self {
        Self {
            sink,
            channel,
            failures: 0,
        }
    }

    pub fn handle_cmd(&mut self, cmd: MidiCommand) {
        let bytes = cmd.to_bytes(self.channel);
        if let Err(e) = self.sink.send(&bytes) {
            self.failures += 1;
            // logged on failure 1, 2, 4, 8, ...
            if self.failures.is_power_of_two() {
                warn!(failures = self.failures, "midi send failed: {e:#}");
            }
        }
    }

    /// Drain the queue until every sender is gone
    pub fn run(mut self, rx: Receiver<MidiCommand>) -> S {
        for cmd in rx.iter() {
            self.handle_cmd(cmd);
        }
        debug!(failures = self.failures, "midi output closed");
        self.sink
    }
}
