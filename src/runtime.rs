// Owner thread. Every tick and control lands on one queue and is handled to
// completion before the next, so the middle layer is never shared.

use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::control::{Control, Transport};
use crate::metronome::MetronomeCommand;
use crate::middle::Middle;
use crate::midi_api::MidiCommand;
use crate::shared::DisplayState;

pub const EVENT_QUEUE: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Tick(u32),
    Control(Control),
    Shutdown,
}

pub struct Runtime {
    pub middle: Middle,
    pub events: Receiver<Event>,
    pub midi: Sender<MidiCommand>,
    pub metronome: Sender<MetronomeCommand>,
    pub display: Arc<RwLock<DisplayState>>,
}

impl Runtime {
    pub fn spawn(self) -> anyhow::Result<JoinHandle<Middle>> {
        let thread = std::thread::Builder::new()
            .name("sequencer".into())
            .spawn(move || self.run())?;
        Ok(thread)
    }

    /// Process events until shutdown or until every sender is gone, then
    /// silence all notes. Hands the middle layer back.
    pub fn run(mut self) -> Middle {
        self.publish();
        while let Ok(event) = self.events.recv() {
            let commands = match event {
                Event::Tick(increment) => self.middle.tick(increment),
                Event::Control(control) => self.control(control),
                Event::Shutdown => break,
            };
            if !self.forward(commands) {
                break;
            }
            self.publish();
        }

        debug!("sequencer shutting down");
        let silence = self.middle.handle_control(Control::Transport(Transport::Stop));
        self.forward(silence);
        self.publish();
        self.middle
    }

    fn control(&mut self, control: Control) -> Vec<MidiCommand> {
        let bpm = self.middle.bpm();
        let commands = self.middle.handle_control(control);
        let next = self.middle.bpm();
        if next != bpm && self.metronome.send(MetronomeCommand::SetBpm(next)).is_err() {
            warn!("metronome gone, bpm {next} not applied");
        }
        commands
    }

    // blocking: note-offs must never be dropped
    fn forward(&self, commands: Vec<MidiCommand>) -> bool {
        for command in commands {
            if self.midi.send(command).is_err() {
                warn!("midi output closed");
                return false;
            }
        }
        true
    }

    fn publish(&self) {
        let snapshot = self.middle.display_state();
        match self.display.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}
