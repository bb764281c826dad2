// Periodic beat pulses for the owner thread. The period follows the session's
// bpm; a new bpm restarts the ticker on its next period.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, select};
use tracing::{debug, warn};

use crate::runtime::Event;

pub enum MetronomeCommand {
    SetBpm(u32),
    Stop,
}

/// `60000 / bpm` whole milliseconds
pub fn bpm_to_period(bpm: u32) -> Duration {
    Duration::from_millis(60_000 / bpm.max(1) as u64)
}

pub struct MetronomeHandle {
    tx: Sender<MetronomeCommand>,
    thread: Option<JoinHandle<()>>,
}

impl MetronomeHandle {
    pub fn sender(&self) -> Sender<MetronomeCommand> {
        self.tx.clone()
    }
}

impl Drop for MetronomeHandle {
    fn drop(&mut self) {
        let _ = self.tx.send(MetronomeCommand::Stop);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub fn start_metronome(bpm: u32, events: Sender<Event>) -> anyhow::Result<MetronomeHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<MetronomeCommand>(16);
    let thread = std::thread::Builder::new()
        .name("metronome".into())
        .spawn(move || run(bpm, rx, events))?;
    Ok(MetronomeHandle {
        tx,
        thread: Some(thread),
    })
}

fn run(bpm: u32, commands: Receiver<MetronomeCommand>, events: Sender<Event>) {
    let mut period = bpm_to_period(bpm);
    let mut ticker = crossbeam_channel::tick(period);
    debug!(?period, "metronome started");

    loop {
        let mut restart = None;
        select! {
            recv(commands) -> cmd => match cmd {
                Ok(MetronomeCommand::SetBpm(bpm)) => restart = Some(bpm_to_period(bpm)),
                Ok(MetronomeCommand::Stop) | Err(_) => break,
            },
            recv(ticker) -> _ => match events.try_send(Event::Tick(1)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => warn!("event queue full, tick dropped"),
                Err(TrySendError::Disconnected(_)) => break,
            },
        }

        if let Some(next) = restart.filter(|&next| next != period) {
            debug!(?next, "metronome period changed");
            period = next;
            ticker = crossbeam_channel::tick(period);
        }
    }
    debug!("metronome stopped");
}
