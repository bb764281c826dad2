use anyhow::{Context, anyhow};
use crossbeam_channel::Sender;
use midir::{MidiOutput, MidiOutputConnection};
use tracing::info;

use crate::config::Config;
use crate::midi_api::MidiCommand;

mod engine;

pub use engine::{Engine, MidiSink};

const CLIENT_NAME: &str = "noisegrid";

pub struct MidiHandle {
    tx: Option<Sender<MidiCommand>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl MidiHandle {
    pub fn sender(&self) -> Option<Sender<MidiCommand>> {
        self.tx.clone()
    }
}

impl Drop for MidiHandle {
    // the thread exits once every sender clone is gone
    fn drop(&mut self) {
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub fn list_ports() -> anyhow::Result<Vec<String>> {
    let output = MidiOutput::new(CLIENT_NAME).context("could not initialize MIDI output")?;
    let names = output
        .ports()
        .iter()
        .map(|port| output.port_name(port).unwrap_or_else(|_| "<unnamed>".into()))
        .collect();
    Ok(names)
}

/// Open the configured output and start the output thread. Failing to get
/// a connection is fatal for the caller.
pub fn start_midi(config: &Config) -> anyhow::Result<MidiHandle> {
    let connection = connect(config)?;
    start_with_sink(connection, config.midi_channel())
}

pub fn start_with_sink<S: MidiSink + 'static>(sink: S, channel: u8) -> anyhow::Result<MidiHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<MidiCommand>(1024);
    let engine = Engine::new(sink, channel);
    let thread = std::thread::Builder::new()
        .name("midi-out".into())
        .spawn(move || {
            engine.run(rx);
        })?;
    Ok(MidiHandle {
        tx: Some(tx),
        thread: Some(thread),
    })
}

fn connect(config: &Config) -> anyhow::Result<MidiOutputConnection> {
    let output = MidiOutput::new(CLIENT_NAME).context("could not initialize MIDI output")?;

    #[cfg(unix)]
    {
        if config.wants_virtual_port() {
            return create_virtual(output);
        }
    }

    let ports = output.ports();
    let mut named = Vec::with_capacity(ports.len());
    for port in ports {
        let name = output.port_name(&port).unwrap_or_default();
        named.push((name, port));
    }

    let (name, port) = match &config.port {
        Some(wanted) => named
            .into_iter()
            .find(|(name, _)| name.contains(wanted.as_str()))
            .ok_or_else(|| anyhow!("no MIDI output port matching {wanted:?}"))?,
        None => named
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no MIDI output ports available"))?,
    };

    let connection = output
        .connect(&port, CLIENT_NAME)
        .map_err(|e| anyhow!("could not connect to {name}: {e}"))?;
    info!(port = %name, channel = config.channel, "midi output connected");
    Ok(connection)
}

#[cfg(unix)]
fn create_virtual(output: MidiOutput) -> anyhow::Result<MidiOutputConnection> {
    use midir::os::unix::VirtualOutput;
    let connection = output
        .create_virtual(CLIENT_NAME)
        .map_err(|e| anyhow!("could not create virtual port: {e}"))?;
    info!(port = CLIENT_NAME, "virtual midi port created");
    Ok(connection)
}
