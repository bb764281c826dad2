use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use crate::playback::GatePolicy;

/// Generative euclidean/noise MIDI sequencer for the terminal
#[derive(Debug, Parser)]
#[command(name = "noisegrid", version, about)]
pub struct Config {
    /// MIDI output port, matched by name substring (default: first port)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Print the available MIDI output ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Create a virtual output port instead of connecting to one
    #[cfg(unix)]
    #[arg(long, conflicts_with = "port")]
    pub virtual_port: bool,

    /// MIDI channel for every note message
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub channel: u8,

    /// Session file used by save and load
    #[arg(short, long, default_value = "session.json")]
    pub session: PathBuf,

    /// Ignore an existing session file at startup
    #[arg(long)]
    pub fresh: bool,

    /// Start from randomized defaults
    #[arg(long, conflicts_with = "fresh")]
    pub randomize: bool,

    /// Startup control as `label=value`, e.g. `bpm=120`, `major` or `play`.
    /// Repeatable; applied in order once the sequencer is running.
    #[arg(long = "set", value_name = "LABEL[=VALUE]")]
    pub controls: Vec<String>,

    /// What a closed euclidean gate suppresses
    #[arg(long, value_enum, default_value_t = GatePolicy::StrikesOnly)]
    pub gate: GatePolicy,

    /// Seed for velocities and randomized defaults
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log destination; the terminal itself belongs to the UI
    #[arg(long, default_value = "noisegrid.log")]
    pub log_file: PathBuf,

    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Config {
    /// Zero-based channel nibble for the wire
    pub fn midi_channel(&self) -> u8 {
        self.channel - 1
    }

    pub fn wants_virtual_port(&self) -> bool {
        #[cfg(unix)]
        {
            self.virtual_port
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}
