mod config;
mod control;
mod generators;
mod metronome;
mod middle;
mod midi;
mod midi_api;
mod pipeline;
mod playback;
mod runtime;
mod shared;
mod tui;

use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::Parser;
use crossbeam_channel::Sender;
use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use config::Config;
use generators::Simplex;
use middle::Middle;
use pipeline::SessionData;
use pipeline::persistence;
use runtime::{EVENT_QUEUE, Event, Runtime};
use shared::{DisplayState, InputEvent};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::parse();

    if config.list_ports {
        for name in midi::list_ports()? {
            println!("{name}");
        }
        return Ok(());
    }

    init_logging(&config)?;
    info!(version = env!("CARGO_PKG_VERSION"), "noisegrid starting");

    let midi = midi::start_midi(&config)?; // no output, no sequencer
    let mut rng = config.rng();
    let state = initial_session(&config, &mut rng);
    let bpm = state.bpm;
    let middle = Middle::new(
        state,
        Box::new(Simplex::default()), // same permutation on every run
        config.gate,
        rng,
        config.session.clone(),
    );

    let display = Arc::new(RwLock::new(middle.display_state()));
    let (events_tx, events_rx) = crossbeam_channel::bounded::<Event>(EVENT_QUEUE);
    let metronome = metronome::start_metronome(bpm, events_tx.clone())?;
    let sequencer = Runtime {
        middle,
        events: events_rx,
        midi: midi.sender().context("midi output already closed")?,
        metronome: metronome.sender(),
        display: Arc::clone(&display),
    }
    .spawn()?;

    for text in &config.controls {
        match control::Control::parse_assignment(text) {
            Some(control) => {
                let _ = events_tx.send(Event::Control(control));
            }
            None => warn!(control = %text, "unknown startup control ignored"),
        }
    }

    let result = run_tui(&display, &events_tx);

    let _ = events_tx.send(Event::Shutdown);
    sequencer
        .join()
        .map_err(|_| anyhow!("sequencer thread panicked"))?;
    drop(metronome);
    drop(midi);
    info!("noisegrid stopped");
    result
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = std::fs::File::create(&config.log_file)
        .with_context(|| format!("could not open log file {}", config.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn initial_session(config: &Config, rng: &mut fastrand::Rng) -> SessionData {
    if config.randomize {
        return SessionData::randomized(rng);
    }
    if config.fresh || !Path::new(&config.session).exists() {
        return SessionData::default();
    }
    match persistence::load_session(&config.session) {
        Ok(state) => {
            info!(path = %config.session.display(), "session restored");
            state
        }
        Err(e) => {
            warn!("{e}; starting from defaults");
            SessionData::default()
        }
    }
}

fn run_tui(display: &RwLock<DisplayState>, events: &Sender<Event>) -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let frame_rate = Duration::from_millis(16); // ~60fps
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let ds = match display.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        tui_state.sync(&ds);

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, &tui_state);
        })?;

        for event in tui::input::poll_input(frame_rate, &mut tui_state)? {
            match event {
                InputEvent::Quit => return Ok(()),
                InputEvent::Control(control) => {
                    if events.send(Event::Control(control)).is_err() {
                        warn!("sequencer gone, leaving");
                        return Ok(());
                    }
                }
            }
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
