use std::path::PathBuf;
use std::time::Instant;

use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use beatgrid::audio::{self, AudioHandle};
use beatgrid::audio_api::AudioCommand;
use beatgrid::config::{self, KitConfig, FRAME_INTERVAL, TARGET_SAMPLE_RATE};
use beatgrid::loader::SoundBank;
use beatgrid::logging;
use beatgrid::middle::Middle;
use beatgrid::pipeline::{persistence, JsonPatternStore};
use beatgrid::sequencer::Session;
use beatgrid::tui;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    logging::init_logger(&project_dir);
    log::info!("starting in {}", project_dir.display());

    let kit = KitConfig::load_or_default(&project_dir);
    let mut audio = match audio::start_audio() {
        Ok(handle) => handle,
        Err(e) => {
            log::warn!("no audio output ({:#}), running silent", e);
            AudioHandle::silent(TARGET_SAMPLE_RATE)
        }
    };
    let audio_clock = audio.clock();

    let mut bank = SoundBank::new(&kit);
    bank.spawn_loader(audio.sample_rate());
    let session = Session::new(bank);
    let mut middle = Middle::new(session, JsonPatternStore::new(&project_dir));
    if let Some(last) = persistence::load_session(&project_dir) {
        middle.restore(&last);
    }

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let mut tui_state = tui::mode::TuiState::default();

    loop {
        // the display samples the playhead at its own cadence
        let ds = middle.display_state(&audio_clock);
        tui_state.sync(&ds);

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        // sleep no longer than the scheduler allows
        let now = Instant::now();
        let timeout = middle
            .session()
            .next_poll_in(now)
            .map_or(FRAME_INTERVAL, |d| d.min(FRAME_INTERVAL));

        let events = tui::input::poll_input(timeout, &tui_state)?;
        for event in events {
            middle.handle_input(event, Instant::now(), &audio_clock, &mut audio);
        }
        if middle.should_quit() {
            break;
        }

        middle.tick(Instant::now(), &audio_clock, &mut audio);
    }

    middle.session_mut().stop();
    audio.send(AudioCommand::Panic);
    if let Err(e) = persistence::save_session(&project_dir, &middle.snapshot()) {
        log::warn!("could not save session to {}: {}", config::state_dir(&project_dir).display(), e);
    }
    drop(term);
    drop(audio);
    log::info!("bye");
    Ok(())
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
