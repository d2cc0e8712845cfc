// The middle layer: owns the session and the pattern bank, turns semantic
// input events into session operations, and produces the `DisplayState` the
// TUI draws. The TUI never touches the session directly.
use std::time::Instant;

use crate::audio_api::TriggerSink;
use crate::clock::AudioClock;
use crate::error::Error;
use crate::pipeline::{Pattern, PatternStore};
use crate::sequencer::Session;
use crate::shared::{DisplayState, InputEvent, RowDisplay, SoundId};

pub struct Middle<S: PatternStore> {
    session: Session,
    store: S,
    cursor: (usize, usize), // (sound, step)
    pattern_name: Option<String>,
    status: String,
    prompt: Option<String>,
    quit: bool,
}

impl<S: PatternStore> Middle<S> {
    pub fn new(session: Session, store: S) -> Self {
        Self {
            session,
            store,
            cursor: (0, 0),
            pattern_name: None,
            status: String::from("space: play  enter: toggle  w: save  l: load  q: quit"),
            prompt: None,
            quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Snapshot of the whole session, used for the autosave on quit.
    pub fn snapshot(&self) -> Pattern {
        let name = self.pattern_name.as_deref().unwrap_or("");
        Pattern::capture(&self.session, name)
    }

    pub fn restore(&mut self, pattern: &Pattern) {
        let repairs = pattern.restore_into(&mut self.session);
        self.pattern_name = (!pattern.name.is_empty()).then(|| pattern.name.clone());
        self.clamp_cursor();
        let what = if pattern.name.is_empty() {
            String::from("restored last session")
        } else {
            format!("loaded '{}'", pattern.name)
        };
        self.status = if repairs.is_clean() {
            what
        } else {
            format!("{} ({} repairs)", what, repairs.notes.len())
        };
    }

    fn report(&mut self, err: Error) {
        log::debug!("ui action failed: {}", err);
        self.status = err.to_string();
    }

    fn cursor_sound(&self) -> SoundId {
        SoundId(self.cursor.0)
    }

    fn clamp_cursor(&mut self) {
        let sounds = self.session.grid().sound_count().max(1);
        let steps = self.session.grid().step_count().max(1);
        self.cursor.0 = self.cursor.0.min(sounds - 1);
        self.cursor.1 = self.cursor.1.min(steps - 1);
    }

    pub fn handle_input(
        &mut self,
        event: InputEvent,
        wall_now: Instant,
        audio: &dyn AudioClock,
        sink: &mut dyn TriggerSink,
    ) {
        match event {
            InputEvent::PlayPress => {
                if self.session.is_playing() {
                    self.session.stop();
                    self.status = "stopped".into();
                } else {
                    match self.session.start(audio, sink, wall_now) {
                        Ok(()) => self.status = "playing".into(),
                        Err(e) => self.report(e),
                    }
                }
            }

            InputEvent::CursorUp => self.cursor.0 = self.cursor.0.saturating_sub(1),
            InputEvent::CursorDown => {
                self.cursor.0 += 1;
                self.clamp_cursor();
            }
            InputEvent::CursorLeft => self.cursor.1 = self.cursor.1.saturating_sub(1),
            InputEvent::CursorRight => {
                self.cursor.1 += 1;
                self.clamp_cursor();
            }
            InputEvent::ToggleCell => {
                let (sound, step) = self.cursor;
                if let Err(e) = self.session.toggle_cell(SoundId(sound), step) {
                    self.report(e);
                }
            }
            InputEvent::ClearGrid => {
                self.session.clear_grid();
                self.status = "cleared".into();
            }

            InputEvent::AdjustTempo(delta) => self.session.nudge_tempo(delta),
            InputEvent::AdjustSteps(delta) => {
                let current = self.session.grid().step_count() as isize;
                let wanted = (current + delta as isize).max(0) as usize;
                self.session.set_step_count(wanted);
                self.clamp_cursor();
            }

            InputEvent::AdjustVolume(delta) => {
                let sound = self.cursor_sound();
                let volume = self.session.mixer().volume(sound).unwrap_or(0.0);
                if let Err(e) = self.session.mixer_mut().set_volume(sound, volume + delta) {
                    self.report(e);
                }
            }
            InputEvent::AdjustMaster(delta) => {
                let master = self.session.mixer().master_volume();
                self.session.mixer_mut().set_master_volume(master + delta);
            }
            InputEvent::ToggleMute => {
                let sound = self.cursor_sound();
                if let Err(e) = self.session.mixer_mut().toggle_mute(sound) {
                    self.report(e);
                }
            }
            InputEvent::ToggleSolo => {
                let sound = self.cursor_sound();
                if let Err(e) = self.session.mixer_mut().toggle_solo(sound) {
                    self.report(e);
                }
            }

            InputEvent::BeginSave => {
                self.prompt = Some(self.pattern_name.clone().unwrap_or_default());
            }
            InputEvent::PromptChar(c) => {
                if let Some(text) = self.prompt.as_mut() {
                    text.push(c);
                }
            }
            InputEvent::PromptBackspace => {
                if let Some(text) = self.prompt.as_mut() {
                    text.pop();
                }
            }
            InputEvent::PromptCancel => self.prompt = None,
            InputEvent::PromptConfirm => {
                if let Some(name) = self.prompt.take() {
                    self.save_as(&name);
                }
            }
            InputEvent::LoadNext => self.load_relative(1),
            InputEvent::LoadPrevious => self.load_relative(-1),

            InputEvent::Quit => self.quit = true,
        }
    }

    pub fn save_as(&mut self, name: &str) {
        let name = name.trim().to_string();
        let pattern = Pattern::capture(&self.session, &name);
        match self.store.save(&name, &pattern) {
            Ok(()) => {
                self.status = format!("saved '{}'", name);
                self.pattern_name = Some(name);
            }
            Err(e) => self.report(e),
        }
    }

    pub fn load(&mut self, name: &str) {
        match self.store.load(name) {
            Ok(mut pattern) => {
                // the slot name wins over whatever name is stored inside
                pattern.name = name.trim().to_string();
                self.restore(&pattern);
            }
            Err(e) => self.report(e),
        }
    }

    // cycle through saved patterns, starting after the current one
    fn load_relative(&mut self, direction: isize) {
        let slots = match self.store.list() {
            Ok(slots) => slots,
            Err(e) => return self.report(e),
        };
        if slots.is_empty() {
            self.status = "no saved patterns".into();
            return;
        }
        let len = slots.len() as isize;
        let current = self
            .pattern_name
            .as_ref()
            .and_then(|name| slots.iter().position(|s| s == name));
        let next = match current {
            Some(i) => (i as isize + direction).rem_euclid(len),
            None if direction > 0 => 0,
            None => len - 1,
        };
        let name = slots[next as usize].clone();
        self.load(&name);
    }

    /// Per-iteration housekeeping: pick up loaded sounds and run the scheduler
    /// if its timer is due. Returns steps committed.
    pub fn tick(
        &mut self,
        wall_now: Instant,
        audio: &dyn AudioClock,
        sink: &mut dyn TriggerSink,
    ) -> usize {
        self.session.bank_mut().poll_loaded();
        self.session.poll_scheduler(wall_now, audio, sink)
    }

    /// Samples the playhead (the display's own cadence) and builds the frame.
    pub fn display_state(&mut self, audio: &dyn AudioClock) -> DisplayState {
        let playhead = self.session.update_playhead(audio);
        let session = &self.session;
        let bank = session.bank();
        let mixer = session.mixer();

        let rows = (0..session.grid().sound_count())
            .map(|i| {
                let sound = SoundId(i);
                RowDisplay {
                    label: bank.id(sound).unwrap_or("?").to_string(),
                    volume: mixer.volume(sound).unwrap_or(0.0),
                    muted: mixer.is_muted(sound),
                    soloed: mixer.is_soloed(sound),
                    loaded: bank.status(sound),
                    cells: session.grid().row(sound).map(<[bool]>::to_vec).unwrap_or_default(),
                }
            })
            .collect();

        DisplayState {
            rows,
            playhead,
            playing: session.is_playing(),
            bpm: session.tempo().bpm(),
            step_count: session.grid().step_count(),
            master_volume: mixer.master_volume(),
            cursor: self.cursor,
            pattern_name: self.pattern_name.clone(),
            status: self.status.clone(),
            prompt: self.prompt.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_api::Trigger;
    use crate::clock::ManualClock;
    use crate::config::KitConfig;
    use crate::loader::SoundBank;
    use crate::pipeline::MemoryPatternStore;

    fn middle() -> Middle<MemoryPatternStore> {
        let session = Session::new(SoundBank::new(&KitConfig::default()));
        Middle::new(session, MemoryPatternStore::new())
    }

    fn press(m: &mut Middle<MemoryPatternStore>, event: InputEvent, clock: &ManualClock) {
        let mut sink: Vec<Trigger> = Vec::new();
        m.handle_input(event, Instant::now(), clock, &mut sink);
    }

    #[test]
    fn play_without_audio_reports_instead_of_failing() {
        let mut m = middle();
        press(&mut m, InputEvent::PlayPress, &ManualClock::unavailable());
        assert!(!m.session().is_playing());
        assert_eq!(m.status(), Error::AudioUnavailable.to_string());
    }

    #[test]
    fn play_press_toggles_transport() {
        let mut m = middle();
        let clock = ManualClock::at(0.0);
        press(&mut m, InputEvent::PlayPress, &clock);
        assert!(m.session().is_playing());
        press(&mut m, InputEvent::PlayPress, &clock);
        assert!(!m.session().is_playing());
    }

    #[test]
    fn cursor_stays_inside_grid_after_shrink() {
        let mut m = middle();
        let clock = ManualClock::at(0.0);
        for _ in 0..20 {
            press(&mut m, InputEvent::CursorRight, &clock);
        }
        assert_eq!(m.cursor().1, 15);
        for _ in 0..20 {
            press(&mut m, InputEvent::AdjustSteps(-1), &clock);
        }
        assert_eq!(m.session().grid().step_count(), 4);
        assert_eq!(m.cursor().1, 3);
    }

    #[test]
    fn save_prompt_then_cycle_loads() {
        let mut m = middle();
        let clock = ManualClock::at(0.0);
        press(&mut m, InputEvent::ToggleCell, &clock);
        press(&mut m, InputEvent::BeginSave, &clock);
        for c in "one".chars() {
            press(&mut m, InputEvent::PromptChar(c), &clock);
        }
        press(&mut m, InputEvent::PromptConfirm, &clock);
        assert_eq!(m.status(), "saved 'one'");

        press(&mut m, InputEvent::ClearGrid, &clock);
        press(&mut m, InputEvent::AdjustTempo(20), &clock);
        m.save_as("two");

        press(&mut m, InputEvent::LoadNext, &clock); // after "two" wraps to "one"
        assert_eq!(m.status(), "loaded 'one'");
        assert!(m.session().grid().get(SoundId(0), 0).unwrap());
        assert_eq!(m.session().tempo().bpm(), 120);
    }

    #[test]
    fn empty_save_name_is_reported() {
        let mut m = middle();
        let clock = ManualClock::at(0.0);
        press(&mut m, InputEvent::BeginSave, &clock);
        press(&mut m, InputEvent::PromptConfirm, &clock);
        assert!(m.status().contains("invalid pattern name"));
    }

    #[test]
    fn load_with_empty_bank() {
        let mut m = middle();
        press(&mut m, InputEvent::LoadNext, &ManualClock::at(0.0));
        assert_eq!(m.status(), "no saved patterns");
    }

    #[test]
    fn untitled_autosave_restores_without_a_name() {
        let mut m = middle();
        let mut pattern = m.snapshot();
        assert!(pattern.name.is_empty());
        pattern.tempo = 101;
        m.restore(&pattern);
        assert_eq!(m.status(), "restored last session");
        assert_eq!(m.session().tempo().bpm(), 101);
        assert_eq!(m.display_state(&ManualClock::at(0.0)).pattern_name, None);
    }
}
