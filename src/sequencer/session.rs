use std::time::{Duration, Instant};

use crate::audio_api::TriggerSink;
use crate::clock::AudioClock;
use crate::config::{DEFAULT_STEPS, MAX_STEPS, MIN_STEPS};
use crate::error::Result;
use crate::loader::SoundBank;
use crate::shared::SoundId;

use super::event_queue::EventQueue;
use super::grid::StepGrid;
use super::mixer::Mixer;
use super::playhead::PlayheadTracker;
use super::scheduler::{ScheduleContext, Scheduler};
use super::tempo::Tempo;

/// All mutable playback state in one place: the UI writes to it between
/// passes, the scheduler and playhead read from it on their own cadence.
#[derive(Debug)]
pub struct Session {
    bank: SoundBank,
    grid: StepGrid,
    tempo: Tempo,
    mixer: Mixer,
    scheduler: Scheduler,
    playhead: PlayheadTracker,
    events: EventQueue,
}

impl Session {
    pub fn new(bank: SoundBank) -> Self {
        Self::with_scheduler(bank, Scheduler::default())
    }

    pub fn with_scheduler(bank: SoundBank, scheduler: Scheduler) -> Self {
        let sounds = bank.len();
        Self {
            bank,
            grid: StepGrid::new(sounds, DEFAULT_STEPS),
            tempo: Tempo::default(),
            mixer: Mixer::new(sounds),
            scheduler,
            playhead: PlayheadTracker::new(),
            events: EventQueue::new(),
        }
    }

    pub fn bank(&self) -> &SoundBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut SoundBank {
        &mut self.bank
    }

    pub fn grid(&self) -> &StepGrid {
        &self.grid
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut Mixer {
        &mut self.mixer
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    // ── grid / tempo edits ───────────────────────────────────────

    pub fn toggle_cell(&mut self, sound: SoundId, step: usize) -> Result<bool> {
        self.grid.toggle(sound, step)
    }

    pub fn set_cell(&mut self, sound: SoundId, step: usize, active: bool) -> Result<()> {
        self.grid.set(sound, step, active)
    }

    pub fn clear_grid(&mut self) {
        self.grid.clear();
    }

    /// Clamped to the supported range. Returns the step count actually applied.
    pub fn set_step_count(&mut self, steps: usize) -> usize {
        let steps = steps.clamp(MIN_STEPS, MAX_STEPS);
        self.grid.resize(steps);
        steps
    }

    /// Only steps committed after this call use the new tempo.
    pub fn set_tempo(&mut self, bpm: u16) {
        self.tempo.set(bpm);
    }

    pub fn nudge_tempo(&mut self, delta: i16) {
        self.tempo.nudge(delta);
    }

    // ── transport ────────────────────────────────────────────────

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    pub fn current_step(&self) -> usize {
        self.scheduler.current_step()
    }

    /// Start playback and fill the lookahead window right away.
    pub fn start(
        &mut self,
        audio: &dyn AudioClock,
        sink: &mut dyn TriggerSink,
        wall_now: Instant,
    ) -> Result<()> {
        self.scheduler.start(audio, wall_now)?;
        self.playhead.reset(&mut self.events);
        self.schedule_now(audio, sink);
        Ok(())
    }

    /// Idempotent. Returns whether playback was actually running.
    pub fn stop(&mut self) -> bool {
        let was_playing = self.scheduler.stop(&mut self.events);
        self.playhead.reset(&mut self.events);
        was_playing
    }

    /// The scheduler's periodic task: runs a pass if its timer is due.
    pub fn poll_scheduler(
        &mut self,
        wall_now: Instant,
        audio: &dyn AudioClock,
        sink: &mut dyn TriggerSink,
    ) -> usize {
        let ctx = ScheduleContext {
            grid: &self.grid,
            tempo: self.tempo,
            mixer: &self.mixer,
            bank: &self.bank,
        };
        self.scheduler
            .poll_if_due(wall_now, audio, ctx, sink, &mut self.events)
    }

    /// A scheduling pass regardless of the timer.
    pub fn schedule_now(&mut self, audio: &dyn AudioClock, sink: &mut dyn TriggerSink) -> usize {
        let Some(now) = audio.now() else {
            return 0;
        };
        let ctx = ScheduleContext {
            grid: &self.grid,
            tempo: self.tempo,
            mixer: &self.mixer,
            bank: &self.bank,
        };
        self.scheduler.poll(now, ctx, sink, &mut self.events)
    }

    /// How long the caller may sleep before the scheduler wants to run again.
    pub fn next_poll_in(&self, wall_now: Instant) -> Option<Duration> {
        self.scheduler.timer().time_until(wall_now)
    }

    /// The display's periodic task: which step is sounding now.
    pub fn update_playhead(&mut self, audio: &dyn AudioClock) -> Option<usize> {
        let playing = self.scheduler.is_playing();
        self.playhead.tick(audio.now(), playing, &mut self.events)
    }

    pub fn displayed_step(&self) -> Option<usize> {
        self.playhead.displayed()
    }
}
