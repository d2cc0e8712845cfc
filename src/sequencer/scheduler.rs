//! Lookahead scheduler.
//!
//! A wall-clock timer wakes the scheduler every few milliseconds; each wake-up
//! commits every step whose start time falls inside the lookahead window of
//! the *audio* clock. A late wake-up just commits more steps, so timing never
//! depends on how often we are polled.

use std::time::{Duration, Instant};

use crate::audio_api::{Trigger, TriggerSink};
use crate::clock::AudioClock;
use crate::config::{LOOKAHEAD_SECS, SCHEDULER_POLL};
use crate::error::{Error, Result};
use crate::loader::SoundBank;

use super::event_queue::{EventQueue, ScheduledEvent};
use super::grid::StepGrid;
use super::mixer::Mixer;
use super::tempo::Tempo;

/// Where the next step goes and when. Frozen (not reset) by stop().
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackClock {
    pub next_step_time: f64,
    pub current_step: usize,
}

/// Next wall-clock deadline for a scheduling pass. Cancelling is idempotent.
#[derive(Clone, Debug)]
pub struct PollTimer {
    interval: Duration,
    next: Option<Instant>,
}

impl PollTimer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, next: None }
    }

    pub fn arm(&mut self, now: Instant) {
        self.next = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    /// True when the deadline has passed; re-arms relative to `now` so a
    /// stalled loop doesn't fire a burst of back-to-back passes.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.next {
            Some(deadline) if now >= deadline => {
                self.next = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.next.map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// Read-only view of everything a scheduling pass consults.
#[derive(Clone, Copy)]
pub struct ScheduleContext<'a> {
    pub grid: &'a StepGrid,
    pub tempo: Tempo,
    pub mixer: &'a Mixer,
    pub bank: &'a SoundBank,
}

#[derive(Debug)]
pub struct Scheduler {
    clock: PlaybackClock,
    playing: bool,
    run: u64,
    sequence: u64,
    lookahead: f64,
    timer: PollTimer,
    clock_lost: bool, // warned once about a missing audio clock this run
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(LOOKAHEAD_SECS, SCHEDULER_POLL)
    }
}

impl Scheduler {
    pub fn new(lookahead: f64, poll_interval: Duration) -> Self {
        Self {
            clock: PlaybackClock::default(),
            playing: false,
            run: 0,
            sequence: 0,
            lookahead,
            timer: PollTimer::new(poll_interval),
            clock_lost: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The step that will be committed next.
    pub fn current_step(&self) -> usize {
        self.clock.current_step
    }

    pub fn next_step_time(&self) -> f64 {
        self.clock.next_step_time
    }

    pub fn playback_clock(&self) -> PlaybackClock {
        self.clock
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn lookahead(&self) -> f64 {
        self.lookahead
    }

    pub fn timer(&self) -> &PollTimer {
        &self.timer
    }

    /// Begin a new run at step 0, "now" on the audio clock. Nothing changes
    /// if we're already playing or the audio clock isn't available.
    pub fn start(&mut self, audio: &dyn AudioClock, wall_now: Instant) -> Result<()> {
        if self.playing {
            return Err(Error::InvalidState("already playing"));
        }
        let now = audio.now().ok_or(Error::AudioUnavailable)?;

        self.run += 1;
        self.sequence = 0;
        self.clock = PlaybackClock {
            next_step_time: now,
            current_step: 0,
        };
        self.playing = true;
        self.clock_lost = false;
        self.timer.arm(wall_now);
        log::info!("playback started (run {}) at {:.3}s", self.run, now);
        Ok(())
    }

    /// Halt the loop and drop events that haven't sounded yet. The position is
    /// kept. Returns false if nothing was playing.
    pub fn stop(&mut self, events: &mut EventQueue) -> bool {
        self.timer.cancel();
        events.clear();
        if !self.playing {
            return false;
        }
        self.playing = false;
        log::info!(
            "playback stopped (run {}) after {} steps",
            self.run,
            self.sequence
        );
        true
    }

    /// Timer-driven pass: schedules only when the poll deadline has passed.
    pub fn poll_if_due(
        &mut self,
        wall_now: Instant,
        audio: &dyn AudioClock,
        ctx: ScheduleContext<'_>,
        sink: &mut dyn TriggerSink,
        events: &mut EventQueue,
    ) -> usize {
        if !self.playing || !self.timer.fire_if_due(wall_now) {
            return 0;
        }
        match audio.now() {
            Some(now) => {
                self.clock_lost = false;
                self.poll(now, ctx, sink, events)
            }
            None => {
                if !self.clock_lost {
                    log::warn!("audio clock went away during playback");
                    self.clock_lost = true;
                }
                0
            }
        }
    }

    /// Commit every step that starts before `now + lookahead`. Returns how
    /// many steps were committed.
    pub fn poll(
        &mut self,
        now: f64,
        ctx: ScheduleContext<'_>,
        sink: &mut dyn TriggerSink,
        events: &mut EventQueue,
    ) -> usize {
        if !self.playing {
            return 0;
        }
        let horizon = now + self.lookahead;
        let mut committed = 0;

        while self.clock.next_step_time < horizon {
            // step count is re-read every step; the grid may have shrunk under us
            let step_count = ctx.grid.step_count();
            if step_count == 0 {
                break;
            }
            if self.clock.current_step >= step_count {
                self.clock.current_step %= step_count;
            }

            self.commit_step(ctx, sink, events);

            self.clock.current_step = (self.clock.current_step + 1) % step_count;
            self.clock.next_step_time += ctx.tempo.step_duration();
            committed += 1;
        }

        if committed > 1 {
            log::debug!("caught up {} steps in one pass", committed);
        }
        committed
    }

    fn commit_step(
        &mut self,
        ctx: ScheduleContext<'_>,
        sink: &mut dyn TriggerSink,
        events: &mut EventQueue,
    ) {
        let step = self.clock.current_step;
        let time = self.clock.next_step_time;

        for sound in ctx.grid.active_sounds(step) {
            let Some(gain) = ctx.mixer.gain_for(sound) else {
                continue;
            };
            let Some(buffer) = ctx.bank.get_buffer(sound) else {
                log::trace!("sound {} not loaded, skipping step {}", sound.index(), step);
                continue;
            };
            sink.trigger(Trigger { sound, buffer, at: time, gain });
        }

        events.push(ScheduledEvent {
            run: self.run,
            sequence: self.sequence,
            step,
            time,
        });
        self.sequence += 1;
    }
}
