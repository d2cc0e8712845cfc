// The audio clock is the only source of timing truth for scheduling.
// Wall-clock time only decides *when we look*; audio time decides *what we commit*.
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

pub trait AudioClock {
    /// Current audio time in seconds, or None while the audio subsystem isn't running.
    fn now(&self) -> Option<f64>;
}

/// Frame counter published by the audio callback; readable from the UI thread.
#[derive(Clone, Debug)]
pub struct FrameClock {
    frames: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    sample_rate: u32,
}

impl FrameClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            running: Arc::new(AtomicBool::new(false)),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    // called from the audio callback once a block has been rendered
    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Release);
        self.running.store(true, Ordering::Release);
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn seconds_to_frame(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * self.sample_rate as f64).round() as u64
    }
}

impl AudioClock for FrameClock {
    fn now(&self) -> Option<f64> {
        if !self.running.load(Ordering::Acquire) {
            return None;
        }
        Some(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// Hand-driven clock for headless runs and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Option<f64>>,
}

impl ManualClock {
    pub fn at(seconds: f64) -> Self {
        Self { now: Cell::new(Some(seconds)) }
    }

    pub fn unavailable() -> Self {
        Self { now: Cell::new(None) }
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(Some(seconds));
    }

    pub fn advance(&self, seconds: f64) {
        let t = self.now.get().unwrap_or(0.0);
        self.now.set(Some(t + seconds));
    }
}

impl AudioClock for ManualClock {
    fn now(&self) -> Option<f64> {
        self.now.get()
    }
}
