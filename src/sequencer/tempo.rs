use crate::config::{DEFAULT_BPM, MAX_BPM, MIN_BPM};

/// Beats per minute, always inside the UI bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tempo {
    bpm: u16,
}

impl Default for Tempo {
    fn default() -> Self {
        Self { bpm: DEFAULT_BPM }
    }
}

impl Tempo {
    pub fn new(bpm: u16) -> Self {
        Self { bpm: bpm.clamp(MIN_BPM, MAX_BPM) }
    }

    pub fn bpm(self) -> u16 {
        self.bpm
    }

    pub fn set(&mut self, bpm: u16) {
        *self = Tempo::new(bpm);
    }

    pub fn nudge(&mut self, delta: i16) {
        let bpm = (self.bpm as i32 + delta as i32).clamp(MIN_BPM as i32, MAX_BPM as i32);
        self.bpm = bpm as u16;
    }

    /// Length of one step (a sixteenth note) in seconds.
    pub fn step_duration(self) -> f64 {
        60.0 / self.bpm as f64 / 4.0
    }
}
