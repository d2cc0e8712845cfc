use std::sync::Arc;

pub use crate::audio::SampleBuffer;
use crate::shared::SoundId;

/// A committed request to play one sound at an audio-clock time.
/// Once handed to a sink it can't be cancelled.
#[derive(Clone, Debug)]
pub struct Trigger {
    pub sound: SoundId,
    pub buffer: Arc<SampleBuffer>,
    pub at: f64,   // audio clock seconds
    pub gain: f32, // sound volume * master volume, already resolved by the mixer
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine never decodes anything; buffers arrive pre-decoded and shared.
    Trigger(Trigger),
    // Silence every voice, used when leaving the app.
    Panic,
}

/// Where the scheduler hands its triggers. Fire-and-forget.
pub trait TriggerSink {
    fn trigger(&mut self, trigger: Trigger);
}

// Collects triggers instead of playing them (tests, offline inspection).
impl TriggerSink for Vec<Trigger> {
    fn trigger(&mut self, trigger: Trigger) {
        self.push(trigger);
    }
}
