use crate::audio_api::{AudioCommand, Trigger};
use crate::clock::FrameClock;

use super::frame::StereoFrame;
use super::voice::Voice;

const MAX_VOICES: usize = 32; // hard cap so we never allocate in the audio callback
const MAX_PENDING: usize = 256;

// A trigger that arrived early and waits for its frame.
#[derive(Debug)]
struct Pending {
    frame: u64,
    trigger: Trigger,
}

/// Runs inside the audio callback: turns timed triggers into voices and mixes them.
pub struct Engine {
    clock: FrameClock,
    position: u64, // absolute frame at the start of the next block
    pending: Vec<Pending>,
    voices: Vec<Option<Voice>>,
}

impl Engine {
    pub fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            position: 0,
            pending: Vec::with_capacity(MAX_PENDING),
            voices: (0..MAX_VOICES).map(|_| None).collect(),
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Trigger(t) => self.queue_trigger(t),
            AudioCommand::Panic => {
                self.pending.clear();
                self.voices.iter_mut().for_each(|v| *v = None);
            }
        }
    }

    fn queue_trigger(&mut self, trigger: Trigger) {
        if self.pending.len() == MAX_PENDING {
            // can't log from here; the sender side bounds this anyway
            return;
        }
        let frame = self.clock.seconds_to_frame(trigger.at);
        self.pending.push(Pending { frame, trigger });
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_some()).count()
    }

    /// Render one block. Triggers due inside this block start at their exact
    /// frame; late ones start at the top of the block.
    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.iter_mut().for_each(|f| *f = StereoFrame::zero());
        let block_start = self.position;
        let block_end = block_start + out.len() as u64;

        // keep playing what's already running
        for slot in self.voices.iter_mut() {
            let finished = match slot.as_mut() {
                Some(voice) => !voice.render_into(out, 0),
                None => false,
            };
            if finished {
                *slot = None;
            }
        }

        // start whatever falls inside this block
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].frame >= block_end {
                i += 1;
                continue;
            }
            let Pending { frame, trigger } = self.pending.swap_remove(i);
            let start = frame.max(block_start);
            let offset = (start - block_start) as usize;
            let mut voice = Voice::new(trigger.buffer, trigger.gain, start);
            let alive = voice.render_into(out, offset);
            if alive {
                let slot = self.free_slot();
                self.voices[slot] = Some(voice);
            }
        }

        self.position = block_end;
        self.clock.advance(out.len() as u64);
    }

    // a free slot, or the one holding the oldest voice
    fn free_slot(&self) -> usize {
        if let Some(i) = self.voices.iter().position(|v| v.is_none()) {
            return i;
        }
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.as_ref().map(|v| v.started_at()).unwrap_or(0))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::audio::SampleBuffer;
    use crate::clock::AudioClock;
    use crate::shared::SoundId;

    fn click(len: usize) -> Arc<SampleBuffer> {
        Arc::new(SampleBuffer::from_frames(vec![StereoFrame::mono(1.0); len], 1000))
    }

    fn trigger_at(at: f64, len: usize) -> AudioCommand {
        AudioCommand::Trigger(Trigger { sound: SoundId(0), buffer: click(len), at, gain: 0.5 })
    }

    #[test]
    fn trigger_starts_on_its_exact_frame() {
        let clock = FrameClock::new(1000);
        let mut engine = Engine::new(clock.clone());
        engine.handle_cmd(trigger_at(0.013, 2)); // frame 13

        let mut out = vec![StereoFrame::zero(); 10];
        engine.render_block(&mut out);
        assert!(out.iter().all(|f| *f == StereoFrame::zero()));

        engine.render_block(&mut out);
        assert_eq!(out[2], StereoFrame::zero());
        assert_eq!(out[3], StereoFrame::mono(0.5));
        assert_eq!(out[4], StereoFrame::mono(0.5));
        assert_eq!(out[5], StereoFrame::zero());
        assert_eq!(clock.now(), Some(0.02));
    }

    #[test]
    fn voice_spanning_blocks_continues() {
        let clock = FrameClock::new(1000);
        let mut engine = Engine::new(clock);
        engine.handle_cmd(trigger_at(0.008, 5));

        let mut out = vec![StereoFrame::zero(); 10];
        engine.render_block(&mut out);
        assert_eq!(engine.active_voices(), 1);
        engine.render_block(&mut out);
        assert_eq!(out[2], StereoFrame::mono(0.5));
        assert_eq!(out[3], StereoFrame::zero());
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn late_trigger_plays_at_block_start() {
        let clock = FrameClock::new(1000);
        let mut engine = Engine::new(clock);
        let mut out = vec![StereoFrame::zero(); 10];
        engine.render_block(&mut out);
        engine.handle_cmd(trigger_at(0.001, 1));
        engine.render_block(&mut out);
        assert_eq!(out[0], StereoFrame::mono(0.5));
    }

    #[test]
    fn panic_silences_everything() {
        let clock = FrameClock::new(1000);
        let mut engine = Engine::new(clock);
        engine.handle_cmd(trigger_at(0.0, 100));
        let mut out = vec![StereoFrame::zero(); 10];
        engine.render_block(&mut out);
        engine.handle_cmd(AudioCommand::Panic);
        engine.render_block(&mut out);
        assert!(out.iter().all(|f| *f == StereoFrame::zero()));
    }
}
