use std::sync::Arc;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;

/// One playing instance of a sample. Plays from the start to the end, once.
#[derive(Clone, Debug)]
pub struct Voice {
    buffer: Arc<SampleBuffer>,
    pos: usize,
    gain: f32,
    started_at: u64, // absolute frame, used for stealing the oldest voice
}

impl Voice {
    pub fn new(buffer: Arc<SampleBuffer>, gain: f32, started_at: u64) -> Self {
        Self { buffer, pos: 0, gain, started_at }
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn is_finished(&self) -> bool {
        self.pos >= self.buffer.len()
    }

    /// Mix this voice into `out`, beginning `offset` frames into the block.
    /// Returns false once the sample has run out.
    pub fn render_into(&mut self, out: &mut [StereoFrame], offset: usize) -> bool {
        let data = &self.buffer.data;
        for frame in out.iter_mut().skip(offset) {
            let Some(sample) = data.get(self.pos) else {
                break;
            };
            frame.mix_in(*sample, self.gain);
            self.pos += 1;
        }
        !self.is_finished()
    }
}
