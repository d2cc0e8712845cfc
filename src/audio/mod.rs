use anyhow::Context;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio_api::{AudioCommand, Trigger, TriggerSink};
use crate::clock::FrameClock;

mod engine;
mod frame;
mod sample_buffer;
mod voice;

pub use engine::Engine;
pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;

const COMMAND_CAPACITY: usize = 1024;
const SCRATCH_FRAMES: usize = 8192;

/// The UI thread's side of the audio output: a command sender plus the
/// frame clock the callback publishes.
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    clock: FrameClock,
    output_stream: Option<cpal::Stream>, // None when running without a device
}

impl AudioHandle {
    /// A handle with no device behind it. Its clock never starts, so playback
    /// can't begin, but everything else works.
    pub fn silent(sample_rate: u32) -> Self {
        let (tx, _rx) = crossbeam_channel::bounded(1);
        Self {
            tx,
            clock: FrameClock::new(sample_rate),
            output_stream: None,
        }
    }

    pub fn send(&self, cmd: AudioCommand) {
        match self.tx.try_send(cmd) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::debug!("audio command queue full, dropping command"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    /// Clone of the frame clock, for reading audio time while the handle is
    /// borrowed mutably as a trigger sink.
    pub fn clock(&self) -> FrameClock {
        self.clock.clone()
    }

    pub fn is_live(&self) -> bool {
        self.output_stream.is_some()
    }
}


impl TriggerSink for AudioHandle {
    fn trigger(&mut self, trigger: Trigger) {
        self.send(AudioCommand::Trigger(trigger));
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_CAPACITY);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let stream_config: cpal::StreamConfig = config.into();
            let clock = FrameClock::new(stream_config.sample_rate);
            let output_stream = build_output_stream_f32(&device, &stream_config, rx, clock.clone())?;
            output_stream.play().context("failed to play output stream")?;
            log::info!(
                "audio output running: {} Hz, {} channels",
                stream_config.sample_rate,
                stream_config.channels
            );

            Ok(AudioHandle {
                tx,
                clock,
                output_stream: Some(output_stream),
            })
        }
        other => anyhow::bail!("unsupported sample format {:?} (only f32 supported for now)", other),
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    clock: FrameClock,
) -> anyhow::Result<cpal::Stream> {
    let channels = config.channels as usize;
    let mut engine = Engine::new(clock);
    let mut scratch = vec![StereoFrame::zero(); SCRATCH_FRAMES];

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            // render through a stereo scratch buffer so any channel layout works
            for chunk in data.chunks_mut(SCRATCH_FRAMES * channels) {
                let n_frames = chunk.len() / channels;
                let block = &mut scratch[..n_frames];
                engine.render_block(block);
                write_interleaved(block, chunk, channels);
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

fn write_interleaved(frames: &[StereoFrame], out: &mut [f32], channels: usize) {
    for (frame, dst) in frames.iter().zip(out.chunks_exact_mut(channels)) {
        match dst {
            [mono] => *mono = 0.5 * (frame.left + frame.right),
            [l, r, rest @ ..] => {
                *l = frame.left;
                *r = frame.right;
                rest.iter_mut().for_each(|s| *s = 0.0);
            }
            [] => {}
        }
    }
}
