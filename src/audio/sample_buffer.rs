use std::path::Path;

use anyhow::Context;

use super::frame::StereoFrame;

/// A decoded, immutable sound. Shared between the sound bank and playing voices.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn from_frames(data: Vec<StereoFrame>, sample_rate: u32) -> Self {
        Self { data, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.data.len() as f64 / self.sample_rate as f64
    }

    // Load a WAV file from disk, converted to stereo at the target rate
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let spec = reader.spec();
        let file_rate = spec.sample_rate;
        let file_channels = spec.channels as usize;

        if file_channels == 0 {
            anyhow::bail!("{} declares zero channels", path.display());
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let mut frames: Vec<StereoFrame> = if file_channels == 1 {
            samples.into_iter().map(StereoFrame::mono).collect()
        } else {
            // anything past the first two channels is dropped
            samples
                .chunks_exact(file_channels)
                .map(|c| StereoFrame { left: c[0], right: c[1] })
                .collect()
        };

        if file_rate != target_rate {
            frames = resample_linear(&frames, file_rate, target_rate);
        }

        Ok(Self { data: frames, sample_rate: target_rate })
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || frames.is_empty() {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos.floor() as usize;
        let frac = (src_pos - idx as f64) as f32;
        if idx >= frames.len() - 1 {
            out.push(frames[frames.len() - 1]);
        } else {
            let a = frames[idx];
            let b = frames[idx + 1];
            out.push(StereoFrame {
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("beatgrid-sb-{}-{}.wav", name, std::process::id()))
    }

    #[test]
    fn mono_int_wav_is_duplicated_to_stereo() {
        let path = scratch("mono");
        write_wav(&path, 1, 44100, &[0, 16384, -16384]);
        let buf = SampleBuffer::load_wav(&path, 44100).unwrap();
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.data[1], StereoFrame::mono(0.5));
        assert_eq!(buf.data[2], StereoFrame::mono(-0.5));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn stereo_wav_keeps_channels_apart() {
        let path = scratch("stereo");
        write_wav(&path, 2, 44100, &[16384, -16384, 0, 8192]);
        let buf = SampleBuffer::load_wav(&path, 44100).unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.data[0], StereoFrame { left: 0.5, right: -0.5 });
        assert_eq!(buf.data[1], StereoFrame { left: 0.0, right: 0.25 });
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn resampling_doubles_length_when_rate_doubles() {
        let path = scratch("resample");
        write_wav(&path, 1, 22050, &[0; 100]);
        let buf = SampleBuffer::load_wav(&path, 44100).unwrap();
        assert_eq!(buf.len(), 200);
        assert_eq!(buf.sample_rate, 44100);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = scratch("does-not-exist");
        assert!(SampleBuffer::load_wav(&path, 44100).is_err());
    }
}
