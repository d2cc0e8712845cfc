#![allow(dead_code)]

use std::path::{Path, PathBuf};

use beatgrid::config::{KitConfig, SoundConfig, TARGET_SAMPLE_RATE};
use beatgrid::loader::SoundBank;
use beatgrid::sequencer::Session;

pub const SOUNDS: [&str; 3] = ["Kick", "Snare", "Hi-Hat"];

pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("beatgrid-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// short decaying click, enough for the engine to have something to play
pub fn write_click(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..256 {
        let amp = (1.0 - i as f32 / 256.0) * i16::MAX as f32;
        writer.write_sample(amp as i16).unwrap();
    }
    writer.finalize().unwrap();
}

pub fn kit_in(dir: &Path) -> KitConfig {
    let sounds = SOUNDS
        .iter()
        .map(|id| {
            let path = dir.join(format!("{}.wav", id.to_lowercase()));
            write_click(&path);
            SoundConfig { id: id.to_string(), path }
        })
        .collect();
    KitConfig { sounds }
}

/// A session with every sound decoded and ready.
pub fn loaded_session(name: &str) -> (Session, PathBuf) {
    let dir = scratch_dir(name);
    let mut bank = SoundBank::new(&kit_in(&dir));
    bank.load_blocking(TARGET_SAMPLE_RATE);
    assert!(!bank.is_loading());
    (Session::new(bank), dir)
}
