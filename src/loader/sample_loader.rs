use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;

use crate::audio::SampleBuffer;
use crate::config::SoundConfig;
use crate::error::Error;
use crate::shared::SoundId;

/// Outcome of decoding one kit entry.
#[derive(Debug)]
pub struct LoadResult {
    pub sound: SoundId,
    pub result: Result<Arc<SampleBuffer>, Error>,
}

// Decode one sound from disk, ready to be shared with the audio engine
pub fn load(sound: &SoundConfig, target_rate: u32) -> Result<Arc<SampleBuffer>, Error> {
    SampleBuffer::load_wav(&sound.path, target_rate)
        .map(Arc::new)
        .map_err(|e| Error::AssetLoadFailure {
            sound: sound.id.clone(),
            reason: format!("{:#}", e),
        })
}

/// Decode every sound on a worker thread. Results arrive in kit order; the
/// channel closes when the last one has been sent.
pub fn spawn_loader(sounds: Vec<SoundConfig>, target_rate: u32) -> Receiver<LoadResult> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let spawned = thread::Builder::new()
        .name("beatgrid-loader".into())
        .spawn(move || {
            for (i, sound) in sounds.iter().enumerate() {
                let result = load(sound, target_rate);
                if tx.send(LoadResult { sound: SoundId(i), result }).is_err() {
                    break; // bank went away
                }
            }
        });
    if let Err(e) = spawned {
        log::error!("could not start sample loader thread: {}", e);
    }
    rx
}
