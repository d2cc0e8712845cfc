use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};

use crate::audio::SampleBuffer;
use crate::config::{KitConfig, SoundConfig};
use crate::error::Error;
use crate::shared::{SoundId, SoundStatus};

use super::sample_loader::{self, LoadResult};

#[derive(Clone, Debug)]
pub enum SlotState {
    Loading,
    Loaded(Arc<SampleBuffer>),
    Failed(String), // silent for the rest of the session
}

#[derive(Clone, Debug)]
pub struct SoundSlot {
    pub config: SoundConfig,
    pub state: SlotState,
}

/// Decoded sounds in kit order. Slots are created once and never removed;
/// a sound that failed to load simply stays silent.
#[derive(Debug)]
pub struct SoundBank {
    slots: Vec<SoundSlot>,
    pending: Option<Receiver<LoadResult>>,
}

impl SoundBank {
    pub fn new(kit: &KitConfig) -> Self {
        Self {
            slots: kit
                .sounds
                .iter()
                .map(|config| SoundSlot {
                    config: config.clone(),
                    state: SlotState::Loading,
                })
                .collect(),
            pending: None,
        }
    }

    /// Start decoding every slot in the background; call `poll_loaded` to pick
    /// the results up.
    pub fn spawn_loader(&mut self, target_rate: u32) {
        let configs = self.slots.iter().map(|s| s.config.clone()).collect();
        self.pending = Some(sample_loader::spawn_loader(configs, target_rate));
    }

    /// Decode every slot on the calling thread.
    pub fn load_blocking(&mut self, target_rate: u32) {
        for i in 0..self.slots.len() {
            let result = sample_loader::load(&self.slots[i].config, target_rate);
            self.install(LoadResult { sound: SoundId(i), result });
        }
    }

    /// Install whatever the loader thread has finished. Returns how many slots changed.
    pub fn poll_loaded(&mut self) -> usize {
        let Some(rx) = self.pending.take() else {
            return 0;
        };
        let mut installed = 0;
        loop {
            match rx.try_recv() {
                Ok(result) => {
                    self.install(result);
                    installed += 1;
                }
                Err(TryRecvError::Empty) => {
                    self.pending = Some(rx);
                    break;
                }
                Err(TryRecvError::Disconnected) => {
                    // loader is done (or died); anything still loading never will
                    for slot in &mut self.slots {
                        if matches!(slot.state, SlotState::Loading) {
                            log::warn!("sound '{}' was never loaded", slot.config.id);
                            slot.state = SlotState::Failed("loader stopped".into());
                            installed += 1;
                        }
                    }
                    break;
                }
            }
        }
        installed
    }

    fn install(&mut self, loaded: LoadResult) {
        let Some(slot) = self.slots.get_mut(loaded.sound.index()) else {
            return;
        };
        slot.state = match loaded.result {
            Ok(buffer) => {
                log::info!(
                    "loaded '{}' ({:.2}s)",
                    slot.config.id,
                    buffer.duration_secs()
                );
                SlotState::Loaded(buffer)
            }
            Err(Error::AssetLoadFailure { sound, reason }) => {
                log::warn!("failed to load sound '{}': {}", sound, reason);
                SlotState::Failed(reason)
            }
            Err(other) => {
                log::warn!("failed to load sound '{}': {}", slot.config.id, other);
                SlotState::Failed(other.to_string())
            }
        };
    }

    /// Installs an already-decoded buffer (tests, generated sounds).
    pub fn insert_buffer(&mut self, sound: SoundId, buffer: Arc<SampleBuffer>) {
        if let Some(slot) = self.slots.get_mut(sound.index()) {
            slot.state = SlotState::Loaded(buffer);
        }
    }

    /// The playable buffer, or None while loading / after a failure.
    pub fn get_buffer(&self, sound: SoundId) -> Option<Arc<SampleBuffer>> {
        match &self.slots.get(sound.index())?.state {
            SlotState::Loaded(buffer) => Some(Arc::clone(buffer)),
            _ => None,
        }
    }

    pub fn status(&self, sound: SoundId) -> SoundStatus {
        match self.slots.get(sound.index()).map(|s| &s.state) {
            Some(SlotState::Loaded(_)) => SoundStatus::Ready,
            Some(SlotState::Loading) => SoundStatus::Loading,
            Some(SlotState::Failed(_)) | None => SoundStatus::Failed,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.slots.iter().any(|s| matches!(s.state, SlotState::Loading))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn id(&self, sound: SoundId) -> Option<&str> {
        self.slots.get(sound.index()).map(|s| s.config.id.as_str())
    }

    pub fn index_of(&self, id: &str) -> Option<SoundId> {
        self.slots.iter().position(|s| s.config.id == id).map(SoundId)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.config.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("beatgrid-bank-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_click(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..64 {
            writer.write_sample(8000i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn two_sound_kit(dir: &Path) -> KitConfig {
        KitConfig {
            sounds: vec![
                SoundConfig { id: "Kick".into(), path: dir.join("kick.wav") },
                SoundConfig { id: "Snare".into(), path: dir.join("missing.wav") },
            ],
        }
    }

    #[test]
    fn failed_sound_is_isolated() {
        let dir = scratch_dir("isolated");
        write_click(&dir.join("kick.wav"));
        let mut bank = SoundBank::new(&two_sound_kit(&dir));
        bank.load_blocking(44100);

        assert!(bank.get_buffer(SoundId(0)).is_some());
        assert!(bank.get_buffer(SoundId(1)).is_none());
        assert_eq!(bank.status(SoundId(0)), SoundStatus::Ready);
        assert_eq!(bank.status(SoundId(1)), SoundStatus::Failed);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn buffers_are_absent_while_loading() {
        let dir = scratch_dir("loading");
        let bank = SoundBank::new(&two_sound_kit(&dir));
        assert!(bank.is_loading());
        assert!(bank.get_buffer(SoundId(0)).is_none());
        assert_eq!(bank.status(SoundId(0)), SoundStatus::Loading);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn background_loader_installs_everything() {
        let dir = scratch_dir("background");
        write_click(&dir.join("kick.wav"));
        let mut bank = SoundBank::new(&two_sound_kit(&dir));
        bank.spawn_loader(44100);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while bank.is_loading() && std::time::Instant::now() < deadline {
            bank.poll_loaded();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(!bank.is_loading());
        assert_eq!(bank.get_buffer(SoundId(0)).map(|b| b.len()), Some(64));
        assert_eq!(bank.status(SoundId(1)), SoundStatus::Failed);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn lookups_follow_kit_order() {
        let bank = SoundBank::new(&KitConfig::default());
        assert_eq!(bank.len(), 6);
        assert_eq!(bank.index_of("Snare"), Some(SoundId(1)));
        assert_eq!(bank.id(SoundId(5)), Some("Clap"));
        assert_eq!(bank.index_of("Cowbell"), None);
    }
}
