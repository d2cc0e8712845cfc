// Engine constants plus the kit definition (which sound lives in which file).
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const BEATGRID_DIR: &str = ".beatgrid";
pub const KIT_FILE: &str = "kit.json";
pub const LOG_FILE: &str = "beatgrid.log";

// scheduling
pub const LOOKAHEAD_SECS: f64 = 0.1; // how far ahead of the audio clock steps get committed
pub const SCHEDULER_POLL: Duration = Duration::from_millis(25);
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16); // ~60fps redraw

// tempo / grid bounds
pub const MIN_BPM: u16 = 60;
pub const MAX_BPM: u16 = 180;
pub const DEFAULT_BPM: u16 = 120;
pub const MIN_STEPS: usize = 4;
pub const MAX_STEPS: usize = 32;
pub const DEFAULT_STEPS: usize = 16;

// mixer
pub const DEFAULT_SOUND_VOLUME: f32 = 0.8;
pub const DEFAULT_MASTER_VOLUME: f32 = 0.5;
pub const VOLUME_STEP: f32 = 0.05; // one key press on a volume control

pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// One entry of the kit: an identifier and the WAV file it is decoded from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundConfig {
    pub id: String,
    pub path: PathBuf,
}

/// Ordered list of sounds. Row order in the grid follows this order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitConfig {
    pub sounds: Vec<SoundConfig>,
}

impl Default for KitConfig {
    fn default() -> Self {
        let entries = [
            ("Kick", "sounds/kick.wav"),
            ("Snare", "sounds/snare.wav"),
            ("Hi-Hat", "sounds/hihat.wav"),
            ("Crash", "sounds/crash.wav"),
            ("Toms", "sounds/tom.wav"),
            ("Clap", "sounds/clap.wav"),
        ];
        Self {
            sounds: entries
                .iter()
                .map(|(id, path)| SoundConfig {
                    id: id.to_string(),
                    path: PathBuf::from(path),
                })
                .collect(),
        }
    }
}

impl KitConfig {
    /// Reads `<project_dir>/kit.json`, falling back to the default kit when the
    /// file is missing or unusable. Relative sample paths are resolved against
    /// the project directory.
    pub fn load_or_default(project_dir: &Path) -> Self {
        let path = project_dir.join(KIT_FILE);
        let kit = match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<KitConfig>(&data) {
                Ok(kit) if kit.validate().is_ok() => kit,
                Ok(kit) => {
                    if let Err(reason) = kit.validate() {
                        log::warn!("ignoring {}: {}", path.display(), reason);
                    }
                    KitConfig::default()
                }
                Err(e) => {
                    log::warn!("ignoring {}: {}", path.display(), e);
                    KitConfig::default()
                }
            },
            Err(_) => KitConfig::default(),
        };
        kit.resolved_against(project_dir)
    }

    fn validate(&self) -> Result<(), String> {
        if self.sounds.is_empty() {
            return Err("kit has no sounds".into());
        }
        for (i, sound) in self.sounds.iter().enumerate() {
            if sound.id.trim().is_empty() {
                return Err(format!("sound {} has an empty id", i));
            }
            if self.sounds[..i].iter().any(|s| s.id == sound.id) {
                return Err(format!("duplicate sound id '{}'", sound.id));
            }
        }
        Ok(())
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        for sound in &mut self.sounds {
            if sound.path.is_relative() {
                sound.path = base.join(&sound.path);
            }
        }
        self
    }
}

// <project_dir>/.beatgrid
pub fn state_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(BEATGRID_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("beatgrid-config-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_kit_has_six_sounds_in_order() {
        let kit = KitConfig::default();
        let ids: Vec<_> = kit.sounds.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["Kick", "Snare", "Hi-Hat", "Crash", "Toms", "Clap"]);
    }

    #[test]
    fn missing_kit_file_falls_back_to_default_resolved() {
        let dir = scratch_dir("missing");
        let kit = KitConfig::load_or_default(&dir);
        assert_eq!(kit.sounds.len(), 6);
        assert_eq!(kit.sounds[0].path, dir.join("sounds/kick.wav"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dir = scratch_dir("dupes");
        std::fs::write(
            dir.join(KIT_FILE),
            r#"{"sounds":[{"id":"a","path":"a.wav"},{"id":"a","path":"b.wav"}]}"#,
        )
        .unwrap();
        let kit = KitConfig::load_or_default(&dir);
        assert_eq!(kit.sounds.len(), 6);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn custom_kit_is_used() {
        let dir = scratch_dir("custom");
        std::fs::write(
            dir.join(KIT_FILE),
            r#"{"sounds":[{"id":"rim","path":"/abs/rim.wav"},{"id":"cow","path":"cow.wav"}]}"#,
        )
        .unwrap();
        let kit = KitConfig::load_or_default(&dir);
        assert_eq!(kit.sounds.len(), 2);
        assert_eq!(kit.sounds[0].path, PathBuf::from("/abs/rim.wav"));
        assert_eq!(kit.sounds[1].path, dir.join("cow.wav"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
