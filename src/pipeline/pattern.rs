// The persisted snapshot of a session: grid, tempo, and mixer settings.
//
// Everything is keyed by sound id rather than row index, so a pattern saved
// with one kit still loads sensibly into another. Every field has a serde
// default so partial or older files deserialize; `restore_into` then repairs
// whatever is out of range instead of trusting the file.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_BPM, DEFAULT_MASTER_VOLUME, DEFAULT_SOUND_VOLUME, DEFAULT_STEPS};
use crate::sequencer::Session;
use crate::shared::SoundId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pattern {
    pub name: String,
    pub grid: BTreeMap<String, Vec<bool>>,
    pub tempo: u16,
    pub step_count: usize,
    pub master_volume: f32,
    pub soloed_sound: Option<String>,
    pub muted_sounds: BTreeSet<String>,
    pub sound_volumes: BTreeMap<String, f32>,
}

impl Default for Pattern {
    fn default() -> Self {
        Self {
            name: String::new(),
            grid: BTreeMap::new(),
            tempo: DEFAULT_BPM,
            step_count: DEFAULT_STEPS,
            master_volume: DEFAULT_MASTER_VOLUME,
            soloed_sound: None,
            muted_sounds: BTreeSet::new(),
            sound_volumes: BTreeMap::new(),
        }
    }
}

/// What `restore_into` had to fix. Empty when the snapshot was clean.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Repairs {
    pub notes: Vec<String>,
}

impl Repairs {
    fn note(&mut self, msg: String) {
        self.notes.push(msg);
    }

    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }
}

impl Pattern {
    /// Snapshot everything needed to restore the session verbatim.
    pub fn capture(session: &Session, name: &str) -> Self {
        let bank = session.bank();
        let grid = session.grid();
        let mixer = session.mixer();

        let mut pattern = Pattern {
            name: name.to_string(),
            tempo: session.tempo().bpm(),
            step_count: grid.step_count(),
            master_volume: mixer.master_volume(),
            soloed_sound: mixer.soloed().and_then(|s| bank.id(s)).map(str::to_string),
            ..Pattern::default()
        };

        for (i, id) in bank.ids().enumerate() {
            let sound = SoundId(i);
            if let Ok(row) = grid.row(sound) {
                pattern.grid.insert(id.to_string(), row.to_vec());
            }
            if mixer.is_muted(sound) {
                pattern.muted_sounds.insert(id.to_string());
            }
            if let Some(volume) = mixer.volume(sound) {
                pattern.sound_volumes.insert(id.to_string(), volume);
            }
        }
        pattern
    }

    /// Replace the session's grid, tempo, and mixer with this snapshot,
    /// repairing anything malformed. Safe while playing: the scheduler reads
    /// the new grid on its next step.
    pub fn restore_into(&self, session: &mut Session) -> Repairs {
        let mut repairs = Repairs::default();

        session.set_tempo(self.tempo);
        if session.tempo().bpm() != self.tempo {
            repairs.note(format!("tempo {} clamped to {}", self.tempo, session.tempo().bpm()));
        }

        let steps = session.set_step_count(self.step_count);
        if steps != self.step_count {
            repairs.note(format!("step count {} clamped to {}", self.step_count, steps));
        }

        session.clear_grid();
        session.mixer_mut().reset();
        if !self.master_volume.is_finite() {
            repairs.note("master volume was not a number".into());
        } else if !(0.0..=1.0).contains(&self.master_volume) {
            repairs.note(format!("master volume {} clamped", self.master_volume));
        }
        session.mixer_mut().set_master_volume(self.master_volume);

        for (id, row) in &self.grid {
            let Some(sound) = session.bank().index_of(id) else {
                repairs.note(format!("dropped row for unknown sound '{}'", id));
                continue;
            };
            if row.len() != steps {
                repairs.note(format!("row '{}' had {} steps, expected {}", id, row.len(), steps));
            }
            for (step, &active) in row.iter().enumerate().take(steps) {
                if active {
                    let _ = session.set_cell(sound, step, true);
                }
            }
        }

        for (id, &volume) in &self.sound_volumes {
            let Some(sound) = session.bank().index_of(id) else {
                repairs.note(format!("dropped volume for unknown sound '{}'", id));
                continue;
            };
            if !volume.is_finite() {
                repairs.note(format!("volume for '{}' was not a number, using default", id));
                let _ = session.mixer_mut().set_volume(sound, DEFAULT_SOUND_VOLUME);
                continue;
            }
            if !(0.0..=1.0).contains(&volume) {
                repairs.note(format!("volume {} for '{}' clamped", volume, id));
            }
            let _ = session.mixer_mut().set_volume(sound, volume);
        }

        for id in &self.muted_sounds {
            match session.bank().index_of(id) {
                Some(sound) => {
                    let _ = session.mixer_mut().set_mute(sound, true);
                }
                None => repairs.note(format!("ignored mute for unknown sound '{}'", id)),
            }
        }

        if let Some(id) = &self.soloed_sound {
            match session.bank().index_of(id) {
                Some(sound) => {
                    let _ = session.mixer_mut().set_solo(Some(sound));
                }
                None => repairs.note(format!("ignored solo for unknown sound '{}'", id)),
            }
        }

        for note in &repairs.notes {
            log::warn!("pattern '{}': {}", self.name, note);
        }
        repairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KitConfig, MAX_BPM};
    use crate::loader::SoundBank;

    fn session() -> Session {
        Session::new(SoundBank::new(&KitConfig::default()))
    }

    #[test]
    fn capture_then_restore_is_identical() {
        let mut original = session();
        original.set_step_count(8);
        original.set_tempo(97);
        original.toggle_cell(SoundId(0), 0).unwrap();
        original.toggle_cell(SoundId(1), 4).unwrap();
        original.toggle_cell(SoundId(5), 7).unwrap();
        original.mixer_mut().set_volume(SoundId(2), 0.3).unwrap();
        original.mixer_mut().set_mute(SoundId(3), true).unwrap();
        original.mixer_mut().set_solo(Some(SoundId(1))).unwrap();
        original.mixer_mut().set_master_volume(0.9);

        let pattern = Pattern::capture(&original, "groove");
        let mut fresh = session();
        let repairs = pattern.restore_into(&mut fresh);

        assert!(repairs.is_clean(), "{:?}", repairs);
        assert_eq!(fresh.grid(), original.grid());
        assert_eq!(fresh.tempo(), original.tempo());
        assert_eq!(fresh.mixer(), original.mixer());
    }

    #[test]
    fn restore_replaces_previous_state() {
        let mut target = session();
        target.toggle_cell(SoundId(0), 3).unwrap();
        target.mixer_mut().set_mute(SoundId(0), true).unwrap();

        Pattern::default().restore_into(&mut target);
        assert!(!target.grid().get(SoundId(0), 3).unwrap());
        assert!(!target.mixer().is_muted(SoundId(0)));
    }

    #[test]
    fn malformed_snapshot_is_repaired() {
        let json = r#"{
            "name": "broken",
            "tempo": 999,
            "step_count": 6,
            "master_volume": 3.0,
            "grid": { "Kick": [true, false, true], "Cowbell": [true] },
            "sound_volumes": { "Snare": -1.0 },
            "soloed_sound": "Cowbell"
        }"#;
        let pattern: Pattern = serde_json::from_str(json).unwrap();
        let mut target = session();
        let repairs = pattern.restore_into(&mut target);

        assert!(!repairs.is_clean());
        assert_eq!(target.tempo().bpm(), MAX_BPM);
        assert_eq!(target.grid().step_count(), 6);
        assert_eq!(
            target.grid().row(SoundId(0)).unwrap(),
            [true, false, true, false, false, false]
        );
        assert_eq!(target.mixer().master_volume(), 1.0);
        assert_eq!(target.mixer().volume(SoundId(1)), Some(0.0));
        assert_eq!(target.mixer().soloed(), None);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let pattern: Pattern = serde_json::from_str(r#"{"name":"bare"}"#).unwrap();
        assert_eq!(pattern.tempo, DEFAULT_BPM);
        assert_eq!(pattern.step_count, DEFAULT_STEPS);
        assert!(pattern.grid.is_empty());
    }
}
