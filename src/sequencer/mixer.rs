use crate::config::{DEFAULT_MASTER_VOLUME, DEFAULT_SOUND_VOLUME};
use crate::error::{Error, Result};
use crate::shared::SoundId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelStrip {
    pub volume: f32, // 0.0 to 1.0
    pub muted: bool,
}

impl Default for ChannelStrip {
    fn default() -> Self {
        Self {
            volume: DEFAULT_SOUND_VOLUME,
            muted: false,
        }
    }
}

/// Per-sound volume/mute, one exclusive solo, and a master volume.
/// Consulted once per trigger; it never touches audio itself.
#[derive(Clone, Debug, PartialEq)]
pub struct Mixer {
    strips: Vec<ChannelStrip>,
    soloed: Option<SoundId>,
    master_volume: f32,
}

fn clamp_unit(v: f32) -> Option<f32> {
    v.is_finite().then(|| v.clamp(0.0, 1.0))
}

impl Mixer {
    pub fn new(sound_count: usize) -> Self {
        Self {
            strips: vec![ChannelStrip::default(); sound_count],
            soloed: None,
            master_volume: DEFAULT_MASTER_VOLUME,
        }
    }

    fn strip_mut(&mut self, sound: SoundId) -> Result<&mut ChannelStrip> {
        let len = self.strips.len();
        self.strips.get_mut(sound.index()).ok_or(Error::IndexOutOfRange {
            what: "sound",
            index: sound.index(),
            len,
        })
    }

    pub fn strip(&self, sound: SoundId) -> Option<&ChannelStrip> {
        self.strips.get(sound.index())
    }

    pub fn sound_count(&self) -> usize {
        self.strips.len()
    }

    /// Effective gain for a trigger, or None when the sound must stay silent.
    /// A muted sound never plays, solo or not.
    pub fn gain_for(&self, sound: SoundId) -> Option<f32> {
        let strip = self.strips.get(sound.index())?;
        if strip.muted {
            return None;
        }
        if self.soloed.is_some_and(|s| s != sound) {
            return None;
        }
        Some(strip.volume * self.master_volume)
    }

    pub fn volume(&self, sound: SoundId) -> Option<f32> {
        self.strip(sound).map(|s| s.volume)
    }

    /// Non-finite values are ignored.
    pub fn set_volume(&mut self, sound: SoundId, volume: f32) -> Result<()> {
        let strip = self.strip_mut(sound)?;
        if let Some(v) = clamp_unit(volume) {
            strip.volume = v;
        }
        Ok(())
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        if let Some(v) = clamp_unit(volume) {
            self.master_volume = v;
        }
    }

    pub fn is_muted(&self, sound: SoundId) -> bool {
        self.strip(sound).is_some_and(|s| s.muted)
    }

    pub fn set_mute(&mut self, sound: SoundId, muted: bool) -> Result<()> {
        self.strip_mut(sound)?.muted = muted;
        Ok(())
    }

    pub fn toggle_mute(&mut self, sound: SoundId) -> Result<bool> {
        let strip = self.strip_mut(sound)?;
        strip.muted = !strip.muted;
        Ok(strip.muted)
    }

    pub fn soloed(&self) -> Option<SoundId> {
        self.soloed
    }

    pub fn is_soloed(&self, sound: SoundId) -> bool {
        self.soloed == Some(sound)
    }

    /// Solo is exclusive: soloing one sound un-solos whichever was soloed before.
    pub fn set_solo(&mut self, sound: Option<SoundId>) -> Result<()> {
        if let Some(s) = sound {
            self.strip_mut(s)?;
        }
        self.soloed = sound;
        Ok(())
    }

    /// Pressing solo on the soloed sound clears the solo.
    pub fn toggle_solo(&mut self, sound: SoundId) -> Result<bool> {
        if self.is_soloed(sound) {
            self.set_solo(None)?;
            Ok(false)
        } else {
            self.set_solo(Some(sound))?;
            Ok(true)
        }
    }

    /// Back to defaults: full strips, no solo, default master.
    pub fn reset(&mut self) {
        let n = self.strips.len();
        *self = Mixer::new(n);
    }
}
