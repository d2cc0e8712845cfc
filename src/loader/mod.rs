pub mod sample_loader;
pub mod sound_bank;

pub use sound_bank::{SlotState, SoundBank};
