//! Step-sequencer drum machine: a lookahead scheduler that turns a mutable
//! step grid and a live tempo into sample-accurate triggers, plus the sound
//! bank, mixer, pattern store, and terminal UI around it.

pub mod audio;
pub mod audio_api;
pub mod clock;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod middle;
pub mod pipeline;
pub mod sequencer;
pub mod shared;
pub mod tui;

pub use error::{Error, Result};
