use thiserror::Error;

/// Everything the sequencer core can report back to its caller.
#[derive(Debug, Error)]
pub enum Error {
    // play/stop called in the wrong state
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("audio output is not available yet")]
    AudioUnavailable,

    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("failed to load sound '{sound}': {reason}")]
    AssetLoadFailure { sound: String, reason: String },

    #[error("no pattern saved in slot '{0}'")]
    NotFound(String),

    #[error("invalid pattern name '{0}'")]
    InvalidPatternName(String),

    #[error("pattern '{slot}' is unreadable: {reason}")]
    CorruptPattern { slot: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
