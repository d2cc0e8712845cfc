// Types shared between the sequencer core, the middle layer, and the TUI.
//
// The idea of the rendering process:
//   - Only the middle layer knows about the session (grid, tempo, mixer, scheduler).
//   - Each frame the TUI calls `middle.display_state()` and draws that, nothing else.
//   - Key presses become `InputEvent`s, and the middle layer turns them into
//     session operations.

/// Row index of a sound in the kit (and therefore in the grid).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundId(pub usize);

impl SoundId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PlayPress,

    // grid cursor
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    ToggleCell,
    ClearGrid,

    // transport
    AdjustTempo(i16),
    AdjustSteps(i8),

    // mixer, applied to the sound under the cursor
    AdjustVolume(f32),
    AdjustMaster(f32),
    ToggleMute,
    ToggleSolo,

    // pattern bank
    BeginSave,
    PromptChar(char),
    PromptBackspace,
    PromptConfirm,
    PromptCancel,
    LoadNext,
    LoadPrevious,

    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowDisplay {
    pub label: String,
    pub volume: f32,
    pub muted: bool,
    pub soloed: bool,
    pub loaded: SoundStatus,
    pub cells: Vec<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundStatus {
    Loading,
    Ready,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub rows: Vec<RowDisplay>,
    pub playhead: Option<usize>, // step currently sounding, None when stopped
    pub playing: bool,
    pub bpm: u16,
    pub step_count: usize,
    pub master_volume: f32,
    pub cursor: (usize, usize), // (sound row, step)
    pub pattern_name: Option<String>,
    pub status: String,
    pub prompt: Option<String>, // text being typed for a save, if any
}
