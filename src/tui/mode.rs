use crate::shared::DisplayState;

// state local to the tui; decides how keys are resolved into input events.
// synced from DisplayState once per loop
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub prompt_active: bool, // typing a pattern name, keys become text
}

impl TuiState {
    pub fn sync(&mut self, ds: &DisplayState) {
        self.prompt_active = ds.prompt.is_some();
    }
}
