use super::event_queue::EventQueue;

/// Turns committed steps into "the step that is sounding right now", sampled
/// at whatever rate the display redraws. It never drives audio timing.
#[derive(Clone, Debug, Default)]
pub struct PlayheadTracker {
    displayed: Option<usize>,
}

impl PlayheadTracker {
    pub fn new() -> Self {
        Self { displayed: None }
    }

    pub fn displayed(&self) -> Option<usize> {
        self.displayed
    }

    /// One display tick. Consumes every event whose time has passed and keeps
    /// the last one. While stopped the queue is drained and nothing is shown.
    pub fn tick(&mut self, now: Option<f64>, playing: bool, events: &mut EventQueue) -> Option<usize> {
        if !playing {
            self.reset(events);
            return None;
        }
        if let Some(now) = now {
            while let Some(event) = events.pop_due(now) {
                self.displayed = Some(event.step);
            }
        }
        self.displayed
    }

    pub fn reset(&mut self, events: &mut EventQueue) {
        events.clear();
        self.displayed = None;
    }
}
