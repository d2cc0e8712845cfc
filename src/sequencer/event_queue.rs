//! FIFO of steps that have been committed to the audio clock.

use std::collections::VecDeque;

/// A step the scheduler has committed. `run` and `sequence` identify it
/// uniquely; `step` is its column in the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledEvent {
    pub run: u64,
    pub sequence: u64, // steps since start() of this run
    pub step: usize,
    pub time: f64, // audio clock seconds
}

/// Written by the scheduler, drained by the playhead tracker.
/// Times are non-decreasing front to back.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: VecDeque<ScheduledEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: VecDeque::new() }
    }

    pub fn push(&mut self, event: ScheduledEvent) {
        debug_assert!(
            self.events.back().is_none_or(|last| last.time <= event.time),
            "scheduled events must be pushed in time order"
        );
        self.events.push_back(event);
    }

    pub fn peek(&self) -> Option<&ScheduledEvent> {
        self.events.front()
    }

    /// Pops the front event if it is strictly before `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<ScheduledEvent> {
        if self.events.front()?.time < now {
            self.events.pop_front()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.events.iter()
    }
}
