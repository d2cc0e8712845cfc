pub mod event_queue;
pub mod grid;
pub mod mixer;
pub mod playhead;
pub mod scheduler;
pub mod session;
pub mod tempo;

pub use event_queue::{EventQueue, ScheduledEvent};
pub use grid::StepGrid;
pub use mixer::{ChannelStrip, Mixer};
pub use playhead::PlayheadTracker;
pub use scheduler::{PlaybackClock, PollTimer, ScheduleContext, Scheduler};
pub use session::Session;
pub use tempo::Tempo;
