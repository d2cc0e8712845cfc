pub mod pattern;
pub mod persistence;

pub use pattern::{Pattern, Repairs};
pub use persistence::{JsonPatternStore, MemoryPatternStore, PatternStore};
