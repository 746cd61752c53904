//! Timed operations and the virtual clock that drives them.

mod operation;
mod scheduler;

pub use operation::{MissionEngine, TickOutcome, UploadOutcome};
pub use scheduler::{Job, Scheduler, TimerId};
