//! Two-pass encode machinery: pass arguments, progress and job workers

pub mod job;
pub mod passes;
pub mod progress;

pub use job::{spawn_job, JobHandle};
pub use passes::PassBuilder;
pub use progress::{
    sink_for, ConsoleProgressSink, JsonProgressSink, NoOpProgressSink, ProgressMode, ProgressThrottle,
    ProgressTracker,
};
