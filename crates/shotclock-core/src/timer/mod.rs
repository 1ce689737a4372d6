mod config;
mod engine;
mod phase;

pub use config::TimerConfig;
pub use engine::{PhaseScheduler, Snapshot, TickOutcome};
pub use phase::Phase;
