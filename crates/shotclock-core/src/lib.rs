//! # Shotclock Core Library
//!
//! Core logic for shotclock, an interval timer for archery training:
//! repeated work/rest countdowns with audio cues at phase boundaries.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-based state machine. The caller polls
//!   [`PhaseScheduler::tick`] with the current `Instant`; remaining time and
//!   progress are derived from the phase start instant rather than from
//!   accumulated tick deltas, so the countdown never drifts under variable
//!   polling cadence.
//! - **Audio**: [`TonePlayer`] synthesizes short sine tones on a dedicated
//!   audio thread. Cue playback is fire-and-forget and audio failures are
//!   non-fatal -- the countdown continues silently.
//! - **Storage**: TOML-based preference storage (default intervals, audio
//!   settings). Live timer state is never persisted.
//!
//! ## Key Components
//!
//! - [`PhaseScheduler`]: core timer state machine
//! - [`TonePlayer`]: tone synthesis and playback
//! - [`Config`]: stored preferences

pub mod audio;
pub mod display;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use audio::{CueKind, TonePlayer};
pub use display::mmss;
pub use error::{AudioError, ConfigError, CoreError};
pub use events::Event;
pub use storage::Config;
pub use timer::{Phase, PhaseScheduler, Snapshot, TickOutcome, TimerConfig};
