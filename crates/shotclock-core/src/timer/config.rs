use serde::{Deserialize, Serialize};

/// Interval timer configuration, fixed for the lifetime of a scheduler.
///
/// Values are taken as-is from user input and sanitized at scheduler
/// construction: `total_reps` is raised to at least 1, and zero work/rest
/// durations count as 1 second *for a phase that is actually entered*.
/// A configured `rest_secs` of 0 still skips the rest phase entirely --
/// the clamp only guards the duration of phases that run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_secs")]
    pub work_secs: u32,
    #[serde(default = "default_rest_secs")]
    pub rest_secs: u32,
    #[serde(default = "default_total_reps")]
    pub total_reps: u32,
    #[serde(default = "default_start_delay_secs")]
    pub start_delay_secs: u32,
}

fn default_work_secs() -> u32 {
    20
}
fn default_rest_secs() -> u32 {
    40
}
fn default_total_reps() -> u32 {
    1
}
fn default_start_delay_secs() -> u32 {
    10
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_secs: default_work_secs(),
            rest_secs: default_rest_secs(),
            total_reps: default_total_reps(),
            start_delay_secs: default_start_delay_secs(),
        }
    }
}

impl TimerConfig {
    /// Return a copy safe to schedule from. A rep count of zero would make
    /// the session unrepresentable, so it is raised to 1.
    pub fn sanitized(self) -> Self {
        Self {
            total_reps: self.total_reps.max(1),
            ..self
        }
    }

    /// Total session length in seconds, assuming no pauses. The final rep
    /// has no trailing rest.
    pub fn total_secs(&self) -> u64 {
        let cfg = self.sanitized();
        let reps = u64::from(cfg.total_reps);
        let work = u64::from(cfg.work_secs.max(1));
        let rest = u64::from(cfg.rest_secs);
        u64::from(cfg.start_delay_secs) + reps * work + (reps - 1) * rest
    }
}
