//! Interval timer engine.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads or timers -- the caller polls `tick()` with the current `Instant`
//! (any cadence of 200 ms or better; cues are second-granular).
//!
//! Remaining time and progress are always derived from `now` minus the
//! instant the current phase started. Pausing snapshots the elapsed time
//! and resuming rebases the phase start instant, so the countdown cannot
//! drift no matter how irregularly `tick()` is called.
//!
//! ## Phases
//!
//! ```text
//! StartDelay -> Work -> (Rest -> Work)* -> Finished
//! ```
//!
//! A rest phase is inserted between reps only when a non-zero rest is
//! configured; with zero rest the engine advances Work -> Work directly.

use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;

use super::config::TimerConfig;
use super::phase::Phase;
use crate::audio::CueKind;
use crate::events::Event;

/// Sentinel for "no countdown cue fired yet in this phase".
const NO_CUE: i32 = -1;

/// Result of a single `tick()` call: the (possibly just-changed) phase,
/// the display values, and at most one audio cue to forward.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub phase: Phase,
    pub remaining_secs: u32,
    /// 0.0 ..= 1.0 progress within the current phase.
    pub progress: f64,
    pub cue: Option<CueKind>,
    /// Set when this tick crossed a phase boundary.
    pub event: Option<Event>,
}

/// Serializable view-model of the current timer state.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub label: &'static str,
    pub rep: u32,
    pub total_reps: u32,
    pub remaining_secs: u32,
    pub progress: f64,
    pub running: bool,
}

/// Core timer state machine. Single-owner, single-writer: all mutation
/// (tick, pause/resume, reset) must come from one logical task.
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
    config: TimerConfig,
    phase: Phase,
    current_rep: u32,
    /// Wall-clock instant the current phase began; rebased on resume.
    phase_start: Instant,
    /// Fixed duration of the current phase, in seconds.
    total_phase_secs: u32,
    running: bool,
    /// Elapsed-in-phase snapshot, present exactly while paused.
    paused_elapsed: Option<f64>,
    /// Last remaining-second value a countdown cue fired at.
    last_cue_second: i32,
}

impl PhaseScheduler {
    /// Create a scheduler and start it running at `now`.
    ///
    /// Enters `StartDelay` when a delay is configured, otherwise goes
    /// straight to `Work` on rep 1.
    pub fn new(config: TimerConfig, now: Instant) -> Self {
        let config = config.sanitized();
        let first = if config.start_delay_secs > 0 {
            Phase::StartDelay
        } else {
            Phase::Work
        };
        let mut scheduler = Self {
            config,
            phase: first,
            current_rep: 1,
            phase_start: now,
            total_phase_secs: 0,
            running: true,
            paused_elapsed: None,
            last_cue_second: NO_CUE,
        };
        scheduler.enter_phase(first, now);
        scheduler
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_rep(&self) -> u32 {
        self.current_rep
    }

    pub fn total_reps(&self) -> u32 {
        self.config.total_reps
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn total_phase_secs(&self) -> u32 {
        self.total_phase_secs
    }

    /// Seconds elapsed in the current phase, fractional. While running this
    /// is the wall-clock delta since the phase started (clamped at zero if
    /// `now` is somehow earlier); while paused it is the frozen snapshot.
    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        if self.running {
            now.saturating_duration_since(self.phase_start).as_secs_f64()
        } else if let Some(paused) = self.paused_elapsed {
            paused
        } else {
            // Finished: the phase is fully elapsed.
            f64::from(self.total_phase_secs)
        }
    }

    /// Whole seconds left in the current phase, rounded up, never negative.
    pub fn remaining_secs(&self, now: Instant) -> u32 {
        let left = f64::from(self.total_phase_secs) - self.elapsed_secs(now);
        left.ceil().max(0.0) as u32
    }

    /// 0.0 ..= 1.0 progress within the current phase.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.total_phase_secs == 0 {
            return 0.0;
        }
        (self.elapsed_secs(now) / f64::from(self.total_phase_secs)).clamp(0.0, 1.0)
    }

    /// Build a serializable snapshot of the current state.
    pub fn snapshot(&self, now: Instant) -> Snapshot {
        Snapshot {
            phase: self.phase,
            label: self.phase.label(),
            rep: self.current_rep,
            total_reps: self.config.total_reps,
            remaining_secs: self.remaining_secs(now),
            progress: self.progress(now),
            running: self.running,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Pause or resume. Pausing snapshots the elapsed time; resuming
    /// rebases the phase start so the countdown picks up exactly where it
    /// left off. No-op when already in the requested state or finished.
    pub fn set_running(&mut self, running: bool, now: Instant) -> Option<Event> {
        if self.phase == Phase::Finished || running == self.running {
            return None;
        }
        if running {
            let paused = self.paused_elapsed.take().unwrap_or(0.0);
            self.phase_start = now
                .checked_sub(Duration::from_secs_f64(paused))
                .unwrap_or(now);
            self.running = true;
            Some(Event::TimerResumed {
                remaining_secs: self.remaining_secs(now),
                at: Utc::now(),
            })
        } else {
            self.paused_elapsed = Some(self.elapsed_secs(now));
            self.running = false;
            Some(Event::TimerPaused {
                remaining_secs: self.remaining_secs(now),
                at: Utc::now(),
            })
        }
    }

    /// Re-enter the current phase from the beginning. Keeps the running
    /// flag as-is; no-op when finished.
    pub fn reset_current_phase(&mut self, now: Instant) -> Option<Event> {
        if self.phase == Phase::Finished {
            return None;
        }
        self.enter_phase(self.phase, now);
        Some(Event::PhaseReset {
            phase: self.phase,
            at: Utc::now(),
        })
    }

    /// Advance the countdown. Call at least once per rendered interval
    /// while running; extra calls at the same instant are harmless.
    ///
    /// Emits at most one cue per call: a short beep once per remaining
    /// second in {3, 2, 1}, or a boundary beep when the phase completes
    /// (the completion double-beep when the transition target is
    /// `Finished`, the plain finish beep otherwise).
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.phase == Phase::Finished || !self.running {
            return self.outcome(now, None, None);
        }

        let remaining = self.remaining_secs(now);
        let mut cue = None;

        if (1..=3).contains(&remaining) && remaining as i32 != self.last_cue_second {
            cue = Some(CueKind::ShortBeep);
            self.last_cue_second = remaining as i32;
        }

        if self.progress(now) >= 1.0 {
            cue = Some(if self.will_finish() {
                CueKind::CompletionBeeps
            } else {
                CueKind::FinishBeep
            });
            self.last_cue_second = NO_CUE;
            let event = self.advance(now);
            return self.outcome(now, cue, Some(event));
        }

        self.outcome(now, cue, None)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn outcome(&self, now: Instant, cue: Option<CueKind>, event: Option<Event>) -> TickOutcome {
        TickOutcome {
            phase: self.phase,
            remaining_secs: self.remaining_secs(now),
            progress: self.progress(now),
            cue,
            event,
        }
    }

    /// True iff completing the current phase leads directly to `Finished`.
    fn will_finish(&self) -> bool {
        match self.phase {
            Phase::StartDelay | Phase::Finished => false,
            Phase::Work | Phase::Rest => self.current_rep >= self.config.total_reps,
        }
    }

    /// Perform the boundary transition and return the resulting event.
    ///
    /// The rest decision uses the *configured* rest seconds: a rest of zero
    /// genuinely skips the rest phase rather than running a clamped one.
    fn advance(&mut self, now: Instant) -> Event {
        let next = match self.phase {
            Phase::StartDelay => Phase::Work,
            Phase::Work => {
                if self.current_rep < self.config.total_reps {
                    if self.config.rest_secs > 0 {
                        Phase::Rest
                    } else {
                        self.current_rep += 1;
                        Phase::Work
                    }
                } else {
                    Phase::Finished
                }
            }
            Phase::Rest => {
                if self.current_rep < self.config.total_reps {
                    self.current_rep += 1;
                    Phase::Work
                } else {
                    Phase::Finished
                }
            }
            Phase::Finished => Phase::Finished,
        };

        self.enter_phase(next, now);

        if next == Phase::Finished {
            Event::TimerFinished { at: Utc::now() }
        } else {
            Event::PhaseStarted {
                phase: next,
                rep: self.current_rep,
                duration_secs: self.total_phase_secs,
                at: Utc::now(),
            }
        }
    }

    /// Enter `phase` at `now`: fix its duration, restart the elapsed clock
    /// and re-arm the countdown cues. Zero work/rest durations clamp to
    /// 1 second here so progress never divides by zero.
    fn enter_phase(&mut self, phase: Phase, now: Instant) {
        self.phase = phase;
        self.phase_start = now;
        self.last_cue_second = NO_CUE;
        self.total_phase_secs = match phase {
            Phase::StartDelay => self.config.start_delay_secs,
            Phase::Work => self.config.work_secs.max(1),
            Phase::Rest => self.config.rest_secs.max(1),
            Phase::Finished => {
                self.running = false;
                1
            }
        };
        // A paused scheduler stays paused across re-entry, with the phase
        // restarted from zero elapsed. The snapshot is present exactly
        // while paused on a non-terminal phase.
        self.paused_elapsed = if !self.running && phase != Phase::Finished {
            Some(0.0)
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(work: u32, rest: u32, reps: u32, delay: u32) -> TimerConfig {
        TimerConfig {
            work_secs: work,
            rest_secs: rest,
            total_reps: reps,
            start_delay_secs: delay,
        }
    }

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn starts_in_work_without_delay() {
        let base = Instant::now();
        let s = PhaseScheduler::new(cfg(5, 5, 2, 0), base);
        assert_eq!(s.phase(), Phase::Work);
        assert_eq!(s.current_rep(), 1);
        assert!(s.is_running());
        assert_eq!(s.remaining_secs(base), 5);
        assert_eq!(s.progress(base), 0.0);
    }

    #[test]
    fn starts_in_delay_when_configured() {
        let base = Instant::now();
        let s = PhaseScheduler::new(cfg(5, 5, 2, 10), base);
        assert_eq!(s.phase(), Phase::StartDelay);
        assert_eq!(s.remaining_secs(base), 10);
    }

    #[test]
    fn start_delay_boundary_plays_plain_finish_beep() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 5, 1, 2), base);
        let out = s.tick(at(base, 2_050));
        assert_eq!(out.phase, Phase::Work);
        assert_eq!(out.cue, Some(CueKind::FinishBeep));
        assert_eq!(s.current_rep(), 1);
    }

    #[test]
    fn end_to_end_with_rest() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 5, 2, 0), base);

        // Work rep 1 completes -> Rest, rep unchanged.
        let out = s.tick(at(base, 5_050));
        assert_eq!(out.phase, Phase::Rest);
        assert_eq!(out.cue, Some(CueKind::FinishBeep));
        assert_eq!(s.current_rep(), 1);

        // Rest completes -> Work, rep 2.
        let out = s.tick(at(base, 10_100));
        assert_eq!(out.phase, Phase::Work);
        assert_eq!(out.cue, Some(CueKind::FinishBeep));
        assert_eq!(s.current_rep(), 2);

        // Final rep completes -> Finished, no trailing rest.
        let out = s.tick(at(base, 15_150));
        assert_eq!(out.phase, Phase::Finished);
        assert_eq!(out.cue, Some(CueKind::CompletionBeeps));
        assert!(matches!(out.event, Some(Event::TimerFinished { .. })));
        assert!(!s.is_running());
        assert_eq!(s.current_rep(), 2);
    }

    #[test]
    fn zero_rest_skips_rest_phase() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 0, 2, 0), base);

        let out = s.tick(at(base, 5_050));
        assert_eq!(out.phase, Phase::Work);
        assert_eq!(out.cue, Some(CueKind::FinishBeep));
        assert_eq!(s.current_rep(), 2);

        let out = s.tick(at(base, 10_100));
        assert_eq!(out.phase, Phase::Finished);
        assert_eq!(out.cue, Some(CueKind::CompletionBeeps));
    }

    #[test]
    fn countdown_cues_fire_once_per_second() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 0, 1, 0), base);

        // remaining 5, 4: silent.
        assert_eq!(s.tick(at(base, 400)).cue, None);
        assert_eq!(s.tick(at(base, 1_400)).cue, None);

        // remaining 3: one beep, then silence at the same second.
        assert_eq!(s.tick(at(base, 2_400)).cue, Some(CueKind::ShortBeep));
        assert_eq!(s.tick(at(base, 2_600)).cue, None);
        assert_eq!(s.tick(at(base, 2_900)).cue, None);

        assert_eq!(s.tick(at(base, 3_400)).cue, Some(CueKind::ShortBeep));
        assert_eq!(s.tick(at(base, 4_400)).cue, Some(CueKind::ShortBeep));
        assert_eq!(s.tick(at(base, 4_900)).cue, None);
    }

    #[test]
    fn tick_is_idempotent_at_the_same_instant() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 0, 1, 0), base);
        let now = at(base, 2_400);
        assert_eq!(s.tick(now).cue, Some(CueKind::ShortBeep));
        assert_eq!(s.tick(now).cue, None);
        assert_eq!(s.tick(now).cue, None);
    }

    #[test]
    fn pause_does_not_cost_countdown_time() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 0, 1, 0), base);

        let before = s.remaining_secs(at(base, 2_000));
        assert!(s.set_running(false, at(base, 2_000)).is_some());

        // Eight seconds pass while paused; remaining is frozen.
        assert_eq!(s.remaining_secs(at(base, 10_000)), before);

        assert!(s.set_running(true, at(base, 10_000)).is_some());
        assert_eq!(s.remaining_secs(at(base, 10_000)), before);

        // The countdown continues from where it stopped.
        assert_eq!(s.remaining_secs(at(base, 11_000)), before - 1);
    }

    #[test]
    fn paused_ticks_emit_no_cues() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 0, 1, 0), base);
        s.set_running(false, at(base, 2_400));
        let out = s.tick(at(base, 2_500));
        assert_eq!(out.cue, None);
        assert_eq!(out.phase, Phase::Work);
    }

    #[test]
    fn set_running_is_a_noop_when_unchanged_or_finished() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(1, 0, 1, 0), base);
        assert!(s.set_running(true, base).is_none());

        s.tick(at(base, 1_050));
        assert_eq!(s.phase(), Phase::Finished);
        assert!(s.set_running(true, at(base, 2_000)).is_none());
        assert!(s.set_running(false, at(base, 2_000)).is_none());
    }

    #[test]
    fn reset_restores_full_phase() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 0, 2, 0), base);
        s.tick(at(base, 3_000));

        assert!(s.reset_current_phase(at(base, 3_000)).is_some());
        assert_eq!(s.remaining_secs(at(base, 3_000)), 5);
        assert_eq!(s.progress(at(base, 3_000)), 0.0);
        assert_eq!(s.phase(), Phase::Work);
        assert_eq!(s.current_rep(), 1);
    }

    #[test]
    fn reset_while_paused_restores_full_phase() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 0, 1, 0), base);

        assert!(s.set_running(false, at(base, 2_000)).is_some());
        assert!(s.reset_current_phase(at(base, 2_500)).is_some());

        // Still paused, but back at the start of the phase.
        assert!(!s.is_running());
        assert_eq!(s.remaining_secs(at(base, 2_500)), 5);
        assert_eq!(s.progress(at(base, 2_500)), 0.0);

        // Time passing while paused stays invisible.
        assert_eq!(s.remaining_secs(at(base, 30_000)), 5);
    }

    #[test]
    fn resume_after_paused_reset_counts_down_from_full_duration() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 0, 1, 0), base);

        s.set_running(false, at(base, 2_000));
        s.reset_current_phase(at(base, 2_500));
        assert!(s.set_running(true, at(base, 10_000)).is_some());

        assert_eq!(s.remaining_secs(at(base, 10_000)), 5);
        assert_eq!(s.remaining_secs(at(base, 12_000)), 3);
        // The rebuilt phase still completes normally.
        let out = s.tick(at(base, 15_050));
        assert_eq!(out.phase, Phase::Finished);
        assert_eq!(out.cue, Some(CueKind::CompletionBeeps));
    }

    #[test]
    fn reset_rearms_countdown_cues() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 0, 1, 0), base);
        assert_eq!(s.tick(at(base, 2_400)).cue, Some(CueKind::ShortBeep));
        s.reset_current_phase(at(base, 2_500));
        assert_eq!(s.tick(at(base, 4_900)).cue, Some(CueKind::ShortBeep));
    }

    #[test]
    fn reset_is_a_noop_when_finished() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(1, 0, 1, 0), base);
        s.tick(at(base, 1_050));
        assert_eq!(s.phase(), Phase::Finished);
        assert!(s.reset_current_phase(at(base, 2_000)).is_none());
        assert_eq!(s.phase(), Phase::Finished);
    }

    #[test]
    fn finished_ticks_are_inert() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(1, 0, 1, 0), base);
        s.tick(at(base, 1_050));

        let out = s.tick(at(base, 60_000));
        assert_eq!(out.phase, Phase::Finished);
        assert_eq!(out.cue, None);
        assert!(out.event.is_none());
        assert_eq!(out.remaining_secs, 0);
        assert_eq!(out.progress, 1.0);
    }

    #[test]
    fn backwards_clock_clamps_to_zero_elapsed() {
        let base = at(Instant::now(), 60_000);
        let s = PhaseScheduler::new(cfg(5, 0, 1, 0), base);
        let earlier = base - Duration::from_secs(30);
        assert_eq!(s.elapsed_secs(earlier), 0.0);
        assert_eq!(s.remaining_secs(earlier), 5);
        assert_eq!(s.progress(earlier), 0.0);
    }

    #[test]
    fn zero_durations_are_clamped_for_entered_phases() {
        let base = Instant::now();
        let s = PhaseScheduler::new(cfg(0, 0, 1, 0), base);
        assert_eq!(s.total_phase_secs(), 1);
        assert_eq!(s.remaining_secs(base), 1);
    }

    #[test]
    fn zero_reps_are_sanitized_to_one() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 0, 0, 0), base);
        assert_eq!(s.total_reps(), 1);
        let out = s.tick(at(base, 5_050));
        assert_eq!(out.phase, Phase::Finished);
    }

    #[test]
    fn boundary_event_carries_new_phase() {
        let base = Instant::now();
        let mut s = PhaseScheduler::new(cfg(5, 5, 2, 0), base);
        let out = s.tick(at(base, 5_050));
        match out.event {
            Some(Event::PhaseStarted {
                phase,
                rep,
                duration_secs,
                ..
            }) => {
                assert_eq!(phase, Phase::Rest);
                assert_eq!(rep, 1);
                assert_eq!(duration_secs, 5);
            }
            other => panic!("expected PhaseStarted, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_reflects_state() {
        let base = Instant::now();
        let s = PhaseScheduler::new(cfg(5, 5, 3, 0), base);
        let snap = s.snapshot(at(base, 1_000));
        assert_eq!(snap.phase, Phase::Work);
        assert_eq!(snap.label, "Work");
        assert_eq!(snap.rep, 1);
        assert_eq!(snap.total_reps, 3);
        assert_eq!(snap.remaining_secs, 4);
        assert!(snap.running);
    }
}
