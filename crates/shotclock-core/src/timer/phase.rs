use serde::{Deserialize, Serialize};

/// The timer's current mode. Exactly one phase is current at any instant.
///
/// `StartDelay` occurs at most once, as the very first phase, and only when
/// a start delay is configured. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    StartDelay,
    Work,
    Rest,
    Finished,
}

impl Phase {
    /// Display label shown alongside the countdown.
    pub fn label(self) -> &'static str {
        match self {
            Phase::StartDelay => "Get Ready",
            Phase::Work => "Work",
            Phase::Rest => "Rest",
            Phase::Finished => "Done",
        }
    }

    /// Accent color name for UI rendering.
    pub fn accent(self) -> &'static str {
        match self {
            Phase::StartDelay => "orange",
            Phase::Work => "green",
            Phase::Rest => "red",
            Phase::Finished => "gray",
        }
    }
}
