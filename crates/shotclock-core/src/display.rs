//! Time formatting helpers.

/// Format a second count as `minutes:seconds`, seconds zero-padded to two
/// digits and minutes unpadded (`0:05`, `1:30`).
pub fn mmss(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
