//! Tick-count to wall-time conversion.

use serde::Serialize;

/// An elapsed offload window, in raw ticks and derived time.
///
/// Derivation for a counter clocked at `clock_hz`:
/// `hundredths = ticks / (clock_hz / 100)`, reported as whole seconds
/// plus a two-digit fraction. Integer arithmetic throughout, matching the
/// hardware counter's resolution.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Elapsed {
    pub ticks: u32,
    pub whole_secs: u32,
    pub hundredths: u32,
}

impl Elapsed {
    /// Convert a raw tick delta. `ticks` is the unsigned difference of two
    /// counter snapshots; the counter must not have wrapped inside the
    /// measured window (known limitation of a single free-running counter).
    pub fn from_ticks(ticks: u32, clock_hz: u32) -> Self {
        debug_assert!(clock_hz >= 100, "clock must resolve hundredths");
        let total_hundredths = ticks / (clock_hz / 100);
        Elapsed {
            ticks,
            whole_secs: total_hundredths / 100,
            hundredths: total_hundredths % 100,
        }
    }
}

impl std::fmt::Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.whole_secs, self.hundredths)
    }
}
