//! Run reports — what one offload (or host-only run) produced.

use serde::Serialize;

use sluice_core::ticks::Elapsed;

/// Result of a successful offload run. A failed run produces an
/// `OffloadError` and no report; there is no partial success.
#[derive(Debug, Serialize)]
pub struct OffloadReport {
    pub clock_hz: u32,
    pub elapsed: Elapsed,
    pub payload_bytes: usize,
    pub words_pushed: usize,
    pub rx_polls: u32,
    pub checksum_before: u32,
    pub checksum_after: u32,
}

/// Result of a host-only run: the same conversion without the
/// accelerator, for comparison against the offloaded path.
#[derive(Debug, Serialize)]
pub struct HostOnlyReport {
    pub clock_hz: u32,
    pub elapsed: Elapsed,
    pub gray_bytes: usize,
}
