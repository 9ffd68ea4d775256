//! Capability surface for the free-running tick counter.

use crate::HalError;

/// A free-running hardware counter used to bracket the offload window.
pub trait TickCounter {
    /// Validate the counter path. A counter that does not behave as a
    /// counter is fatal; the error propagates to the caller unrecovered.
    fn self_test(&mut self) -> Result<(), HalError>;

    /// Configure wraparound behavior.
    fn set_auto_reload(&mut self, enabled: bool);

    /// Begin incrementing.
    fn start(&mut self);

    /// Snapshot the current tick count.
    ///
    /// Elapsed time is the unsigned difference of two snapshots; the
    /// counter must not wrap inside the measured window.
    fn value(&mut self) -> u32;
}
