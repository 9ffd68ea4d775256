//! sluice-hal — hardware access layer.
//!
//! The transport and orchestrator talk to the FIFO channel and the tick
//! counter only through the capability traits in this crate. Two
//! implementations exist for each: a memory-mapped UIO register window
//! (`mmio`) for real hardware, and a scripted in-process stand-in (`sim`)
//! for tests and hardware-less runs.

use std::path::PathBuf;

pub mod channel;
pub mod counter;
pub mod mmio;
pub mod sim;

pub use channel::FifoChannel;
pub use counter::TickCounter;

/// Errors raised while locating or bringing up a hardware handle.
/// Both kinds abort the run before any transfer begins.
#[derive(Debug, thiserror::Error)]
pub enum HalError {
    #[error("device lookup failed for {path}: {source}")]
    ConfigLookup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("device initialization failed: {0}")]
    Initialization(String),
}
