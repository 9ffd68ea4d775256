//! Per-offload transfer state and the error kinds that terminate a run.

use sluice_core::config::TransportConfig;
use sluice_hal::HalError;

/// Phases of one transfer, in protocol order. `Failed` is terminal and
/// reachable from any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    ResetCheck,
    Transmitting,
    LengthCommitted,
    AwaitTxDone,
    AwaitRxData,
    RxVerified,
    Failed,
}

/// Poll budgets for the three hardware waits. Every wait is bounded; a
/// hardware fault surfaces as an error instead of a hang.
#[derive(Debug, Clone, Copy)]
pub struct WaitLimits {
    /// Vacancy polls allowed per transmitted word.
    pub tx_vacancy_polls: u32,
    /// Polls allowed for the transmit-complete signal.
    pub tx_done_polls: u32,
    /// Receive-occupancy countdown. The wait performs exactly this many
    /// polls before giving up.
    pub rx_occupancy_polls: u32,
}

impl WaitLimits {
    pub fn from_config(config: &TransportConfig) -> Self {
        Self {
            tx_vacancy_polls: config.tx_vacancy_polls,
            tx_done_polls: config.tx_done_polls,
            rx_occupancy_polls: config.rx_occupancy_polls,
        }
    }
}

impl Default for WaitLimits {
    fn default() -> Self {
        Self::from_config(&TransportConfig::default())
    }
}

/// State of the single in-flight transfer. Created when the transport
/// begins, dropped when it reaches a terminal phase. Exactly one session
/// exists at a time — the transport is synchronous and the channel handle
/// is exclusively borrowed for the call.
pub(crate) struct TransferSession {
    phase: TransferPhase,
    pub(crate) words_remaining: usize,
    pub(crate) rx_countdown: u32,
}

impl TransferSession {
    pub(crate) fn new(words: usize, limits: &WaitLimits) -> Self {
        Self {
            phase: TransferPhase::ResetCheck,
            words_remaining: words,
            rx_countdown: limits.rx_occupancy_polls,
        }
    }

    pub(crate) fn advance(&mut self, next: TransferPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "transfer phase");
        self.phase = next;
    }

    pub(crate) fn fail(&mut self) {
        tracing::debug!(from = ?self.phase, "transfer failed");
        self.phase = TransferPhase::Failed;
    }
}

/// Everything that can terminate a run. Nothing here is recovered
/// locally; each kind aborts the offload, and a failed run must be
/// re-invoked fresh by the caller.
#[derive(Debug, thiserror::Error)]
pub enum OffloadError {
    /// Device lookup or bring-up failed before any transfer started.
    #[error(transparent)]
    Hal(#[from] HalError),

    /// The channel did not come up idle after clearing pending bits.
    #[error("channel status {status:#010x} after reset, expected 0x0")]
    ResetStateInvalid { status: u32 },

    /// No transmit vacancy within the poll budget.
    #[error("transmit stalled: no vacancy for word {word} within {polls} polls")]
    TransmitStalled { word: usize, polls: u32 },

    /// Transmit-complete never asserted within the poll budget.
    #[error("transmit completion not signalled within {polls} polls")]
    TransmitTimeout { polls: u32 },

    /// The receive countdown expired with no occupancy.
    #[error("no receive data after {polls} polls")]
    ReceiveTimeout { polls: u32 },

    /// Occupancy was observed but the completion flag never rose.
    #[error("receive data present but completion flag not set")]
    ReceiveIncomplete,

    /// The input buffer changed while the offload ran. Indicates host
    /// memory corruption, not a channel failure — reported distinctly.
    #[error("input buffer checksum changed during offload: {before:#010x} before, {after:#010x} after")]
    IntegrityMismatch { before: u32, after: u32 },
}
