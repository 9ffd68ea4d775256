//! The transmit/receive state machine over the streaming channel.
//!
//! Protocol, in order: verify the channel came up idle, push one word per
//! payload byte behind vacancy grants, commit the byte length exactly once
//! (the commit starts the accelerator), wait for transmit-complete, wait
//! for receive occupancy under the countdown, then check the
//! receive-complete flag. The returned stream's content is not read —
//! this transport confirms completion, not accelerator correctness.

use sluice_hal::FifoChannel;

use crate::session::{OffloadError, TransferPhase, TransferSession, WaitLimits};

/// Accounting from a completed transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferStats {
    pub words_pushed: usize,
    pub bytes_committed: u32,
    /// Occupancy polls spent before the receive side reported data.
    pub rx_polls: u32,
}

/// Ship one payload through the channel and block until the accelerator
/// signals completion.
///
/// The payload moves into this call and is released on every path,
/// success or failure. There is no retry and no way to resume: any error
/// is terminal for this transfer.
pub fn ship<C: FifoChannel>(
    channel: &mut C,
    payload: Vec<u8>,
    limits: &WaitLimits,
) -> Result<TransferStats, OffloadError> {
    let mut session = TransferSession::new(payload.len(), limits);

    // The channel must come up idle: clear every pending bit, then the
    // status word has to read zero. Anything else means a previous run
    // left state behind, and this transfer cannot be trusted.
    channel.reset_and_clear();
    let status = channel.status();
    if status != 0 {
        session.fail();
        return Err(OffloadError::ResetStateInvalid { status });
    }
    session.advance(TransferPhase::Transmitting);

    for (word, &byte) in payload.iter().enumerate() {
        let mut granted = false;
        for _ in 0..limits.tx_vacancy_polls {
            if channel.tx_vacant() {
                granted = true;
                break;
            }
        }
        if !granted {
            session.fail();
            return Err(OffloadError::TransmitStalled {
                word,
                polls: limits.tx_vacancy_polls,
            });
        }
        channel.tx_push(byte as u32);
        session.words_remaining -= 1;
    }
    debug_assert_eq!(session.words_remaining, 0);

    // Length commit: one write, strictly after the last data word. This
    // is what tells the accelerator to start consuming the stream.
    let bytes = payload.len() as u32;
    channel.tx_commit_length(bytes);
    session.advance(TransferPhase::LengthCommitted);

    session.advance(TransferPhase::AwaitTxDone);
    let mut tx_done = false;
    for _ in 0..limits.tx_done_polls {
        if channel.tx_done() {
            tx_done = true;
            break;
        }
    }
    if !tx_done {
        session.fail();
        return Err(OffloadError::TransmitTimeout {
            polls: limits.tx_done_polls,
        });
    }

    // Receive wait: count down one step per failed occupancy poll,
    // exactly rx_occupancy_polls polls before giving up.
    session.advance(TransferPhase::AwaitRxData);
    loop {
        if session.rx_countdown == 0 {
            session.fail();
            return Err(OffloadError::ReceiveTimeout {
                polls: limits.rx_occupancy_polls,
            });
        }
        if channel.rx_occupied() {
            break;
        }
        session.rx_countdown -= 1;
    }
    let rx_polls = limits.rx_occupancy_polls - session.rx_countdown + 1;

    if !channel.rx_done() {
        session.fail();
        return Err(OffloadError::ReceiveIncomplete);
    }
    session.advance(TransferPhase::RxVerified);

    let stats = TransferStats {
        words_pushed: payload.len(),
        bytes_committed: bytes,
        rx_polls,
    };
    tracing::debug!(
        words = stats.words_pushed,
        bytes = stats.bytes_committed,
        rx_polls = stats.rx_polls,
        "transfer complete"
    );
    Ok(stats)
}
