//! Capability surface the transport requires from the streaming channel.

/// A word-oriented hardware FIFO between host and accelerator.
///
/// All methods take `&mut self`: even the reads touch device registers
/// with side effects on real hardware, and the simulator keeps poll
/// counters.
pub trait FifoChannel {
    /// Clear all pending status/interrupt bits.
    fn reset_and_clear(&mut self);

    /// Current channel status. Expected to read 0 after a reset.
    fn status(&mut self) -> u32;

    /// True if a transmit slot is free.
    fn tx_vacant(&mut self) -> bool;

    /// Push one word into the transmit side. Only valid after a vacancy
    /// grant.
    fn tx_push(&mut self, word: u32);

    /// Write the transfer length in bytes. This is the signal that starts
    /// the accelerator consuming the stream — it must come after every
    /// data word, exactly once.
    fn tx_commit_length(&mut self, bytes: u32);

    /// Transmit-complete signal.
    fn tx_done(&mut self) -> bool;

    /// Data available on the receive side.
    fn rx_occupied(&mut self) -> bool;

    /// Receive-complete signal.
    fn rx_done(&mut self) -> bool;
}
