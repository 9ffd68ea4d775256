//! Scripted stand-ins for the channel and the counter.
//!
//! The simulator answers the same poll sequences real hardware would and
//! records every interaction, so the transport state machine can be
//! driven and asserted against synthetic signal sequences. The binary's
//! `sim` mode runs the full offload against these types on a machine with
//! no accelerator attached.

use crate::channel::FifoChannel;
use crate::counter::TickCounter;
use crate::HalError;

/// One recorded interaction with the simulated channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    ResetAndClear,
    StatusRead,
    VacancyPoll { granted: bool },
    Push(u32),
    CommitLength(u32),
    TxDonePoll { done: bool },
    RxOccupancyPoll { occupied: bool },
    RxDonePoll { done: bool },
}

/// A simulated FIFO channel.
///
/// `responsive()` models a healthy accelerator; the `with_*` builders
/// degrade individual signals to exercise the failure paths.
pub struct SimChannel {
    events: Vec<ChannelEvent>,
    status: u32,
    reset_residue: u32,
    vacancy_denials: u32,
    tx_done_after: u32,
    tx_done_polls: u32,
    rx_occupied_after: Option<u32>,
    rx_polls: u32,
    rx_done: bool,
}

impl SimChannel {
    /// Idle after reset, always vacant, transmit and receive complete on
    /// the first poll.
    pub fn responsive() -> Self {
        Self {
            events: Vec::new(),
            // Stale completion bits from a previous run; cleared by reset.
            status: 0x0c00_0000,
            reset_residue: 0,
            vacancy_denials: 0,
            tx_done_after: 0,
            tx_done_polls: 0,
            rx_occupied_after: Some(0),
            rx_polls: 0,
            rx_done: true,
        }
    }

    /// Status word left pending even after the clear — a channel that did
    /// not come up idle.
    pub fn with_reset_residue(mut self, status: u32) -> Self {
        self.reset_residue = status;
        self
    }

    /// Deny the first `n` vacancy polls, then grant.
    pub fn with_vacancy_denials(mut self, n: u32) -> Self {
        self.vacancy_denials = n;
        self
    }

    /// Report transmit-complete only after `n` failed polls.
    pub fn with_tx_done_after(mut self, n: u32) -> Self {
        self.tx_done_after = n;
        self
    }

    /// Report receive occupancy only after `n` failed polls.
    pub fn with_rx_occupied_after(mut self, n: u32) -> Self {
        self.rx_occupied_after = Some(n);
        self
    }

    /// Never report receive occupancy.
    pub fn rx_never_occupied(mut self) -> Self {
        self.rx_occupied_after = None;
        self
    }

    /// Assert occupancy but never the receive-complete flag.
    pub fn without_rx_done(mut self) -> Self {
        self.rx_done = false;
        self
    }

    pub fn events(&self) -> &[ChannelEvent] {
        &self.events
    }

    /// Words pushed, in order.
    pub fn pushed_words(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ChannelEvent::Push(w) => Some(*w),
                _ => None,
            })
            .collect()
    }

    /// Every length committed, in order. A correct transport commits once.
    pub fn committed_lengths(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ChannelEvent::CommitLength(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Number of receive-occupancy polls observed.
    pub fn rx_occupancy_poll_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ChannelEvent::RxOccupancyPoll { .. }))
            .count()
    }
}

impl FifoChannel for SimChannel {
    fn reset_and_clear(&mut self) {
        self.status = self.reset_residue;
        self.events.push(ChannelEvent::ResetAndClear);
    }

    fn status(&mut self) -> u32 {
        self.events.push(ChannelEvent::StatusRead);
        self.status
    }

    fn tx_vacant(&mut self) -> bool {
        let granted = if self.vacancy_denials > 0 {
            self.vacancy_denials -= 1;
            false
        } else {
            true
        };
        self.events.push(ChannelEvent::VacancyPoll { granted });
        granted
    }

    fn tx_push(&mut self, word: u32) {
        self.events.push(ChannelEvent::Push(word));
    }

    fn tx_commit_length(&mut self, bytes: u32) {
        self.events.push(ChannelEvent::CommitLength(bytes));
    }

    fn tx_done(&mut self) -> bool {
        let done = self.tx_done_polls >= self.tx_done_after;
        self.tx_done_polls += 1;
        self.events.push(ChannelEvent::TxDonePoll { done });
        done
    }

    fn rx_occupied(&mut self) -> bool {
        let occupied = match self.rx_occupied_after {
            Some(after) => self.rx_polls >= after,
            None => false,
        };
        self.rx_polls += 1;
        self.events.push(ChannelEvent::RxOccupancyPoll { occupied });
        occupied
    }

    fn rx_done(&mut self) -> bool {
        self.events.push(ChannelEvent::RxDonePoll { done: self.rx_done });
        self.rx_done
    }
}

/// A simulated tick counter: advances by a fixed step on every snapshot
/// while running.
pub struct SimCounter {
    ticks: u32,
    step: u32,
    running: bool,
    auto_reload: bool,
    fail_self_test: bool,
}

impl SimCounter {
    pub fn new(step: u32) -> Self {
        Self {
            ticks: 0,
            step,
            running: false,
            auto_reload: false,
            fail_self_test: false,
        }
    }

    /// A counter whose self-test fails, for exercising the fatal path.
    pub fn failing_self_test() -> Self {
        let mut counter = Self::new(0);
        counter.fail_self_test = true;
        counter
    }

    pub fn auto_reload(&self) -> bool {
        self.auto_reload
    }
}

impl TickCounter for SimCounter {
    fn self_test(&mut self) -> Result<(), HalError> {
        if self.fail_self_test {
            return Err(HalError::Initialization(
                "simulated counter self-test failure".to_string(),
            ));
        }
        Ok(())
    }

    fn set_auto_reload(&mut self, enabled: bool) {
        self.auto_reload = enabled;
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn value(&mut self) -> u32 {
        if self.running {
            self.ticks = self.ticks.wrapping_add(self.step);
        }
        self.ticks
    }
}
