//! Transport state machine properties, asserted against recorded channel
//! event sequences.

use sluice_hal::sim::{ChannelEvent, SimChannel};
use sluice_offload::{ship, OffloadError, WaitLimits};

fn limits(rx_polls: u32) -> WaitLimits {
    WaitLimits {
        tx_vacancy_polls: 64,
        tx_done_polls: 64,
        rx_occupancy_polls: rx_polls,
    }
}

/// For a payload of N bytes: exactly N single-word pushes, one length
/// commit carrying N, and the commit strictly after the Nth push.
#[test]
fn word_count_and_commit_ordering() {
    let payload: Vec<u8> = (0..37u8).collect();
    let mut channel = SimChannel::responsive();

    let stats = ship(&mut channel, payload.clone(), &limits(16)).expect("transfer should succeed");

    assert_eq!(stats.words_pushed, 37);
    assert_eq!(stats.bytes_committed, 37);

    let pushed = channel.pushed_words();
    assert_eq!(pushed.len(), 37);
    let expected: Vec<u32> = payload.iter().map(|&b| b as u32).collect();
    assert_eq!(pushed, expected, "words must stream in payload order");

    assert_eq!(channel.committed_lengths(), vec![37], "exactly one commit");

    let events = channel.events();
    let last_push = events
        .iter()
        .rposition(|e| matches!(e, ChannelEvent::Push(_)))
        .unwrap();
    let commit = events
        .iter()
        .position(|e| matches!(e, ChannelEvent::CommitLength(_)))
        .unwrap();
    assert!(
        commit > last_push,
        "length commit must come after the final data word"
    );
}

/// A channel that does not come up idle fails the run before any data
/// moves.
#[test]
fn nonzero_status_after_reset_is_fatal() {
    let mut channel = SimChannel::responsive().with_reset_residue(0x0400_0000);

    let err = ship(&mut channel, vec![1, 2, 3], &limits(16)).unwrap_err();

    assert!(matches!(
        err,
        OffloadError::ResetStateInvalid { status: 0x0400_0000 }
    ));
    assert!(channel.pushed_words().is_empty(), "no words may be pushed");
    assert!(channel.committed_lengths().is_empty(), "no commit may happen");
}

/// With occupancy never asserted and a countdown of T, the receive wait
/// performs exactly T polls and then reports a timeout.
#[test]
fn rx_timeout_polls_exactly_the_countdown() {
    let countdown = 9;
    let mut channel = SimChannel::responsive().rx_never_occupied();

    let err = ship(&mut channel, vec![0xab; 4], &limits(countdown)).unwrap_err();

    assert!(matches!(err, OffloadError::ReceiveTimeout { polls } if polls == countdown));
    assert_eq!(
        channel.rx_occupancy_poll_count(),
        countdown as usize,
        "the countdown bounds the wait exactly"
    );
}

/// Occupancy without the completion flag is an incomplete receive, not a
/// success.
#[test]
fn occupancy_without_done_flag_is_incomplete() {
    let mut channel = SimChannel::responsive().without_rx_done();

    let err = ship(&mut channel, vec![5; 8], &limits(16)).unwrap_err();

    assert!(matches!(err, OffloadError::ReceiveIncomplete));
}

/// Vacancy that never arrives exhausts the per-word budget instead of
/// spinning forever.
#[test]
fn vacancy_starvation_stalls_the_transmit() {
    let budget = 12;
    let mut channel = SimChannel::responsive().with_vacancy_denials(u32::MAX);
    let wait = WaitLimits {
        tx_vacancy_polls: budget,
        ..limits(16)
    };

    let err = ship(&mut channel, vec![1, 2], &wait).unwrap_err();

    assert!(matches!(
        err,
        OffloadError::TransmitStalled { word: 0, polls } if polls == budget
    ));
    assert!(channel.pushed_words().is_empty());
}

/// A vacancy grant that arrives late is still honored within the budget.
#[test]
fn delayed_vacancy_within_budget_succeeds() {
    let mut channel = SimChannel::responsive().with_vacancy_denials(3);

    let stats = ship(&mut channel, vec![7], &limits(16)).expect("transfer should succeed");

    assert_eq!(stats.words_pushed, 1);
    let denials = channel
        .events()
        .iter()
        .filter(|e| matches!(e, ChannelEvent::VacancyPoll { granted: false }))
        .count();
    assert_eq!(denials, 3);
}

/// Transmit-complete that never rises exhausts its budget too — no wait
/// in the protocol is unbounded.
#[test]
fn missing_tx_done_times_out() {
    let budget = 10;
    let mut channel = SimChannel::responsive().with_tx_done_after(u32::MAX);
    let wait = WaitLimits {
        tx_done_polls: budget,
        ..limits(16)
    };

    let err = ship(&mut channel, vec![3; 6], &wait).unwrap_err();

    assert!(matches!(err, OffloadError::TransmitTimeout { polls } if polls == budget));
    // The payload was fully pushed and committed before the wait began.
    assert_eq!(channel.pushed_words().len(), 6);
    assert_eq!(channel.committed_lengths(), vec![6]);
}

/// Late occupancy inside the countdown completes normally and reports how
/// many polls it took.
#[test]
fn late_rx_occupancy_within_countdown_succeeds() {
    let mut channel = SimChannel::responsive().with_rx_occupied_after(5);

    let stats = ship(&mut channel, vec![9; 3], &limits(32)).expect("transfer should succeed");

    assert_eq!(stats.rx_polls, 6, "five denials plus the granting poll");
}
