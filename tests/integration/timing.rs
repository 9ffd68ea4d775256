//! Tick conversion and timer bracketing.

use sluice_core::ticks::Elapsed;
use sluice_hal::sim::SimCounter;
use sluice_hal::TickCounter;

/// 250 ticks at 100 kHz is below the hundredth-of-a-second resolution.
#[test]
fn sub_hundredth_window_reports_zero() {
    let e = Elapsed::from_ticks(250, 100_000);
    assert_eq!(e.whole_secs, 0);
    assert_eq!(e.hundredths, 0);
}

/// A full second of ticks converts to exactly 1.00 s.
#[test]
fn full_second_of_ticks() {
    let e = Elapsed::from_ticks(100_000, 100_000);
    assert_eq!(e.whole_secs, 1);
    assert_eq!(e.hundredths, 0);
}

/// Two snapshots around a window subtract to the window's tick count,
/// matching the unsigned-difference contract.
#[test]
fn snapshot_difference_measures_the_window() {
    let mut counter = SimCounter::new(750);
    counter.self_test().unwrap();
    counter.start();

    let before = counter.value();
    // ... measured work would run here ...
    let after = counter.value();

    let elapsed = Elapsed::from_ticks(after.wrapping_sub(before), 100_000_000);
    assert_eq!(elapsed.ticks, 750);
}
