//! End-to-end runs through the orchestrator, including the integrity
//! gate and failure propagation.

use sluice_core::image::PlanarImage;
use sluice_core::integrity::{self, Verdict};
use sluice_hal::sim::{SimChannel, SimCounter};
use sluice_offload::{run_host_only, run_offload, ship, OffloadError, RunSettings, WaitLimits};

use crate::random_image;

fn settings() -> RunSettings {
    RunSettings {
        limits: WaitLimits {
            tx_vacancy_polls: 64,
            tx_done_polls: 64,
            rx_occupancy_polls: 64,
        },
        clock_hz: 100_000,
    }
}

/// Healthy hardware, untouched buffer: checksums agree and the run
/// succeeds with a full report.
#[test]
fn clean_offload_reports_success() -> anyhow::Result<()> {
    let mut channel = SimChannel::responsive();
    let mut counter = SimCounter::new(500);
    let image = random_image(16, 8);
    let expected_checksum = integrity::checksum(image.bytes());

    let report = run_offload(&mut channel, &mut counter, image, &settings())?;

    assert_eq!(report.checksum_before, expected_checksum);
    assert_eq!(report.checksum_after, expected_checksum);
    assert_eq!(report.payload_bytes, 16 * 8);
    assert_eq!(report.words_pushed, 16 * 8);
    assert_eq!(report.elapsed.ticks, 500, "one counter step inside the window");
    Ok(())
}

/// The offloaded payload is the grayscale derivative, never the raw
/// planes: the channel must see width*height words, not width*height*3.
#[test]
fn transport_ships_the_derivative_not_the_planes() {
    let mut channel = SimChannel::responsive();
    let mut counter = SimCounter::new(1);
    let image = PlanarImage::synthetic(10, 6);
    let expected = image.to_grayscale();

    run_offload(&mut channel, &mut counter, image, &settings()).expect("run should succeed");

    let shipped: Vec<u8> = channel.pushed_words().iter().map(|&w| w as u8).collect();
    assert_eq!(shipped.len(), 10 * 6);
    assert_eq!(shipped, expected);
}

/// One stray byte written into the original buffer during the offload
/// window must surface as an integrity mismatch, never as success. The
/// sequence below is the orchestrator's own, with the fault landing
/// between transport completion and the post-offload checksum.
#[test]
fn integrity_gate_flags_mid_window_mutation() {
    let image = random_image(8, 8);
    let checksum_before = integrity::checksum(image.bytes());

    let gray = image.to_grayscale();
    let mut channel = SimChannel::responsive();
    ship(&mut channel, gray, &settings().limits).expect("transfer should succeed");

    // The stray write: one byte flipped in the original buffer.
    let mut raw = image.into_bytes();
    raw[17] ^= 0xff;
    let image = PlanarImage::from_raw(raw, 8, 8, 3).unwrap();

    let checksum_after = integrity::checksum(image.bytes());
    assert_eq!(
        integrity::compare(checksum_before, checksum_after),
        Verdict::Mismatch,
        "a single-byte fault must not cancel out in the sum"
    );
}

/// A failed transport leaves no report behind — failure is never partial
/// success.
#[test]
fn receive_timeout_fails_the_whole_run() {
    let mut channel = SimChannel::responsive().rx_never_occupied();
    let mut counter = SimCounter::new(1);
    let image = random_image(4, 4);

    let err = run_offload(&mut channel, &mut counter, image, &settings()).unwrap_err();

    assert!(matches!(err, OffloadError::ReceiveTimeout { polls: 64 }));
}

/// A counter that fails its self-test aborts the run before the channel
/// sees a single register access.
#[test]
fn broken_counter_aborts_before_any_transfer() {
    let mut channel = SimChannel::responsive();
    let mut counter = SimCounter::failing_self_test();
    let image = random_image(4, 4);

    let err = run_offload(&mut channel, &mut counter, image, &settings()).unwrap_err();

    assert!(matches!(err, OffloadError::Hal(_)));
    assert!(channel.events().is_empty());
}

/// The host-only path produces the same derivative size and a timed
/// window, without touching any channel.
#[test]
fn host_only_run_matches_payload_size() -> anyhow::Result<()> {
    let mut counter = SimCounter::new(2_000);
    let image = random_image(12, 5);

    let report = run_host_only(&mut counter, image, 100_000)?;

    assert_eq!(report.gray_bytes, 12 * 5);
    assert_eq!(report.elapsed.ticks, 2_000);
    Ok(())
}

/// Auto-reload is enabled for the measured window and disabled after,
/// mirroring the bracketing the hardware timer expects.
#[test]
fn counter_auto_reload_is_disabled_after_the_run() {
    let mut channel = SimChannel::responsive();
    let mut counter = SimCounter::new(10);
    let image = random_image(4, 4);

    run_offload(&mut channel, &mut counter, image, &settings()).expect("run should succeed");

    assert!(!counter.auto_reload());
}
