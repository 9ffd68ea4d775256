//! Sluice integration test harness.
//!
//! Every test here drives the real transport state machine and
//! orchestrator against the simulated channel and counter from
//! `sluice-hal::sim` — no hardware required. The simulator records each
//! interaction, so tests assert exact poll counts and event ordering,
//! not just outcomes.
//!
//!   cargo test --test integration

use rand::Rng;

use sluice_core::image::PlanarImage;

mod orchestrator;
mod timing;
mod transport;

// ── Harness ───────────────────────────────────────────────────────────────────

/// A small randomized three-plane image for end-to-end runs.
pub fn random_image(width: usize, height: usize) -> PlanarImage {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..width * height * 3).map(|_| rng.gen()).collect();
    PlanarImage::from_raw(bytes, width, height, 3).expect("generated buffer has correct shape")
}
