//! Host orchestrator — sequences one offload run.
//!
//! checksum (before) → timer start → preprocess → transport → timer
//! snapshot → checksum (after) → compare → report. Any fatal condition
//! stops the run immediately; no partial result is reported as success.

use sluice_core::image::PlanarImage;
use sluice_core::integrity::{self, Verdict};
use sluice_core::ticks::Elapsed;
use sluice_hal::{FifoChannel, TickCounter};

use crate::report::{HostOnlyReport, OffloadReport};
use crate::session::{OffloadError, WaitLimits};
use crate::transport;

/// Knobs for one run, resolved from config by the caller.
#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    pub limits: WaitLimits,
    pub clock_hz: u32,
}

/// Run one offload through the hardware channel.
///
/// Owns the image for the duration of the run and releases it at the end,
/// after the post-offload checksum. The grayscale payload moves into the
/// transport and dies there.
pub fn run_offload<C, T>(
    channel: &mut C,
    counter: &mut T,
    image: PlanarImage,
    settings: &RunSettings,
) -> Result<OffloadReport, OffloadError>
where
    C: FifoChannel,
    T: TickCounter,
{
    counter.self_test()?;
    counter.set_auto_reload(true);

    let checksum_before = integrity::checksum(image.bytes());
    tracing::info!(
        checksum = %format_args!("{checksum_before:#010x}"),
        bytes = image.bytes().len(),
        "input checksummed"
    );

    counter.start();
    let ticks_before = counter.value();

    let gray = image.to_grayscale();
    let payload_bytes = gray.len();
    tracing::info!(payload_bytes, "grayscale payload ready");

    let stats = transport::ship(channel, gray, &settings.limits)?;

    let ticks_after = counter.value();
    counter.set_auto_reload(false);

    let checksum_after = integrity::checksum(image.bytes());
    if let Verdict::Mismatch = integrity::compare(checksum_before, checksum_after) {
        tracing::error!(
            before = %format_args!("{checksum_before:#010x}"),
            after = %format_args!("{checksum_after:#010x}"),
            "input buffer corrupted during offload"
        );
        return Err(OffloadError::IntegrityMismatch {
            before: checksum_before,
            after: checksum_after,
        });
    }

    let elapsed = Elapsed::from_ticks(ticks_after.wrapping_sub(ticks_before), settings.clock_hz);
    tracing::info!(ticks = elapsed.ticks, time = %elapsed, "offload complete");

    Ok(OffloadReport {
        clock_hz: settings.clock_hz,
        elapsed,
        payload_bytes,
        words_pushed: stats.words_pushed,
        rx_polls: stats.rx_polls,
        checksum_before,
        checksum_after,
    })
}

/// Run the same conversion entirely on the host, timed with the same
/// counter. No channel is touched; useful as a baseline against the
/// offloaded path.
pub fn run_host_only<T: TickCounter>(
    counter: &mut T,
    image: PlanarImage,
    clock_hz: u32,
) -> Result<HostOnlyReport, OffloadError> {
    counter.self_test()?;
    counter.set_auto_reload(true);
    counter.start();
    let ticks_before = counter.value();

    let gray = image.to_grayscale();
    let gray_bytes = gray.len();

    let ticks_after = counter.value();
    counter.set_auto_reload(false);

    let elapsed = Elapsed::from_ticks(ticks_after.wrapping_sub(ticks_before), clock_hz);
    tracing::info!(ticks = elapsed.ticks, time = %elapsed, "host-only conversion complete");

    Ok(HostOnlyReport {
        clock_hz,
        elapsed,
        gray_bytes,
    })
}
