//! sluice-core — shared types for the Sluice offload driver.
//! Buffers, the grayscale preprocessor, the integrity checksum, tick
//! conversion, and configuration. No hardware access lives here.

pub mod config;
pub mod image;
pub mod integrity;
pub mod ticks;

pub use image::PlanarImage;
pub use integrity::Verdict;
pub use ticks::Elapsed;
