//! Planar image buffer and the grayscale preprocessor.
//!
//! The accelerator consumes one byte per pixel. Input arrives as three
//! contiguous planes (not interleaved): plane 0 is the first
//! `width * height` bytes, plane 1 the next, plane 2 the last.

/// A raw multi-plane image buffer.
///
/// Owned by the orchestrator for the duration of one offload and released
/// when the run ends. The buffer length must match the stated geometry;
/// the constructor enforces this.
#[derive(Debug)]
pub struct PlanarImage {
    bytes: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("buffer is {len} bytes, expected {expected} for {width}x{height}x{channels}")]
    ShapeMismatch {
        len: usize,
        expected: usize,
        width: usize,
        height: usize,
        channels: usize,
    },
}

impl PlanarImage {
    /// Wrap a raw planar buffer. Fails if the length does not match the
    /// geometry.
    pub fn from_raw(
        bytes: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Self, ImageError> {
        let expected = width * height * channels;
        if bytes.len() != expected {
            return Err(ImageError::ShapeMismatch {
                len: bytes.len(),
                expected,
                width,
                height,
                channels,
            });
        }
        Ok(Self {
            bytes,
            width,
            height,
            channels,
        })
    }

    /// Deterministic three-plane test pattern: byte `i` holds `i % 256`.
    pub fn synthetic(width: usize, height: usize) -> Self {
        let len = width * height * 3;
        let bytes = (0..len).map(|i| (i % 256) as u8).collect();
        Self {
            bytes,
            width,
            height,
            channels: 3,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The full raw buffer, all planes. This is what the integrity gate
    /// checksums.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the image, returning the raw buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// One contiguous plane of `width * height` bytes.
    pub fn plane(&self, index: usize) -> &[u8] {
        let size = self.width * self.height;
        &self.bytes[index * size..(index + 1) * size]
    }

    /// Collapse the three planes into one grayscale byte per pixel:
    /// `gray[p] = (plane0[p] + plane1[p] + plane2[p]) / 3`, integer floor
    /// division. Pure host-side work; the hardware never sees the planes.
    pub fn to_grayscale(&self) -> Vec<u8> {
        debug_assert_eq!(self.channels, 3, "grayscale collapse needs three planes");
        let size = self.width * self.height;
        let (p0, p1, p2) = (self.plane(0), self.plane(1), self.plane(2));
        let mut gray = Vec::with_capacity(size);
        for p in 0..size {
            let sum = p0[p] as u32 + p1[p] as u32 + p2[p] as u32;
            gray.push((sum / 3) as u8);
        }
        gray
    }
}
