//! The pixel buffer every effect draws into.

use palette::Srgb;

use crate::error::{Error, Result};

pub type Pixel = Srgb<u8>;

pub const BLACK: Pixel = Srgb::new(0, 0, 0);
pub const WHITE: Pixel = Srgb::new(255, 255, 255);
pub const DARK_RED: Pixel = Srgb::new(139, 0, 0);
pub const DARK_GREEN: Pixel = Srgb::new(0, 100, 0);
pub const DARK_BLUE: Pixel = Srgb::new(0, 0, 139);

/// Fixed-length strip contents.
///
/// The length is chosen once at startup and never changes afterwards.
pub struct PixelBuffer {
    pixels: Vec<Pixel>,
}

impl PixelBuffer {
    /// Allocates a black strip of `len` pixels, clamped to `capacity`.
    pub fn new(len: usize, capacity: usize) -> PixelBuffer {
        if len > capacity {
            log::warn!("Strip length {len} exceeds buffer capacity, clamping to {capacity}");
        }

        PixelBuffer {
            pixels: vec![BLACK; len.min(capacity)],
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn set(&mut self, index: usize, color: Pixel) -> Result<()> {
        let len = self.pixels.len();
        match self.pixels.get_mut(index) {
            Some(pixel) => {
                *pixel = color;
                Ok(())
            }
            None => Err(Error::PixelOutOfRange { index, len }),
        }
    }

    pub fn fill(&mut self, color: Pixel) {
        self.pixels.fill(color);
    }

    pub fn clear(&mut self) {
        self.fill(BLACK);
    }

    /// The first `count` pixels, or the whole strip if it is shorter.
    pub fn active_mut(&mut self, count: usize) -> &mut [Pixel] {
        let count = count.min(self.pixels.len());
        &mut self.pixels[..count]
    }

    /// Blacks out everything from `start` to the end of the strip.
    pub fn clear_from(&mut self, start: usize) {
        if let Some(tail) = self.pixels.get_mut(start..) {
            tail.fill(BLACK);
        }
    }

    pub fn as_slice(&self) -> &[Pixel] {
        &self.pixels
    }
}

/// Scales each channel by `(scale + 1) / 256`, so 255 keeps the colour.
pub fn scale(pixel: Pixel, scale: u8) -> Pixel {
    let channel = |c: u8| ((c as u16 * (scale as u16 + 1)) >> 8) as u8;
    Srgb::new(channel(pixel.red), channel(pixel.green), channel(pixel.blue))
}

/// Dims a pixel by `amount / 256`.
pub fn fade_to_black_by(pixel: Pixel, amount: u8) -> Pixel {
    scale(pixel, 255 - amount)
}
