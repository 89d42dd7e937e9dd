//! Fixed-length frame buffer
//!
//! The strip length is part of the type. Pixel 0 is the one wired closest
//! to the data pin.

use core::iter::FlatMap;
use core::slice::Iter;

use crate::color::{BYTES_PER_PIXEL, Rgb, grb};

/// Wire bytes of a strip, in GRB order
pub type WireBytes<'a> =
    FlatMap<Iter<'a, Rgb>, [u8; BYTES_PER_PIXEL], fn(&Rgb) -> [u8; BYTES_PER_PIXEL]>;

/// Frame buffer for a strip of `N` LEDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strip<const N: usize> {
    pixels: [Rgb; N],
}

impl<const N: usize> Strip<N> {
    /// Number of bytes one frame occupies on the wire
    pub const WIRE_LEN: usize = N * BYTES_PER_PIXEL;

    /// Create a strip with all LEDs off
    pub const fn new() -> Self {
        Self::filled(Rgb { r: 0, g: 0, b: 0 })
    }

    /// Create a strip with every LED set to `color`
    pub const fn filled(color: Rgb) -> Self {
        Self { pixels: [color; N] }
    }

    /// Number of LEDs
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        N
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Set a single LED
    ///
    /// Returns `None` if `index` is past the end of the strip
    pub fn set(&mut self, index: usize, color: Rgb) -> Option<()> {
        let pixel = self.pixels.get_mut(index)?;
        *pixel = color;
        Some(())
    }

    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }

    pub const fn pixels(&self) -> &[Rgb; N] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgb; N] {
        &mut self.pixels
    }

    /// Iterate the frame as it goes out on the wire
    pub fn wire_bytes(&self) -> WireBytes<'_> {
        let to_grb: fn(&Rgb) -> [u8; BYTES_PER_PIXEL] = |pixel| grb(*pixel);
        self.pixels.iter().flat_map(to_grb)
    }
}

impl<const N: usize> Default for Strip<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> From<[Rgb; N]> for Strip<N> {
    fn from(pixels: [Rgb; N]) -> Self {
        Self { pixels }
    }
}
