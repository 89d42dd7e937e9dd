use smart_leds::RGB8;

pub type Rgb = RGB8;

/// Bytes per pixel on the wire
pub const BYTES_PER_PIXEL: usize = 3;

/// Channel bytes of `color` in WS2812B wire order
///
/// The device shifts in green, then red, then blue. This is fixed by the
/// LED hardware, not a display preference.
#[inline(always)]
pub const fn grb(color: Rgb) -> [u8; BYTES_PER_PIXEL] {
    [color.g, color.r, color.b]
}
