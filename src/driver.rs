//! Bit-banged WS2812B signal encoder
//!
//! Turns bytes into bit cells on a plain GPIO. Every hold is a compile-time
//! cycle count from [`BitTiming`], and a whole frame is sent with interrupts
//! masked so nothing can stretch a cell into a reset.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
#[cfg(feature = "esp32-log")]
use esp_println::println;
use smart_leds::SmartLedsWrite;

use crate::OutputDriver;
use crate::color::{Rgb, grb};
use crate::delay::CycleDelay;
use crate::guard::InterruptGuard;
use crate::strip::Strip;
use crate::timing::BitTiming;

/// WS2812B encoder bound to one output pin
///
/// `CLOCK_HZ` is the core clock the cycle counts are derived for. A clock
/// that cannot produce valid symbols with `C`'s overhead fails to compile.
///
/// # Usage
///
/// ```ignore
/// // RP2040 at its default 125 MHz
/// type Spin = SpinDelay<2, 4, 2>;
/// let mut leds: Ws2812<_, Spin, 125_000_000> = Ws2812::new(pin, Spin::new());
///
/// let strip = Strip::<12>::filled(Rgb::new(0, 0, 0xFF));
/// leds.show(&strip);
/// ```
pub struct Ws2812<P, C, const CLOCK_HZ: u32> {
    pin: P,
    cycles: C,
}

impl<P, C, const CLOCK_HZ: u32> Ws2812<P, C, CLOCK_HZ>
where
    P: OutputPin<Error = Infallible>,
    C: CycleDelay,
{
    /// Bit cell profile for this clock and target
    pub const TIMING: BitTiming = BitTiming::from_clock(CLOCK_HZ, C::OVERHEAD);

    /// Create an encoder on a pin already configured as output
    ///
    /// The line is driven low so the strip starts idle.
    pub fn new(mut pin: P, cycles: C) -> Self {
        let Ok(()) = pin.set_low();
        #[cfg(feature = "esp32-log")]
        println!(
            "[Ws2812.new] {} Hz: base={} delta={} low={} reset={} cycles",
            CLOCK_HZ,
            Self::TIMING.base(),
            Self::TIMING.delta(),
            Self::TIMING.low(),
            Self::TIMING.reset()
        );
        Self { pin, cycles }
    }

    /// Timing profile in use
    pub const fn timing(&self) -> BitTiming {
        Self::TIMING
    }

    /// Give back the pin and the delay
    pub fn release(self) -> (P, C) {
        (self.pin, self.cycles)
    }

    /// Send raw bytes, MSB first
    ///
    /// `bytes` must already be in wire order (GRB, 3 per LED). The strip
    /// keeps the data in its shift registers until [`latch`](Self::latch).
    pub fn transmit(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let _guard = InterruptGuard::acquire();
        for &byte in bytes {
            self.send_byte(byte);
        }
    }

    /// Send pixels in GRB order inside one critical section
    ///
    /// The iterator runs between bytes with interrupts masked, so it should
    /// be cheap: the low time it adds must stay well under the reset gap.
    pub fn transmit_pixels<I>(&mut self, pixels: I)
    where
        I: IntoIterator,
        I::Item: Into<Rgb>,
    {
        let _guard = InterruptGuard::acquire();
        for pixel in pixels {
            for byte in grb(pixel.into()) {
                self.send_byte(byte);
            }
        }
    }

    /// Hold the line low long enough for the strip to latch the frame
    pub fn latch(&mut self) {
        let Ok(()) = self.pin.set_low();
        self.cycles.delay_cycles(Self::TIMING.reset());
    }

    /// Send a full frame and latch it
    pub fn show<const N: usize>(&mut self, strip: &Strip<N>) {
        {
            let _guard = InterruptGuard::acquire();
            for byte in strip.wire_bytes() {
                self.send_byte(byte);
            }
        }
        self.latch();
    }

    /// Light the first `count` LEDs with one color and latch
    pub fn show_color(&mut self, color: Rgb, count: usize) {
        self.transmit_pixels(core::iter::repeat_n(color, count));
        self.latch();
    }

    #[inline(always)]
    fn send_byte(&mut self, byte: u8) {
        let timing = Self::TIMING;
        let mut data = byte;
        for _ in 0..8 {
            let Ok(()) = self.pin.set_high();
            self.cycles.delay_cycles(timing.base());
            if data & 0x80 == 0 {
                let Ok(()) = self.pin.set_low();
            }
            data <<= 1;
            self.cycles.delay_cycles(timing.delta());
            // No-op for a zero, ends the high time of a one.
            let Ok(()) = self.pin.set_low();
            self.cycles.delay_cycles(timing.low());
        }
    }
}

impl<P, C, const CLOCK_HZ: u32> SmartLedsWrite for Ws2812<P, C, CLOCK_HZ>
where
    P: OutputPin<Error = Infallible>,
    C: CycleDelay,
{
    type Error = Infallible;
    type Color = Rgb;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.transmit_pixels(iterator);
        self.latch();
        Ok(())
    }
}

impl<P, C, const CLOCK_HZ: u32> OutputDriver for Ws2812<P, C, CLOCK_HZ>
where
    P: OutputPin<Error = Infallible>,
    C: CycleDelay,
{
    fn write(&mut self, colors: &[Rgb]) {
        self.transmit_pixels(colors.iter().copied());
        self.latch();
    }
}
