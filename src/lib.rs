#![no_std]

pub mod color;
pub mod delay;
pub mod driver;
pub mod error;
pub mod guard;
pub mod strip;
pub mod timing;
pub mod trace;

#[cfg(target_arch = "arm")]
pub use delay::SpinDelay;
pub use delay::{CYCLES_PER_LOOP, CycleDelay, Overhead, SpinPlan};
pub use driver::Ws2812;
pub use error::{Phase, Symbol, TimingError};
pub use guard::InterruptGuard;
pub use strip::Strip;
pub use timing::{BitTiming, Protocol, cycles_for_ns, cycles_for_ns_ceil};
pub use trace::{SignalTrace, TraceClock, TracePin};

pub use color::{Rgb, grb};
pub use smart_leds::SmartLedsWrite;

/// Abstract LED driver trait
///
/// Frame composers write whole frames through this trait and stay unaware
/// of how the signal is produced.
pub trait OutputDriver {
    /// Write colors to the LED strip and latch them
    fn write(&mut self, colors: &[Rgb]);
}
