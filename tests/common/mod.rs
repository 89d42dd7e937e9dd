//! Shared test infrastructure: instrumented interrupts and a checked pin

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::Cell;

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use myrtio_ws2812::{TraceClock, TracePin, Ws2812};

/// Core clock used by the simulated encoder
pub const CLOCK_HZ: u32 = 16_000_000;

/// Encoder wired to a [`myrtio_ws2812::SignalTrace`]
pub type TraceEncoder<'a, const EDGES: usize> =
    Ws2812<MaskedPin<TracePin<'a, EDGES>>, TraceClock<'a, EDGES>, CLOCK_HZ>;

// ============================================================================
// Instrumented critical section
// ============================================================================

// Tests run on separate threads, so per-thread state keeps them isolated.
thread_local! {
    static INTERRUPTS_ENABLED: Cell<bool> = const { Cell::new(true) };
    static ACQUIRES: Cell<u32> = const { Cell::new(0) };
    static RELEASES: Cell<u32> = const { Cell::new(0) };
}

struct InstrumentedCriticalSection;
critical_section::set_impl!(InstrumentedCriticalSection);

unsafe impl critical_section::Impl for InstrumentedCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        ACQUIRES.with(|count| count.set(count.get() + 1));
        INTERRUPTS_ENABLED.with(|enabled| enabled.replace(false))
    }

    unsafe fn release(restore: critical_section::RawRestoreState) {
        RELEASES.with(|count| count.set(count.get() + 1));
        INTERRUPTS_ENABLED.with(|enabled| enabled.set(restore));
    }
}

/// Start from enabled interrupts and zeroed counters
///
/// Needed when the harness runs several tests on one thread.
pub fn reset_interrupts() {
    INTERRUPTS_ENABLED.with(|enabled| enabled.set(true));
    ACQUIRES.with(|count| count.set(0));
    RELEASES.with(|count| count.set(0));
}

pub fn interrupts_enabled() -> bool {
    INTERRUPTS_ENABLED.with(Cell::get)
}

pub fn set_interrupts_enabled(enabled: bool) {
    INTERRUPTS_ENABLED.with(|flag| flag.set(enabled));
}

pub fn acquire_count() -> u32 {
    ACQUIRES.with(Cell::get)
}

pub fn release_count() -> u32 {
    RELEASES.with(Cell::get)
}

// ============================================================================
// Checked pin
// ============================================================================

/// Pin wrapper that counts rising writes made while interrupts were enabled
///
/// Only bit cells drive the line high, so every such write is a cell that
/// could have been stretched by an interrupt.
pub struct MaskedPin<P> {
    inner: P,
    unmasked_highs: u32,
    highs: u32,
}

impl<P> MaskedPin<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            unmasked_highs: 0,
            highs: 0,
        }
    }

    pub fn unmasked_highs(&self) -> u32 {
        self.unmasked_highs
    }

    pub fn highs(&self) -> u32 {
        self.highs
    }
}

impl<P: ErrorType<Error = Infallible>> ErrorType for MaskedPin<P> {
    type Error = Infallible;
}

impl<P: OutputPin<Error = Infallible>> OutputPin for MaskedPin<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.inner.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.highs += 1;
        if interrupts_enabled() {
            self.unmasked_highs += 1;
        }
        self.inner.set_high()
    }
}

/// Build an encoder recording into `trace`
pub fn encoder<const EDGES: usize>(
    trace: &myrtio_ws2812::SignalTrace<EDGES>,
) -> TraceEncoder<'_, EDGES> {
    Ws2812::new(MaskedPin::new(trace.pin()), trace.clock())
}

/// High time threshold separating symbol 0 from symbol 1
pub fn threshold() -> u64 {
    u64::from(myrtio_ws2812::Protocol::WS2812B.midpoint_high_cycles(CLOCK_HZ))
}
