//! WS2812B bit-cell timing
//!
//! The protocol encodes every bit as a fixed-length cell that starts high:
//!
//! ```text
//! symbol 0:  ‾‾‾‾‾|________________     T0H high, rest low
//! symbol 1:  ‾‾‾‾‾‾‾‾‾‾‾|__________     T1H high, rest low
//!            |base|delta|   low   |
//! ```
//!
//! The encoder drives the line high, holds for `base`, drops it early for a
//! zero, holds for `delta`, drops it unconditionally and holds for `low`.
//! All three holds are derived here from the clock frequency, with the
//! encoder's own instruction overhead subtracted, so that each cell lasts
//! exactly one bit period.

use crate::delay::Overhead;
use crate::error::{Phase, Symbol, TimingError};

const NS_PER_SECOND: u64 = 1_000_000_000;

/// Nanosecond constants of a single-wire LED protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protocol {
    /// Nominal high time of symbol 0
    pub t0h_ns: u32,
    /// Nominal high time of symbol 1
    pub t1h_ns: u32,
    /// Nominal bit cell length
    pub period_ns: u32,
    /// Allowed deviation of either high time
    pub tolerance_ns: u32,
    /// Minimum low time that latches the frame
    pub reset_ns: u32,
}

impl Protocol {
    /// WS2812B datasheet figures
    pub const WS2812B: Self = Self {
        t0h_ns: 400,
        t1h_ns: 850,
        period_ns: 1250,
        tolerance_ns: 150,
        reset_ns: 50_000,
    };

    /// High time halfway between the two symbols, in cycles
    ///
    /// A receiver sampling at this point reads a one for any high pulse
    /// at least this long.
    pub const fn midpoint_high_cycles(self, clock_hz: u32) -> u32 {
        cycles_for_ns((self.t0h_ns + self.t1h_ns) / 2, clock_hz)
    }
}

/// Convert nanoseconds to clock cycles, rounding to the nearest cycle
#[allow(clippy::cast_possible_truncation)]
pub const fn cycles_for_ns(ns: u32, clock_hz: u32) -> u32 {
    ((ns as u64 * clock_hz as u64 + NS_PER_SECOND / 2) / NS_PER_SECOND) as u32
}

/// Convert nanoseconds to clock cycles, rounding up
///
/// For minimum holds: the result never lasts less than `ns`.
#[allow(clippy::cast_possible_truncation)]
pub const fn cycles_for_ns_ceil(ns: u32, clock_hz: u32) -> u32 {
    (ns as u64 * clock_hz as u64).div_ceil(NS_PER_SECOND) as u32
}

/// Whether `cycles` at `clock_hz` lands within `tolerance_ns` of `nominal_ns`
const fn within_tolerance(cycles: u32, nominal_ns: u32, tolerance_ns: u32, clock_hz: u32) -> bool {
    // Compare in units of ns * Hz to stay in integers.
    let realised = cycles as u64 * NS_PER_SECOND;
    let nominal = nominal_ns as u64 * clock_hz as u64;
    let deviation = realised.abs_diff(nominal);
    deviation <= tolerance_ns as u64 * clock_hz as u64
}

/// Cycle counts of one bit cell, after overhead correction
///
/// Only [`BitTiming::derive`] builds one, so the clock is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTiming {
    base: u32,
    delta: u32,
    low: u32,
    reset: u32,
    overhead: Overhead,
    clock_hz: u32,
}

impl BitTiming {
    /// Derive the WS2812B profile, failing the build on an invalid clock
    ///
    /// Meant for associated constants: a bad combination turns into a
    /// compile-time panic.
    pub const fn from_clock(clock_hz: u32, overhead: Overhead) -> Self {
        match Self::derive(Protocol::WS2812B, clock_hz, overhead) {
            Ok(timing) => timing,
            Err(err) => panic!("{}", err.as_str()),
        }
    }

    /// Derive a profile for `protocol` at `clock_hz`
    pub const fn derive(
        protocol: Protocol,
        clock_hz: u32,
        overhead: Overhead,
    ) -> Result<Self, TimingError> {
        if clock_hz == 0 {
            return Err(TimingError::ClockOutOfRange);
        }

        let t0h = cycles_for_ns(protocol.t0h_ns, clock_hz);
        let t1h = cycles_for_ns(protocol.t1h_ns, clock_hz);
        let period = cycles_for_ns(protocol.period_ns, clock_hz);

        if !within_tolerance(t0h, protocol.t0h_ns, protocol.tolerance_ns, clock_hz) {
            return Err(TimingError::SymbolOutOfTolerance(Symbol::Zero));
        }
        if !within_tolerance(t1h, protocol.t1h_ns, protocol.tolerance_ns, clock_hz) {
            return Err(TimingError::SymbolOutOfTolerance(Symbol::One));
        }

        let Some(base) = t0h.checked_sub(overhead.high) else {
            return Err(TimingError::OverheadExceedsPhase(Phase::Base));
        };
        let Some(delta) = t1h.saturating_sub(t0h).checked_sub(overhead.delta) else {
            return Err(TimingError::OverheadExceedsPhase(Phase::Delta));
        };
        let Some(low) = period.saturating_sub(t1h).checked_sub(overhead.low) else {
            return Err(TimingError::OverheadExceedsPhase(Phase::Low));
        };

        Ok(Self {
            base,
            delta,
            low,
            reset: cycles_for_ns_ceil(protocol.reset_ns, clock_hz),
            overhead,
            clock_hz,
        })
    }

    /// Hold after driving high, common to both symbols
    pub const fn base(self) -> u32 {
        self.base
    }

    /// Extra hold that separates symbol 1 from symbol 0
    pub const fn delta(self) -> u32 {
        self.delta
    }

    /// Trailing low hold that completes the cell
    pub const fn low(self) -> u32 {
        self.low
    }

    /// Low hold that latches the frame, never shorter than the reset time
    pub const fn reset(self) -> u32 {
        self.reset
    }

    /// Instruction overhead already subtracted from the holds
    pub const fn overhead(self) -> Overhead {
        self.overhead
    }

    pub const fn clock_hz(self) -> u32 {
        self.clock_hz
    }

    /// High time of `symbol` as seen on the wire, in cycles
    pub const fn symbol_high_cycles(self, symbol: Symbol) -> u32 {
        let zero = self.base + self.overhead.high;
        match symbol {
            Symbol::Zero => zero,
            Symbol::One => zero + self.delta + self.overhead.delta,
        }
    }

    /// Full bit cell length, in cycles
    pub const fn period_cycles(self) -> u32 {
        self.base + self.delta + self.low + self.overhead.total()
    }

    /// Convert a cycle count at this profile's clock to nanoseconds
    #[allow(clippy::cast_possible_truncation)]
    pub const fn cycles_to_ns(self, cycles: u32) -> u32 {
        (cycles as u64 * NS_PER_SECOND / self.clock_hz as u64) as u32
    }
}
