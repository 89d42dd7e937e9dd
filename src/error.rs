//! Errors raised while deriving bit-cell timing.
//!
//! Transmission itself cannot fail. The only thing that can go wrong is a
//! clock/overhead combination that cannot produce valid symbols, and that is
//! caught when the timing constants are evaluated at build time.

use core::fmt;

/// Phase of a bit cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// High time shared by both symbols
    Base,
    /// Extra high time of symbol 1
    Delta,
    /// Trailing low time
    Low,
}

/// Transmitted symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Zero,
    One,
}

/// Error returned when a timing profile cannot be derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    /// Clock frequency is zero
    ClockOutOfRange,
    /// Instruction overhead is larger than the time available for a phase
    OverheadExceedsPhase(Phase),
    /// The realised high time of a symbol is outside the tolerance band
    SymbolOutOfTolerance(Symbol),
}

impl TimingError {
    /// Static description, usable from `const` contexts
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClockOutOfRange => "clock frequency must be non-zero",
            Self::OverheadExceedsPhase(Phase::Base) => "overhead exceeds base high time",
            Self::OverheadExceedsPhase(Phase::Delta) => "overhead exceeds symbol delta",
            Self::OverheadExceedsPhase(Phase::Low) => "overhead exceeds trailing low time",
            Self::SymbolOutOfTolerance(Symbol::Zero) => "symbol 0 high time out of tolerance",
            Self::SymbolOutOfTolerance(Symbol::One) => "symbol 1 high time out of tolerance",
        }
    }
}

impl fmt::Display for TimingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::error::Error for TimingError {}
