//! Simulated output for host-side checks
//!
//! [`SignalTrace`] stands in for the GPIO and the cycle counter. The encoder
//! drives a [`TracePin`] and waits on a [`TraceClock`]; the trace records every
//! level change with its cycle timestamp, so a frame can be inspected and
//! decoded the way a strip would read it.

use core::cell::RefCell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use heapless::Vec;

use crate::delay::{CycleDelay, Overhead};

/// A level change on the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Cycle the change happened at
    pub at: u64,
    /// Level after the change
    pub high: bool,
}

/// One bit cell as seen by the receiver, in cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub high: u64,
    pub low: u64,
}

#[derive(Debug)]
struct TraceState<const EDGES: usize> {
    now: u64,
    high: bool,
    edges: Vec<Edge, EDGES>,
    overflowed: bool,
}

impl<const EDGES: usize> TraceState<EDGES> {
    fn drive(&mut self, high: bool) {
        if self.high == high {
            return;
        }
        self.high = high;
        let edge = Edge { at: self.now, high };
        if self.edges.push(edge).is_err() {
            self.overflowed = true;
        }
    }
}

/// Recording of a single output line, holding up to `EDGES` level changes
///
/// The line starts low at cycle 0.
#[derive(Debug)]
pub struct SignalTrace<const EDGES: usize> {
    state: RefCell<TraceState<EDGES>>,
}

impl<const EDGES: usize> SignalTrace<EDGES> {
    pub const fn new() -> Self {
        Self {
            state: RefCell::new(TraceState {
                now: 0,
                high: false,
                edges: Vec::new(),
                overflowed: false,
            }),
        }
    }

    /// Output pin that records into this trace
    pub const fn pin(&self) -> TracePin<'_, EDGES> {
        TracePin { trace: self }
    }

    /// Cycle delay that advances this trace's clock
    pub const fn clock(&self) -> TraceClock<'_, EDGES> {
        TraceClock { trace: self }
    }

    /// Recorded level changes, oldest first
    pub fn edges(&self) -> Vec<Edge, EDGES> {
        self.state.borrow().edges.clone()
    }

    /// Cycles elapsed since the trace started
    pub fn elapsed(&self) -> u64 {
        self.state.borrow().now
    }

    /// Current line level
    pub fn is_high(&self) -> bool {
        self.state.borrow().high
    }

    /// Whether edges were dropped because the buffer was full
    pub fn overflowed(&self) -> bool {
        self.state.borrow().overflowed
    }

    /// Forget all edges and restart the clock, keeping the line level
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.now = 0;
        state.edges.clear();
        state.overflowed = false;
    }

    /// Split the recording into high/low pulses, one per bit cell
    ///
    /// The low time of the last pulse runs up to the current cycle, so it
    /// includes any latch hold.
    ///
    /// At most `M` pulses are returned. Pulses past `M`, the final one
    /// included, are dropped without a mark: compare the length against the
    /// expected cell count, or pick `M >= EDGES`, which never truncates.
    pub fn pulses<const M: usize>(&self) -> Vec<Pulse, M> {
        let state = self.state.borrow();
        let mut pulses = Vec::new();
        let mut rise: Option<u64> = None;
        let mut fall: Option<u64> = None;

        for edge in &state.edges {
            if edge.high {
                if let (Some(rise), Some(fall)) = (rise, fall) {
                    let pulse = Pulse {
                        high: fall - rise,
                        low: edge.at - fall,
                    };
                    if pulses.push(pulse).is_err() {
                        return pulses;
                    }
                }
                rise = Some(edge.at);
                fall = None;
            } else if rise.is_some() {
                fall = Some(edge.at);
            }
        }

        let last = match (rise, fall) {
            (Some(rise), Some(fall)) => Some(Pulse {
                high: fall - rise,
                low: state.now - fall,
            }),
            (Some(rise), None) => Some(Pulse {
                high: state.now - rise,
                low: 0,
            }),
            _ => None,
        };
        if let Some(pulse) = last {
            // Full buffer truncates, same as above.
            let _ = pulses.push(pulse);
        }
        pulses
    }

    /// Read the recording back into bytes, MSB first
    ///
    /// A pulse whose high time is at least `threshold` cycles is a one.
    /// Trailing bits that do not complete a byte are dropped, as are bytes
    /// past `M`.
    pub fn decode<const M: usize>(&self, threshold: u64) -> Vec<u8, M> {
        let mut bytes = Vec::new();
        let mut current = 0u8;
        let mut bits = 0;

        // Each cell starts with a rising edge, so EDGES bounds the cell count.
        for pulse in &self.pulses::<EDGES>() {
            current = (current << 1) | u8::from(pulse.high >= threshold);
            bits += 1;
            if bits == 8 {
                if bytes.push(current).is_err() {
                    break;
                }
                current = 0;
                bits = 0;
            }
        }
        bytes
    }
}

impl<const EDGES: usize> Default for SignalTrace<EDGES> {
    fn default() -> Self {
        Self::new()
    }
}

/// Output pin half of a [`SignalTrace`]
#[derive(Debug, Clone, Copy)]
pub struct TracePin<'a, const EDGES: usize> {
    trace: &'a SignalTrace<EDGES>,
}

impl<const EDGES: usize> ErrorType for TracePin<'_, EDGES> {
    type Error = Infallible;
}

impl<const EDGES: usize> OutputPin for TracePin<'_, EDGES> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.trace.state.borrow_mut().drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.trace.state.borrow_mut().drive(true);
        Ok(())
    }
}

/// Cycle clock half of a [`SignalTrace`]
///
/// Pin writes take no time here, so the encoder runs with
/// [`Overhead::NONE`].
#[derive(Debug, Clone, Copy)]
pub struct TraceClock<'a, const EDGES: usize> {
    trace: &'a SignalTrace<EDGES>,
}

impl<const EDGES: usize> CycleDelay for TraceClock<'_, EDGES> {
    const OVERHEAD: Overhead = Overhead::NONE;

    fn delay_cycles(&mut self, cycles: u32) {
        self.trace.state.borrow_mut().now += u64::from(cycles);
    }
}
