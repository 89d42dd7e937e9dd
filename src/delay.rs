//! Fixed-cycle busy waits
//!
//! The encoder never measures time. Every hold inside a bit cell is a
//! compile-time constant handed to [`CycleDelay::delay_cycles`], and the
//! implementation must burn exactly that many cycles on every call.

/// Cycles spent by the encoder's own instructions in each phase of a bit cell.
///
/// These are subtracted from the protocol durations so that the
/// total cell length matches the nominal bit period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overhead {
    /// Cycles between driving the pin high and the base hold
    pub high: u32,
    /// Cycles spent on the conditional low and the bit shift
    pub delta: u32,
    /// Cycles spent on the unconditional low and the loop branch
    pub low: u32,
}

impl Overhead {
    /// No instruction overhead, used by simulated backends
    pub const NONE: Self = Self::new(0, 0, 0);

    /// AVR `sbi` / `sbrs` + `cbi` + `lsl` / `cbi` + `dec` + `brne` budget
    pub const AVR: Self = Self::new(2, 4, 2);

    pub const fn new(high: u32, delta: u32, low: u32) -> Self {
        Self { high, delta, low }
    }

    /// Total overhead of one bit cell
    pub const fn total(self) -> u32 {
        self.high + self.delta + self.low
    }
}

/// Busy-wait for an exact number of clock cycles
///
/// Implementations must take the same number of cycles for a given argument
/// on every call, with no data-dependent branching. The encoder only ever
/// passes compile-time constants, so an `#[inline(always)]` body lets the
/// compiler fold the wait into a straight-line sequence.
pub trait CycleDelay {
    /// Instruction overhead of the encoder loop on this target
    const OVERHEAD: Overhead;

    /// Spin for `cycles` clock cycles
    fn delay_cycles(&mut self, cycles: u32);
}

/// Cycles taken by one iteration of `SpinDelay`'s countdown loop
///
/// `subs` (1) plus a taken `bne` (2) on Cortex-M0+ running from
/// zero-wait-state memory. Cores with a longer branch penalty or flash wait
/// states need their own [`CycleDelay`].
pub const CYCLES_PER_LOOP: u32 = 3;

// The nop padding in `SpinDelay` covers remainders up to 3.
const _: () = assert!(CYCLES_PER_LOOP <= 4);

/// How a hold is split between countdown iterations and single `nop`s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinPlan {
    pub loops: u32,
    /// Remainder, always below `cycles_per_loop`
    pub nops: u32,
}

impl SpinPlan {
    pub const fn new(cycles: u32, cycles_per_loop: u32) -> Self {
        if cycles_per_loop == 0 {
            return Self {
                loops: 0,
                nops: cycles,
            };
        }
        Self {
            loops: cycles / cycles_per_loop,
            nops: cycles % cycles_per_loop,
        }
    }

    /// Cycles the plan takes at `cycles_per_loop`
    pub const fn cycles(self, cycles_per_loop: u32) -> u32 {
        self.loops * cycles_per_loop + self.nops
    }
}

/// Calibrated countdown loop for Cortex-M0+
///
/// A hold of `cycles` runs `cycles / CYCLES_PER_LOOP` loop iterations and
/// pads the remainder with `nop`s. Loading the counter costs the cycle the
/// final untaken branch saves, as long as the count fits a `movs`
/// immediate (below 256 iterations). Longer holds only occur for the latch,
/// which may run a cycle long.
///
/// The encoder's own overhead is supplied by the integrator, after
/// checking the output against a logic analyzer:
///
/// ```ignore
/// type Rp2040Spin = SpinDelay<3, 5, 4>;
/// ```
#[cfg(target_arch = "arm")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinDelay<const HIGH: u32, const DELTA: u32, const LOW: u32>;

#[cfg(target_arch = "arm")]
impl<const HIGH: u32, const DELTA: u32, const LOW: u32> SpinDelay<HIGH, DELTA, LOW> {
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "arm")]
impl<const HIGH: u32, const DELTA: u32, const LOW: u32> CycleDelay
    for SpinDelay<HIGH, DELTA, LOW>
{
    const OVERHEAD: Overhead = Overhead::new(HIGH, DELTA, LOW);

    #[inline(always)]
    fn delay_cycles(&mut self, cycles: u32) {
        let plan = SpinPlan::new(cycles, CYCLES_PER_LOOP);
        if plan.loops > 0 {
            countdown(plan.loops);
        }
        if plan.nops & 1 != 0 {
            nop();
        }
        if plan.nops & 2 != 0 {
            nop();
            nop();
        }
    }
}

#[cfg(target_arch = "arm")]
#[inline(always)]
fn countdown(loops: u32) {
    // SAFETY: register-only loop, r0 is declared clobbered.
    unsafe {
        core::arch::asm!(
            "2:",
            "subs r0, #1",
            "bne 2b",
            inout("r0") loops => _,
            options(nomem, nostack),
        );
    }
}

#[cfg(target_arch = "arm")]
#[inline(always)]
fn nop() {
    // SAFETY: no operands, no side effects.
    unsafe {
        core::arch::asm!("nop", options(nomem, nostack, preserves_flags));
    }
}
