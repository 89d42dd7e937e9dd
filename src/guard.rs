//! Scoped interrupt masking
//!
//! Any preemption longer than the protocol's low-time tolerance in the middle
//! of a bit cell looks like a reset to the strip. The encoder therefore runs
//! a whole frame inside an [`InterruptGuard`], which remembers whether
//! interrupts were enabled on entry and puts that state back when dropped.

use core::marker::PhantomData;

use critical_section::RestoreState;

/// Interrupts stay masked while this guard is alive
///
/// Built on `critical-section`, so the actual mask/unmask is provided by
/// whichever HAL registers the critical section implementation.
#[must_use = "interrupts are restored as soon as the guard is dropped"]
pub struct InterruptGuard {
    restore: RestoreState,
    // Restoring must happen on the core that masked.
    _not_send: PhantomData<*mut ()>,
}

impl InterruptGuard {
    /// Mask interrupts, remembering the previous state
    #[inline(always)]
    pub(crate) fn acquire() -> Self {
        // SAFETY: the matching `release` runs in `Drop`, and guards are only
        // created in lexical scopes inside this crate, so releases happen in
        // reverse order of acquisition.
        let restore = unsafe { critical_section::acquire() };
        Self {
            restore,
            _not_send: PhantomData,
        }
    }
}

impl Drop for InterruptGuard {
    #[inline(always)]
    fn drop(&mut self) {
        // SAFETY: `restore` came from the `acquire` in `InterruptGuard::acquire`.
        unsafe { critical_section::release(self.restore) }
    }
}
