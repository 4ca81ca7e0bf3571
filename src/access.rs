//! Debug-only exclusive-access guard.
//!
//! Tables call back into user code only through their `SlotHasher`. The
//! guard makes sure such a callback cannot observe a table in the middle
//! of a set, delete or rebuild: in debug builds a nested entry panics, in
//! release builds the guard is a zero-sized no-op.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table access tracker. Public entry points start with
/// `let _g = self.access.enter();`.
#[derive(Debug)]
pub(crate) struct ExclusiveAccess {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    // Tables are single-owner; the raw pointer keeps them !Send + !Sync.
    _single_owner: PhantomData<*mut ()>,
}

impl ExclusiveAccess {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            _single_owner: PhantomData,
        }
    }

    /// Mark an operation as in progress until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> AccessGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.get(),
                "probe table re-entered while an operation was in progress"
            );
            self.active.set(true);
            AccessGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            AccessGuard { _z: PhantomData }
        }
    }
}

/// RAII guard returned by `ExclusiveAccess::enter`.
pub(crate) struct AccessGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ExclusiveAccess,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for AccessGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get());
            self.owner.active.set(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExclusiveAccess;

    /// Invariant: a dropped guard frees the tracker; entering while a guard
    /// is held panics in debug builds and is allowed in release builds.
    #[test]
    fn guard_releases_and_rejects_nesting() {
        let access = ExclusiveAccess::new();
        drop(access.enter());

        let held = access.enter();
        let nested = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _inner = access.enter();
        }));
        assert_eq!(nested.is_err(), cfg!(debug_assertions));

        drop(held);
        drop(access.enter());
    }
}
