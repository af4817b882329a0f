//! Single-threaded one-shot deferred values for asynchronous interceptors.
//!
//! A [`Deferred`] is the promise half of an interceptor decision: the hook
//! returns it immediately, the mutation controller attaches a continuation,
//! and the host resolves (or rejects) it later from the same event loop.
//!
//! # Invariants
//!
//! 1. A deferred settles at most once: the first `resolve`/`reject` wins and
//!    later settles are ignored.
//! 2. The continuation runs at most once, at settle time — immediately if
//!    the value is already resolved when it is attached.
//! 3. Rejection silently drops the continuation: a cancelled confirmation is
//!    a veto, not an error.
//! 4. An unsettled deferred stalls only its own pending mutation; no
//!    timeout is applied.

use std::cell::RefCell;
use std::rc::Rc;

enum Slot<T> {
    /// No value, no continuation yet.
    Pending,
    /// Continuation attached, waiting for a settle.
    Waiting(Box<dyn FnOnce(T)>),
    /// Value arrived before the continuation.
    Resolved(T),
    /// Settled: rejected, or already delivered.
    Settled,
}

/// A one-shot, single-threaded deferred value.
pub struct Deferred<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deferred<T> {
    /// Create an unsettled deferred.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Pending)),
        }
    }

    /// Resolve with a value, running the attached continuation if any.
    ///
    /// Ignored if the deferred has already settled.
    pub fn resolve(&self, value: T) {
        let state = {
            let mut slot = self.slot.borrow_mut();
            std::mem::replace(&mut *slot, Slot::Settled)
        };
        match state {
            Slot::Pending => *self.slot.borrow_mut() = Slot::Resolved(value),
            // Continuation runs with the borrow released; it may re-enter.
            Slot::Waiting(run) => run(value),
            Slot::Resolved(first) => *self.slot.borrow_mut() = Slot::Resolved(first),
            Slot::Settled => {}
        }
    }

    /// Reject: drop any attached continuation without running it.
    ///
    /// Ignored if the deferred has already resolved.
    pub fn reject(&self) {
        let mut slot = self.slot.borrow_mut();
        if matches!(*slot, Slot::Pending | Slot::Waiting(_)) {
            *slot = Slot::Settled;
        }
    }

    /// Whether the deferred is still awaiting a settle or a continuation.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(*self.slot.borrow(), Slot::Pending | Slot::Waiting(_))
    }

    /// Attach the continuation. Only one continuation is honored; the first
    /// attach wins.
    pub(crate) fn on_settle(&self, run: impl FnOnce(T) + 'static) {
        let state = {
            let mut slot = self.slot.borrow_mut();
            std::mem::replace(&mut *slot, Slot::Settled)
        };
        match state {
            Slot::Pending => *self.slot.borrow_mut() = Slot::Waiting(Box::new(run)),
            Slot::Resolved(value) => run(value),
            Slot::Waiting(first) => *self.slot.borrow_mut() = Slot::Waiting(first),
            Slot::Settled => {}
        }
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match *self.slot.borrow() {
            Slot::Pending => "pending",
            Slot::Waiting(_) => "waiting",
            Slot::Resolved(_) => "resolved",
            Slot::Settled => "settled",
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn attach_then_resolve_runs_continuation() {
        let seen = Rc::new(Cell::new(0));
        let d = Deferred::new();
        let s = Rc::clone(&seen);
        d.on_settle(move |v| s.set(v));
        assert!(d.is_pending());

        d.resolve(42);
        assert_eq!(seen.get(), 42);
        assert!(!d.is_pending());
    }

    #[test]
    fn resolve_then_attach_runs_immediately() {
        let seen = Rc::new(Cell::new(0));
        let d = Deferred::new();
        d.resolve(7);

        let s = Rc::clone(&seen);
        d.on_settle(move |v| s.set(v));
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn reject_drops_continuation_silently() {
        let ran = Rc::new(Cell::new(false));
        let d = Deferred::<i32>::new();
        let r = Rc::clone(&ran);
        d.on_settle(move |_| r.set(true));

        d.reject();
        assert!(!ran.get());
        assert!(!d.is_pending());

        // A late resolve after rejection is ignored.
        d.resolve(1);
        assert!(!ran.get());
    }

    #[test]
    fn second_resolve_is_ignored() {
        let seen = Rc::new(Cell::new(0));
        let d = Deferred::new();
        d.resolve(1);
        d.resolve(2);

        let s = Rc::clone(&seen);
        d.on_settle(move |v| s.set(v));
        assert_eq!(seen.get(), 1, "first settle wins");
    }

    #[test]
    fn reject_after_resolve_is_ignored() {
        let seen = Rc::new(Cell::new(0));
        let d = Deferred::new();
        d.resolve(5);
        d.reject();

        let s = Rc::clone(&seen);
        d.on_settle(move |v| s.set(v));
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn clones_share_the_slot() {
        let seen = Rc::new(Cell::new(0));
        let d = Deferred::new();
        let d2 = d.clone();

        let s = Rc::clone(&seen);
        d.on_settle(move |v| s.set(v));
        d2.resolve(9);
        assert_eq!(seen.get(), 9);
    }

    #[test]
    fn continuation_runs_at_most_once() {
        let count = Rc::new(Cell::new(0));
        let d = Deferred::new();
        let c = Rc::clone(&count);
        d.on_settle(move |_: i32| c.set(c.get() + 1));

        d.resolve(1);
        d.resolve(2);
        assert_eq!(count.get(), 1);
    }
}
