#![forbid(unsafe_code)]

//! Lazily recomputed values derived from [`Observable`] sources.
//!
//! # Design
//!
//! [`Derived<T>`] holds a recompute closure, a cached result, and a stale
//! flag. A write to any source marks the value stale through a weak
//! back-reference; the next read recomputes and re-caches. Nothing is
//! pushed to the derived value's readers: it has no subscribers of its
//! own, it is a memoized pull.
//!
//! # Invariants
//!
//! 1. A read never returns a result inconsistent with the current source
//!    values.
//! 2. The recompute closure runs at most once per source change.
//! 3. A clean read is O(1).
//!
//! # Failure Modes
//!
//! If a source cell is dropped, its staleness subscription becomes inert:
//! the derived value keeps serving the last cached result.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::observable::{Observable, Subscription};

/// Shared interior for [`Derived<T>`].
struct DerivedInner<T> {
    recompute: Box<dyn Fn() -> T>,
    cached: RefCell<Option<T>>,
    stale: Cell<bool>,
    /// Source subscriptions; never read, but dropping them would detach
    /// staleness tracking.
    deps: RefCell<Vec<Subscription>>,
}

/// A memoized value computed from one or two observable cells.
///
/// Cloning a `Derived` creates a new handle to the **same** cached value.
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Derived<T> {
    /// Derive from a single source cell.
    pub fn map<S: Clone + 'static>(
        source: &Observable<S>,
        f: impl Fn(&S) -> T + 'static,
    ) -> Self {
        let source_handle = source.clone();
        let derived = Self::with_recompute(move || source_handle.with(|v| f(v)));
        derived.track(source);
        derived
    }

    /// Derive from two source cells.
    pub fn zip<A, B>(
        a: &Observable<A>,
        b: &Observable<B>,
        f: impl Fn(&A, &B) -> T + 'static,
    ) -> Self
    where
        A: Clone + 'static,
        B: Clone + 'static,
    {
        let a_handle = a.clone();
        let b_handle = b.clone();
        let derived = Self::with_recompute(move || a_handle.with(|va| b_handle.with(|vb| f(va, vb))));
        derived.track(a);
        derived.track(b);
        derived
    }

    fn with_recompute(recompute: impl Fn() -> T + 'static) -> Self {
        Self {
            inner: Rc::new(DerivedInner {
                recompute: Box::new(recompute),
                cached: RefCell::new(None),
                stale: Cell::new(true), // force the first read to compute
                deps: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Subscribe to `source` so its writes mark this value stale. The
    /// back-reference is weak: the subscription never keeps the derived
    /// value alive.
    fn track<S: Clone + 'static>(&self, source: &Observable<S>) {
        let weak = Rc::downgrade(&self.inner);
        let sub = source.subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.stale.set(true);
            }
        });
        self.inner.deps.borrow_mut().push(sub);
    }

    fn refresh(&self) {
        if self.inner.stale.get() || self.inner.cached.borrow().is_none() {
            let value = (self.inner.recompute)();
            *self.inner.cached.borrow_mut() = Some(value);
            self.inner.stale.set(false);
        }
    }

    /// Current value, recomputing first if any source has changed.
    #[must_use]
    pub fn get(&self) -> T {
        self.refresh();
        self.inner
            .cached
            .borrow()
            .as_ref()
            .expect("cached is Some after refresh")
            .clone()
    }

    /// Access the current value by reference, recomputing first if stale.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.refresh();
        let cached = self.inner.cached.borrow();
        f(cached.as_ref().expect("cached is Some after refresh"))
    }

    /// Whether the next read will recompute.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.inner.stale.get()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived")
            .field("cached", &self.inner.cached.borrow())
            .field("stale", &self.inner.stale.get())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_follows_source() {
        let depth = Observable::new(2u32);
        let label = Derived::map(&depth, |d| format!("depth {d}"));
        assert_eq!(label.get(), "depth 2");

        depth.set(6);
        assert!(label.is_stale());
        assert_eq!(label.get(), "depth 6");
    }

    #[test]
    fn zip_combines_two_sources() {
        let show = Observable::new(true);
        let depth = Observable::new(3u32);
        let summary = Derived::zip(&show, &depth, |s, d| if *s { *d } else { 0 });
        assert_eq!(summary.get(), 3);

        show.set(false);
        assert_eq!(summary.get(), 0);

        show.set(true);
        depth.set(8);
        assert_eq!(summary.get(), 8);
    }

    #[test]
    fn memoizes_between_source_changes() {
        let runs = Rc::new(Cell::new(0u32));
        let runs_clone = Rc::clone(&runs);
        let source = Observable::new(10);
        let doubled = Derived::map(&source, move |v| {
            runs_clone.set(runs_clone.get() + 1);
            v * 2
        });

        assert_eq!(doubled.get(), 20);
        assert_eq!(doubled.get(), 20);
        assert_eq!(runs.get(), 1);

        source.set(11);
        assert_eq!(doubled.get(), 22);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn lazy_until_first_read() {
        let runs = Rc::new(Cell::new(0u32));
        let runs_clone = Rc::clone(&runs);
        let source = Observable::new(1);
        let derived = Derived::map(&source, move |v| {
            runs_clone.set(runs_clone.get() + 1);
            *v
        });

        source.set(2);
        source.set(3);
        assert_eq!(runs.get(), 0);

        assert_eq!(derived.get(), 3);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn survives_source_drop() {
        let derived;
        {
            let source = Observable::new(41);
            derived = Derived::map(&source, |v| v + 1);
            assert_eq!(derived.get(), 42);
        }
        assert!(!derived.is_stale());
        assert_eq!(derived.get(), 42);
    }

    #[test]
    fn clone_shares_cache() {
        let source = Observable::new(1);
        let a = Derived::map(&source, |v| *v);
        let b = a.clone();
        assert_eq!(a.get(), 1);
        assert!(!b.is_stale());

        source.set(2);
        assert!(b.is_stale());
        assert_eq!(b.get(), 2);
        assert!(!a.is_stale());
    }

    #[test]
    fn with_access() {
        let source = Observable::new(vec![1, 2, 3]);
        let total = Derived::map(&source, |v| v.iter().sum::<i32>());
        assert_eq!(total.with(|t| *t), 6);
    }
}
