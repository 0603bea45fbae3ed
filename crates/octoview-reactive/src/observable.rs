#![forbid(unsafe_code)]

//! Observable value cells with synchronous change notification.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a single value in shared, reference-counted
//! storage together with a list of subscriber callbacks. [`set()`]
//! replaces the value and synchronously invokes every live subscriber with
//! the new value, run-to-completion on the calling thread. There is no
//! equality short-circuit: callers that want change-only delivery compare
//! in their observer.
//!
//! [`subscribe()`] registers a callback and immediately invokes it with
//! the current value, so an observer never starts out blind. It returns a
//! [`Subscription`] guard; dropping the guard (or calling
//! [`Subscription::unsubscribe`]) permanently deregisters that one
//! observer.
//!
//! # Invariants
//!
//! 1. `get()` after the last `set()` returns the last value set.
//! 2. Subscribers are notified in registration order.
//! 3. `version()` increments by exactly 1 per `set()`.
//! 4. A removed subscriber is never invoked again, even when removal
//!    happens in the middle of a delivery pass for the same cell.
//!
//! # Failure Modes
//!
//! Every operation is total; none has an error path. An observer that
//! panics aborts the remaining delivery pass (the value is already
//! stored, so reads stay consistent).
//!
//! [`set()`]: Observable::set
//! [`subscribe()`]: Observable::subscribe

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

/// One registered observer. The id is unique per cell for the cell's
/// lifetime and is what [`Subscription`] removes.
struct Slot<T> {
    id: u64,
    callback: Rc<dyn Fn(&T)>,
}

/// Shared interior for [`Observable<T>`].
struct ObservableInner<T> {
    value: T,
    /// Monotonically increasing, bumped on each `set`.
    version: u64,
    /// Next subscriber id; never reused.
    next_id: u64,
    /// Live subscribers in registration order.
    subscribers: Vec<Slot<T>>,
}

/// A shared, mutable value that notifies subscribers on every write.
///
/// Cloning an `Observable` creates a new handle to the **same** cell.
///
/// ```
/// use octoview_reactive::Observable;
///
/// let depth = Observable::new(1u32);
/// depth.set(5);
/// assert_eq!(depth.get(), 5);
/// ```
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T> Observable<T> {
    /// Create a cell holding `initial`. Always succeeds.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value: initial,
                version: 0,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Access the current value by reference without cloning. Safe to
    /// call from inside an observer: the value borrow is released before
    /// callbacks run.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Current version number. Increments by 1 on each `set`.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of currently registered observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Return a clone of the current value. No side effects.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replace the value and synchronously notify every live subscriber
    /// with the new value.
    ///
    /// Notification is unconditional: setting a value equal to the
    /// current one still delivers one call per observer. Subscribers run
    /// in registration order on the calling thread; the value borrow is
    /// released first, so observers may freely `get()` or `set()` this
    /// cell (a reentrant `set` takes effect for deliveries *after* the
    /// current pass completes its snapshot value).
    pub fn set(&self, value: T) {
        let (current, ids) = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value;
            inner.version += 1;
            let ids: Vec<u64> = inner.subscribers.iter().map(|s| s.id).collect();
            trace!(
                version = inner.version,
                subscribers = ids.len(),
                "observable set"
            );
            (inner.value.clone(), ids)
        };
        self.deliver(&current, &ids);
    }

    /// Read-modify-write convenience: `set(f(&current))`.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.inner.borrow().value);
        self.set(next);
    }

    /// Register an observer.
    ///
    /// The observer is invoked immediately with the current value, then
    /// once per `set` until the returned [`Subscription`] is dropped.
    #[must_use]
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<dyn Fn(&T)> = Rc::new(observer);
        let (id, current) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push(Slot {
                id,
                callback: Rc::clone(&callback),
            });
            trace!(id, subscribers = inner.subscribers.len(), "subscribe");
            (id, inner.value.clone())
        };
        // Immediate delivery, outside the borrow.
        callback(&current);

        let weak: Weak<RefCell<ObservableInner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(strong) = weak.upgrade() {
                strong.borrow_mut().subscribers.retain(|s| s.id != id);
            }
        })
    }

    /// Invoke each of `ids` that is still subscribed, re-checking
    /// liveness before every call so a mid-pass unsubscribe (by an
    /// earlier observer) suppresses delivery.
    fn deliver(&self, current: &T, ids: &[u64]) {
        for &id in ids {
            let callback = {
                let inner = self.inner.borrow();
                inner
                    .subscribers
                    .iter()
                    .find(|s| s.id == id)
                    .map(|s| Rc::clone(&s.callback))
            };
            if let Some(callback) = callback {
                callback(current);
            }
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// RAII guard for one registered observer.
///
/// Dropping the guard permanently removes the observer from its cell.
/// The guard is type-erased so subscriptions to cells of different value
/// types can live in one collection.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Explicitly remove the observer now. Equivalent to dropping the
    /// guard; provided for call sites where the intent should be visible.
    pub fn unsubscribe(self) {
        // Drop runs the cancel closure.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_returns_initial() {
        let cell = Observable::new(42);
        assert_eq!(cell.get(), 42);
        assert_eq!(cell.version(), 0);
    }

    #[test]
    fn last_write_wins() {
        let cell = Observable::new(0);
        cell.set(1);
        cell.set(2);
        cell.set(3);
        assert_eq!(cell.get(), 3);
        assert_eq!(cell.version(), 3);
    }

    #[test]
    fn subscribe_delivers_current_value_immediately() {
        let cell = Observable::new(7);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = cell.subscribe(move |v| seen_clone.borrow_mut().push(*v));
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn set_notifies_each_subscriber_once() {
        let cell = Observable::new(0);
        let a = Rc::new(Cell::new(0u32));
        let b = Rc::new(Cell::new(0u32));
        let a_clone = Rc::clone(&a);
        let b_clone = Rc::clone(&b);
        let _sa = cell.subscribe(move |_| a_clone.set(a_clone.get() + 1));
        let _sb = cell.subscribe(move |_| b_clone.set(b_clone.get() + 1));
        assert_eq!((a.get(), b.get()), (1, 1)); // immediate deliveries

        cell.set(1);
        assert_eq!((a.get(), b.get()), (2, 2));
    }

    #[test]
    fn equal_value_still_notifies() {
        let cell = Observable::new(42);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = cell.subscribe(move |_| count_clone.set(count_clone.get() + 1));
        assert_eq!(count.get(), 1);

        cell.set(42);
        assert_eq!(count.get(), 2);
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn notification_in_registration_order() {
        let cell = Observable::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        let _s1 = cell.subscribe(move |_| o1.borrow_mut().push("first"));
        let _s2 = cell.subscribe(move |_| o2.borrow_mut().push("second"));
        order.borrow_mut().clear();

        cell.set(1);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let cell = Observable::new(false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let sub = cell.subscribe(move |v| seen_clone.borrow_mut().push(*v));
        assert_eq!(*seen.borrow(), vec![false]);

        cell.set(true);
        assert_eq!(*seen.borrow(), vec![false, true]);

        sub.unsubscribe();
        cell.set(false);
        assert_eq!(*seen.borrow(), vec![false, true]);
        assert!(!cell.get());
    }

    #[test]
    fn drop_is_unsubscribe() {
        let cell = Observable::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        {
            let _sub = cell.subscribe(move |_| count_clone.set(count_clone.get() + 1));
            cell.set(1);
        }
        assert_eq!(count.get(), 2);
        assert_eq!(cell.subscriber_count(), 0);

        cell.set(2);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn unsubscribe_mid_delivery_suppresses_later_call() {
        // First observer drops the second's subscription while the pass
        // for the same set() is still running; the second must not fire.
        let cell = Observable::new(0);
        let second_sub: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let second_hits = Rc::new(Cell::new(0u32));

        let slot = Rc::clone(&second_sub);
        let _first = cell.subscribe(move |v| {
            if *v == 1 {
                slot.borrow_mut().take();
            }
        });

        let hits = Rc::clone(&second_hits);
        *second_sub.borrow_mut() = Some(cell.subscribe(move |_| hits.set(hits.get() + 1)));
        assert_eq!(second_hits.get(), 1); // immediate delivery

        cell.set(1);
        assert_eq!(second_hits.get(), 1);
        assert_eq!(cell.subscriber_count(), 1);
    }

    #[test]
    fn observer_may_read_cell_during_delivery() {
        let cell = Observable::new(5);
        let observed = Rc::new(Cell::new(0));
        let cell_clone = cell.clone();
        let observed_clone = Rc::clone(&observed);
        let _sub = cell.subscribe(move |_| observed_clone.set(cell_clone.get()));

        cell.set(9);
        assert_eq!(observed.get(), 9);
    }

    #[test]
    fn update_reads_then_sets() {
        let cell = Observable::new(10u32);
        cell.update(|v| v + 1);
        assert_eq!(cell.get(), 11);
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn clone_shares_the_cell() {
        let a = Observable::new(String::from("one"));
        let b = a.clone();
        b.set(String::from("two"));
        assert_eq!(a.get(), "two");
        assert_eq!(a.version(), b.version());
    }

    #[test]
    fn cells_are_independent() {
        let x = Observable::new(0);
        let y = Observable::new(0);
        let x_hits = Rc::new(Cell::new(0u32));
        let x_hits_clone = Rc::clone(&x_hits);
        let _sub = x.subscribe(move |_| x_hits_clone.set(x_hits_clone.get() + 1));

        y.set(99);
        assert_eq!(x_hits.get(), 1); // only the immediate delivery
        assert_eq!(x.version(), 0);
    }

    #[test]
    fn unsubscribe_after_cell_dropped_is_inert() {
        let sub;
        {
            let cell = Observable::new(1);
            sub = cell.subscribe(|_| {});
        }
        // Cell is gone; dropping the guard must not panic.
        sub.unsubscribe();
    }

    #[test]
    fn set_with_no_subscribers_still_bumps_version() {
        let cell = Observable::new(0);
        cell.set(1);
        cell.set(2);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn debug_format() {
        let cell = Observable::new(3);
        let _sub = cell.subscribe(|_| {});
        let dbg = format!("{cell:?}");
        assert!(dbg.contains("Observable"));
        assert!(dbg.contains('3'));
    }
}
