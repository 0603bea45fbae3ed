#![forbid(unsafe_code)]

//! Reactive state primitives for the OctoView viewer.
//!
//! This crate provides the change-tracking cells the viewer's UI state is
//! built from:
//!
//! - [`Observable`]: a shared, version-tracked value wrapper that notifies
//!   subscriber callbacks on every write.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - [`Derived`]: a lazily-evaluated, memoized value computed from one or
//!   two `Observable` sources.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership: cloning an `Observable` clones the handle, not the value.
//! All access is assumed to originate from one logical thread of control
//! (the UI thread); nothing here is `Send`.
//!
//! `Derived<T>` subscribes to its sources via [`Observable::subscribe`],
//! marking itself stale on change. Recomputation is deferred until read.
//!
//! # Invariants
//!
//! 1. A read after the last write returns the last value written.
//! 2. Every `set` delivers exactly one notification to each observer
//!    subscribed at the time of the call, in registration order. Writes
//!    of a value equal to the current one still notify.
//! 3. A newly registered observer is invoked once, immediately, with the
//!    current value.
//! 4. Dropping a [`Subscription`] removes the callback; it receives no
//!    notification after removal, even mid-delivery.
//! 5. Cells are independent: no write to one cell notifies another.

pub mod derived;
pub mod observable;

pub use derived::Derived;
pub use observable::{Observable, Subscription};
