//! Bus - Single-value publish/subscribe container
//!
//! `Bus<T>` holds one value and a list of subscribers. Publishing a value that is
//! [identical](crate::Identity) to the current one is ignored; anything else
//! replaces the state and calls every subscriber once, synchronously, in the
//! order they subscribed.
//!
//! ## Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use wayfinder_reactive::Bus;
//!
//! let path = Bus::new("/".to_string());
//! let seen = Rc::new(Cell::new(0));
//!
//! let counter = seen.clone();
//! let subscription = path.subscribe(move |_| counter.set(counter.get() + 1));
//!
//! path.update("/users".to_string());
//! path.update("/users".to_string()); // identical, ignored
//! assert_eq!(seen.get(), 1);
//!
//! subscription.unsubscribe();
//! path.update("/posts".to_string());
//! assert_eq!(seen.get(), 1);
//! ```

use core::cell::{Cell, RefCell};
use core::fmt;

extern crate alloc;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;

use crate::identity::Identity;

type Listener<T> = Rc<dyn Fn(&T)>;

struct BusInner<T> {
	state: RefCell<T>,
	/// Keyed by a monotonically increasing id, so iteration order is subscription order.
	listeners: RefCell<BTreeMap<u64, Listener<T>>>,
	next_id: Cell<u64>,
}

/// A reactive single-value container.
///
/// `Bus<T>` is a cheap handle: clones share the same state and subscribers.
/// It is single-threaded by construction (`Rc`/`RefCell`), matching the
/// run-to-completion event loop it is designed for.
pub struct Bus<T: 'static> {
	inner: Rc<BusInner<T>>,
}

impl<T: 'static> Clone for Bus<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: Identity + Clone + 'static> Bus<T> {
	/// Creates a bus holding `initial`.
	pub fn new(initial: T) -> Self {
		Self {
			inner: Rc::new(BusInner {
				state: RefCell::new(initial),
				listeners: RefCell::new(BTreeMap::new()),
				next_id: Cell::new(0),
			}),
		}
	}

	/// Returns a clone of the current value.
	pub fn state(&self) -> T {
		self.inner.state.borrow().clone()
	}

	/// Runs `f` with a borrow of the current value.
	///
	/// `f` must not publish to this bus.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.state.borrow())
	}

	/// Publishes `value`.
	///
	/// Does nothing when `value` is identical to the current state. Otherwise
	/// the state is replaced and every subscriber is called exactly once.
	pub fn update(&self, value: T) {
		if self.replace(value) {
			self.notify();
		}
	}

	/// Replaces the state without notifying anyone.
	///
	/// Returns `false` (and leaves the state untouched) when `value` is
	/// identical to the current state. Pair with [`Bus::notify`] to publish
	/// several buses as one coherent change.
	pub fn replace(&self, value: T) -> bool {
		let mut state = self.inner.state.borrow_mut();
		if state.is_identical(&value) {
			return false;
		}
		*state = value;
		true
	}

	/// Calls every current subscriber with the current state.
	///
	/// Subscribers are snapshotted before the first call, so a callback may
	/// subscribe, unsubscribe or publish without disturbing this round.
	pub fn notify(&self) {
		let listeners: Vec<Listener<T>> = self.inner.listeners.borrow().values().cloned().collect();
		if listeners.is_empty() {
			return;
		}
		let value = self.state();
		for listener in listeners {
			listener(&value);
		}
	}

	/// Registers `callback` and returns the capability that removes it.
	pub fn subscribe<F>(&self, callback: F) -> Subscription
	where
		F: Fn(&T) + 'static,
	{
		let id = self.inner.next_id.get();
		self.inner.next_id.set(id + 1);
		self.inner
			.listeners
			.borrow_mut()
			.insert(id, Rc::new(callback));

		let weak: Weak<BusInner<T>> = Rc::downgrade(&self.inner);
		let remove: Box<dyn FnOnce()> = Box::new(move || {
			if let Some(inner) = weak.upgrade() {
				inner.listeners.borrow_mut().remove(&id);
			}
		});
		Subscription {
			remove: Rc::new(RefCell::new(Some(remove))),
		}
	}

	/// Returns the number of live subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.inner.listeners.borrow().len()
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Bus<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Bus")
			.field("state", &self.inner.state.borrow())
			.field("subscribers", &self.inner.listeners.borrow().len())
			.finish()
	}
}

/// Handle returned by [`Bus::subscribe`].
///
/// Dropping a `Subscription` keeps the callback registered; call
/// [`unsubscribe`](Subscription::unsubscribe) or convert it with
/// [`guard`](Subscription::guard) to tie removal to a scope.
#[derive(Clone)]
pub struct Subscription {
	remove: Rc<RefCell<Option<Box<dyn FnOnce()>>>>,
}

impl Subscription {
	/// Removes the callback. Calling this more than once is a no-op.
	pub fn unsubscribe(&self) {
		let remove = self.remove.borrow_mut().take();
		if let Some(remove) = remove {
			remove();
		}
	}

	/// Returns `true` until [`unsubscribe`](Subscription::unsubscribe) has run.
	pub fn is_active(&self) -> bool {
		self.remove.borrow().is_some()
	}

	/// Converts this handle into one that unsubscribes when dropped.
	pub fn guard(self) -> SubscriptionGuard {
		SubscriptionGuard(self)
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.is_active())
			.finish()
	}
}

/// Unsubscribes on drop.
#[derive(Debug)]
pub struct SubscriptionGuard(Subscription);

impl Drop for SubscriptionGuard {
	fn drop(&mut self) {
		self.0.unsubscribe();
	}
}
