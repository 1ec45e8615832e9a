//! Signal - Observable State Cell
//!
//! `Signal<T>` holds the local state of a binding. Components read it with
//! [`Signal::get`] and observe changes with [`Signal::subscribe`].
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_bindings::reactive::Signal;
//!
//! let count = Signal::new(0);
//! let _sub = count.subscribe(|n| println!("count is now {}", n));
//!
//! count.set(42);            // prints "count is now 42"
//! count.update(|n| *n += 1); // prints "count is now 43"
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Subscribers<T> {
	next_id: Cell<u64>,
	listeners: RefCell<BTreeMap<u64, Listener<T>>>,
}

/// An observable value shared by every clone of the signal.
///
/// ## Cloning
///
/// `Signal<T>` shares its value via `Rc<RefCell<T>>`. All clones of the same
/// Signal see the same value and the same subscribers.
pub struct Signal<T: 'static> {
	value: Rc<RefCell<T>>,
	subscribers: Rc<Subscribers<T>>,
}

impl<T: 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			value: Rc::clone(&self.value),
			subscribers: Rc::clone(&self.subscribers),
		}
	}
}

impl<T: 'static> Signal<T> {
	/// Create a new Signal with the given initial value
	pub fn new(value: T) -> Self {
		Self {
			value: Rc::new(RefCell::new(value)),
			subscribers: Rc::new(Subscribers {
				next_id: Cell::new(0),
				listeners: RefCell::new(BTreeMap::new()),
			}),
		}
	}

	/// Get a clone of the current value
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.value.borrow().clone()
	}

	/// Read the current value by reference without cloning it
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.value.borrow())
	}

	/// Set the signal to a new value and notify subscribers
	pub fn set(&self, value: T)
	where
		T: Clone,
	{
		*self.value.borrow_mut() = value;
		self.notify();
	}

	/// Update the value in place and notify subscribers once
	pub fn update<F>(&self, f: F)
	where
		T: Clone,
		F: FnOnce(&mut T),
	{
		f(&mut *self.value.borrow_mut());
		self.notify();
	}

	/// Registers a listener that runs after every change.
	///
	/// The listener stays registered until the returned [`Subscription`]
	/// is dropped. Listeners receive a snapshot of the new value, so they may
	/// write to this signal or call back into the binding that owns it. A
	/// write from a listener notifies every listener again before the outer
	/// notification continues.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&T) + 'static,
	{
		let id = self.subscribers.next_id.get();
		self.subscribers.next_id.set(id + 1);
		self.subscribers
			.listeners
			.borrow_mut()
			.insert(id, Rc::new(listener));

		let weak: Weak<Subscribers<T>> = Rc::downgrade(&self.subscribers);
		Subscription::new(move || {
			if let Some(subscribers) = weak.upgrade() {
				subscribers.listeners.borrow_mut().remove(&id);
			}
		})
	}

	/// Number of live subscriptions
	pub fn subscriber_count(&self) -> usize {
		self.subscribers.listeners.borrow().len()
	}

	fn notify(&self)
	where
		T: Clone,
	{
		// No borrow is held while listeners run.
		let listeners: Vec<Listener<T>> =
			self.subscribers.listeners.borrow().values().cloned().collect();
		if listeners.is_empty() {
			return;
		}
		let value = self.value.borrow().clone();
		for listener in listeners {
			listener(&value);
		}
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("value", &*self.value.borrow())
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

/// Guard that ends a subscription when dropped.
///
/// Returned by [`Signal::subscribe`] and by the ambient capabilities
/// (storage events). Keep it alive for as long as the listener should run.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
	cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	/// Creates a subscription that runs `cancel` when dropped or cancelled.
	pub fn new<F>(cancel: F) -> Self
	where
		F: FnOnce() + 'static,
	{
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}

	/// A subscription with nothing to clean up.
	pub fn noop() -> Self {
		Self { cancel: None }
	}

	/// Ends the subscription now.
	pub fn cancel(mut self) {
		self.run_cancel();
	}

	fn run_cancel(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.run_cancel();
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.cancel.is_some())
			.finish()
	}
}
