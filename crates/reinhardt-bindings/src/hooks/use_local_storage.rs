//! Storage hook: use_local_storage
//!
//! Two-way binding between a [`Signal`] and one JSON-encoded entry of a
//! [`KeyValueStore`]. Changes made to the same key by other documents are
//! mirrored into the signal.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::platform::storage::{KeyValueStore, StorageEvent};
use crate::reactive::{Signal, Subscription};
use crate::warn_log;

struct StorageInner<T: 'static> {
	store: Rc<dyn KeyValueStore>,
	key: String,
	initial: T,
	value: Signal<T>,
	subscription: RefCell<Option<Subscription>>,
}

/// Handle returned by [`use_local_storage`].
///
/// Clones share the binding. The external-change subscription ends when
/// [`teardown`](Self::teardown) is called or the last clone is dropped.
pub struct UseLocalStorage<T: 'static> {
	inner: Rc<StorageInner<T>>,
}

impl<T: 'static> Clone for UseLocalStorage<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

/// Binds the stored value under `key` to a signal, falling back to `initial`.
///
/// This is the equivalent of a `useLocalStorage` hook. The initial read
/// returns `initial` when the store is unavailable, the key is missing, or
/// the stored text is not valid JSON for `T`.
///
/// # Example
///
/// ```ignore
/// use std::rc::Rc;
/// use reinhardt_bindings::hooks::use_local_storage;
/// use reinhardt_bindings::platform::WebStorage;
///
/// let theme = use_local_storage(Rc::new(WebStorage::new()), "theme", "light".to_string());
/// theme.set("dark".to_string());
/// theme.update(|t| if t == "dark" { "light".into() } else { "dark".into() });
/// ```
pub fn use_local_storage<T>(
	store: Rc<dyn KeyValueStore>,
	key: impl Into<String>,
	initial: T,
) -> UseLocalStorage<T>
where
	T: Serialize + DeserializeOwned + Clone + 'static,
{
	let key = key.into();
	let value = Signal::new(read_value(store.as_ref(), &key, &initial));
	let inner = Rc::new(StorageInner {
		store,
		key,
		initial,
		value,
		subscription: RefCell::new(None),
	});

	if inner.store.is_available() {
		// Weak reference so the store's listener does not keep the binding alive.
		let weak = Rc::downgrade(&inner);
		let subscription = inner.store.subscribe(Rc::new(move |event: &StorageEvent| {
			if let Some(inner) = weak.upgrade() {
				inner.on_external_change(event);
			}
		}));
		*inner.subscription.borrow_mut() = Some(subscription);
	}

	UseLocalStorage { inner }
}

fn read_value<T>(store: &dyn KeyValueStore, key: &str, initial: &T) -> T
where
	T: DeserializeOwned + Clone,
{
	if !store.is_available() {
		return initial.clone();
	}

	match store.get_item(key) {
		Ok(Some(raw)) => decode_or(&raw, key, initial),
		Ok(None) => initial.clone(),
		Err(err) => {
			warn_log!("use_local_storage: reading {} failed: {}", key, err);
			initial.clone()
		}
	}
}

fn decode_or<T>(raw: &str, key: &str, initial: &T) -> T
where
	T: DeserializeOwned + Clone,
{
	serde_json::from_str(raw).unwrap_or_else(|err| {
		warn_log!("use_local_storage: stored value for {} is corrupt: {}", key, err);
		initial.clone()
	})
}

impl<T> StorageInner<T>
where
	T: DeserializeOwned + Clone + 'static,
{
	fn on_external_change(&self, event: &StorageEvent) {
		let next = match (event.key.as_deref(), &event.new_value) {
			// The whole store was cleared.
			(None, _) => self.initial.clone(),
			(Some(key), _) if key != self.key => return,
			(Some(_), Some(raw)) => decode_or(raw, &self.key, &self.initial),
			(Some(_), None) => self.initial.clone(),
		};
		self.value.set(next);
	}
}

impl<T> UseLocalStorage<T>
where
	T: Serialize + DeserializeOwned + Clone + 'static,
{
	/// The current value.
	pub fn get(&self) -> T {
		self.inner.value.get()
	}

	/// The signal holding the value, for subscribing to changes.
	pub fn signal(&self) -> Signal<T> {
		self.inner.value.clone()
	}

	/// The bound key.
	pub fn key(&self) -> &str {
		&self.inner.key
	}

	/// Stores `value` and mirrors it into the signal.
	///
	/// A failed write (quota exceeded, serialization error) is logged and
	/// leaves the signal unchanged. When the store is unavailable only the
	/// signal is updated.
	pub fn set(&self, value: T) {
		let inner = &self.inner;
		if inner.store.is_available() {
			let written = serde_json::to_string(&value)
				.map_err(|e| e.to_string())
				.and_then(|raw| {
					inner
						.store
						.set_item(&inner.key, &raw)
						.map_err(|e| e.to_string())
				});
			if let Err(err) = written {
				warn_log!("use_local_storage: writing {} failed: {}", inner.key, err);
				return;
			}
		}
		inner.value.set(value);
	}

	/// Stores the value computed from the current one.
	pub fn update<F>(&self, f: F)
	where
		F: FnOnce(&T) -> T,
	{
		let next = self.inner.value.with(f);
		self.set(next);
	}

	/// Deletes the entry and resets the signal to the initial value.
	pub fn remove(&self) {
		let inner = &self.inner;
		if inner.store.is_available()
			&& let Err(err) = inner.store.remove_item(&inner.key)
		{
			warn_log!("use_local_storage: removing {} failed: {}", inner.key, err);
			return;
		}
		inner.value.set(inner.initial.clone());
	}

	/// Stops listening for external changes.
	pub fn teardown(&self) {
		let subscription = self.inner.subscription.borrow_mut().take();
		drop(subscription);
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for UseLocalStorage<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UseLocalStorage")
			.field("key", &self.inner.key)
			.field("value", &self.inner.value)
			.finish()
	}
}
