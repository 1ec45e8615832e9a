//! Persistent key-value store boundary
//!
//! [`KeyValueStore`] is the string-valued get/set/remove interface of
//! `window.localStorage`, plus a feed of changes made by other documents
//! (the `storage` event). Writes made through a store never notify that
//! store's own subscribers, matching browser behavior.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::StorageError;
use crate::reactive::Subscription;

/// A change to a key made outside the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
	/// Changed key. `None` when the whole store was cleared.
	pub key: Option<String>,
	/// New value, `None` when the key was removed.
	pub new_value: Option<String>,
}

/// Callback receiving external storage changes.
pub type StorageListener = Rc<dyn Fn(&StorageEvent)>;

/// String-valued persistent store.
pub trait KeyValueStore {
	/// Whether the store can be used in this environment.
	fn is_available(&self) -> bool;

	/// Reads a value.
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

	/// Writes a value.
	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

	/// Deletes a value. Deleting a missing key is not an error.
	fn remove_item(&self, key: &str) -> Result<(), StorageError>;

	/// Subscribes to changes originating outside this document.
	fn subscribe(&self, listener: StorageListener) -> Subscription;
}

struct MemoryStoreState {
	available: bool,
	items: RefCell<BTreeMap<String, String>>,
	next_id: Cell<u64>,
	listeners: RefCell<BTreeMap<u64, StorageListener>>,
}

/// In-memory [`KeyValueStore`].
///
/// Used on the server and in tests. Clones share the same entries, so two
/// bindings built from clones of one store behave like two components on the
/// same page.
#[derive(Clone)]
pub struct MemoryStore {
	state: Rc<MemoryStoreState>,
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryStore {
	/// Creates an empty, available store.
	pub fn new() -> Self {
		Self::with_availability(true)
	}

	/// Creates a store that reports itself unavailable, as outside a browser.
	pub fn unavailable() -> Self {
		Self::with_availability(false)
	}

	fn with_availability(available: bool) -> Self {
		Self {
			state: Rc::new(MemoryStoreState {
				available,
				items: RefCell::new(BTreeMap::new()),
				next_id: Cell::new(0),
				listeners: RefCell::new(BTreeMap::new()),
			}),
		}
	}

	/// Applies a change as if another tab had made it, and notifies subscribers.
	pub fn emit_external(&self, key: &str, new_value: Option<&str>) {
		{
			let mut items = self.state.items.borrow_mut();
			match new_value {
				Some(value) => {
					items.insert(key.to_string(), value.to_string());
				}
				None => {
					items.remove(key);
				}
			}
		}
		self.dispatch(&StorageEvent {
			key: Some(key.to_string()),
			new_value: new_value.map(str::to_string),
		});
	}

	/// Clears every entry as if another tab had called `clear()`.
	pub fn clear_external(&self) {
		self.state.items.borrow_mut().clear();
		self.dispatch(&StorageEvent {
			key: None,
			new_value: None,
		});
	}

	/// Number of stored entries.
	pub fn len(&self) -> usize {
		self.state.items.borrow().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.state.items.borrow().is_empty()
	}

	/// Number of live subscriptions.
	pub fn listener_count(&self) -> usize {
		self.state.listeners.borrow().len()
	}

	fn dispatch(&self, event: &StorageEvent) {
		let listeners: Vec<StorageListener> =
			self.state.listeners.borrow().values().cloned().collect();
		for listener in listeners {
			listener(event);
		}
	}
}

impl KeyValueStore for MemoryStore {
	fn is_available(&self) -> bool {
		self.state.available
	}

	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		if !self.state.available {
			return Err(StorageError::Unavailable);
		}
		Ok(self.state.items.borrow().get(key).cloned())
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		if !self.state.available {
			return Err(StorageError::Unavailable);
		}
		self.state
			.items
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		if !self.state.available {
			return Err(StorageError::Unavailable);
		}
		self.state.items.borrow_mut().remove(key);
		Ok(())
	}

	fn subscribe(&self, listener: StorageListener) -> Subscription {
		let id = self.state.next_id.get();
		self.state.next_id.set(id + 1);
		self.state.listeners.borrow_mut().insert(id, listener);

		let state = Rc::downgrade(&self.state);
		Subscription::new(move || {
			if let Some(state) = state.upgrade() {
				state.listeners.borrow_mut().remove(&id);
			}
		})
	}
}

impl fmt::Debug for MemoryStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryStore")
			.field("available", &self.state.available)
			.field("items", &*self.state.items.borrow())
			.field("listeners", &self.listener_count())
			.finish()
	}
}

/// [`KeyValueStore`] backed by `window.localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WebStorage;

#[cfg(target_arch = "wasm32")]
impl WebStorage {
	/// Creates a handle to `window.localStorage`.
	pub fn new() -> Self {
		Self
	}

	fn storage(&self) -> Result<web_sys::Storage, StorageError> {
		if !crate::environment::is_browser() {
			return Err(StorageError::Unavailable);
		}
		web_sys::window()
			.ok_or(StorageError::Unavailable)?
			.local_storage()
			.map_err(|e| StorageError::Backend(format!("{:?}", e)))?
			.ok_or(StorageError::Unavailable)
	}
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for WebStorage {
	fn is_available(&self) -> bool {
		self.storage().is_ok()
	}

	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		self.storage()?
			.get_item(key)
			.map_err(|e| StorageError::Backend(format!("{:?}", e)))
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.storage()?
			.set_item(key, value)
			.map_err(|e| StorageError::Backend(format!("{:?}", e)))
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		self.storage()?
			.remove_item(key)
			.map_err(|e| StorageError::Backend(format!("{:?}", e)))
	}

	fn subscribe(&self, listener: StorageListener) -> Subscription {
		use wasm_bindgen::JsCast;
		use wasm_bindgen::prelude::Closure;

		let Some(window) = web_sys::window() else {
			return Subscription::noop();
		};

		let closure = Closure::wrap(Box::new(move |event: web_sys::StorageEvent| {
			listener(&StorageEvent {
				key: event.key(),
				new_value: event.new_value(),
			});
		}) as Box<dyn FnMut(web_sys::StorageEvent)>);

		if let Err(err) =
			window.add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
		{
			crate::warn_log!("WebStorage: failed to add storage listener: {:?}", err);
			return Subscription::noop();
		}

		Subscription::new(move || {
			let _ = window
				.remove_event_listener_with_callback("storage", closure.as_ref().unchecked_ref());
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_memory_store_round_trip() {
		let store = MemoryStore::new();
		store.set_item("k", "42").unwrap();
		assert_eq!(store.get_item("k").unwrap().as_deref(), Some("42"));

		store.remove_item("k").unwrap();
		assert_eq!(store.get_item("k").unwrap(), None);
		assert!(store.is_empty());
	}

	#[rstest]
	fn test_memory_store_clones_share_entries() {
		let store = MemoryStore::new();
		let other = store.clone();
		store.set_item("theme", "\"dark\"").unwrap();
		assert_eq!(other.get_item("theme").unwrap().as_deref(), Some("\"dark\""));
	}

	#[rstest]
	fn test_unavailable_store_rejects_access() {
		let store = MemoryStore::unavailable();
		assert!(!store.is_available());
		assert_eq!(store.get_item("k"), Err(StorageError::Unavailable));
		assert_eq!(store.set_item("k", "v"), Err(StorageError::Unavailable));
	}

	#[rstest]
	fn test_local_writes_do_not_notify() {
		let store = MemoryStore::new();
		let events = Rc::new(RefCell::new(Vec::new()));
		let _sub = store.subscribe({
			let events = Rc::clone(&events);
			Rc::new(move |event: &StorageEvent| events.borrow_mut().push(event.clone()))
		});

		store.set_item("k", "1").unwrap();
		assert!(events.borrow().is_empty());

		store.emit_external("k", Some("2"));
		assert_eq!(
			*events.borrow(),
			vec![StorageEvent {
				key: Some("k".into()),
				new_value: Some("2".into()),
			}]
		);
		assert_eq!(store.get_item("k").unwrap().as_deref(), Some("2"));
	}

	#[rstest]
	fn test_external_clear_notifies_without_key() {
		let store = MemoryStore::new();
		store.set_item("a", "1").unwrap();
		store.set_item("b", "2").unwrap();
		let events = Rc::new(RefCell::new(Vec::new()));
		let _sub = store.subscribe({
			let events = Rc::clone(&events);
			Rc::new(move |event: &StorageEvent| events.borrow_mut().push(event.clone()))
		});

		store.clear_external();
		assert!(store.is_empty());
		assert_eq!(
			*events.borrow(),
			vec![StorageEvent {
				key: None,
				new_value: None,
			}]
		);
	}

	#[rstest]
	fn test_dropping_subscription_removes_listener() {
		let store = MemoryStore::new();
		let sub = store.subscribe(Rc::new(|_: &StorageEvent| {}));
		assert_eq!(store.listener_count(), 1);
		drop(sub);
		assert_eq!(store.listener_count(), 0);
	}
}
