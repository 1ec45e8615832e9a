//! Watch - Structural Dependency Tracking
//!
//! A hook that re-runs work "whenever its inputs change" needs a notion of
//! change. `Watch` compares dependency sets by their serialized JSON shape, so
//! two option structs built separately but holding the same data count as
//! unchanged and do not trigger a redundant run.

use std::cell::RefCell;

use serde::Serialize;

use crate::warn_log;

/// Remembers the last dependency set seen and reports when it changes.
#[derive(Debug, Default)]
pub struct Watch {
	last: RefCell<Option<String>>,
}

impl Watch {
	/// Creates a watch that has not seen any dependencies yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `deps` and returns `true` if they differ from the previous call.
	///
	/// The first call always returns `true`. Dependencies that cannot be
	/// serialized are treated as changed every time.
	pub fn changed<D>(&self, deps: &D) -> bool
	where
		D: Serialize + ?Sized,
	{
		let key = match serde_json::to_string(deps) {
			Ok(key) => key,
			Err(err) => {
				warn_log!("Watch: dependencies could not be serialized: {}", err);
				self.last.borrow_mut().take();
				return true;
			}
		};

		let mut last = self.last.borrow_mut();
		if last.as_deref() == Some(key.as_str()) {
			return false;
		}
		*last = Some(key);
		true
	}

	/// Forgets the recorded dependencies so the next call reports a change.
	pub fn reset(&self) {
		self.last.borrow_mut().take();
	}
}
