//! Cancellation handles for in-flight work
//!
//! [`AbortController`] mirrors the browser API of the same name. Aborting it
//! does two things:
//!
//! 1. flips the shared [`AbortSignal`] and runs the listeners registered on
//!    it, so a transport can tear down its socket (best effort);
//! 2. aborts every future wrapped with [`AbortController::wrap`], so the
//!    consumer stops waiting even when the transport ignores the signal.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{AbortHandle, Abortable, Aborted};

type AbortListener = Box<dyn FnOnce()>;

struct AbortState {
	aborted: Cell<bool>,
	listeners: RefCell<Vec<AbortListener>>,
	handles: RefCell<Vec<AbortHandle>>,
}

/// Owner side of a cancellation handle.
#[derive(Clone)]
pub struct AbortController {
	state: Rc<AbortState>,
}

/// Observer side of a cancellation handle, handed to transports.
#[derive(Clone)]
pub struct AbortSignal {
	state: Rc<AbortState>,
}

impl Default for AbortController {
	fn default() -> Self {
		Self::new()
	}
}

impl AbortController {
	/// Creates a controller whose signal is not aborted.
	pub fn new() -> Self {
		Self {
			state: Rc::new(AbortState {
				aborted: Cell::new(false),
				listeners: RefCell::new(Vec::new()),
				handles: RefCell::new(Vec::new()),
			}),
		}
	}

	/// Returns the signal observed by the cancelled operation.
	pub fn signal(&self) -> AbortSignal {
		AbortSignal {
			state: Rc::clone(&self.state),
		}
	}

	/// Aborts the signal. Calling this more than once has no further effect.
	pub fn abort(&self) {
		if self.state.aborted.replace(true) {
			return;
		}

		for handle in self.state.handles.borrow_mut().drain(..) {
			handle.abort();
		}

		// Listeners may register new work, so release the borrow first.
		let listeners = std::mem::take(&mut *self.state.listeners.borrow_mut());
		for listener in listeners {
			listener();
		}
	}

	/// Returns `true` once [`abort`](Self::abort) has been called.
	pub fn is_aborted(&self) -> bool {
		self.state.aborted.get()
	}

	/// Wraps a future so that it resolves to `Err(Aborted)` as soon as this
	/// controller is aborted.
	pub fn wrap<F: Future>(&self, future: F) -> Abortable<F> {
		let (handle, registration) = AbortHandle::new_pair();
		if self.is_aborted() {
			handle.abort();
		} else {
			self.state.handles.borrow_mut().push(handle);
		}
		Abortable::new(future, registration)
	}

	/// Runs a future to completion unless this controller is aborted first.
	pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, Aborted> {
		self.wrap(future).await
	}
}

impl AbortSignal {
	/// Returns `true` once the owning controller has been aborted.
	pub fn is_aborted(&self) -> bool {
		self.state.aborted.get()
	}

	/// Registers a callback that runs when the controller is aborted.
	///
	/// If the signal is already aborted the callback runs immediately.
	pub fn on_abort<F>(&self, listener: F)
	where
		F: FnOnce() + 'static,
	{
		if self.is_aborted() {
			listener();
		} else {
			self.state.listeners.borrow_mut().push(Box::new(listener));
		}
	}
}

impl fmt::Debug for AbortController {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AbortController")
			.field("aborted", &self.is_aborted())
			.finish()
	}
}

impl fmt::Debug for AbortSignal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AbortSignal")
			.field("aborted", &self.is_aborted())
			.finish()
	}
}
