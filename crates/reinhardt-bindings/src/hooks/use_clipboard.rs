//! Clipboard hook: use_clipboard
//!
//! Copies text through a [`Clipboard`] capability and tracks the outcome of
//! the last attempt. A successful copy can schedule a reset back to
//! [`CopyStatus::Idle`]; a later `copy` or an explicit `reset` cancels it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::abort::AbortController;
use crate::error::ClipboardError;
use crate::platform::clipboard::Clipboard;
use crate::reactive::Signal;
use crate::spawn::{sleep, spawn_local};
use crate::{debug_log, warn_log};

/// Outcome of the last copy attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
	/// Nothing copied yet, or reset since
	#[default]
	Idle,
	/// The last copy succeeded
	Success,
	/// The last copy failed
	Error,
}

type SuccessCallback = Rc<dyn Fn(&str)>;
type ErrorCallback = Rc<dyn Fn(&ClipboardError)>;

/// Per-call options for [`UseClipboard::copy`].
#[derive(Clone, Default)]
pub struct CopyOptions {
	/// Reset to [`CopyStatus::Idle`] this long after a successful copy.
	pub reset_after: Option<Duration>,
	/// Called with the copied text on success.
	pub on_success: Option<SuccessCallback>,
	/// Called with the error on failure.
	pub on_error: Option<ErrorCallback>,
}

impl CopyOptions {
	/// Creates options with no timer and no callbacks.
	pub fn new() -> Self {
		Self::default()
	}

	/// Schedules a reset `delay` after a successful copy.
	pub fn with_reset_after(mut self, delay: Duration) -> Self {
		self.reset_after = Some(delay);
		self
	}

	/// Sets the success callback.
	pub fn on_success<F>(mut self, f: F) -> Self
	where
		F: Fn(&str) + 'static,
	{
		self.on_success = Some(Rc::new(f));
		self
	}

	/// Sets the failure callback.
	pub fn on_error<F>(mut self, f: F) -> Self
	where
		F: Fn(&ClipboardError) + 'static,
	{
		self.on_error = Some(Rc::new(f));
		self
	}
}

impl fmt::Debug for CopyOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CopyOptions")
			.field("reset_after", &self.reset_after)
			.field("on_success", &self.on_success.is_some())
			.field("on_error", &self.on_error.is_some())
			.finish()
	}
}

struct ClipboardInner {
	clipboard: Rc<dyn Clipboard>,
	status: Signal<CopyStatus>,
	value: Signal<Option<String>>,
	error: Signal<Option<ClipboardError>>,
	timer: RefCell<Option<AbortController>>,
}

impl ClipboardInner {
	fn cancel_timer(&self) {
		let timer = self.timer.borrow_mut().take();
		if let Some(controller) = timer {
			controller.abort();
		}
	}

	fn reset(&self) {
		self.cancel_timer();
		self.value.set(None);
		self.status.set(CopyStatus::Idle);
	}

	fn schedule_reset(self: &Rc<Self>, delay: Duration) {
		self.cancel_timer();
		let controller = AbortController::new();
		*self.timer.borrow_mut() = Some(controller.clone());

		let weak: Weak<Self> = Rc::downgrade(self);
		spawn_local(async move {
			if controller.run(sleep(delay)).await.is_err() {
				return;
			}
			if let Some(inner) = weak.upgrade() {
				debug_log!("use_clipboard: reset after {:?}", delay);
				inner.reset();
			}
		});
	}
}

impl Drop for ClipboardInner {
	fn drop(&mut self) {
		if let Some(controller) = self.timer.get_mut().take() {
			controller.abort();
		}
	}
}

/// Handle returned by [`use_clipboard`].
#[derive(Clone)]
pub struct UseClipboard {
	inner: Rc<ClipboardInner>,
}

/// Creates a copy-to-clipboard binding.
///
/// # Example
///
/// ```ignore
/// use std::rc::Rc;
/// use std::time::Duration;
/// use reinhardt_bindings::hooks::{CopyOptions, use_clipboard};
/// use reinhardt_bindings::platform::NavigatorClipboard;
///
/// let clipboard = use_clipboard(Rc::new(NavigatorClipboard::new()));
/// let copied = clipboard
///     .copy("npm i", CopyOptions::new().with_reset_after(Duration::from_secs(2)))
///     .await;
/// ```
pub fn use_clipboard(clipboard: Rc<dyn Clipboard>) -> UseClipboard {
	UseClipboard {
		inner: Rc::new(ClipboardInner {
			clipboard,
			status: Signal::new(CopyStatus::Idle),
			value: Signal::new(None),
			error: Signal::new(None),
			timer: RefCell::new(None),
		}),
	}
}

impl UseClipboard {
	/// Copies `text`, returning whether it succeeded.
	///
	/// A pending reset timer is cancelled first. Failures are reported
	/// through the status and `on_error`; they never propagate. The value of
	/// the last successful copy is kept on failure.
	///
	/// On native targets a `reset_after` timer must be scheduled from inside
	/// a [`tokio::task::LocalSet`].
	pub async fn copy(&self, text: impl Into<String>, options: CopyOptions) -> bool {
		let text = text.into();
		let inner = &self.inner;
		inner.cancel_timer();

		match inner.clipboard.write_text(&text).await {
			Ok(()) => {
				// A copy that overlapped this one may have armed a timer meanwhile.
				inner.cancel_timer();
				inner.error.set(None);
				inner.value.set(Some(text.clone()));
				inner.status.set(CopyStatus::Success);
				if let Some(on_success) = &options.on_success {
					on_success(&text);
				}
				if let Some(delay) = options.reset_after.filter(|d| !d.is_zero()) {
					inner.schedule_reset(delay);
				}
				true
			}
			Err(err) => {
				warn_log!("use_clipboard: copy failed: {}", err);
				inner.error.set(Some(err.clone()));
				inner.status.set(CopyStatus::Error);
				if let Some(on_error) = &options.on_error {
					on_error(&err);
				}
				false
			}
		}
	}

	/// Cancels any pending reset timer and clears the value.
	pub fn reset(&self) {
		self.inner.reset();
	}

	/// Status of the last attempt.
	pub fn status(&self) -> CopyStatus {
		self.inner.status.get()
	}

	/// Signal holding the status.
	pub fn status_signal(&self) -> Signal<CopyStatus> {
		self.inner.status.clone()
	}

	/// Text of the last successful copy.
	pub fn value(&self) -> Option<String> {
		self.inner.value.get()
	}

	/// Error of the last failed copy.
	pub fn error(&self) -> Option<ClipboardError> {
		self.inner.error.get()
	}

	/// Whether the last copy succeeded.
	pub fn is_success(&self) -> bool {
		self.status() == CopyStatus::Success
	}

	/// Whether the last copy failed.
	pub fn is_error(&self) -> bool {
		self.status() == CopyStatus::Error
	}

	/// Whether a reset timer is pending.
	pub fn has_pending_reset(&self) -> bool {
		self.inner.timer.borrow().is_some()
	}
}

impl fmt::Debug for UseClipboard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UseClipboard")
			.field("status", &self.status())
			.field("value", &self.value())
			.field("pending_reset", &self.has_pending_reset())
			.finish()
	}
}
