//! Clipboard boundary
//!
//! [`Clipboard`] is a write-only view of the system copy buffer.
//! [`NavigatorClipboard`] uses `navigator.clipboard.writeText` and falls back
//! to selecting a hidden `<textarea>` and running `execCommand("copy")` on
//! browsers without the async Clipboard API.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;

use crate::error::ClipboardError;

/// Write access to the system copy buffer.
#[async_trait(?Send)]
pub trait Clipboard {
	/// Whether a clipboard is reachable in this environment.
	fn is_available(&self) -> bool;

	/// Replaces the clipboard contents with `text`.
	async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// In-memory [`Clipboard`] for the server and tests.
///
/// Clones share the buffer. A clipboard built with [`MemoryClipboard::failing`]
/// rejects every write, which is how permission errors are exercised.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
	contents: Rc<RefCell<Option<String>>>,
	failure: Option<ClipboardError>,
}

impl MemoryClipboard {
	/// Creates an empty clipboard that accepts writes.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a clipboard whose writes fail with `error`.
	pub fn failing(error: ClipboardError) -> Self {
		Self {
			contents: Rc::default(),
			failure: Some(error),
		}
	}

	/// Returns the last text written.
	pub fn contents(&self) -> Option<String> {
		self.contents.borrow().clone()
	}
}

#[async_trait(?Send)]
impl Clipboard for MemoryClipboard {
	fn is_available(&self) -> bool {
		self.failure != Some(ClipboardError::Unavailable)
	}

	async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
		if let Some(err) = &self.failure {
			return Err(err.clone());
		}
		*self.contents.borrow_mut() = Some(text.to_string());
		Ok(())
	}
}

/// [`Clipboard`] backed by the browser.
///
/// Outside a browser every write fails with [`ClipboardError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigatorClipboard;

impl NavigatorClipboard {
	/// Creates a handle to the browser clipboard.
	pub fn new() -> Self {
		Self
	}
}

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl Clipboard for NavigatorClipboard {
	fn is_available(&self) -> bool {
		crate::environment::is_browser()
	}

	async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
		if !crate::environment::is_browser() {
			return Err(ClipboardError::Unavailable);
		}
		let window = web_sys::window().ok_or(ClipboardError::Unavailable)?;

		if has_async_clipboard(&window) {
			let promise = window.navigator().clipboard().write_text(text);
			return wasm_bindgen_futures::JsFuture::from(promise)
				.await
				.map(|_| ())
				.map_err(|e| ClipboardError::Denied(format!("{:?}", e)));
		}

		copy_with_selection(&window, text)
	}
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl Clipboard for NavigatorClipboard {
	fn is_available(&self) -> bool {
		false
	}

	async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
		Err(ClipboardError::Unavailable)
	}
}

/// `navigator.clipboard` is missing on insecure origins and old browsers.
#[cfg(target_arch = "wasm32")]
fn has_async_clipboard(window: &web_sys::Window) -> bool {
	let navigator = window.navigator();
	js_sys::Reflect::get(&navigator, &"clipboard".into())
		.map(|clipboard| !clipboard.is_undefined() && !clipboard.is_null())
		.unwrap_or(false)
}

#[cfg(target_arch = "wasm32")]
fn copy_with_selection(window: &web_sys::Window, text: &str) -> Result<(), ClipboardError> {
	use wasm_bindgen::JsCast;

	let denied = |e: wasm_bindgen::JsValue| ClipboardError::Denied(format!("{:?}", e));

	let document = window
		.document()
		.ok_or(ClipboardError::Unavailable)?
		.dyn_into::<web_sys::HtmlDocument>()
		.map_err(|_| ClipboardError::Unavailable)?;
	let body = document.body().ok_or(ClipboardError::Unavailable)?;

	let textarea = document
		.create_element("textarea")
		.map_err(denied)?
		.dyn_into::<web_sys::HtmlTextAreaElement>()
		.map_err(|_| ClipboardError::Unavailable)?;
	textarea.set_value(text);
	let style = textarea.style();
	style.set_property("position", "fixed").map_err(denied)?;
	style.set_property("opacity", "0").map_err(denied)?;

	body.append_child(&textarea).map_err(denied)?;
	textarea.select();
	let copied = document.exec_command("copy");
	let _ = body.remove_child(&textarea);

	match copied {
		Ok(true) => Ok(()),
		Ok(false) => Err(ClipboardError::Denied("execCommand(\"copy\") returned false".into())),
		Err(e) => Err(denied(e)),
	}
}
