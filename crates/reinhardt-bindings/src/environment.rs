//! Environment probe
//!
//! Every web-backed capability consults [`is_browser`] before touching
//! `window`, `document` or `navigator`. Outside a browser (SSR, native tests)
//! the bindings fall back to their in-memory defaults.

/// Returns `true` when a full interactive runtime (window + document) is present.
#[cfg(target_arch = "wasm32")]
pub fn is_browser() -> bool {
	web_sys::window()
		.and_then(|window| window.document())
		.is_some()
}

/// Returns `true` when a full interactive runtime is present (always `false` natively).
#[cfg(not(target_arch = "wasm32"))]
pub fn is_browser() -> bool {
	false
}
