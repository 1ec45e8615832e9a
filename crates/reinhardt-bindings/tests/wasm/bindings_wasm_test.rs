//! Browser tests for the web-backed capabilities
//!
//! Run with `wasm-pack test --headless --chrome crates/reinhardt-bindings`.

#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use reinhardt_bindings::{
	CookieJar, CookieOptions, DocumentCookieJar, KeyValueStore, WebStorage, is_browser,
	use_cookie, use_local_storage,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_is_browser() {
	assert!(is_browser());
}

#[wasm_bindgen_test]
fn test_web_storage_binding_writes_json() {
	let store = WebStorage::new();
	assert!(store.is_available());
	let _ = store.remove_item("bindings-test-count");

	let count = use_local_storage(Rc::new(store.clone()), "bindings-test-count", 0u32);
	count.update(|n| n + 5);

	assert_eq!(count.get(), 5);
	assert_eq!(
		store.get_item("bindings-test-count").unwrap().as_deref(),
		Some("5")
	);

	count.remove();
	assert_eq!(store.get_item("bindings-test-count").unwrap(), None);
}

#[wasm_bindgen_test]
fn test_document_cookie_set_and_remove() {
	let jar = DocumentCookieJar::new();
	let cookie = use_cookie(
		Rc::new(jar),
		"bindings_test",
		None,
		CookieOptions::new().with_path("/"),
	);

	cookie.set("hello world");
	assert!(jar.cookie_string().contains("bindings_test=hello%20world"));

	cookie.remove();
	assert!(!jar.cookie_string().contains("bindings_test="));
}
