//! Integration tests for the storage, cookie and clipboard bindings
//!
//! These tests verify:
//! 1. localStorage bindings follow external changes to their own key only,
//!    and a cleared store resets every binding to its initial value
//! 2. Cookie writes and removals reach the jar in browser format
//! 3. Clipboard reset timers are cancelled by later copies

#![cfg(not(target_arch = "wasm32"))]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use reinhardt_bindings::{
	ClipboardError, CookieJar, CookieOptions, CopyOptions, CopyStatus, KeyValueStore,
	MemoryClipboard, MemoryCookieJar, MemoryStore, SameSite, use_clipboard, use_cookie,
	use_local_storage,
};
use rstest::{fixture, rstest};
use serde::{Deserialize, Serialize};
use tokio::task::LocalSet;
use tokio::time::advance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Preferences {
	theme: String,
	font_size: u8,
}

#[fixture]
fn defaults() -> Preferences {
	Preferences {
		theme: "light".into(),
		font_size: 14,
	}
}

#[rstest]
fn test_external_change_to_same_key_updates_value(defaults: Preferences) {
	let store = MemoryStore::new();
	let prefs = use_local_storage(Rc::new(store.clone()), "prefs", defaults);

	store.emit_external("prefs", Some(r#"{"theme":"dark","font_size":16}"#));

	assert_eq!(
		prefs.get(),
		Preferences {
			theme: "dark".into(),
			font_size: 16
		}
	);
}

#[rstest]
fn test_external_change_to_other_key_is_ignored(defaults: Preferences) {
	let store = MemoryStore::new();
	let prefs = use_local_storage(Rc::new(store.clone()), "prefs", defaults.clone());
	let changes = Rc::new(RefCell::new(0));
	let _subscription = prefs.signal().subscribe({
		let changes = Rc::clone(&changes);
		move |_: &Preferences| *changes.borrow_mut() += 1
	});

	store.emit_external("prefs-backup", Some(r#"{"theme":"dark","font_size":16}"#));

	assert_eq!(prefs.get(), defaults);
	assert_eq!(*changes.borrow(), 0);
}

#[rstest]
fn test_external_removal_and_corruption_fall_back_to_initial(defaults: Preferences) {
	let store = MemoryStore::new();
	let prefs = use_local_storage(Rc::new(store.clone()), "prefs", defaults.clone());
	prefs.set(Preferences {
		theme: "dark".into(),
		font_size: 12,
	});

	store.emit_external("prefs", None);
	assert_eq!(prefs.get(), defaults);

	prefs.update(|p| Preferences {
		font_size: p.font_size + 2,
		..p.clone()
	});
	store.emit_external("prefs", Some("{broken"));
	assert_eq!(prefs.get(), defaults);
}

#[rstest]
fn test_external_clear_resets_every_binding(defaults: Preferences) {
	let store = MemoryStore::new();
	let prefs = use_local_storage(Rc::new(store.clone()), "prefs", defaults.clone());
	let visits = use_local_storage(Rc::new(store.clone()), "visits", 0u32);
	prefs.set(Preferences {
		theme: "dark".into(),
		font_size: 18,
	});
	visits.set(4);

	store.clear_external();

	assert_eq!(prefs.get(), defaults);
	assert_eq!(visits.get(), 0);
	assert_eq!(store.get_item("prefs").unwrap(), None);
}

#[rstest]
fn test_two_bindings_on_one_store_are_independent(defaults: Preferences) {
	let store = MemoryStore::new();
	let prefs = use_local_storage(Rc::new(store.clone()), "prefs", defaults);
	let visits = use_local_storage(Rc::new(store.clone()), "visits", 0u32);

	visits.update(|n| n + 1);
	prefs.remove();

	assert_eq!(visits.get(), 1);
	assert_eq!(store.get_item("visits").unwrap().as_deref(), Some("1"));
	assert_eq!(store.get_item("prefs").unwrap(), None);
}

#[rstest]
fn test_stored_value_survives_a_fresh_binding() {
	let store = MemoryStore::new();
	let writer = use_local_storage(Rc::new(store.clone()), "k", 0);
	writer.set(42);

	let reader = use_local_storage(Rc::new(store.clone()), "k", 0);
	assert_eq!(reader.get(), 42);

	reader.remove();
	let fresh = use_local_storage(Rc::new(store), "k", 0);
	assert_eq!(fresh.get(), 0);
}

#[rstest]
fn test_session_cookie_with_max_age() {
	let jar = MemoryCookieJar::new();
	let session = use_cookie(
		Rc::new(jar.clone()),
		"session",
		None,
		CookieOptions::new().with_max_age(3600),
	);

	session.set("abc");
	assert!(jar.cookie_string().contains("session=abc"));

	session.remove();
	assert!(!jar.cookie_string().contains("session="));
}

#[rstest]
fn test_cookie_round_trip_through_jar() {
	let jar = MemoryCookieJar::new();
	let options = CookieOptions::new()
		.with_path("/")
		.with_same_site(SameSite::Lax)
		.with_secure(true);

	let consent = use_cookie(Rc::new(jar.clone()), "cookie consent", None, options.clone());
	consent.set("analytics=no; ads=no");
	assert_eq!(jar.cookie_string(), "cookie%20consent=analytics%3Dno%3B%20ads%3Dno");

	// A second binding reads what the first wrote.
	let reader = use_cookie(Rc::new(jar.clone()), "cookie consent", None, options);
	assert_eq!(reader.get().as_deref(), Some("analytics=no; ads=no"));

	consent.remove();
	assert_eq!(jar.cookie_string(), "");
	assert_eq!(consent.get(), None);
}

#[rstest]
fn test_cookie_max_age_override_deletes() {
	let jar = MemoryCookieJar::new();
	let session = use_cookie(Rc::new(jar.clone()), "session", None, CookieOptions::new());

	session.set("abc");
	session.set_with("abc", &CookieOptions::new().with_max_age(0));

	assert_eq!(jar.cookie_string(), "");
	assert_eq!(session.get().as_deref(), Some("abc"));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_clipboard_timer_is_replaced_by_later_copy() {
	LocalSet::new()
		.run_until(async {
			let clipboard = MemoryClipboard::new();
			let binding = use_clipboard(Rc::new(clipboard.clone()));
			let statuses = Rc::new(RefCell::new(Vec::new()));
			let _subscription = binding.status_signal().subscribe({
				let statuses = Rc::clone(&statuses);
				move |status: &CopyStatus| statuses.borrow_mut().push(*status)
			});

			let reset_soon = CopyOptions::new().with_reset_after(Duration::from_millis(100));
			let reset_later = CopyOptions::new().with_reset_after(Duration::from_millis(500));

			assert!(binding.copy("first", reset_soon).await);
			advance(Duration::from_millis(50)).await;
			assert!(binding.copy("second", reset_later).await);

			// Past the first timer's deadline: nothing happens.
			advance(Duration::from_millis(100)).await;
			tokio::task::yield_now().await;
			assert_eq!(binding.value().as_deref(), Some("second"));

			// Past the second timer's deadline: reset.
			advance(Duration::from_millis(500)).await;
			for _ in 0..4 {
				tokio::task::yield_now().await;
			}
			assert_eq!(binding.status(), CopyStatus::Idle);
			assert_eq!(binding.value(), None);
			assert_eq!(clipboard.contents().as_deref(), Some("second"));

			assert_eq!(
				*statuses.borrow(),
				vec![CopyStatus::Success, CopyStatus::Success, CopyStatus::Idle]
			);
		})
		.await;
}

#[rstest]
#[tokio::test]
async fn test_clipboard_denied_is_reported_not_raised() {
	let failures = Rc::new(RefCell::new(Vec::new()));
	let binding = use_clipboard(Rc::new(MemoryClipboard::failing(ClipboardError::Denied(
		"NotAllowedError".into(),
	))));

	let copied = binding
		.copy(
			"secret",
			CopyOptions::new().on_error({
				let failures = Rc::clone(&failures);
				move |err: &ClipboardError| failures.borrow_mut().push(err.clone())
			}),
		)
		.await;

	assert!(!copied);
	assert_eq!(binding.status(), CopyStatus::Error);
	assert_eq!(binding.value(), None);
	assert_eq!(
		*failures.borrow(),
		vec![ClipboardError::Denied("NotAllowedError".into())]
	);
}
