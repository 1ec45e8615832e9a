//! Integration tests for the use_fetch lifecycle
//!
//! These tests verify:
//! 1. Automatic execution on creation and on dependency changes
//! 2. Structural dependency comparison (no duplicate requests)
//! 3. Last-issued-wins ordering under out-of-order completion
//! 4. Teardown aborts without a state transition
//! 5. State listeners may reconfigure the binding they observe

#![cfg(not(target_arch = "wasm32"))]

use std::cell::RefCell;
use std::rc::Rc;

use reinhardt_bindings::testing::MockTransport;
use reinhardt_bindings::{
	FetchError, FetchState, FetchStatus, HttpResponse, RequestInit, Subscription, UseFetch,
	UseFetchOptions, use_fetch,
};
use rstest::rstest;
use serde::Deserialize;
use serde_json::json;
use tokio::task::LocalSet;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct User {
	id: u64,
	name: String,
}

/// Lets spawned executions run to their next await point.
async fn settle() {
	for _ in 0..8 {
		tokio::task::yield_now().await;
	}
}

fn record_statuses(fetch: &UseFetch<User>) -> (Rc<RefCell<Vec<FetchStatus>>>, Subscription) {
	let seen = Rc::new(RefCell::new(Vec::new()));
	let subscription = fetch.state_signal().subscribe({
		let seen = Rc::clone(&seen);
		move |state: &FetchState<User>| seen.borrow_mut().push(state.status())
	});
	(seen, subscription)
}

#[rstest]
#[tokio::test]
async fn test_immediate_fetch_runs_on_creation() {
	LocalSet::new()
		.run_until(async {
			let transport = MockTransport::json(200, &json!({ "id": 1, "name": "ada" }));
			let fetch: UseFetch<User> = use_fetch(
				Rc::new(transport.clone()),
				Some("/api/users/1"),
				UseFetchOptions::default(),
			);

			assert!(fetch.is_loading());
			settle().await;

			assert_eq!(transport.request_count(), 1);
			assert_eq!(
				fetch.data(),
				Some(User {
					id: 1,
					name: "ada".into()
				})
			);
		})
		.await;
}

#[rstest]
#[tokio::test]
async fn test_manual_fetch_stays_idle() {
	LocalSet::new()
		.run_until(async {
			let transport = MockTransport::json(200, &json!({ "id": 1, "name": "ada" }));
			let fetch: UseFetch<User> = use_fetch(
				Rc::new(transport.clone()),
				Some("/api/users/1"),
				UseFetchOptions::manual(),
			);
			settle().await;

			assert_eq!(fetch.status(), FetchStatus::Idle);
			assert_eq!(transport.request_count(), 0);
		})
		.await;
}

#[rstest]
#[tokio::test]
async fn test_structurally_equal_configuration_does_not_refetch() {
	LocalSet::new()
		.run_until(async {
			let transport = MockTransport::json(200, &json!({ "id": 1, "name": "ada" }));
			let options = || {
				UseFetchOptions::default()
					.with_request(RequestInit::new().with_header("Accept", "application/json"))
			};
			let fetch: UseFetch<User> =
				use_fetch(Rc::new(transport.clone()), Some("/api/users/1"), options());
			settle().await;

			// A fresh but equal options value, as a re-render would produce.
			fetch.configure(Some("/api/users/1"), options());
			settle().await;
			assert_eq!(transport.request_count(), 1);

			fetch.configure(
				Some("/api/users/1"),
				UseFetchOptions::default()
					.with_request(RequestInit::new().with_header("Accept", "text/plain")),
			);
			settle().await;
			assert_eq!(transport.request_count(), 2);
			assert_eq!(
				transport.request(1).unwrap().init.headers.get("Accept").map(String::as_str),
				Some("text/plain")
			);
		})
		.await;
}

#[rstest]
#[tokio::test]
async fn test_changing_url_aborts_previous_request() {
	LocalSet::new()
		.run_until(async {
			let transport = MockTransport::new();
			let fetch: UseFetch<User> = use_fetch(
				Rc::new(transport.clone()),
				Some("/api/users/1"),
				UseFetchOptions::default(),
			);
			settle().await;

			fetch.configure(Some("/api/users/2"), UseFetchOptions::default());
			settle().await;

			assert_eq!(transport.request_count(), 2);
			assert!(transport.was_aborted(0));
			assert!(!transport.was_aborted(1));

			// The aborted request's reply has nobody left to receive it.
			assert!(!transport.resolve_json(0, 200, &json!({ "id": 1, "name": "ada" })));
			assert!(transport.resolve_json(1, 200, &json!({ "id": 2, "name": "grace" })));
			settle().await;

			assert_eq!(fetch.data().map(|user| user.id), Some(2));
		})
		.await;
}

#[rstest]
#[tokio::test]
async fn test_later_execution_wins_when_earlier_completes_last() {
	let transport = MockTransport::new();
	let fetch: UseFetch<User> =
		use_fetch(Rc::new(transport.clone()), Some("/api/users/1"), UseFetchOptions::manual());

	let mut first = Box::pin(fetch.execute());
	assert!(futures::poll!(&mut first).is_pending());
	let mut second = Box::pin(fetch.execute());
	assert!(futures::poll!(&mut second).is_pending());

	transport.resolve_json(1, 200, &json!({ "id": 2, "name": "second" }));
	assert_eq!(second.await.map(|user| user.name), Some("second".to_string()));

	transport.resolve_json(0, 200, &json!({ "id": 1, "name": "first" }));
	assert_eq!(first.await, None);

	assert_eq!(fetch.data().map(|user| user.name), Some("second".to_string()));
}

#[rstest]
#[tokio::test]
async fn test_stale_error_is_not_reported() {
	let transport = MockTransport::new();
	let fetch: UseFetch<User> =
		use_fetch(Rc::new(transport.clone()), Some("/api/users"), UseFetchOptions::manual());

	let mut first = Box::pin(fetch.execute());
	assert!(futures::poll!(&mut first).is_pending());
	let mut second = Box::pin(fetch.execute());
	assert!(futures::poll!(&mut second).is_pending());

	transport.resolve(0, HttpResponse::new(500, ""));
	assert_eq!(first.await, None);
	assert!(fetch.is_loading());

	transport.resolve_json(1, 200, &json!({ "id": 1, "name": "ada" }));
	second.await;
	assert!(fetch.is_success());
	assert_eq!(fetch.error(), None);
}

#[rstest]
#[tokio::test]
async fn test_transitions_for_success_and_error() {
	let transport = MockTransport::new();
	let fetch: UseFetch<User> =
		use_fetch(Rc::new(transport.clone()), Some("/api/users/1"), UseFetchOptions::manual());
	let (seen, _subscription) = record_statuses(&fetch);

	let mut run = Box::pin(fetch.execute());
	assert!(futures::poll!(&mut run).is_pending());
	transport.resolve(0, HttpResponse::new(404, "{}"));
	run.await;

	let mut run = Box::pin(fetch.execute());
	assert!(futures::poll!(&mut run).is_pending());
	transport.resolve_json(1, 200, &json!({ "id": 1, "name": "ada" }));
	run.await;

	assert_eq!(
		*seen.borrow(),
		vec![
			FetchStatus::Loading,
			FetchStatus::Error,
			FetchStatus::Loading,
			FetchStatus::Success,
		]
	);
}

#[rstest]
#[tokio::test]
async fn test_teardown_aborts_without_transition() {
	let transport = MockTransport::new();
	let fetch: UseFetch<User> =
		use_fetch(Rc::new(transport.clone()), Some("/api/users/1"), UseFetchOptions::manual());
	let (seen, _subscription) = record_statuses(&fetch);

	let mut run = Box::pin(fetch.execute());
	assert!(futures::poll!(&mut run).is_pending());

	fetch.teardown();
	assert!(transport.was_aborted(0));
	assert_eq!(run.await, None);

	assert_eq!(*seen.borrow(), vec![FetchStatus::Loading]);
	assert!(!fetch.has_pending());
}

#[rstest]
#[tokio::test]
async fn test_dropping_last_handle_aborts_live_request() {
	LocalSet::new()
		.run_until(async {
			let transport = MockTransport::new();
			let fetch: UseFetch<User> = use_fetch(
				Rc::new(transport.clone()),
				Some("/api/users/1"),
				UseFetchOptions::manual(),
			);
			let mut run = Box::pin(fetch.execute());
			assert!(futures::poll!(&mut run).is_pending());

			drop(run);
			drop(fetch);
			assert!(transport.was_aborted(0));
		})
		.await;
}

#[rstest]
#[tokio::test]
async fn test_http_error_carries_status() {
	let transport = MockTransport::json(503, &json!({ "detail": "maintenance" }));
	let fetch: UseFetch<User> =
		use_fetch(Rc::new(transport), Some("/api/users/1"), UseFetchOptions::manual());

	assert_eq!(fetch.refetch().await, None);
	let error = fetch.error().unwrap();
	assert_eq!(error, FetchError::http(503));
	assert_eq!(error.to_string(), "HTTP 503");
}

#[rstest]
#[tokio::test]
async fn test_error_listener_switches_to_fallback_url() {
	LocalSet::new()
		.run_until(async {
			let transport = MockTransport::new();
			let fetch: UseFetch<User> = use_fetch(
				Rc::new(transport.clone()),
				Some("/api/users/1"),
				UseFetchOptions::default(),
			);
			settle().await;
			let (seen, _recording) = record_statuses(&fetch);

			let fallback = fetch.state_signal().subscribe({
				let fetch = fetch.clone();
				move |state: &FetchState<User>| {
					let on_fallback = fetch
						.target()
						.is_some_and(|target| target.url == "/api/users/fallback");
					if state.is_error() && !on_fallback {
						fetch.configure(Some("/api/users/fallback"), UseFetchOptions::default());
					}
				}
			});

			transport.resolve(0, HttpResponse::new(500, ""));
			settle().await;

			assert_eq!(transport.request_count(), 2);
			assert_eq!(transport.request(1).unwrap().url, "/api/users/fallback");
			assert!(fetch.is_loading());

			transport.resolve_json(1, 200, &json!({ "id": 0, "name": "guest" }));
			settle().await;
			drop(fallback);

			assert_eq!(fetch.data().map(|user| user.name), Some("guest".to_string()));
			assert_eq!(
				*seen.borrow(),
				vec![FetchStatus::Error, FetchStatus::Loading, FetchStatus::Success]
			);
		})
		.await;
}
