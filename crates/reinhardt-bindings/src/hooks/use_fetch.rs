//! Fetch hook: use_fetch
//!
//! Binds a JSON endpoint to observable state. At most one request is live
//! per binding: starting a new execution aborts the previous one, and a
//! superseded or torn-down execution can never write to the state again,
//! whatever order the responses arrive in.
//!
//! ## State machine
//!
//! ```text
//! Idle ──execute──▶ Loading ──▶ Success(T)
//!                      ▲    └─▶ Error(FetchError)
//!                      └──────── execute (from Success or Error)
//! ```
//!
//! Cancellation never produces a transition. `teardown` from any state only
//! aborts the live request. A transport that aborts the live request on its
//! own returns the binding to `Idle`.
//!
//! Listeners on [`UseFetch::state_signal`] may call back into the binding,
//! for example to `configure` a fallback URL when a request fails.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::abort::AbortController;
use crate::error::{FetchError, TransportError};
use crate::platform::transport::{HttpRequest, RequestInit, Transport};
use crate::reactive::{Signal, Watch};
use crate::spawn::spawn_local;
use crate::{debug_log, warn_log};

/// Outcome of the binding's current request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
	/// No request has been issued
	Idle,
	/// A request is in flight
	Loading,
	/// The last request returned this payload
	Success(T),
	/// The last request failed
	Error(FetchError),
}

/// Tag of a [`FetchState`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
	/// No request has been issued
	Idle,
	/// A request is in flight
	Loading,
	/// The last request succeeded
	Success,
	/// The last request failed
	Error,
}

impl<T> FetchState<T> {
	/// The tag of this state.
	pub fn status(&self) -> FetchStatus {
		match self {
			FetchState::Idle => FetchStatus::Idle,
			FetchState::Loading => FetchStatus::Loading,
			FetchState::Success(_) => FetchStatus::Success,
			FetchState::Error(_) => FetchStatus::Error,
		}
	}

	/// The payload, if the last request succeeded.
	pub fn data(&self) -> Option<&T> {
		match self {
			FetchState::Success(data) => Some(data),
			_ => None,
		}
	}

	/// The failure, if the last request failed.
	pub fn error(&self) -> Option<&FetchError> {
		match self {
			FetchState::Error(err) => Some(err),
			_ => None,
		}
	}

	/// `true` while a request is in flight.
	pub fn is_loading(&self) -> bool {
		matches!(self, FetchState::Loading)
	}

	/// `true` when the last request succeeded.
	pub fn is_success(&self) -> bool {
		matches!(self, FetchState::Success(_))
	}

	/// `true` when the last request failed.
	pub fn is_error(&self) -> bool {
		matches!(self, FetchState::Error(_))
	}
}

/// Activation policy and transport configuration for [`use_fetch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UseFetchOptions {
	/// Run automatically whenever the target or configuration changes
	pub immediate: bool,
	/// Method, headers, body and credentials of the request
	pub request: RequestInit,
}

impl Default for UseFetchOptions {
	fn default() -> Self {
		Self {
			immediate: true,
			request: RequestInit::default(),
		}
	}
}

impl UseFetchOptions {
	/// Options that only run on explicit [`UseFetch::execute`] calls.
	pub fn manual() -> Self {
		Self {
			immediate: false,
			..Self::default()
		}
	}

	/// Sets the activation policy.
	pub fn with_immediate(mut self, immediate: bool) -> Self {
		self.immediate = immediate;
		self
	}

	/// Sets the transport configuration.
	pub fn with_request(mut self, request: RequestInit) -> Self {
		self.request = request;
		self
	}
}

/// The live execution of a binding.
struct Execution {
	generation: u64,
	controller: AbortController,
}

/// An execution that has been started and not yet awaited.
struct Started {
	generation: u64,
	controller: AbortController,
	request: HttpRequest,
}

struct FetchInner<T: 'static> {
	transport: Rc<dyn Transport>,
	target: RefCell<Option<HttpRequest>>,
	immediate: Cell<bool>,
	state: Signal<FetchState<T>>,
	current: RefCell<Option<Execution>>,
	generation: Cell<u64>,
	deps: Watch,
}

impl<T: 'static> Drop for FetchInner<T> {
	fn drop(&mut self) {
		if let Some(execution) = self.current.get_mut().take() {
			execution.controller.abort();
		}
	}
}

/// Handle returned by [`use_fetch`].
///
/// Clones share the same binding instance.
pub struct UseFetch<T: 'static> {
	inner: Rc<FetchInner<T>>,
}

impl<T: 'static> Clone for UseFetch<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

/// Binds the JSON resource at `url` to observable state.
///
/// This is the equivalent of a `useFetch` hook. With
/// `options.immediate` (the default) the request starts right away and is
/// re-issued whenever [`UseFetch::configure`] receives a different target or
/// configuration. A `None` or empty `url` never issues a request.
///
/// Automatic executions are spawned with [`spawn_local`], so natively this
/// must run inside a `tokio::task::LocalSet`.
///
/// # Example
///
/// ```ignore
/// use std::rc::Rc;
/// use reinhardt_bindings::hooks::{use_fetch, UseFetchOptions};
/// use reinhardt_bindings::platform::HttpTransport;
///
/// let users = use_fetch::<Vec<User>>(
///     Rc::new(HttpTransport::new()),
///     Some("/api/users/"),
///     UseFetchOptions::default(),
/// );
///
/// if users.is_loading() {
///     // render spinner
/// } else if let Some(list) = users.data() {
///     // render list
/// }
///
/// // Later, e.g. from a click handler
/// spawn_local(async move { users.refetch().await; });
/// ```
pub fn use_fetch<T>(
	transport: Rc<dyn Transport>,
	url: Option<&str>,
	options: UseFetchOptions,
) -> UseFetch<T>
where
	T: DeserializeOwned + Clone + 'static,
{
	let fetch = UseFetch::new(transport);
	fetch.configure(url, options);
	fetch
}

impl<T> UseFetch<T>
where
	T: DeserializeOwned + Clone + 'static,
{
	/// Creates an unconfigured binding in the `Idle` state.
	///
	/// Call [`configure`](Self::configure) to set the target.
	pub fn new(transport: Rc<dyn Transport>) -> Self {
		Self {
			inner: Rc::new(FetchInner {
				transport,
				target: RefCell::new(None),
				immediate: Cell::new(false),
				state: Signal::new(FetchState::Idle),
				current: RefCell::new(None),
				generation: Cell::new(0),
				deps: Watch::new(),
			}),
		}
	}

	/// Updates the target and options.
	///
	/// Nothing happens when `url` and `options` serialize to the same shape as
	/// the previous call. Otherwise the live execution is torn down and, if
	/// `options.immediate` is set and a target exists, a new one starts.
	pub fn configure(&self, url: Option<&str>, options: UseFetchOptions) {
		let url = url.filter(|url| !url.is_empty());
		if !self.inner.deps.changed(&(url, &options)) {
			return;
		}

		self.teardown();
		*self.inner.target.borrow_mut() = url.map(|url| HttpRequest::new(url, options.request));
		self.inner.immediate.set(options.immediate);

		if options.immediate
			&& let Some(started) = self.begin()
		{
			let this = self.clone();
			spawn_local(async move {
				this.finish(started).await;
			});
		}
	}

	/// Issues one request and waits for it.
	///
	/// Aborts the previous execution, moves to `Loading`, and settles in
	/// `Success` or `Error` unless this execution is superseded or torn down
	/// first. Returns the payload on success and `None` on failure, on
	/// cancellation, or when there is no target.
	pub async fn execute(&self) -> Option<T> {
		let started = self.begin()?;
		self.finish(started).await
	}

	/// Alias of [`execute`](Self::execute).
	pub async fn refetch(&self) -> Option<T> {
		self.execute().await
	}

	/// Aborts the live execution without changing the state.
	///
	/// Call this when the owning component is destroyed. The aborted
	/// execution will not write to the state even if its response arrives.
	pub fn teardown(&self) {
		let execution = self.inner.current.borrow_mut().take();
		if let Some(execution) = execution {
			debug_log!("use_fetch: tearing down generation {}", execution.generation);
			execution.controller.abort();
		}
	}

	fn begin(&self) -> Option<Started> {
		let request = self.inner.target.borrow().clone()?;

		let previous = self.inner.current.borrow_mut().take();
		if let Some(previous) = previous {
			debug_log!("use_fetch: generation {} superseded", previous.generation);
			previous.controller.abort();
		}

		let generation = self.inner.generation.get() + 1;
		self.inner.generation.set(generation);
		let controller = AbortController::new();
		*self.inner.current.borrow_mut() = Some(Execution {
			generation,
			controller: controller.clone(),
		});

		debug_log!(
			"use_fetch: generation {} {} {}",
			generation,
			request.init.method,
			request.url
		);
		self.inner.state.set(FetchState::Loading);

		Some(Started {
			generation,
			controller,
			request,
		})
	}

	async fn finish(&self, started: Started) -> Option<T> {
		let Started {
			generation,
			controller,
			request,
		} = started;

		let signal = controller.signal();
		let outcome = controller
			.run(self.inner.transport.send(&request, &signal))
			.await;

		if !self.is_current(generation) {
			debug_log!("use_fetch: dropping stale result of generation {}", generation);
			return None;
		}

		let result = match outcome {
			Err(_) => return None,
			Ok(Err(TransportError::Aborted)) => {
				// Aborted by the transport itself: nothing to report, but the
				// execution is over and the binding must not stay loading.
				debug_log!("use_fetch: transport aborted generation {}", generation);
				self.inner.current.borrow_mut().take();
				self.inner.state.set(FetchState::Idle);
				return None;
			}
			Ok(Err(err)) => Err(FetchError::from(err)),
			Ok(Ok(response)) if !response.is_success() => Err(FetchError::http(response.status)),
			Ok(Ok(response)) => response.json::<T>(),
		};

		// Retire the execution; a later teardown has nothing left to abort.
		self.inner.current.borrow_mut().take();

		match result {
			Ok(data) => {
				self.inner.state.set(FetchState::Success(data.clone()));
				Some(data)
			}
			Err(err) => {
				warn_log!("use_fetch: {} {} failed: {}", request.init.method, request.url, err);
				self.inner.state.set(FetchState::Error(err));
				None
			}
		}
	}

	fn is_current(&self, generation: u64) -> bool {
		self.inner
			.current
			.borrow()
			.as_ref()
			.is_some_and(|execution| execution.generation == generation)
	}
}

impl<T: Clone + 'static> UseFetch<T> {
	/// A snapshot of the current state.
	pub fn state(&self) -> FetchState<T> {
		self.inner.state.get()
	}

	/// The state signal, for subscribing to transitions.
	///
	/// A listener that keeps a clone of this binding forms a reference
	/// cycle until its subscription is dropped.
	pub fn state_signal(&self) -> Signal<FetchState<T>> {
		self.inner.state.clone()
	}

	/// The tag of the current state.
	pub fn status(&self) -> FetchStatus {
		self.inner.state.with(FetchState::status)
	}

	/// The payload of the last successful request, while in `Success`.
	pub fn data(&self) -> Option<T> {
		self.inner.state.with(|state| state.data().cloned())
	}

	/// The failure of the last request, while in `Error`.
	pub fn error(&self) -> Option<FetchError> {
		self.inner.state.with(|state| state.error().cloned())
	}

	/// `true` while a request is in flight.
	pub fn is_loading(&self) -> bool {
		self.inner.state.with(FetchState::is_loading)
	}

	/// `true` when the last request succeeded.
	pub fn is_success(&self) -> bool {
		self.inner.state.with(FetchState::is_success)
	}

	/// `true` when the last request failed.
	pub fn is_error(&self) -> bool {
		self.inner.state.with(FetchState::is_error)
	}

	/// The request the binding is configured with, if any.
	pub fn target(&self) -> Option<HttpRequest> {
		self.inner.target.borrow().clone()
	}

	/// Whether the binding runs automatically on configuration changes.
	pub fn is_immediate(&self) -> bool {
		self.inner.immediate.get()
	}

	/// Whether an execution is live.
	pub fn has_pending(&self) -> bool {
		self.inner.current.borrow().is_some()
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for UseFetch<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UseFetch")
			.field("target", &*self.inner.target.borrow())
			.field("immediate", &self.inner.immediate.get())
			.field("state", &self.inner.state)
			.field("generation", &self.inner.generation.get())
			.finish()
	}
}
