//! Testing utilities
//!
//! [`MockTransport`] stands in for the network in unit tests, SSR and
//! component tests. It records every request and either answers at once
//! ([`MockTransport::always`]) or holds each request open until the test
//! resolves it, which makes out-of-order completion easy to script:
//!
//! ```ignore
//! let transport = MockTransport::new();
//! let fetch = use_fetch::<Value>(Rc::new(transport.clone()), Some("/a"), UseFetchOptions::manual());
//!
//! let mut first = Box::pin(fetch.execute());
//! let _ = futures::poll!(&mut first);       // request #0 in flight
//! let mut second = Box::pin(fetch.execute());
//! let _ = futures::poll!(&mut second);      // request #1 supersedes #0
//!
//! transport.resolve(1, HttpResponse::new(200, "2"));
//! transport.resolve(0, HttpResponse::new(200, "1")); // too late, ignored
//! ```
//!
//! The mock never looks at the abort signal on its own; cancellation is
//! observable through [`MockTransport::was_aborted`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use serde::Serialize;

use crate::abort::AbortSignal;
use crate::error::TransportError;
use crate::platform::transport::{HttpRequest, HttpResponse, Transport};

type Reply = Result<HttpResponse, TransportError>;

struct Pending {
	request: HttpRequest,
	signal: AbortSignal,
	reply: Option<oneshot::Sender<Reply>>,
}

#[derive(Default)]
struct MockState {
	auto_reply: Option<Reply>,
	requests: RefCell<Vec<Pending>>,
}

/// Scriptable [`Transport`] for tests.
///
/// Clones share the recorded requests.
#[derive(Clone, Default)]
pub struct MockTransport {
	state: Rc<MockState>,
}

impl MockTransport {
	/// Creates a transport that holds every request until it is resolved.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a transport that answers every request with `response`.
	pub fn always(response: HttpResponse) -> Self {
		Self {
			state: Rc::new(MockState {
				auto_reply: Some(Ok(response)),
				requests: RefCell::default(),
			}),
		}
	}

	/// Creates a transport that answers every request with `status` and
	/// `body` serialized as JSON.
	pub fn json<B: Serialize>(status: u16, body: &B) -> Self {
		let body = serde_json::to_vec(body).unwrap_or_default();
		Self::always(HttpResponse::new(status, body))
	}

	/// Creates a transport that fails every request with `error`.
	pub fn always_fail(error: TransportError) -> Self {
		Self {
			state: Rc::new(MockState {
				auto_reply: Some(Err(error)),
				requests: RefCell::default(),
			}),
		}
	}

	/// Number of requests issued so far.
	pub fn request_count(&self) -> usize {
		self.state.requests.borrow().len()
	}

	/// The request issued at `index` (in issue order).
	pub fn request(&self, index: usize) -> Option<HttpRequest> {
		self.state
			.requests
			.borrow()
			.get(index)
			.map(|pending| pending.request.clone())
	}

	/// Whether the request at `index` was aborted by its caller.
	pub fn was_aborted(&self, index: usize) -> bool {
		self.state
			.requests
			.borrow()
			.get(index)
			.is_some_and(|pending| pending.signal.is_aborted())
	}

	/// Completes the request at `index` with `response`.
	///
	/// Returns `false` if the request does not exist, was already completed,
	/// or its caller stopped waiting for it.
	pub fn resolve(&self, index: usize, response: HttpResponse) -> bool {
		self.reply(index, Ok(response))
	}

	/// Completes the request at `index` with a JSON body.
	pub fn resolve_json<B: Serialize>(&self, index: usize, status: u16, body: &B) -> bool {
		let body = serde_json::to_vec(body).unwrap_or_default();
		self.resolve(index, HttpResponse::new(status, body))
	}

	/// Fails the request at `index` with `error`.
	pub fn fail(&self, index: usize, error: TransportError) -> bool {
		self.reply(index, Err(error))
	}

	fn reply(&self, index: usize, reply: Reply) -> bool {
		let sender = self
			.state
			.requests
			.borrow_mut()
			.get_mut(index)
			.and_then(|pending| pending.reply.take());
		match sender {
			Some(sender) => sender.send(reply).is_ok(),
			None => false,
		}
	}
}

#[async_trait(?Send)]
impl Transport for MockTransport {
	async fn send(&self, request: &HttpRequest, signal: &AbortSignal) -> Reply {
		if let Some(reply) = &self.state.auto_reply {
			self.state.requests.borrow_mut().push(Pending {
				request: request.clone(),
				signal: signal.clone(),
				reply: None,
			});
			return reply.clone();
		}

		let (sender, receiver) = oneshot::channel();
		self.state.requests.borrow_mut().push(Pending {
			request: request.clone(),
			signal: signal.clone(),
			reply: Some(sender),
		});

		receiver
			.await
			.unwrap_or_else(|_| Err(TransportError::Failed("mock reply dropped".into())))
	}
}

impl fmt::Debug for MockTransport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MockTransport")
			.field("auto_reply", &self.state.auto_reply)
			.field("requests", &self.request_count())
			.finish()
	}
}
