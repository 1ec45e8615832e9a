//! Error types for the ambient resource bindings.
//!
//! Failures of a user-intended operation (an HTTP request, a clipboard write)
//! are surfaced as observable state. Failures caused by the environment
//! (no browser, corrupted storage) are absorbed by the bindings and only
//! appear here so that capability implementations can report them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a failed request, stored in [`FetchState::Error`](crate::hooks::FetchState).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FetchError {
	/// The request could not be delivered (connection refused, DNS, CORS, ...)
	#[error("Network error: {0}")]
	Transport(String),

	/// A response arrived with a status outside `200..=299`
	#[error("HTTP {status}")]
	Http {
		/// HTTP status code
		status: u16,
	},

	/// The response body was not valid JSON for the expected type
	#[error("Deserialization error: {0}")]
	Decode(String),
}

impl FetchError {
	/// Create a transport error
	pub fn transport(msg: impl Into<String>) -> Self {
		Self::Transport(msg.into())
	}

	/// Create an HTTP status error
	pub fn http(status: u16) -> Self {
		Self::Http { status }
	}

	/// Create a decode error
	pub fn decode(msg: impl Into<String>) -> Self {
		Self::Decode(msg.into())
	}

	/// Returns the HTTP status code when the failure came from a response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http { status } => Some(*status),
			_ => None,
		}
	}
}

/// Errors reported by a [`Transport`](crate::platform::transport::Transport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	/// The request was cancelled through its abort signal
	#[error("request aborted")]
	Aborted,

	/// The request was rejected before it was sent (bad method, header, URL)
	#[error("invalid request: {0}")]
	InvalidRequest(String),

	/// The request failed in flight
	#[error("{0}")]
	Failed(String),
}

impl From<TransportError> for FetchError {
	fn from(err: TransportError) -> Self {
		FetchError::Transport(err.to_string())
	}
}

/// Errors reported by a [`KeyValueStore`](crate::platform::storage::KeyValueStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
	/// No storage is reachable in this environment
	#[error("storage is not available")]
	Unavailable,

	/// The backend refused the operation (quota exceeded, security error)
	#[error("storage error: {0}")]
	Backend(String),
}

/// Errors reported by a [`Clipboard`](crate::platform::clipboard::Clipboard).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
	/// No clipboard is reachable in this environment
	#[error("Not in browser")]
	Unavailable,

	/// The browser refused the write (permission denied, no user gesture)
	#[error("clipboard write denied: {0}")]
	Denied(String),
}
