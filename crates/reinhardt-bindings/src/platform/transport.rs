//! Network transport boundary
//!
//! `use_fetch` never talks to the network directly. It hands an
//! [`HttpRequest`] and an [`AbortSignal`] to a [`Transport`] and gets back a
//! status code and body. [`HttpTransport`] is the default implementation,
//! built on `reqwest` (which uses `fetch` on wasm32).

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::abort::AbortSignal;
use crate::error::{FetchError, TransportError};

/// Credentials mode of a request, as in the Fetch API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestCredentials {
	/// Never send cookies
	Omit,
	/// Send cookies to the same origin only
	#[default]
	SameOrigin,
	/// Always send cookies, including cross-origin
	Include,
}

/// Transport configuration of a request (everything except the URL).
///
/// Two `RequestInit` values with the same serialized shape are considered the
/// same configuration by `use_fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestInit {
	/// HTTP method
	pub method: String,
	/// Request headers, sorted by name
	pub headers: BTreeMap<String, String>,
	/// Request body
	pub body: Option<String>,
	/// Credentials mode (only honored by the browser transport)
	pub credentials: RequestCredentials,
}

impl Default for RequestInit {
	fn default() -> Self {
		Self {
			method: "GET".to_string(),
			headers: BTreeMap::new(),
			body: None,
			credentials: RequestCredentials::default(),
		}
	}
}

impl RequestInit {
	/// Creates a GET configuration with no headers and no body.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the HTTP method.
	pub fn with_method(mut self, method: impl Into<String>) -> Self {
		self.method = method.into();
		self
	}

	/// Adds a header, replacing an existing header of the same name.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());
		self
	}

	/// Sets a raw request body.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());
		self
	}

	/// Serializes `value` as the JSON body and sets `Content-Type`.
	pub fn with_json<B: Serialize>(mut self, value: &B) -> Result<Self, serde_json::Error> {
		self.body = Some(serde_json::to_string(value)?);
		self.headers
			.insert("Content-Type".to_string(), "application/json".to_string());
		Ok(self)
	}

	/// Sets the credentials mode.
	pub fn with_credentials(mut self, credentials: RequestCredentials) -> Self {
		self.credentials = credentials;
		self
	}
}

/// A resolved request: address plus configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
	/// Absolute or origin-relative URL
	pub url: String,
	/// Method, headers, body, ...
	pub init: RequestInit,
}

impl HttpRequest {
	/// Creates a request for `url` with the given configuration.
	pub fn new(url: impl Into<String>, init: RequestInit) -> Self {
		Self {
			url: url.into(),
			init,
		}
	}
}

/// A response as seen by the bindings: status code and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code
	pub status: u16,
	/// Raw response body
	pub body: Vec<u8>,
}

impl HttpResponse {
	/// Creates a response.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self {
			status,
			body: body.into(),
		}
	}

	/// Returns `true` for status codes in `200..=299`.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decodes the body as JSON.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
		serde_json::from_slice(&self.body).map_err(|e| FetchError::decode(e.to_string()))
	}
}

/// The "issue request" capability consumed by `use_fetch`.
///
/// Implementations should stop work when `signal` is aborted and report
/// [`TransportError::Aborted`]; the caller suppresses stale results even if
/// they do not.
#[async_trait(?Send)]
pub trait Transport {
	/// Sends `request` and returns the response status and body.
	async fn send(
		&self,
		request: &HttpRequest,
		signal: &AbortSignal,
	) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	base_url: Option<Url>,
}

impl Default for HttpTransport {
	fn default() -> Self {
		Self::new()
	}
}

impl HttpTransport {
	/// Creates a transport. In the browser, relative URLs resolve against the
	/// current page location.
	pub fn new() -> Self {
		Self {
			client: reqwest::Client::new(),
			base_url: default_base_url(),
		}
	}

	/// Creates a transport from an existing client.
	pub fn with_client(client: reqwest::Client) -> Self {
		Self {
			client,
			base_url: default_base_url(),
		}
	}

	/// Resolves relative URLs against `base`.
	pub fn with_base_url(mut self, base: &str) -> Result<Self, TransportError> {
		let base = Url::parse(base)
			.map_err(|e| TransportError::InvalidRequest(format!("base url: {}", e)))?;
		self.base_url = Some(base);
		Ok(self)
	}

	/// Turns `url` into an absolute URL.
	pub fn resolve_url(&self, url: &str) -> Result<Url, TransportError> {
		match Url::parse(url) {
			Ok(url) => Ok(url),
			Err(url::ParseError::RelativeUrlWithoutBase) => self
				.base_url
				.as_ref()
				.ok_or_else(|| {
					TransportError::InvalidRequest(format!("relative url without base: {}", url))
				})?
				.join(url)
				.map_err(|e| TransportError::InvalidRequest(e.to_string())),
			Err(e) => Err(TransportError::InvalidRequest(e.to_string())),
		}
	}

	fn build(&self, request: &HttpRequest) -> Result<reqwest::RequestBuilder, TransportError> {
		let method = reqwest::Method::from_bytes(request.init.method.to_uppercase().as_bytes())
			.map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
		let url = self.resolve_url(&request.url)?;

		let mut builder = self.client.request(method, url);
		for (name, value) in &request.init.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(body) = &request.init.body {
			builder = builder.body(body.clone());
		}

		#[cfg(target_arch = "wasm32")]
		{
			builder = match request.init.credentials {
				RequestCredentials::Omit => builder.fetch_credentials_omit(),
				RequestCredentials::SameOrigin => builder.fetch_credentials_same_origin(),
				RequestCredentials::Include => builder.fetch_credentials_include(),
			};
		}

		Ok(builder)
	}
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
	async fn send(
		&self,
		request: &HttpRequest,
		signal: &AbortSignal,
	) -> Result<HttpResponse, TransportError> {
		if signal.is_aborted() {
			return Err(TransportError::Aborted);
		}

		let response = self
			.build(request)?
			.send()
			.await
			.map_err(|e| TransportError::Failed(e.to_string()))?;
		let status = response.status().as_u16();

		if signal.is_aborted() {
			return Err(TransportError::Aborted);
		}

		let body = response
			.bytes()
			.await
			.map_err(|e| TransportError::Failed(e.to_string()))?;

		Ok(HttpResponse::new(status, body.to_vec()))
	}
}

#[cfg(target_arch = "wasm32")]
fn default_base_url() -> Option<Url> {
	let href = web_sys::window()?.location().href().ok()?;
	Url::parse(&href).ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn default_base_url() -> Option<Url> {
	None
}
