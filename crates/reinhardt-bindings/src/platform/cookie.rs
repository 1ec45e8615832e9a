//! Cookie jar boundary
//!
//! A [`CookieJar`] exposes the same surface as `document.cookie`: one string
//! holding every visible cookie as `name=value` pairs, and a write operation
//! that takes a single `name=value; attr=...` line.
//!
//! This module also holds the string handling shared by the jars and
//! `use_cookie`: building a cookie line from [`CookieOptions`] and finding a
//! value in a cookie string.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format used by `Date.prototype.toUTCString` (RFC 1123).
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
	/// Only sent on same-site requests
	Strict,
	/// Sent on same-site requests and top-level navigations
	Lax,
	/// Always sent (requires `secure`)
	None,
}

impl SameSite {
	/// The attribute value as written in a cookie line.
	pub fn as_str(&self) -> &'static str {
		match self {
			SameSite::Strict => "strict",
			SameSite::Lax => "lax",
			SameSite::None => "none",
		}
	}
}

/// Attributes applied when a cookie is written.
///
/// Every field is optional so that per-call overrides can be merged over the
/// binding's defaults with [`CookieOptions::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
	/// `path` attribute
	pub path: Option<String>,
	/// `domain` attribute
	pub domain: Option<String>,
	/// `expires` attribute
	pub expires: Option<DateTime<Utc>>,
	/// `max-age` attribute, in seconds
	pub max_age: Option<i64>,
	/// `secure` flag
	pub secure: Option<bool>,
	/// `samesite` attribute
	pub same_site: Option<SameSite>,
}

impl CookieOptions {
	/// Creates options with no attributes set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the `path` attribute.
	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());
		self
	}

	/// Sets the `domain` attribute.
	pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = Some(domain.into());
		self
	}

	/// Sets the `expires` attribute.
	pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
		self.expires = Some(expires);
		self
	}

	/// Sets the `max-age` attribute in seconds.
	pub fn with_max_age(mut self, seconds: i64) -> Self {
		self.max_age = Some(seconds);
		self
	}

	/// Sets the `secure` flag.
	pub fn with_secure(mut self, secure: bool) -> Self {
		self.secure = Some(secure);
		self
	}

	/// Sets the `samesite` attribute.
	pub fn with_same_site(mut self, same_site: SameSite) -> Self {
		self.same_site = Some(same_site);
		self
	}

	/// Returns `self` with every field that `overrides` sets replaced.
	pub fn merge(&self, overrides: &CookieOptions) -> CookieOptions {
		CookieOptions {
			path: overrides.path.clone().or_else(|| self.path.clone()),
			domain: overrides.domain.clone().or_else(|| self.domain.clone()),
			expires: overrides.expires.or(self.expires),
			max_age: overrides.max_age.or(self.max_age),
			secure: overrides.secure.or(self.secure),
			same_site: overrides.same_site.or(self.same_site),
		}
	}
}

/// Builds a cookie line: `name=value; path=..; domain=..; max-age=..;
/// expires=..; samesite=..; secure`.
///
/// Name and value are percent-encoded.
pub fn build_cookie(name: &str, value: &str, options: &CookieOptions) -> String {
	let mut cookie = format!("{}={}", urlencoding::encode(name), urlencoding::encode(value));

	if let Some(path) = options.path.as_deref().filter(|p| !p.is_empty()) {
		cookie.push_str(&format!("; path={}", path));
	}
	if let Some(domain) = options.domain.as_deref().filter(|d| !d.is_empty()) {
		cookie.push_str(&format!("; domain={}", domain));
	}
	if let Some(max_age) = options.max_age {
		cookie.push_str(&format!("; max-age={}", max_age));
	}
	if let Some(expires) = options.expires {
		cookie.push_str(&format!("; expires={}", expires.format(EXPIRES_FORMAT)));
	}
	if let Some(same_site) = options.same_site {
		cookie.push_str(&format!("; samesite={}", same_site.as_str()));
	}
	if options.secure == Some(true) {
		cookie.push_str("; secure");
	}

	cookie
}

/// Finds the raw (still encoded) value of `name` in a cookie string.
///
/// The cookie string format is: "name1=value1; name2=value2; ..."
pub fn parse_cookie_value(cookie_str: &str, name: &str) -> Option<String> {
	for part in cookie_str.split(';') {
		let part = part.trim();
		if let Some((key, value)) = part.split_once('=')
			&& key.trim() == name
		{
			return Some(value.trim().to_string());
		}
	}
	None
}

/// Reads and percent-decodes the cookie stored under `name`.
pub fn read_cookie(cookie_str: &str, name: &str) -> Option<String> {
	let raw = parse_cookie_value(cookie_str, &urlencoding::encode(name))?;
	Some(
		urlencoding::decode(&raw)
			.map(|decoded| decoded.into_owned())
			.unwrap_or(raw),
	)
}

/// The `document.cookie` capability.
pub trait CookieJar {
	/// Whether cookies can be used in this environment.
	fn is_available(&self) -> bool;

	/// All visible cookies as `name=value` pairs joined by `"; "`.
	fn cookie_string(&self) -> String;

	/// Writes one cookie line. Expired cookies are deleted.
	fn write(&self, cookie: &str);
}

/// In-memory [`CookieJar`] that applies browser write semantics.
///
/// A write replaces the cookie of the same name; a write whose `max-age` is
/// not positive or whose `expires` lies in the past deletes it. Cookies are
/// keyed by name only; `path` and `domain` scoping is not modelled.
#[derive(Clone)]
pub struct MemoryCookieJar {
	available: bool,
	cookies: Rc<RefCell<BTreeMap<String, String>>>,
}

impl Default for MemoryCookieJar {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryCookieJar {
	/// Creates an empty, available jar.
	pub fn new() -> Self {
		Self {
			available: true,
			cookies: Rc::new(RefCell::new(BTreeMap::new())),
		}
	}

	/// Creates a jar that reports itself unavailable, as outside a browser.
	pub fn unavailable() -> Self {
		Self {
			available: false,
			..Self::new()
		}
	}

	fn is_expired(attributes: &[(String, String)]) -> bool {
		let now = Utc::now();
		attributes.iter().any(|(name, value)| match name.as_str() {
			"max-age" => value.parse::<i64>().map(|age| age <= 0).unwrap_or(false),
			"expires" => NaiveDateTime::parse_from_str(value, EXPIRES_FORMAT)
				.map(|at| at.and_utc() <= now)
				.unwrap_or(false),
			_ => false,
		})
	}
}

impl CookieJar for MemoryCookieJar {
	fn is_available(&self) -> bool {
		self.available
	}

	fn cookie_string(&self) -> String {
		if !self.available {
			return String::new();
		}
		self.cookies
			.borrow()
			.iter()
			.map(|(name, value)| format!("{}={}", name, value))
			.collect::<Vec<_>>()
			.join("; ")
	}

	fn write(&self, cookie: &str) {
		if !self.available {
			return;
		}

		let mut parts = cookie.split(';');
		let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
			return;
		};
		let attributes: Vec<(String, String)> = parts
			.map(|attr| {
				let attr = attr.trim();
				match attr.split_once('=') {
					Some((k, v)) => (k.trim().to_ascii_lowercase(), v.trim().to_string()),
					None => (attr.to_ascii_lowercase(), String::new()),
				}
			})
			.collect();

		let name = name.trim().to_string();
		if Self::is_expired(&attributes) {
			self.cookies.borrow_mut().remove(&name);
		} else {
			self.cookies
				.borrow_mut()
				.insert(name, value.trim().to_string());
		}
	}
}

impl fmt::Debug for MemoryCookieJar {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryCookieJar")
			.field("available", &self.available)
			.field("cookies", &self.cookie_string())
			.finish()
	}
}

/// [`CookieJar`] backed by `document.cookie`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentCookieJar;

#[cfg(target_arch = "wasm32")]
impl DocumentCookieJar {
	/// Creates a handle to `document.cookie`.
	pub fn new() -> Self {
		Self
	}

	fn document(&self) -> Option<web_sys::HtmlDocument> {
		use wasm_bindgen::JsCast;

		if !crate::environment::is_browser() {
			return None;
		}
		web_sys::window()?
			.document()?
			.dyn_into::<web_sys::HtmlDocument>()
			.ok()
	}
}

#[cfg(target_arch = "wasm32")]
impl CookieJar for DocumentCookieJar {
	fn is_available(&self) -> bool {
		self.document().is_some()
	}

	fn cookie_string(&self) -> String {
		self.document()
			.and_then(|doc| doc.cookie().ok())
			.unwrap_or_default()
	}

	fn write(&self, cookie: &str) {
		if let Some(doc) = self.document()
			&& let Err(err) = doc.set_cookie(cookie)
		{
			crate::warn_log!("DocumentCookieJar: write failed: {:?}", err);
		}
	}
}
