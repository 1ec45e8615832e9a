//! Cookie hook: use_cookie

use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::platform::cookie::{CookieJar, CookieOptions, build_cookie, read_cookie};
use crate::reactive::Signal;

struct CookieInner {
	jar: Rc<dyn CookieJar>,
	key: String,
	initial: Option<String>,
	options: CookieOptions,
	value: Signal<Option<String>>,
}

/// Handle returned by [`use_cookie`].
#[derive(Clone)]
pub struct UseCookie {
	inner: Rc<CookieInner>,
}

/// Binds the cookie named `key` to a signal.
///
/// The current value is read once from the jar, falling back to `initial`
/// when the cookie is absent or the jar is unavailable. `options` are the
/// defaults for every write and can be overridden per call with
/// [`UseCookie::set_with`].
///
/// # Example
///
/// ```ignore
/// use std::rc::Rc;
/// use reinhardt_bindings::hooks::use_cookie;
/// use reinhardt_bindings::platform::{CookieOptions, DocumentCookieJar, SameSite};
///
/// let consent = use_cookie(
///     Rc::new(DocumentCookieJar::new()),
///     "consent",
///     None,
///     CookieOptions::new().with_path("/").with_same_site(SameSite::Lax),
/// );
/// consent.set("granted");
/// ```
pub fn use_cookie(
	jar: Rc<dyn CookieJar>,
	key: impl Into<String>,
	initial: Option<String>,
	options: CookieOptions,
) -> UseCookie {
	let key = key.into();
	let current = if jar.is_available() {
		read_cookie(&jar.cookie_string(), &key).or_else(|| initial.clone())
	} else {
		initial.clone()
	};

	UseCookie {
		inner: Rc::new(CookieInner {
			jar,
			key,
			initial,
			options,
			value: Signal::new(current),
		}),
	}
}

impl UseCookie {
	/// The current value.
	pub fn get(&self) -> Option<String> {
		self.inner.value.get()
	}

	/// The signal holding the value.
	pub fn signal(&self) -> Signal<Option<String>> {
		self.inner.value.clone()
	}

	/// The cookie name.
	pub fn key(&self) -> &str {
		&self.inner.key
	}

	/// Writes `value` with the binding's options.
	pub fn set(&self, value: impl Into<String>) {
		self.set_with(value, &CookieOptions::default());
	}

	/// Writes `value` with the binding's options overridden by `overrides`.
	pub fn set_with(&self, value: impl Into<String>, overrides: &CookieOptions) {
		let value = value.into();
		let inner = &self.inner;
		if inner.jar.is_available() {
			let options = inner.options.merge(overrides);
			inner.jar.write(&build_cookie(&inner.key, &value, &options));
		}
		inner.value.set(Some(value));
	}

	/// Expires the cookie and resets the value to the initial one.
	pub fn remove(&self) {
		let inner = &self.inner;
		if inner.jar.is_available() {
			let options = CookieOptions {
				path: Some(inner.options.path.clone().unwrap_or_else(|| "/".to_string())),
				domain: inner.options.domain.clone(),
				expires: Some(DateTime::<Utc>::UNIX_EPOCH),
				..CookieOptions::default()
			};
			inner.jar.write(&build_cookie(&inner.key, "", &options));
		}
		inner.value.set(inner.initial.clone());
	}
}

impl fmt::Debug for UseCookie {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UseCookie")
			.field("key", &self.inner.key)
			.field("value", &self.inner.value)
			.field("options", &self.inner.options)
			.finish()
	}
}
