//! Ambient resource capabilities
//!
//! The bindings never reach for `window`, `document` or `navigator` directly.
//! Each resource is an injected capability with a browser implementation
//! (wasm32 only) and an in-memory implementation usable everywhere:
//!
//! | Capability | Browser | In-memory |
//! |------------|---------|-----------|
//! | [`Transport`] | [`HttpTransport`] (reqwest over `fetch`) | [`MockTransport`](crate::testing::MockTransport) |
//! | [`KeyValueStore`] | `WebStorage` | [`MemoryStore`] |
//! | [`CookieJar`] | `DocumentCookieJar` | [`MemoryCookieJar`] |
//! | [`Clipboard`] | [`NavigatorClipboard`] | [`MemoryClipboard`] |

pub mod clipboard;
pub mod cookie;
pub mod storage;
pub mod transport;

pub use clipboard::{Clipboard, MemoryClipboard, NavigatorClipboard};
#[cfg(target_arch = "wasm32")]
pub use cookie::DocumentCookieJar;
pub use cookie::{CookieJar, CookieOptions, MemoryCookieJar, SameSite};
#[cfg(target_arch = "wasm32")]
pub use storage::WebStorage;
pub use storage::{KeyValueStore, MemoryStore, StorageEvent, StorageListener};
pub use transport::{
	HttpRequest, HttpResponse, HttpTransport, RequestCredentials, RequestInit, Transport,
};
