//! Reinhardt Bindings - reactive bindings to browser resources
//!
//! Small stateful bindings that connect UI state to the resources a page
//! talks to: HTTP endpoints, `localStorage`, cookies and the clipboard.
//!
//! ## Features
//!
//! - **Race-free fetching**: only the most recently started request may
//!   update a binding; superseded requests are aborted
//! - **Injected capabilities**: network, storage, cookies and clipboard sit
//!   behind traits with browser and in-memory implementations
//! - **Same code everywhere**: bindings compile for `wasm32` and for native
//!   targets (SSR, tests), where the browser capabilities report themselves
//!   unavailable
//!
//! ## Architecture
//!
//! - [`hooks`]: `use_fetch`, `use_local_storage`, `use_cookie`, `use_clipboard`
//! - [`reactive`]: `Signal` cells and structural dependency tracking
//! - [`platform`]: capability traits and their implementations
//! - [`abort`]: `AbortController` / `AbortSignal`
//! - [`spawn`]: local task spawning and timers
//! - [`error`]: error types
//! - [`testing`]: `MockTransport`
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use reinhardt_bindings::{HttpTransport, UseFetchOptions, use_fetch};
//!
//! #[derive(Clone, serde::Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let users = use_fetch::<Vec<User>>(
//!     Rc::new(HttpTransport::new()),
//!     Some("/api/users"),
//!     UseFetchOptions::default(),
//! );
//!
//! let subscription = users.state_signal().subscribe(|state| {
//!     if let Some(users) = state.data() {
//!         reinhardt_bindings::info_log!("{} users", users.len());
//!     }
//! });
//! ```

#![warn(missing_docs)]

// Core modules
pub mod abort;
pub mod environment;
pub mod error;
pub mod logging;
pub mod reactive;
pub mod spawn;

// Capabilities (browser and in-memory implementations)
pub mod platform;

// Bindings
pub mod hooks;

// Testing utilities (available on both WASM and server)
pub mod testing;

// Re-export commonly used types
pub use abort::{AbortController, AbortSignal};
pub use environment::is_browser;
pub use error::{ClipboardError, FetchError, StorageError, TransportError};
pub use hooks::{
	CopyOptions, CopyStatus, FetchState, FetchStatus, UseClipboard, UseCookie, UseFetch,
	UseFetchOptions, UseLocalStorage, use_clipboard, use_cookie, use_fetch, use_local_storage,
};
pub use platform::{
	Clipboard, CookieJar, CookieOptions, HttpRequest, HttpResponse, HttpTransport,
	KeyValueStore, MemoryClipboard, MemoryCookieJar, MemoryStore, NavigatorClipboard,
	RequestCredentials, RequestInit, SameSite, Transport,
};
#[cfg(target_arch = "wasm32")]
pub use platform::{DocumentCookieJar, WebStorage};
pub use reactive::{Signal, Subscription, Watch};
pub use testing::MockTransport;
