//! Stateful bindings to ambient resources
//!
//! Each hook returns a cheap-to-clone handle whose state lives in
//! [`Signal`](crate::reactive::Signal)s:
//!
//! - [`use_fetch`]: a JSON endpoint with loading and error state
//! - [`use_local_storage`]: one JSON-encoded entry of a key-value store,
//!   kept in sync with other documents
//! - [`use_cookie`]: one cookie
//! - [`use_clipboard`]: copy-to-clipboard with an optional reset timer
//!
//! Resources are passed in as capabilities from [`platform`](crate::platform),
//! so every hook runs unchanged in the browser, on the server and in tests.

pub mod use_clipboard;
pub mod use_cookie;
pub mod use_fetch;
pub mod use_local_storage;

pub use use_clipboard::{CopyOptions, CopyStatus, UseClipboard, use_clipboard};
pub use use_cookie::{UseCookie, use_cookie};
pub use use_fetch::{FetchState, FetchStatus, UseFetch, UseFetchOptions, use_fetch};
pub use use_local_storage::{UseLocalStorage, use_local_storage};
