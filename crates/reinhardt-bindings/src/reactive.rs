//! Reactive primitives shared by the bindings
//!
//! - [`Signal`]: observable state cell holding a binding's local state
//! - [`Subscription`]: RAII guard for listeners (signals, storage events)
//! - [`Watch`]: structural change detection for hook dependencies

pub mod signal;
pub mod watch;

pub use signal::{Signal, Subscription};
pub use watch::Watch;
