//! Single-threaded task spawning
//!
//! Binding state is `Rc`-based and never crosses threads, so background work
//! (automatic fetches, clipboard reset timers) is spawned onto the local task
//! queue: the browser microtask queue on wasm32, a tokio `LocalSet` natively.

use std::future::Future;
use std::time::Duration;

/// Spawns a `!Send` future on the current thread.
///
/// On native targets this must be called from inside a
/// [`tokio::task::LocalSet`].
#[cfg(target_arch = "wasm32")]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	wasm_bindgen_futures::spawn_local(future);
}

/// Spawns a `!Send` future on the current thread.
///
/// On native targets this must be called from inside a
/// [`tokio::task::LocalSet`].
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	// The JoinHandle is dropped on purpose; the task keeps running detached.
	let _ = tokio::task::spawn_local(future);
}

/// Waits for `duration` using the platform timer.
#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
	gloo_timers::future::sleep(duration).await;
}

/// Waits for `duration` using the platform timer.
#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
	tokio::time::sleep(duration).await;
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
	use super::*;
	use std::cell::Cell;
	use std::rc::Rc;
	use tokio::task::LocalSet;

	#[tokio::test(start_paused = true)]
	async fn test_spawn_local_runs_detached_task() {
		let local = LocalSet::new();
		let ran = Rc::new(Cell::new(false));

		local
			.run_until({
				let ran = Rc::clone(&ran);
				async move {
					spawn_local(async move {
						sleep(Duration::from_millis(10)).await;
						ran.set(true);
					});
					sleep(Duration::from_millis(20)).await;
				}
			})
			.await;

		assert!(ran.get());
	}
}
