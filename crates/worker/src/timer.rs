use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{TaskClass, spawn};

/// Cancellable one-shot delayed callback.
///
/// Re-arming cancels the previous schedule. Each [`arm`](Self::arm) fires its
/// callback at most once. Dropping the timer cancels any pending schedule.
#[derive(Debug, Default)]
pub struct Timer {
	armed: Option<CancellationToken>,
}

impl Timer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Schedules `callback` to run once after `delay`.
	pub fn arm<F>(&mut self, delay: Duration, callback: F)
	where
		F: FnOnce() + Send + 'static,
	{
		self.cancel();

		let cancel = CancellationToken::new();
		self.armed = Some(cancel.clone());

		spawn(TaskClass::Timer, async move {
			tokio::select! {
				biased;
				_ = cancel.cancelled() => {}
				_ = sleep(delay) => {
					if cancel.is_cancelled() {
						return;
					}
					// Marks the schedule as spent for `is_armed`.
					cancel.cancel();
					tracing::trace!(delay_ms = delay.as_millis() as u64, "timer.fire");
					callback();
				}
			}
		});
	}

	/// Cancels the pending schedule, if any. Idempotent.
	pub fn cancel(&mut self) {
		if let Some(cancel) = self.armed.take() {
			cancel.cancel();
		}
	}

	/// Returns true while a schedule is pending (neither fired nor cancelled).
	pub fn is_armed(&self) -> bool {
		self.armed.as_ref().is_some_and(|cancel| !cancel.is_cancelled())
	}
}

impl Drop for Timer {
	fn drop(&mut self) {
		self.cancel();
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
		let fired = Arc::new(AtomicUsize::new(0));
		let handle = fired.clone();
		let make = move || {
			let fired = handle.clone();
			Box::new(move || {
				fired.fetch_add(1, Ordering::SeqCst);
			}) as Box<dyn FnOnce() + Send>
		};
		(fired, make)
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn fires_once_after_delay() {
		let (fired, make) = counter();
		let mut timer = Timer::new();
		timer.arm(Duration::from_millis(300), make());
		assert!(timer.is_armed());

		tokio::task::yield_now().await;
		tokio::time::advance(Duration::from_millis(299)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 0);

		tokio::time::advance(Duration::from_millis(1)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 1);
		assert!(!timer.is_armed());

		tokio::time::advance(Duration::from_secs(5)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn rearm_replaces_previous_schedule() {
		let (fired, make) = counter();
		let mut timer = Timer::new();
		timer.arm(Duration::from_millis(300), make());
		tokio::task::yield_now().await;
		tokio::time::advance(Duration::from_millis(200)).await;

		timer.arm(Duration::from_millis(300), make());
		tokio::task::yield_now().await;
		tokio::time::advance(Duration::from_millis(200)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 0);

		tokio::time::advance(Duration::from_millis(100)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn cancel_is_idempotent_and_suppresses_fire() {
		let (fired, make) = counter();
		let mut timer = Timer::new();
		timer.cancel();

		timer.arm(Duration::from_millis(50), make());
		timer.cancel();
		timer.cancel();
		assert!(!timer.is_armed());

		tokio::time::advance(Duration::from_millis(100)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 0);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn drop_cancels_pending_schedule() {
		let (fired, make) = counter();
		{
			let mut timer = Timer::new();
			timer.arm(Duration::from_millis(50), make());
		}
		tokio::time::advance(Duration::from_millis(100)).await;
		tokio::task::yield_now().await;
		assert_eq!(fired.load(Ordering::SeqCst), 0);
	}
}
