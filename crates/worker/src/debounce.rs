use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::Timer;

/// Latest submitted value, tagged so that a timer fire racing a flush or
/// cancel cannot deliver it twice.
struct Slot<T> {
	epoch: u64,
	value: Option<T>,
}

/// Coalesces bursts of submissions into one delivery of the last value.
///
/// Every [`submit`](Self::submit) re-arms a quiet-period timer. When it fires,
/// `on_settle` receives the most recent value; intermediate values are dropped.
pub struct Debouncer<T> {
	window: Duration,
	timer: Timer,
	slot: Arc<Mutex<Slot<T>>>,
	on_settle: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T: Send + 'static> std::fmt::Debug for Debouncer<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Debouncer")
			.field("window", &self.window)
			.field("armed", &self.timer.is_armed())
			.field("pending", &self.is_pending())
			.finish()
	}
}

impl<T: Send + 'static> Debouncer<T> {
	pub fn new<F>(window: Duration, on_settle: F) -> Self
	where
		F: Fn(T) + Send + Sync + 'static,
	{
		Self {
			window,
			timer: Timer::new(),
			slot: Arc::new(Mutex::new(Slot { epoch: 0, value: None })),
			on_settle: Arc::new(on_settle),
		}
	}

	pub fn window(&self) -> Duration {
		self.window
	}

	/// Stores `value` and restarts the quiet period.
	pub fn submit(&mut self, value: T) {
		let epoch = {
			let mut slot = self.slot.lock();
			slot.epoch += 1;
			slot.value = Some(value);
			slot.epoch
		};

		let slot = self.slot.clone();
		let on_settle = self.on_settle.clone();
		self.timer.arm(self.window, move || {
			let value = {
				let mut slot = slot.lock();
				if slot.epoch != epoch {
					return;
				}
				slot.value.take()
			};
			if let Some(value) = value {
				on_settle(value);
			}
		});
	}

	/// Cancels the quiet period and delivers the pending value immediately.
	///
	/// Does nothing when no value is pending.
	pub fn flush_now(&mut self) {
		self.timer.cancel();
		let value = {
			let mut slot = self.slot.lock();
			slot.epoch += 1;
			slot.value.take()
		};
		if let Some(value) = value {
			(self.on_settle)(value);
		}
	}

	/// Discards the pending value without delivering it.
	pub fn cancel(&mut self) {
		self.timer.cancel();
		let mut slot = self.slot.lock();
		slot.epoch += 1;
		slot.value = None;
	}

	/// Returns true while a submitted value awaits delivery.
	pub fn is_pending(&self) -> bool {
		self.slot.lock().value.is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn recording(window: Duration) -> (Debouncer<&'static str>, Arc<Mutex<Vec<&'static str>>>) {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		let debouncer = Debouncer::new(window, move |value| sink.lock().push(value));
		(debouncer, seen)
	}

	async fn step(ms: u64) {
		tokio::task::yield_now().await;
		tokio::time::advance(Duration::from_millis(ms)).await;
		tokio::task::yield_now().await;
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn burst_delivers_only_last_value() {
		let (mut debouncer, seen) = recording(Duration::from_millis(300));

		debouncer.submit("R");
		step(100).await;
		debouncer.submit("Ra");
		step(50).await;
		debouncer.submit("Ram");
		step(299).await;
		assert!(seen.lock().is_empty());
		assert!(debouncer.is_pending());

		step(1).await;
		assert_eq!(*seen.lock(), vec!["Ram"]);
		assert!(!debouncer.is_pending());
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn flush_now_delivers_synchronously_once() {
		let (mut debouncer, seen) = recording(Duration::from_millis(300));

		debouncer.submit("a");
		debouncer.submit("b");
		debouncer.flush_now();
		assert_eq!(*seen.lock(), vec!["b"]);

		step(1_000).await;
		assert_eq!(*seen.lock(), vec!["b"]);

		debouncer.flush_now();
		assert_eq!(seen.lock().len(), 1);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn cancel_discards_pending_value() {
		let (mut debouncer, seen) = recording(Duration::from_millis(300));

		debouncer.submit("gone");
		debouncer.cancel();
		assert!(!debouncer.is_pending());

		step(1_000).await;
		assert!(seen.lock().is_empty());

		debouncer.submit("kept");
		step(300).await;
		assert_eq!(*seen.lock(), vec!["kept"]);
	}
}
