use std::fmt;

use tokio_util::sync::CancellationToken;

/// Identifier of one logical query dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
	/// Returns the raw generation number.
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for Generation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "g{}", self.0)
	}
}

/// Monotonic generation clock owned by a single coordinator.
///
/// The first issued generation is `0`.
#[derive(Debug, Default)]
pub struct GenerationClock {
	next: u64,
}

impl GenerationClock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a generation strictly greater than every previously issued one.
	pub fn next(&mut self) -> Generation {
		let generation = Generation(self.next);
		self.next += 1;
		generation
	}
}

/// Generation-scoped cancellation handle for one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestHandle {
	generation: Generation,
	cancel: CancellationToken,
}

impl RequestHandle {
	/// Creates a handle with a fresh cancellation token.
	pub fn new(generation: Generation) -> Self {
		Self {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	pub const fn generation(&self) -> Generation {
		self.generation
	}

	/// Returns a clone of the token the fetch must observe.
	pub fn token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Requests cancellation. Idempotent.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clock_starts_at_zero_and_increases() {
		let mut clock = GenerationClock::new();
		let first = clock.next();
		let second = clock.next();
		assert_eq!(first.get(), 0);
		assert!(second > first);
		assert_eq!(second.to_string(), "g1");
	}

	#[test]
	fn cancel_reaches_cloned_tokens() {
		let mut clock = GenerationClock::new();
		let handle = RequestHandle::new(clock.next());
		let token = handle.token();
		assert!(!token.is_cancelled());

		handle.cancel();
		handle.cancel();
		assert!(token.is_cancelled());
		assert!(handle.is_cancelled());
	}
}
