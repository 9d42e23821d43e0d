//! Scheduling primitives shared by list query coordinators.
//!
//! - [`Timer`]: cancellable one-shot delayed callback.
//! - [`Debouncer`]: coalesces bursts of submissions into one settled value.
//! - [`GenerationClock`] / [`RequestHandle`]: monotonic request tagging with
//!   generation-scoped cancellation.
//! - [`spawn`]: task spawning classified by [`TaskClass`].

mod class;
mod debounce;
mod spawn;
mod timer;
mod token;

pub use class::TaskClass;
pub use debounce::Debouncer;
pub use spawn::spawn;
pub use timer::Timer;
pub use token::{Generation, GenerationClock, RequestHandle};
