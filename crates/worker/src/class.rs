/// Execution classes used to label spawned work in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Delayed callbacks armed by a [`Timer`](crate::Timer).
	Timer,
	/// Fetch work issued for one query generation.
	Request,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Timer => "timer",
			Self::Request => "request",
		}
	}
}
