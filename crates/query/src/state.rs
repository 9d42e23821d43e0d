use std::sync::Arc;

use roster_worker::Generation;

use crate::{FetchError, QueryParams, ResultPage};

/// Observable state of a [`Coordinator`](crate::Coordinator).
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorState<T> {
	/// Nothing dispatched yet.
	Idle,
	/// A request for `params` is in flight.
	Loading {
		generation: Generation,
		params: QueryParams,
		/// Result still worth showing while the new one loads.
		previous: Option<Arc<ResultPage<T>>>,
	},
	Success {
		generation: Generation,
		params: QueryParams,
		result: Arc<ResultPage<T>>,
	},
	Error {
		generation: Generation,
		params: QueryParams,
		error: FetchError,
	},
	/// Torn down; accepts no further dispatches.
	Disposed,
}

impl<T> CoordinatorState<T> {
	pub const fn name(&self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Loading { .. } => "loading",
			Self::Success { .. } => "success",
			Self::Error { .. } => "error",
			Self::Disposed => "disposed",
		}
	}

	pub fn generation(&self) -> Option<Generation> {
		match self {
			Self::Loading { generation, .. } | Self::Success { generation, .. } | Self::Error { generation, .. } => Some(*generation),
			Self::Idle | Self::Disposed => None,
		}
	}

	/// Parameters that produced (or are producing) this state.
	pub fn params(&self) -> Option<&QueryParams> {
		match self {
			Self::Loading { params, .. } | Self::Success { params, .. } | Self::Error { params, .. } => Some(params),
			Self::Idle | Self::Disposed => None,
		}
	}

	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading { .. })
	}

	/// The committed result, only in `Success`.
	pub fn result(&self) -> Option<&Arc<ResultPage<T>>> {
		match self {
			Self::Success { result, .. } => Some(result),
			_ => None,
		}
	}

	/// Rows a view should render: the committed result, or while loading the
	/// previous one.
	pub fn visible_result(&self) -> Option<&Arc<ResultPage<T>>> {
		match self {
			Self::Success { result, .. } => Some(result),
			Self::Loading { previous, .. } => previous.as_ref(),
			_ => None,
		}
	}

	pub fn error(&self) -> Option<&FetchError> {
		match self {
			Self::Error { error, .. } => Some(error),
			_ => None,
		}
	}
}
