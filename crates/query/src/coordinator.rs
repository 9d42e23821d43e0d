//! Per-view list query coordinator.
//!
//! # Dispatch
//!
//! Filter edits ([`Coordinator::set_filters`]) update the parameters at once
//! but reach the fetcher only after the debounce window has been quiet. Page
//! and page-size changes, and [`Coordinator::refresh`], dispatch immediately
//! and drop any filter change still waiting in the debouncer (its parameters
//! are already part of the immediate dispatch).
//!
//! # Generations
//!
//! Every effective dispatch cancels the previous request and takes a fresh
//! [`Generation`]. Request tasks report back over a channel tagged with their
//! generation; anything that is not the current generation when the coordinator
//! processes it is dropped without a state change. Cancelled requests report
//! nothing at all.
//!
//! # Driving
//!
//! Spawned work never touches coordinator state. The owning view loop calls
//! [`Coordinator::poll_events`] each tick, or awaits [`Coordinator::changed`].

use std::sync::Arc;

use roster_worker::{Debouncer, Generation, GenerationClock, RequestHandle, TaskClass, spawn};
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace, warn};

use crate::{CoordinatorConfig, CoordinatorState, FetchError, Fetcher, FilterValue, QueryError, QueryParams, ResultPage};

/// Filter parameters waiting out the debounce window.
struct SettledFilters {
	epoch: u64,
	params: QueryParams,
}

enum CoordinatorEvent<T> {
	FiltersSettled {
		epoch: u64,
		params: QueryParams,
	},
	Resolved {
		generation: Generation,
		outcome: Result<ResultPage<T>, FetchError>,
	},
}

/// Owns one list view's query parameters, in-flight request and last result.
pub struct Coordinator<F: Fetcher> {
	fetcher: Arc<F>,
	max_page_size: u32,
	params: QueryParams,
	clock: GenerationClock,
	in_flight: Option<RequestHandle>,
	state: CoordinatorState<F::Item>,
	debouncer: Debouncer<SettledFilters>,
	/// Bumped on every filter edit and every debounce bypass.
	settle_epoch: u64,
	settling: bool,
	events_tx: mpsc::UnboundedSender<CoordinatorEvent<F::Item>>,
	events_rx: mpsc::UnboundedReceiver<CoordinatorEvent<F::Item>>,
	notify: watch::Sender<CoordinatorState<F::Item>>,
}

impl<F: Fetcher> std::fmt::Debug for Coordinator<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Coordinator")
			.field("params", &self.params)
			.field("state", &self.state.name())
			.field("generation", &self.state.generation())
			.field("in_flight", &self.in_flight.as_ref().map(RequestHandle::generation))
			.field("settling", &self.settling)
			.finish()
	}
}

impl<F: Fetcher> Coordinator<F> {
	/// Creates an idle coordinator.
	///
	/// Nothing is fetched until the view calls [`refresh`](Self::refresh),
	/// which it must do once on mount for the initial load. Fails if the
	/// initial page size is outside `1..=max_page_size`.
	pub fn new(fetcher: Arc<F>, config: CoordinatorConfig) -> Result<Self, QueryError> {
		page_size_within(i64::from(config.initial_params.page_size()), config.max_page_size)?;

		let (events_tx, events_rx) = mpsc::unbounded_channel();
		let settle_tx = events_tx.clone();
		let debouncer = Debouncer::new(config.debounce_window, move |settled: SettledFilters| {
			let _ = settle_tx.send(CoordinatorEvent::FiltersSettled {
				epoch: settled.epoch,
				params: settled.params,
			});
		});
		let (notify, _) = watch::channel(CoordinatorState::Idle);

		Ok(Self {
			fetcher,
			max_page_size: config.max_page_size,
			params: config.initial_params,
			clock: GenerationClock::new(),
			in_flight: None,
			state: CoordinatorState::Idle,
			debouncer,
			settle_epoch: 0,
			settling: false,
			events_tx,
			events_rx,
			notify,
		})
	}

	pub fn state(&self) -> &CoordinatorState<F::Item> {
		&self.state
	}

	/// Latest requested parameters, including a filter change still settling.
	pub fn params(&self) -> &QueryParams {
		&self.params
	}

	/// Rows to render, keeping the previous page visible while reloading.
	pub fn visible_result(&self) -> Option<&Arc<ResultPage<F::Item>>> {
		self.state.visible_result()
	}

	/// True while a filter change waits for the debounce window.
	pub fn is_settling(&self) -> bool {
		self.settling
	}

	pub fn is_disposed(&self) -> bool {
		matches!(self.state, CoordinatorState::Disposed)
	}

	/// Receives a snapshot of every state transition.
	pub fn subscribe(&self) -> watch::Receiver<CoordinatorState<F::Item>> {
		self.notify.subscribe()
	}

	/// Merges `partial` into the filters, resets to the first page and
	/// schedules a debounced dispatch. `None` clears a filter.
	pub fn set_filters<I, K>(&mut self, partial: I) -> Result<(), QueryError>
	where
		I: IntoIterator<Item = (K, Option<FilterValue>)>,
		K: Into<String>,
	{
		if self.is_disposed() {
			return Ok(());
		}

		let partial: Vec<(String, Option<FilterValue>)> = partial.into_iter().map(|(k, v)| (k.into(), v)).collect();
		if let Some((key, _)) = partial.iter().find(|(key, _)| key.trim().is_empty()) {
			return Err(QueryError::Validation(format!("empty filter key {key:?}")));
		}

		let merged = self.params.merge_filters(partial);
		if merged == self.params {
			trace!(params = %merged, "query.filters_unchanged");
			return Ok(());
		}

		self.params = merged.clone();
		self.settle_epoch += 1;
		self.settling = true;
		debug!(params = %merged, window_ms = self.debouncer.window().as_millis() as u64, "query.filters");
		self.debouncer.submit(SettledFilters {
			epoch: self.settle_epoch,
			params: merged,
		});
		Ok(())
	}

	/// Moves to page `page` and dispatches immediately.
	pub fn set_page(&mut self, page: i64) -> Result<(), QueryError> {
		if self.is_disposed() {
			return Ok(());
		}

		let page = u32::try_from(page).map_err(|_| QueryError::Validation(format!("page must be a non-negative integer, got {page}")))?;
		let params = self.params.clone().with_page(page);
		self.dispatch_now(params);
		Ok(())
	}

	/// Changes the page size, returns to the first page and dispatches immediately.
	pub fn set_page_size(&mut self, page_size: i64) -> Result<(), QueryError> {
		if self.is_disposed() {
			return Ok(());
		}

		let page_size = page_size_within(page_size, self.max_page_size)?;
		let params = self.params.clone().with_page_size(page_size).with_page(0);
		self.dispatch_now(params);
		Ok(())
	}

	/// Dispatches the current parameters immediately.
	///
	/// Used for the initial load and to retry after an error.
	pub fn refresh(&mut self) {
		if self.is_disposed() {
			return;
		}
		self.bypass_debounce();
		self.dispatch();
	}

	/// Applies every event that is ready without waiting.
	///
	/// Returns true if the state changed.
	pub fn poll_events(&mut self) -> bool {
		let mut changed = false;
		while let Ok(event) = self.events_rx.try_recv() {
			changed |= self.apply(event);
		}
		changed
	}

	/// Waits for the next state change.
	///
	/// Returns false once the coordinator is disposed. Never resolves while
	/// nothing is settling or in flight.
	pub async fn changed(&mut self) -> bool {
		loop {
			if self.is_disposed() {
				return false;
			}
			let Some(event) = self.events_rx.recv().await else {
				return false;
			};
			if self.apply(event) {
				return true;
			}
		}
	}

	/// Tears the coordinator down: cancels the in-flight request and any
	/// pending filter change. Later dispatches are ignored.
	pub fn dispose(&mut self) {
		if self.is_disposed() {
			return;
		}
		self.cancel_in_flight();
		self.bypass_debounce();
		debug!("query.dispose");
		self.transition(CoordinatorState::Disposed);
	}

	fn dispatch_now(&mut self, params: QueryParams) {
		let unchanged = params == self.params && !self.settling;
		let current = matches!(
			&self.state,
			CoordinatorState::Loading { params: p, .. } | CoordinatorState::Success { params: p, .. } if *p == params
		);
		if unchanged && current {
			trace!(%params, "query.dispatch_unchanged");
			return;
		}

		self.params = params;
		self.bypass_debounce();
		self.dispatch();
	}

	fn bypass_debounce(&mut self) {
		self.debouncer.cancel();
		self.settle_epoch += 1;
		self.settling = false;
	}

	fn cancel_in_flight(&mut self) {
		if let Some(previous) = self.in_flight.take() {
			trace!(generation = %previous.generation(), "query.cancel");
			previous.cancel();
		}
	}

	fn dispatch(&mut self) {
		self.cancel_in_flight();

		let params = self.params.clone();
		let generation = self.clock.next();
		let handle = RequestHandle::new(generation);
		let token = handle.token();
		self.in_flight = Some(handle);

		let previous = self.state.visible_result().cloned();
		debug!(%generation, %params, "query.dispatch");
		self.transition(CoordinatorState::Loading {
			generation,
			params: params.clone(),
			previous,
		});

		let fetcher = self.fetcher.clone();
		let events_tx = self.events_tx.clone();
		spawn(TaskClass::Request, async move {
			// The fetcher is polled first so it observes cancellation itself.
			let outcome = tokio::select! {
				biased;
				outcome = fetcher.fetch(params, token.clone()) => outcome,
				_ = token.cancelled() => return,
			};
			if token.is_cancelled() || outcome.as_ref().is_err_and(FetchError::is_cancelled) {
				return;
			}
			let _ = events_tx.send(CoordinatorEvent::Resolved { generation, outcome });
		});
	}

	fn apply(&mut self, event: CoordinatorEvent<F::Item>) -> bool {
		if self.is_disposed() {
			return false;
		}

		match event {
			CoordinatorEvent::FiltersSettled { epoch, params } => {
				if epoch != self.settle_epoch {
					trace!(epoch, current = self.settle_epoch, "query.discard_settle");
					return false;
				}
				self.settling = false;
				debug_assert_eq!(params, self.params);
				self.dispatch();
				true
			}
			CoordinatorEvent::Resolved { generation, outcome } => self.resolve(generation, outcome),
		}
	}

	fn resolve(&mut self, generation: Generation, outcome: Result<ResultPage<F::Item>, FetchError>) -> bool {
		let params = match &self.state {
			CoordinatorState::Loading { generation: current, params, .. } if *current == generation => params.clone(),
			_ => {
				trace!(%generation, current = ?self.state.generation(), "query.discard_stale");
				return false;
			}
		};
		self.in_flight = None;

		let next = match outcome {
			Ok(page) if page.page_number != params.page() => {
				warn!(%generation, requested = params.page(), received = page.page_number, "query.page_mismatch");
				CoordinatorState::Error {
					generation,
					error: FetchError::Server(format!(
						"requested page {} but received page {}",
						params.page(),
						page.page_number
					)),
					params,
				}
			}
			Ok(page) => {
				debug!(%generation, items = page.len(), total = page.total_elements, "query.success");
				CoordinatorState::Success {
					generation,
					params,
					result: Arc::new(page),
				}
			}
			Err(error) => {
				debug!(%generation, %error, "query.error");
				CoordinatorState::Error { generation, params, error }
			}
		};
		self.transition(next);
		true
	}

	fn transition(&mut self, next: CoordinatorState<F::Item>) {
		trace!(from = self.state.name(), to = next.name(), "query.transition");
		self.state = next;
		self.notify.send_replace(self.state.clone());
	}
}

fn page_size_within(page_size: i64, max_page_size: u32) -> Result<u32, QueryError> {
	u32::try_from(page_size)
		.ok()
		.filter(|size| (1..=max_page_size).contains(size))
		.ok_or_else(|| QueryError::Validation(format!("page size must be within 1..={max_page_size}, got {page_size}")))
}

impl<F: Fetcher> Drop for Coordinator<F> {
	fn drop(&mut self) {
		self.cancel_in_flight();
		self.debouncer.cancel();
	}
}
