//! In-memory [`Fetcher`] over a fixed record set.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{FetchError, Fetcher, FilterValue, QueryParams, ResultPage};

/// Record that can be tested against a named filter.
pub trait Filterable {
	/// Returns true when the record satisfies `key = value`.
	///
	/// Unknown keys should return `false` so typos surface as empty lists.
	fn matches(&self, key: &str, value: &FilterValue) -> bool;
}

/// Serves pages from an in-memory directory, optionally with simulated latency.
#[derive(Debug)]
pub struct MemoryFetcher<T> {
	records: Arc<[T]>,
	latency: Duration,
}

impl<T> MemoryFetcher<T> {
	pub fn new(records: impl Into<Arc<[T]>>) -> Self {
		Self {
			records: records.into(),
			latency: Duration::ZERO,
		}
	}

	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = latency;
		self
	}
}

#[async_trait]
impl<T> Fetcher for MemoryFetcher<T>
where
	T: Filterable + Clone + Send + Sync + 'static,
{
	type Item = T;

	async fn fetch(&self, params: QueryParams, token: CancellationToken) -> Result<ResultPage<T>, FetchError> {
		if !self.latency.is_zero() {
			tokio::select! {
				biased;
				_ = token.cancelled() => return Err(FetchError::Cancelled),
				_ = tokio::time::sleep(self.latency) => {}
			}
		} else if token.is_cancelled() {
			return Err(FetchError::Cancelled);
		}

		let matching: Vec<T> = self
			.records
			.iter()
			.filter(|record| params.filters().all(|(key, value)| value.is_empty() || record.matches(key, value)))
			.cloned()
			.collect();

		Ok(ResultPage::paginate(matching, params.page(), params.page_size()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, Clone, PartialEq)]
	struct Case {
		title: &'static str,
		year: i64,
	}

	impl Filterable for Case {
		fn matches(&self, key: &str, value: &FilterValue) -> bool {
			match key {
				"title" => value.matches_text(self.title),
				"year" => value.matches_text(&self.year.to_string()),
				_ => false,
			}
		}
	}

	fn cases() -> Vec<Case> {
		vec![
			Case { title: "Flood relief", year: 2023 },
			Case { title: "Medical aid", year: 2024 },
			Case { title: "Flood damage", year: 2024 },
		]
	}

	#[tokio::test(flavor = "current_thread")]
	async fn filters_and_paginates() {
		let fetcher = MemoryFetcher::new(cases());
		let params = QueryParams::new(1).with_filter("title", "flood").with_filter("year", "");

		let page = fetcher.fetch(params.clone(), CancellationToken::new()).await.unwrap();
		assert_eq!(page.items[0].title, "Flood relief");
		assert_eq!((page.total_pages, page.total_elements), (2, 2));

		let page = fetcher.fetch(params.with_filter("year", 2024), CancellationToken::new()).await.unwrap();
		assert_eq!(page.items, vec![Case { title: "Flood damage", year: 2024 }]);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn cancellation_interrupts_latency() {
		let fetcher = MemoryFetcher::new(cases()).with_latency(Duration::from_secs(10));
		let token = CancellationToken::new();
		let canceller = token.clone();

		let (result, ()) = tokio::join!(fetcher.fetch(QueryParams::new(10), token), async move {
			tokio::time::sleep(Duration::from_millis(5)).await;
			canceller.cancel();
		});

		assert_eq!(result, Err(FetchError::Cancelled));
	}
}
