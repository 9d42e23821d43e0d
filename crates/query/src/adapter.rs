//! JSON API adapter.
//!
//! List endpoints answer in one of two shapes: a paginated object
//! (`{"content": [...], "number": 0, "totalPages": 3, "totalElements": 42}`) or
//! a bare array holding every matching record. Both are normalized into a
//! [`ResultPage`] here so a coordinator only ever sees one shape and applies
//! its generation check uniformly.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{FetchError, Fetcher, QueryParams, ResultPage};

/// Raw GET access to the remote API.
///
/// Authentication, base URLs and status mapping live behind this trait.
/// Implementations return [`FetchError::Network`] for transport failures and
/// [`FetchError::Server`] for non-success statuses.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
	async fn get(&self, path: &str, query: &[(String, String)], token: CancellationToken) -> Result<Value, FetchError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PageEnvelope<T> {
	Paged {
		content: Vec<T>,
		number: u32,
		#[serde(rename = "totalPages")]
		total_pages: u32,
		#[serde(rename = "totalElements")]
		total_elements: u64,
	},
	Bare(Vec<T>),
}

/// Normalizes a list payload into the page requested by `params`.
///
/// A bare array is treated as the complete result set and sliced locally.
pub fn normalize<T: DeserializeOwned>(payload: Value, params: &QueryParams) -> Result<ResultPage<T>, FetchError> {
	let envelope: PageEnvelope<T> =
		serde_json::from_value(payload).map_err(|error| FetchError::Server(format!("malformed payload: {error}")))?;

	Ok(match envelope {
		PageEnvelope::Paged {
			content,
			number,
			total_pages,
			total_elements,
		} => ResultPage::new(content, number, total_pages, total_elements),
		PageEnvelope::Bare(all) => ResultPage::paginate(all, params.page(), params.page_size()),
	})
}

/// [`Fetcher`] for one list endpoint of a JSON API.
pub struct ApiFetcher<Tr, T> {
	transport: Arc<Tr>,
	path: String,
	_item: PhantomData<fn() -> T>,
}

impl<Tr, T> std::fmt::Debug for ApiFetcher<Tr, T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ApiFetcher").field("path", &self.path).finish_non_exhaustive()
	}
}

impl<Tr: Transport, T> ApiFetcher<Tr, T> {
	/// Creates a fetcher for `path`, sharing `transport` with other endpoints.
	pub fn new(transport: Arc<Tr>, path: impl Into<String>) -> Self {
		Self {
			transport,
			path: path.into(),
			_item: PhantomData,
		}
	}
}

#[async_trait]
impl<Tr, T> Fetcher for ApiFetcher<Tr, T>
where
	Tr: Transport,
	T: DeserializeOwned + Clone + Send + Sync + 'static,
{
	type Item = T;

	async fn fetch(&self, params: QueryParams, token: CancellationToken) -> Result<ResultPage<T>, FetchError> {
		let query = params.to_query_pairs();
		tracing::trace!(path = %self.path, %params, "api.fetch");

		let payload = tokio::select! {
			biased;
			_ = token.cancelled() => return Err(FetchError::Cancelled),
			payload = self.transport.get(&self.path, &query, token.clone()) => payload?,
		};

		normalize(payload, &params)
	}
}
