use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{FetchError, QueryParams, ResultPage};

/// Performs one page fetch for a list view.
///
/// Implementations must observe `token` and stop their I/O promptly once it is
/// cancelled, returning [`FetchError::Cancelled`]. A fetcher may be shared by
/// many coordinators and keeps no per-view state.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
	type Item: Clone + Send + Sync + 'static;

	async fn fetch(&self, params: QueryParams, token: CancellationToken) -> Result<ResultPage<Self::Item>, FetchError>;
}
