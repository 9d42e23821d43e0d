//! Query coordination for filterable, paginated list views.
//!
//! A [`Coordinator`] owns one view's [`QueryParams`], its in-flight request and
//! its last result. Filter edits are debounced; page changes dispatch at once.
//! Every dispatch is tagged with a [`Generation`], and a response that resolves
//! after a newer dispatch is dropped without touching the visible state.
//!
//! Fetching is delegated to a [`Fetcher`]. [`ApiFetcher`] adapts a JSON
//! [`Transport`] and normalizes both paginated-object and bare-array payloads
//! into a [`ResultPage`]; [`MemoryFetcher`] serves an in-memory directory.
//!
//! View configurations are read from TOML through [`PortalConfig`].

pub mod adapter;
pub mod config;
mod coordinator;
pub mod error;
mod fetcher;
pub mod memory;
mod page;
mod params;
mod state;

pub use adapter::{ApiFetcher, Transport};
pub use config::{CoordinatorConfig, PortalConfig};
pub use coordinator::Coordinator;
pub use error::{ConfigError, FetchError, QueryError};
pub use fetcher::Fetcher;
pub use memory::{Filterable, MemoryFetcher};
pub use page::ResultPage;
pub use params::{FilterValue, QueryParams};
pub use roster_worker::Generation;
pub use state::CoordinatorState;
pub use tokio_util::sync::CancellationToken;
