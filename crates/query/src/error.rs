//! Error types for list queries and their configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
	/// The request was superseded or its view was disposed. Never surfaced.
	#[error("request cancelled")]
	Cancelled,

	/// Transport failure; the view may retry by re-dispatching.
	#[error("network error: {0}")]
	Network(String),

	/// Non-success response, malformed payload, or a page the request did not ask for.
	#[error("server error: {0}")]
	Server(String),
}

impl FetchError {
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

/// Synchronous rejection of a dispatch before any fetch is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
	#[error("invalid query: {0}")]
	Validation(String),
}

/// Errors that can occur when loading portal configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A value parsed but is out of range, or a view is unknown.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
