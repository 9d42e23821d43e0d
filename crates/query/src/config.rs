//! Coordinator configuration and TOML portal config loading.
//!
//! ```toml
//! [defaults]
//! debounce_window_ms = 300
//! page_size = 20
//! max_page_size = 100
//!
//! [views.members]
//! filters = { name = "", region = "" }
//!
//! [views.cases]
//! debounce_window_ms = 150
//! page_size = 10
//! ```
//!
//! Values set on a view override `[defaults]`. Empty filter strings seed the
//! key with an unset value.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::{FilterValue, QueryParams};

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Construction settings for one [`Coordinator`](crate::Coordinator).
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
	/// Quiet period before a filter-only change is dispatched.
	pub debounce_window: Duration,
	/// Parameters the view starts from.
	pub initial_params: QueryParams,
	/// Largest page size `set_page_size` accepts.
	pub max_page_size: u32,
}

impl Default for CoordinatorConfig {
	fn default() -> Self {
		Self::new(QueryParams::new(DEFAULT_PAGE_SIZE))
	}
}

impl CoordinatorConfig {
	pub fn new(initial_params: QueryParams) -> Self {
		Self {
			debounce_window: DEFAULT_DEBOUNCE_WINDOW,
			initial_params,
			max_page_size: DEFAULT_MAX_PAGE_SIZE,
		}
	}

	pub fn with_debounce_window(mut self, window: Duration) -> Self {
		self.debounce_window = window;
		self
	}

	/// Checks that the initial page size is within `1..=max_page_size`.
	pub fn validate(&self) -> Result<()> {
		let size = self.initial_params.page_size();
		if size == 0 || size > self.max_page_size {
			return Err(ConfigError::Invalid(format!(
				"page_size {size} outside 1..={}",
				self.max_page_size
			)));
		}
		Ok(())
	}
}

/// Portal-wide settings shared by every view unless overridden.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
	pub debounce_window_ms: u64,
	pub page_size: u32,
	pub max_page_size: u32,
}

impl Default for Defaults {
	fn default() -> Self {
		Self {
			debounce_window_ms: DEFAULT_DEBOUNCE_WINDOW.as_millis() as u64,
			page_size: DEFAULT_PAGE_SIZE,
			max_page_size: DEFAULT_MAX_PAGE_SIZE,
		}
	}
}

/// Per-view overrides and filter seeds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
	pub debounce_window_ms: Option<u64>,
	pub page_size: Option<u32>,
	pub max_page_size: Option<u32>,
	pub filters: BTreeMap<String, FilterValue>,
}

/// Parsed portal configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
	pub defaults: Defaults,
	pub views: BTreeMap<String, ViewConfig>,
}

impl PortalConfig {
	/// Parses TOML text and validates every view.
	pub fn parse(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		for name in config.views.keys() {
			config.view(name)?;
		}
		Ok(config)
	}

	/// Reads and parses a config file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&input)
	}

	/// Resolves the coordinator config for view `name`.
	pub fn view(&self, name: &str) -> Result<CoordinatorConfig> {
		let view = self
			.views
			.get(name)
			.ok_or_else(|| ConfigError::Invalid(format!("unknown view '{name}'")))?;

		if let Some(key) = view.filters.keys().find(|key| key.trim().is_empty()) {
			return Err(ConfigError::Invalid(format!("view '{name}' has an empty filter key {key:?}")));
		}

		let mut params = QueryParams::new(view.page_size.unwrap_or(self.defaults.page_size));
		for (key, value) in &view.filters {
			params = params.with_filter(key.clone(), value.clone());
		}

		let config = CoordinatorConfig {
			debounce_window: Duration::from_millis(view.debounce_window_ms.unwrap_or(self.defaults.debounce_window_ms)),
			initial_params: params,
			max_page_size: view.max_page_size.unwrap_or(self.defaults.max_page_size),
		};
		match config.validate() {
			Err(ConfigError::Invalid(msg)) => Err(ConfigError::Invalid(format!("view '{name}': {msg}"))),
			other => other.map(|()| config),
		}
	}

	pub fn view_names(&self) -> impl Iterator<Item = &str> {
		self.views.keys().map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	const PORTAL: &str = r#"
[defaults]
debounce_window_ms = 250
page_size = 20

[views.members]
filters = { name = "", region = "north", year = 2024 }

[views.cases]
debounce_window_ms = 100
page_size = 5
"#;

	#[test]
	fn views_inherit_and_override_defaults() {
		let config = PortalConfig::parse(PORTAL).unwrap();
		assert_eq!(config.view_names().collect::<Vec<_>>(), vec!["cases", "members"]);

		let members = config.view("members").unwrap();
		assert_eq!(members.debounce_window, Duration::from_millis(250));
		assert_eq!(members.max_page_size, DEFAULT_MAX_PAGE_SIZE);
		assert_eq!(
			members.initial_params,
			QueryParams::new(20)
				.with_filter("name", FilterValue::Empty)
				.with_filter("region", "north")
				.with_filter("year", 2024)
		);

		let cases = config.view("cases").unwrap();
		assert_eq!(cases.debounce_window, Duration::from_millis(100));
		assert_eq!(cases.initial_params.page_size(), 5);
	}

	#[test]
	fn empty_document_uses_builtin_defaults() {
		let config = PortalConfig::parse("").unwrap();
		assert_eq!(config.defaults, Defaults::default());
		assert!(matches!(config.view("members"), Err(ConfigError::Invalid(_))));
	}

	#[test]
	fn out_of_range_page_size_is_rejected() {
		let error = PortalConfig::parse("[views.members]\npage_size = 0\n").unwrap_err();
		assert!(matches!(error, ConfigError::Invalid(ref msg) if msg.contains("members")));

		let error = PortalConfig::parse("[views.members]\npage_size = 500\nmax_page_size = 200\n").unwrap_err();
		assert!(matches!(error, ConfigError::Invalid(_)));
	}

	#[test]
	fn unknown_fields_are_toml_errors() {
		let error = PortalConfig::parse("[defaults]\ndebounce = 3\n").unwrap_err();
		assert!(matches!(error, ConfigError::Toml(_)));
	}

	#[test]
	fn load_reads_file_and_reports_missing_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(PORTAL.as_bytes()).unwrap();
		let config = PortalConfig::load(file.path()).unwrap();
		assert_eq!(config.views.len(), 2);

		let missing = file.path().with_extension("missing");
		assert!(matches!(PortalConfig::load(&missing), Err(ConfigError::Io { path, .. }) if path == missing));
	}
}
