use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Value of a single list filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "RawFilterValue")]
pub enum FilterValue {
	Text(String),
	Number(i64),
	/// Filter present but unset; matches everything.
	#[default]
	Empty,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFilterValue {
	Number(i64),
	Text(String),
}

impl From<RawFilterValue> for FilterValue {
	fn from(raw: RawFilterValue) -> Self {
		match raw {
			RawFilterValue::Number(n) => Self::Number(n),
			RawFilterValue::Text(s) => Self::from(s),
		}
	}
}

impl From<String> for FilterValue {
	fn from(s: String) -> Self {
		if s.is_empty() { Self::Empty } else { Self::Text(s) }
	}
}

impl From<&str> for FilterValue {
	fn from(s: &str) -> Self {
		Self::from(s.to_owned())
	}
}

impl From<i64> for FilterValue {
	fn from(n: i64) -> Self {
		Self::Number(n)
	}
}

impl FilterValue {
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}

	/// Returns the value as sent to a remote API, or `None` when unset.
	pub fn as_query_value(&self) -> Option<String> {
		match self {
			Self::Text(s) => Some(s.clone()),
			Self::Number(n) => Some(n.to_string()),
			Self::Empty => None,
		}
	}

	/// Case-insensitive substring match for text, exact match for numbers.
	pub fn matches_text(&self, text: &str) -> bool {
		match self {
			Self::Text(needle) => text.to_lowercase().contains(&needle.to_lowercase()),
			Self::Number(n) => text.trim() == n.to_string(),
			Self::Empty => true,
		}
	}
}

impl fmt::Display for FilterValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Text(s) => write!(f, "{s:?}"),
			Self::Number(n) => write!(f, "{n}"),
			Self::Empty => f.write_str("<empty>"),
		}
	}
}

/// Immutable description of one list query: filters plus pagination.
///
/// Equality is structural. Filters are kept ordered so two parameter sets with
/// the same entries compare and serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParams {
	filters: BTreeMap<String, FilterValue>,
	page: u32,
	page_size: u32,
}

impl QueryParams {
	/// Creates first-page parameters with no filters.
	pub fn new(page_size: u32) -> Self {
		Self {
			filters: BTreeMap::new(),
			page: 0,
			page_size,
		}
	}

	pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
		self.filters.insert(key.into(), value.into());
		self
	}

	pub fn with_page(mut self, page: u32) -> Self {
		self.page = page;
		self
	}

	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size;
		self
	}

	/// Returns a copy with `partial` merged in and the page reset to `0`.
	///
	/// A `None` value clears the filter to [`FilterValue::Empty`].
	pub fn merge_filters<I>(&self, partial: I) -> Self
	where
		I: IntoIterator<Item = (String, Option<FilterValue>)>,
	{
		let mut merged = self.clone();
		for (key, value) in partial {
			merged.filters.insert(key, value.unwrap_or_default());
		}
		merged.page = 0;
		merged
	}

	pub fn filter(&self, key: &str) -> Option<&FilterValue> {
		self.filters.get(key)
	}

	pub fn filters(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
		self.filters.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub const fn page(&self) -> u32 {
		self.page
	}

	pub const fn page_size(&self) -> u32 {
		self.page_size
	}

	/// Index of the first item on this page.
	pub fn offset(&self) -> usize {
		self.page as usize * self.page_size as usize
	}

	/// Query-string pairs: `page`, `size`, then every non-empty filter.
	pub fn to_query_pairs(&self) -> Vec<(String, String)> {
		let mut pairs = vec![("page".to_owned(), self.page.to_string()), ("size".to_owned(), self.page_size.to_string())];
		pairs.extend(
			self.filters
				.iter()
				.filter_map(|(key, value)| value.as_query_value().map(|v| (key.clone(), v))),
		);
		pairs
	}
}

impl fmt::Display for QueryParams {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "page={} size={}", self.page, self.page_size)?;
		for (key, value) in self.filters.iter().filter(|(_, v)| !v.is_empty()) {
			write!(f, " {key}={value}")?;
		}
		Ok(())
	}
}
